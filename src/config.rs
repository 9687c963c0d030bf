//! Configuration for tau.
//!
//! - [load]: the [Config] struct, config file lookup and default config generation.
//! - [general]: listing behavior ([General]).
//! - [table]: table layout and metadata options ([Table]).
//! - [input]: key bindings ([Keys]) and the external [Editor].
//!
//! Everything is read from `tau.toml` with serde. Missing sections and fields fall back to the
//! internal defaults.

pub mod general;
pub mod input;
pub mod load;
pub mod table;

pub use general::General;
pub use input::{Editor, Keys};
pub use load::{Config, ConfigError, RawConfig};
pub use table::Table;
