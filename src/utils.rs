//! Miscellaneous utility functions for tau.
//!
//! - [helpers]: home directory handling, resolving the start directory and opening files in the
//!   chosen editor.
//! - [cli]: command line flags and help text.
//! - [logging]: the file logger installed by the binary.

pub mod cli;
pub mod helpers;
pub mod logging;

pub use helpers::{
    expand_home_path, get_home, open_in_editor, resolve_initial_dir, shorten_home_path,
};
pub use logging::init_logging;
