//! Library crate for tau.
//!
//! The reusable part is [core]: [core::VirtualTable], a virtualized detail-view table over one
//! directory listing with stable multi-key sorting, path-keyed multi-selection, lazily resolved
//! per-entry metadata and column widths that only grow within a listing generation.
//!
//! The shipped application is the `tau` binary (`src/main.rs`), a terminal browser built from
//! [app], [config], [ui] and [utils] around that table.

pub mod app;
pub mod config;
pub mod core;
pub mod ui;
pub mod utils;
