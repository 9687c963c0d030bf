//! Terminal UI for tau.
//!
//! [render] draws one frame from the [crate::app::AppState]: the path bar, the detail table and
//! the status line.

pub mod render;

pub use render::render;
