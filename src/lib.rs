//! taskdeck: a task and note workspace with drag-and-drop ordering.
//!
//! Records live in `.taskdeck/workspace.json`. Every change to order or
//! containment goes through [`store::Store`]; drags are resolved by [`dnd`]
//! and applied by [`ops::moves`].

pub mod cli;
pub mod dnd;
pub mod io;
pub mod logging;
pub mod model;
pub mod ops;
pub mod store;
pub mod tui;
