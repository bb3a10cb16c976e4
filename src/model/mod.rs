pub mod config;
pub mod nav;
pub mod note;
pub mod project;
pub mod task;
pub mod workspace;

pub use config::*;
pub use nav::*;
pub use note::*;
pub use project::*;
pub use task::*;
pub use workspace::*;
