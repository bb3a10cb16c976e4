pub mod config_io;
pub mod lock;
pub mod state;
pub mod watcher;
pub mod workspace_io;
