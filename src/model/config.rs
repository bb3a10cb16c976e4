use serde::{Deserialize, Serialize};

/// Configuration from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    pub workspace: WorkspaceInfo,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceInfo {
    pub name: String,
    /// User ID that CLI and TUI act as
    #[serde(default = "default_owner")]
    pub owner: String,
}

fn default_owner() -> String {
    "local".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Show completed tasks below each list
    #[serde(default)]
    pub show_completed: bool,
    #[serde(default = "default_sidebar_width")]
    pub sidebar_width: u16,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            show_completed: false,
            sidebar_width: default_sidebar_width(),
        }
    }
}

fn default_sidebar_width() -> u16 {
    32
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing` filter directive, overridden by TASKDECK_LOG
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
