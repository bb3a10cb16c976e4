use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::io::config_io;
use crate::model::{Workspace, WorkspaceConfig};

pub const WORKSPACE_DIR: &str = ".taskdeck";
pub const CONFIG_FILE: &str = "config.toml";
pub const DATA_FILE: &str = "workspace.json";
pub const LOG_FILE: &str = "taskdeck.log";

/// Error type for workspace I/O operations
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("not a taskdeck workspace: no .taskdeck/ directory found")]
    NotAWorkspace,
    #[error("workspace already exists at {0}")]
    AlreadyInitialized(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not edit config.toml: {0}")]
    ConfigEditError(#[from] toml_edit::TomlError),
    #[error("unknown config key: {0}")]
    UnknownKey(String),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
    #[error("could not parse {path}: {source}")]
    DataParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not serialize workspace: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// A workspace on disk, loaded
#[derive(Debug, Clone)]
pub struct Deck {
    /// Directory containing `.taskdeck/`
    pub root: PathBuf,
    /// The `.taskdeck/` directory itself
    pub dir: PathBuf,
    pub config: WorkspaceConfig,
    pub workspace: Workspace,
}

impl Deck {
    /// The user ID this workspace acts as
    pub fn owner(&self) -> &str {
        &self.config.workspace.owner
    }

    pub fn save(&self) -> Result<(), WorkspaceError> {
        save_workspace(&self.dir, &self.workspace)
    }
}

/// Walk up from `start` looking for a `.taskdeck/` directory with a config.
pub fn discover_workspace(start: &Path) -> Result<PathBuf, WorkspaceError> {
    let mut current = start.to_path_buf();
    loop {
        let dir = current.join(WORKSPACE_DIR);
        if dir.is_dir() && dir.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(WorkspaceError::NotAWorkspace);
        }
    }
}

pub fn load_deck(root: &Path) -> Result<Deck, WorkspaceError> {
    let dir = root.join(WORKSPACE_DIR);
    if !dir.is_dir() {
        return Err(WorkspaceError::NotAWorkspace);
    }
    let (config, _doc) = config_io::read_config(&dir)?;
    let workspace = load_workspace(&dir)?;
    tracing::debug!(
        root = %root.display(),
        tasks = workspace.tasks.len(),
        notes = workspace.notes.len(),
        projects = workspace.projects.len(),
        "loaded workspace"
    );
    Ok(Deck {
        root: root.to_path_buf(),
        dir,
        config,
        workspace,
    })
}

/// Read `workspace.json`. A missing file is an empty workspace.
pub fn load_workspace(dir: &Path) -> Result<Workspace, WorkspaceError> {
    let path = dir.join(DATA_FILE);
    if !path.exists() {
        return Ok(Workspace::default());
    }
    let text = fs::read_to_string(&path).map_err(|e| WorkspaceError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    serde_json::from_str(&text).map_err(|e| WorkspaceError::DataParseError { path, source: e })
}

pub fn save_workspace(dir: &Path, workspace: &Workspace) -> Result<(), WorkspaceError> {
    let path = dir.join(DATA_FILE);
    let mut content = serde_json::to_string_pretty(workspace)?;
    content.push('\n');
    atomic_write(&path, content.as_bytes())
        .map_err(|e| WorkspaceError::WriteError { path, source: e })
}

/// Create `.taskdeck/` under `root` with a fresh config and an empty workspace.
pub fn init_workspace(root: &Path, name: &str, owner: &str) -> Result<PathBuf, WorkspaceError> {
    let dir = root.join(WORKSPACE_DIR);
    if dir.join(CONFIG_FILE).exists() {
        return Err(WorkspaceError::AlreadyInitialized(dir));
    }
    fs::create_dir_all(&dir).map_err(|e| WorkspaceError::WriteError {
        path: dir.clone(),
        source: e,
    })?;
    config_io::write_config(&dir, &config_io::default_document(name, owner))?;
    save_workspace(&dir, &Workspace::default())?;
    tracing::info!(dir = %dir.display(), "initialized workspace");
    Ok(dir)
}

/// Write via a temp file in the same directory, then rename over `path`.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
