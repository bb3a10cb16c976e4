use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::io::workspace_io::DATA_FILE;

/// Events sent from the file watcher to the TUI event loop.
#[derive(Debug)]
pub enum FileEvent {
    /// `workspace.json` was written, by this process or another one.
    Changed(Vec<PathBuf>),
}

/// Watches a `.taskdeck/` directory for writes to the record file.
pub struct DeckWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<FileEvent>,
}

impl DeckWatcher {
    /// Start watching `dir`. Call [`poll`](Self::poll) once per tick.
    pub fn start(dir: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(e) => e,
                    Err(e) => {
                        tracing::warn!(error = %e, "file watcher error");
                        return;
                    }
                };
                match event.kind {
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
                    _ => return,
                }
                // Saves land by renaming a temp file over workspace.json
                let relevant: Vec<PathBuf> = event
                    .paths
                    .into_iter()
                    .filter(|p| is_data_file(p))
                    .collect();
                if !relevant.is_empty() {
                    let _ = tx.send(FileEvent::Changed(relevant));
                }
            },
            Config::default(),
        )?;

        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        tracing::debug!(dir = %dir.display(), "watching workspace");
        Ok(DeckWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Non-blocking: every event queued since the last poll.
    pub fn poll(&self) -> Vec<FileEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.rx.try_recv() {
            events.push(evt);
        }
        events
    }
}

fn is_data_file(path: &Path) -> bool {
    path.file_name().and_then(|n| n.to_str()) == Some(DATA_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn only_the_record_file_is_relevant() {
        assert!(is_data_file(Path::new("/w/.taskdeck/workspace.json")));
        assert!(!is_data_file(Path::new("/w/.taskdeck/.state.json")));
        assert!(!is_data_file(Path::new("/w/.taskdeck/.lock")));
        assert!(!is_data_file(Path::new("/w/.taskdeck/config.toml")));
    }

    #[test]
    fn reports_writes_to_the_record_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let watcher = DeckWatcher::start(tmp.path()).unwrap();
        std::fs::write(tmp.path().join(DATA_FILE), "{}").unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut events = Vec::new();
        while events.is_empty() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(25));
            events = watcher.poll();
        }
        assert!(matches!(events.first(), Some(FileEvent::Changed(paths)) if !paths.is_empty()));
    }
}
