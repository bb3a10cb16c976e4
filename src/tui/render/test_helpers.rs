use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use tempfile::TempDir;

use crate::io::workspace_io::{Deck, WORKSPACE_DIR};
use crate::model::{
    Folder, LogConfig, NavState, Note, Project, Section, Task, UiConfig, Workspace,
    WorkspaceConfig, WorkspaceInfo,
};
use crate::tui::app::App;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

pub fn task(id: &str, title: &str, sort_order: i64) -> Task {
    let mut task = Task::new(id.into(), "me".into(), title.into());
    task.sort_order = sort_order;
    task
}

/// A small workspace owned by `me`:
///
/// - folder Work holding project Launch, then standalone project Home
/// - Home has one unsectioned task and a Garden section with one task
/// - Inbox: Buy milk, the Gift ideas note, Call plumber
pub fn sample_workspace() -> Workspace {
    let mut paint = task("t-paint", "Paint fence", 0);
    paint.project_id = Some("p-home".into());
    let mut weed = task("t-weed", "Pull weeds", 0);
    weed.project_id = Some("p-home".into());
    weed.section_id = Some("s-garden".into());
    let mut idea = Note::new("n-idea".into(), "me".into(), "Gift ideas".into());
    idea.sort_order = 1;

    Workspace {
        folders: vec![Folder {
            id: "f-work".into(),
            user_id: "me".into(),
            name: "Work".into(),
            sort_order: 0,
        }],
        projects: vec![
            Project {
                id: "p-launch".into(),
                user_id: "me".into(),
                name: "Launch".into(),
                folder_id: Some("f-work".into()),
                sort_order: 0,
            },
            Project {
                id: "p-home".into(),
                user_id: "me".into(),
                name: "Home".into(),
                folder_id: None,
                sort_order: 1,
            },
        ],
        sections: vec![Section {
            id: "s-garden".into(),
            user_id: "me".into(),
            project_id: "p-home".into(),
            name: "Garden".into(),
            sort_order: 0,
        }],
        tasks: vec![
            task("t-milk", "Buy milk", 0),
            task("t-call", "Call plumber", 2),
            paint,
            weed,
        ],
        subtasks: vec![],
        notes: vec![idea],
    }
}

/// An app over `ws`, backed by a throwaway workspace directory so commits
/// can take the lock and save. The directory lives as long as the `TempDir`.
pub fn app_with(ws: Workspace) -> (TempDir, App) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();
    let dir = root.join(WORKSPACE_DIR);
    std::fs::create_dir_all(&dir).unwrap();
    let deck = Deck {
        root,
        dir,
        config: WorkspaceConfig {
            workspace: WorkspaceInfo {
                name: "Test".into(),
                owner: "me".into(),
            },
            ui: UiConfig::default(),
            log: LogConfig::default(),
        },
        workspace: ws,
    };
    deck.save().unwrap();
    (tmp, App::new(deck, NavState::default()))
}
