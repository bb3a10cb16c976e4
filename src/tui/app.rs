use std::io;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::dnd::{
    DragContext, DragItem, DragSession, DropTarget, Droppable, Dropped, ItemKind, ListScope, Point,
    Rect,
};
use crate::io::lock::FileLock;
use crate::io::state::{prune_nav_state, read_nav_state, write_nav_state};
use crate::io::watcher::{DeckWatcher, FileEvent};
use crate::io::workspace_io::{Deck, LOG_FILE, discover_workspace, load_deck, load_workspace};
use crate::logging;
use crate::model::{NavState, Selection, SmartList, Workspace};
use crate::ops::moves;
use crate::ops::views::{self, ListItem, SidebarEntry};

use super::input;
use super::render;
use super::theme::Theme;

/// Which pane has keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Sidebar,
    List,
}

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Keyboard drag: j/k choose the landing spot
    Move,
    /// Typing into `edit_buffer`
    Input(InputKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Renaming `nav.editing`
    Rename,
    /// Title for a new task in the selected container
    NewTask,
}

/// A row in the sidebar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarRow {
    Smart(SmartList),
    Folder {
        id: String,
        name: String,
        expanded: bool,
    },
    Project {
        id: String,
        name: String,
        in_folder: bool,
    },
    /// Shown only while a project is being dragged
    NoFolder,
}

impl SidebarRow {
    pub fn drag_item(&self) -> Option<DragItem> {
        match self {
            SidebarRow::Folder { id, .. } => Some(DragItem::folder(id.clone())),
            SidebarRow::Project { id, .. } => Some(DragItem::project(id.clone())),
            _ => None,
        }
    }

    pub fn drop_target(&self) -> Option<DropTarget> {
        match self {
            SidebarRow::Smart(SmartList::NextSevenDays) => None,
            SidebarRow::Smart(list) => Some(DropTarget::SmartList(*list)),
            SidebarRow::NoFolder => Some(DropTarget::NoFolder),
            row => row.drag_item().map(DropTarget::Item),
        }
    }
}

/// A row in the list pane
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListRow {
    /// A section heading; items dropped on it move into `target`
    Header { label: String, target: DropTarget },
    Item(DragItem),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

/// A clickable row recorded during render
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub rect: Rect,
    pub pane: Pane,
    pub row: usize,
}

/// A left-button press that has not yet become a click or a drag
#[derive(Debug, Clone)]
pub struct Press {
    pub hit: Hit,
    pub item: Option<DragItem>,
    pub origin: Point,
}

/// Main application state
pub struct App {
    pub deck: Deck,
    pub nav: NavState,
    pub theme: Theme,
    pub mode: Mode,
    pub focus: Pane,
    pub sidebar_cursor: usize,
    pub list_cursor: usize,
    pub drag: DragSession,
    /// Drop regions registered by the last render
    pub droppables: Vec<Droppable>,
    /// Rows registered by the last render
    pub hits: Vec<Hit>,
    pub press: Option<Press>,
    pub status: Option<Status>,
    pub edit_buffer: String,
    pub show_completed: bool,
    pub today_start: DateTime<Utc>,
    pub should_quit: bool,
    pub watcher: Option<DeckWatcher>,
    /// `workspace.json` changed on disk and has not been reloaded yet
    pub pending_reload: bool,
}

impl App {
    pub fn new(deck: Deck, nav: NavState) -> Self {
        let show_completed = deck.config.ui.show_completed;
        let mut app = App {
            deck,
            nav,
            theme: Theme::default(),
            mode: Mode::Navigate,
            focus: Pane::List,
            sidebar_cursor: 0,
            list_cursor: 0,
            drag: DragSession::new(),
            droppables: Vec::new(),
            hits: Vec::new(),
            press: None,
            status: None,
            edit_buffer: String::new(),
            show_completed,
            today_start: views::start_of_day(Local::now()),
            should_quit: false,
            watcher: None,
            pending_reload: false,
        };
        // Leftover edit from a previous session is not resumed
        app.nav.end_edit();
        app.sidebar_cursor = app.selected_sidebar_row().unwrap_or(0);
        app
    }

    pub fn owner(&self) -> &str {
        self.deck.owner()
    }

    /// Sidebar rows in display order, honoring any optimistic reorder.
    pub fn sidebar_rows(&self) -> Vec<SidebarRow> {
        let ws = &self.deck.workspace;
        let mut rows = vec![
            SidebarRow::Smart(SmartList::Inbox),
            SidebarRow::Smart(SmartList::Today),
            SidebarRow::Smart(SmartList::NextSevenDays),
        ];
        let entries = views::sidebar(ws, self.owner());
        let stored: Vec<DragItem> = entries.iter().map(SidebarEntry::drag_item).collect();
        for item in self.drag.display(&ListScope::Sidebar, &stored) {
            let Some(entry) = entries.iter().find(|e| e.drag_item() == *item) else {
                continue;
            };
            match entry {
                SidebarEntry::Folder { folder, projects } => {
                    let expanded = self.nav.is_expanded(&folder.id);
                    rows.push(SidebarRow::Folder {
                        id: folder.id.clone(),
                        name: folder.name.clone(),
                        expanded,
                    });
                    if !expanded {
                        continue;
                    }
                    let stored: Vec<DragItem> = projects
                        .iter()
                        .map(|p| DragItem::project(p.id.clone()))
                        .collect();
                    let scope = ListScope::Folder(folder.id.clone());
                    for item in self.drag.display(&scope, &stored) {
                        if let Some(p) = projects.iter().find(|p| p.id == item.id) {
                            rows.push(SidebarRow::Project {
                                id: p.id.clone(),
                                name: p.name.clone(),
                                in_folder: true,
                            });
                        }
                    }
                }
                SidebarEntry::Project(p) => rows.push(SidebarRow::Project {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    in_folder: false,
                }),
            }
        }
        if self.drag.active().is_some_and(|i| i.kind == ItemKind::Project) {
            rows.push(SidebarRow::NoFolder);
        }
        rows
    }

    fn selected_sidebar_row(&self) -> Option<usize> {
        self.sidebar_rows().iter().position(|row| match (row, &self.nav.selection) {
            (SidebarRow::Smart(a), Selection::Smart(b)) => a == b,
            (SidebarRow::Project { id, .. }, Selection::Project(sel)) => id == sel,
            _ => false,
        })
    }

    /// Heading for the list pane
    pub fn list_title(&self) -> String {
        match &self.nav.selection {
            Selection::Smart(list) => list.label().to_string(),
            Selection::Project(id) => self
                .deck
                .workspace
                .project(id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| id.clone()),
        }
    }

    /// List pane rows in display order, honoring any optimistic reorder.
    pub fn list_rows(&self) -> Vec<ListRow> {
        let ws = &self.deck.workspace;
        let owner = self.owner();
        // A pending order also carries hidden siblings; show only stored rows
        let shown = |scope: ListScope, stored: Vec<DragItem>| -> Vec<ListRow> {
            self.drag
                .display(&scope, &stored)
                .iter()
                .filter(|item| stored.contains(item))
                .cloned()
                .map(ListRow::Item)
                .collect()
        };
        let drag_items =
            |items: &[ListItem<'_>]| items.iter().map(ListItem::drag_item).collect::<Vec<_>>();

        match &self.nav.selection {
            Selection::Smart(SmartList::Inbox) => shown(
                ListScope::inbox(),
                drag_items(&views::inbox(ws, owner, self.show_completed)),
            ),
            Selection::Smart(SmartList::Today) => shown(
                ListScope::Smart(SmartList::Today),
                views::today(ws, owner, self.today_start)
                    .iter()
                    .map(|t| DragItem::task(t.id.clone()))
                    .collect(),
            ),
            Selection::Smart(SmartList::NextSevenDays) => views::next_seven_days(
                ws,
                owner,
                self.today_start,
            )
            .iter()
            .map(|t| ListRow::Item(DragItem::task(t.id.clone())))
            .collect(),
            Selection::Project(project_id) => {
                let Some(view) = views::project_view(ws, owner, project_id, self.show_completed)
                else {
                    return Vec::new();
                };
                let mut rows = vec![ListRow::Header {
                    label: "(no section)".to_string(),
                    target: DropTarget::Unsectioned {
                        project_id: project_id.clone(),
                    },
                }];
                rows.extend(shown(
                    ListScope::Items {
                        project_id: Some(project_id.clone()),
                        section_id: None,
                    },
                    drag_items(&view.unsectioned),
                ));
                for block in &view.sections {
                    rows.push(ListRow::Header {
                        label: block.section.name.clone(),
                        target: DropTarget::Section {
                            project_id: project_id.clone(),
                            section_id: block.section.id.clone(),
                        },
                    });
                    rows.extend(shown(
                        ListScope::Items {
                            project_id: Some(project_id.clone()),
                            section_id: Some(block.section.id.clone()),
                        },
                        drag_items(&block.items),
                    ));
                }
                rows
            }
        }
    }

    pub fn drag_context(&self) -> DragContext {
        views::drag_context(
            &self.deck.workspace,
            self.owner(),
            self.today_start,
            self.show_completed,
        )
    }

    /// The draggable record under the cursor of the focused pane
    pub fn cursor_item(&self) -> Option<DragItem> {
        match self.focus {
            Pane::Sidebar => self
                .sidebar_rows()
                .get(self.sidebar_cursor)
                .and_then(SidebarRow::drag_item),
            Pane::List => match self.list_rows().get(self.list_cursor) {
                Some(ListRow::Item(item)) => Some(item.clone()),
                _ => None,
            },
        }
    }

    /// Activate a sidebar row: select a list or project, or fold a folder.
    pub fn activate_sidebar_row(&mut self, index: usize) {
        let Some(row) = self.sidebar_rows().into_iter().nth(index) else {
            return;
        };
        self.sidebar_cursor = index;
        match row {
            SidebarRow::Smart(list) => self.select(Selection::Smart(list)),
            SidebarRow::Project { id, .. } => self.select(Selection::Project(id)),
            SidebarRow::Folder { id, .. } => {
                self.nav.toggle_folder(&id);
            }
            SidebarRow::NoFolder => {}
        }
    }

    fn select(&mut self, selection: Selection) {
        if self.nav.selection != selection {
            self.nav.select(selection);
            self.list_cursor = 0;
        }
    }

    /// Put the cursor back on `item` after it moved.
    pub fn follow(&mut self, item: &DragItem) {
        if item.kind.is_list_item() {
            if let Some(i) = self
                .list_rows()
                .iter()
                .position(|r| matches!(r, ListRow::Item(it) if it == item))
            {
                self.list_cursor = i;
            }
        } else if let Some(i) = self
            .sidebar_rows()
            .iter()
            .position(|r| r.drag_item().as_ref() == Some(item))
        {
            self.sidebar_cursor = i;
        }
    }

    /// Run a write against the workspace under the file lock and save it.
    /// The workspace is re-read under the lock first so writes from other
    /// `td` processes are kept. On any failure the in-memory workspace is
    /// restored and the error is shown on the status line.
    pub fn commit<T>(
        &mut self,
        what: &str,
        op: impl FnOnce(&mut Workspace, &str) -> Result<T, Box<dyn std::error::Error>>,
    ) -> Option<T> {
        let result = self.try_commit(op);
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(error = %e, "{} failed", what);
                self.status = Some(Status::Error(format!("{} failed: {}", what, e)));
                None
            }
        }
    }

    fn try_commit<T>(
        &mut self,
        op: impl FnOnce(&mut Workspace, &str) -> Result<T, Box<dyn std::error::Error>>,
    ) -> Result<T, Box<dyn std::error::Error>> {
        let _lock = FileLock::acquire_default(&self.deck.dir)?;
        self.deck.workspace = load_workspace(&self.deck.dir)?;
        self.pending_reload = false;
        let owner = self.owner().to_string();
        let before = self.deck.workspace.clone();
        let result = op(&mut self.deck.workspace, &owner).and_then(|value| {
            self.deck.save()?;
            Ok(value)
        });
        if result.is_err() {
            self.deck.workspace = before;
        }
        result
    }

    /// Persist a finished drop, then settle its optimistic order either way.
    pub fn apply_drop(&mut self, dropped: Dropped) {
        let Dropped { mutation, ticket } = dropped;
        let outcome = self.commit("move", |ws, owner| Ok(moves::apply(ws, owner, &mutation)?));
        if let Some(ticket) = ticket {
            self.drag.settle(ticket);
        }
        if let Some(outcome) = outcome {
            tracing::info!(?mutation, writes = outcome.writes(), "drop applied");
            self.status = Some(if outcome.is_noop() {
                Status::Info("no change".to_string())
            } else {
                Status::Info(format!("updated {}", outcome.writes()))
            });
        }
    }

    /// Drop optimistic orders the stored data has caught up with.
    pub fn reconcile_lists(&mut self) {
        if self.drag.is_dragging() {
            return;
        }
        for list in self.drag_context().lists {
            self.drag.reconcile(&list.scope, &list.siblings);
        }
    }

    /// Drain watcher events. A change is reloaded once no drag is in flight.
    pub fn check_watcher(&mut self) {
        if let Some(watcher) = &self.watcher {
            for FileEvent::Changed(paths) in watcher.poll() {
                tracing::debug!(?paths, "workspace changed on disk");
                self.pending_reload = true;
            }
        }
        if self.pending_reload && !self.drag.is_dragging() {
            self.reload_workspace();
        }
    }

    /// Replace the in-memory workspace with what is on disk.
    pub fn reload_workspace(&mut self) {
        self.pending_reload = false;
        match load_workspace(&self.deck.dir) {
            Ok(workspace) => {
                self.deck.workspace = workspace;
                prune_nav_state(&mut self.nav, &self.deck.workspace);
                input::clamp_cursors(self);
                self.reconcile_lists();
            }
            Err(e) => {
                tracing::warn!(error = %e, "reload failed");
                self.status = Some(Status::Error(format!("reload failed: {}", e)));
            }
        }
    }
}

/// Run the TUI application
pub fn run(workspace_dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let start = match workspace_dir {
        Some(dir) => std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?,
        None => std::env::current_dir()?,
    };
    let root: PathBuf = discover_workspace(&start)?;
    let deck = load_deck(&root)?;
    logging::init_tui(&deck.dir.join(LOG_FILE), Some(&deck.config.log.level));

    let mut nav = read_nav_state(&deck.dir).unwrap_or_default();
    prune_nav_state(&mut nav, &deck.workspace);
    let mut app = App::new(deck, nav);
    app.watcher = match DeckWatcher::start(&app.deck.dir) {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            tracing::warn!(error = %e, "could not watch workspace; external edits show after the next write");
            None
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    if let Err(e) = write_nav_state(&app.deck.dir, &app.nav) {
        tracing::warn!(error = %e, "could not save navigation state");
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.today_start = views::start_of_day(Local::now());
        app.check_watcher();
        app.reconcile_lists();
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => input::handle_key(app, key),
                Event::Mouse(mouse) => input::handle_mouse(app, mouse),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dnd::Destination;
    use crate::io::workspace_io::save_workspace;
    use crate::model::TaskStatus;
    use crate::ops::records::{self, InsertAt};
    use crate::store::RecordRef;
    use crate::tui::render::test_helpers::{app_with, sample_workspace};
    use pretty_assertions::assert_eq;

    /// What a separate `td add` does to the files under the app's feet
    fn add_from_outside(app: &App, title: &str) -> String {
        let mut ws = load_workspace(&app.deck.dir).unwrap();
        let id = records::create_task(&mut ws, "me", title, &Destination::Inbox, InsertAt::Bottom)
            .unwrap();
        save_workspace(&app.deck.dir, &ws).unwrap();
        id
    }

    #[test]
    fn sidebar_lists_smart_lists_then_entries() {
        let (_tmp, mut app) = app_with(sample_workspace());
        let names = |app: &App| -> Vec<String> {
            app.sidebar_rows()
                .iter()
                .map(|r| match r {
                    SidebarRow::Smart(l) => l.label().to_string(),
                    SidebarRow::Folder { name, .. } | SidebarRow::Project { name, .. } => {
                        name.clone()
                    }
                    SidebarRow::NoFolder => "-".to_string(),
                })
                .collect()
        };
        assert_eq!(
            names(&app),
            vec!["Inbox", "Today", "Next 7 Days", "Work", "Home"]
        );
        app.nav.toggle_folder("f-work");
        assert_eq!(
            names(&app),
            vec!["Inbox", "Today", "Next 7 Days", "Work", "Launch", "Home"]
        );
    }

    #[test]
    fn project_rows_have_section_headers() {
        let (_tmp, mut app) = app_with(sample_workspace());
        app.nav.select(Selection::Project("p-home".into()));
        let rows = app.list_rows();
        assert_eq!(
            rows[0],
            ListRow::Header {
                label: "(no section)".into(),
                target: DropTarget::Unsectioned {
                    project_id: "p-home".into()
                },
            }
        );
        assert!(rows.contains(&ListRow::Item(DragItem::task("t-paint"))));
        assert!(rows.iter().any(|r| matches!(
            r,
            ListRow::Header { target: DropTarget::Section { section_id, .. }, .. } if section_id == "s-garden"
        )));
    }

    #[test]
    fn activating_folder_toggles_it() {
        let (_tmp, mut app) = app_with(sample_workspace());
        let folder = app
            .sidebar_rows()
            .iter()
            .position(|r| matches!(r, SidebarRow::Folder { .. }))
            .unwrap();
        app.activate_sidebar_row(folder);
        assert!(app.nav.is_expanded("f-work"));
        app.activate_sidebar_row(folder);
        assert!(!app.nav.is_expanded("f-work"));
    }

    #[test]
    fn failed_commit_restores_workspace_and_reports() {
        let (_tmp, mut app) = app_with(sample_workspace());
        let before = app.deck.workspace.clone();
        let result: Option<()> = app.commit("rename", |ws, _| {
            ws.tasks.clear();
            Err("store rejected the write".into())
        });
        assert!(result.is_none());
        assert_eq!(app.deck.workspace, before);
        assert!(matches!(app.status, Some(Status::Error(ref m)) if m.contains("rejected")));
    }

    #[test]
    fn commit_keeps_records_written_by_another_process() {
        let (_tmp, mut app) = app_with(sample_workspace());
        let outside = add_from_outside(&app, "Written elsewhere");

        let renamed = app.commit("rename", |ws, owner| {
            Ok(records::rename(ws, owner, &RecordRef::task("t-milk"), "Buy oat milk")?)
        });
        assert!(renamed.is_some());

        let on_disk = load_workspace(&app.deck.dir).unwrap();
        assert!(on_disk.task(&outside).is_some());
        assert_eq!(on_disk.task("t-milk").unwrap().title, "Buy oat milk");
        assert!(app.deck.workspace.task(&outside).is_some());
    }

    #[test]
    fn reload_waits_for_the_drag_to_finish() {
        let (_tmp, mut app) = app_with(sample_workspace());
        let outside = add_from_outside(&app, "Written elsewhere");
        app.pending_reload = true;

        let ctx = app.drag_context();
        app.drag.start_keyboard(DragItem::task("t-milk"), &ctx);
        app.check_watcher();
        assert!(app.deck.workspace.task(&outside).is_none());
        assert!(app.pending_reload);

        app.drag.cancel();
        app.check_watcher();
        assert!(app.deck.workspace.task(&outside).is_some());
        assert!(!app.pending_reload);
        assert!(
            app.list_rows()
                .contains(&ListRow::Item(DragItem::task(outside.clone())))
        );
    }

    #[test]
    fn reorder_with_completed_hidden_keeps_keys_distinct() {
        // Inbox: t-milk 0, t-call 1 (completed, hidden), n-idea 2
        let mut ws = sample_workspace();
        let call = ws.tasks.iter_mut().find(|t| t.id == "t-call").unwrap();
        call.status = TaskStatus::Completed;
        call.sort_order = 1;
        ws.notes[0].sort_order = 2;
        let (_tmp, mut app) = app_with(ws);
        assert!(!app.show_completed);

        let ctx = app.drag_context();
        app.drag.start_keyboard(DragItem::note("n-idea"), &ctx);
        app.drag.nudge(-1, &ctx);
        let dropped = app.drag.end(&ctx).unwrap();
        app.apply_drop(dropped);

        let ws = &app.deck.workspace;
        assert_eq!(ws.note("n-idea").unwrap().sort_order, 0);
        assert_eq!(ws.task("t-call").unwrap().sort_order, 1);
        assert_eq!(ws.task("t-milk").unwrap().sort_order, 2);
        assert_eq!(
            app.list_rows(),
            vec![
                ListRow::Item(DragItem::note("n-idea")),
                ListRow::Item(DragItem::task("t-milk")),
            ]
        );
    }
}
