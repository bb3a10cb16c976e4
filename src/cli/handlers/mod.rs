mod init;
pub use init::cmd_init;

use std::path::PathBuf;
use std::sync::OnceLock;

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::dnd::dispatch::dispatch as dispatch_drop;
use crate::dnd::token::{self, DragItem, DropTarget, SidebarIndex};
use crate::dnd::{Collision, Contact, Destination, DragEnd};
use crate::io::config_io;
use crate::io::lock::FileLock;
use crate::io::workspace_io::{self, Deck, WORKSPACE_DIR, WorkspaceError};
use crate::logging;
use crate::model::{Priority, SmartList, TaskStatus, Workspace};
use crate::ops::records::{self, InsertAt};
use crate::ops::views::{self, ListItem};
use crate::ops::{Outcome, moves, sort_order};
use crate::store::RecordRef;

/// Global override for the workspace directory (set by -C flag)
static WORKSPACE_DIR_OVERRIDE: OnceLock<PathBuf> = OnceLock::new();

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;

    if let Some(ref dir) = cli.workspace_dir {
        let abs = std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?;
        let _ = WORKSPACE_DIR_OVERRIDE.set(abs);
    }

    let Some(cmd) = cli.command else {
        // The binary launches the TUI before getting here
        return Ok(());
    };
    match cmd {
        Commands::Init(args) => cmd_init(args),

        // Read commands
        Commands::List(args) => cmd_list(args, json),
        Commands::Sidebar => cmd_sidebar(json),
        Commands::Show(args) => cmd_show(args, json),

        // Create
        Commands::Add(args) => cmd_add(args, InsertAt::Bottom),
        Commands::Push(args) => cmd_add(args, InsertAt::Top),
        Commands::Note(args) => cmd_note(args),
        Commands::Sub(args) => cmd_sub(args),
        Commands::Project(args) => cmd_project(args),
        Commands::Folder(args) => cmd_folder(args),
        Commands::Section(args) => cmd_section(args),

        // Edit
        Commands::Done(args) => cmd_status(args, TaskStatus::Completed),
        Commands::Reopen(args) => cmd_status(args, TaskStatus::Pending),
        Commands::Check(args) => cmd_check(args),
        Commands::Due(args) => cmd_due(args),
        Commands::Priority(args) => cmd_priority(args),
        Commands::Remind(args) => cmd_remind(args),
        Commands::Rename(args) => cmd_rename(args),
        Commands::Delete(args) => cmd_delete(args, json),

        // Order and containment
        Commands::Mv(args) => cmd_mv(args, json),
        Commands::Order(args) => cmd_order(args, json),

        Commands::Config(args) => cmd_config(args),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Where commands start looking for a workspace: `-C` or the current directory
pub(crate) fn start_dir() -> std::io::Result<PathBuf> {
    match WORKSPACE_DIR_OVERRIDE.get() {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir(),
    }
}

fn load_deck_cwd() -> Result<Deck, WorkspaceError> {
    let start = start_dir().map_err(|e| WorkspaceError::ReadError {
        path: PathBuf::from("."),
        source: e,
    })?;
    let root = workspace_io::discover_workspace(&start)?;
    let (config, _) = config_io::read_config(&root.join(WORKSPACE_DIR))?;
    logging::init_cli(Some(&config.log.level));
    workspace_io::load_deck(&root)
}

/// Lock the workspace, then read its records, so a write never starts from
/// a copy another process has since replaced.
fn load_deck_locked() -> Result<(Deck, FileLock), Box<dyn std::error::Error>> {
    let mut deck = load_deck_cwd()?;
    let lock = FileLock::acquire_default(&deck.dir)?;
    deck.workspace = workspace_io::load_workspace(&deck.dir)?;
    Ok((deck, lock))
}

fn destination(project: Option<String>, section: Option<String>) -> Destination {
    match project {
        None => Destination::Inbox,
        Some(project_id) => Destination::Project {
            project_id,
            section_id: section,
        },
    }
}

fn today_start() -> DateTime<Utc> {
    views::start_of_day(Local::now())
}

/// Parse a due date argument: `today`, `tomorrow`, `YYYY-MM-DD` (local), or `none`.
fn parse_due(s: &str, now: DateTime<Local>) -> Result<Option<DateTime<Utc>>, String> {
    let today = views::start_of_day(now);
    match s {
        "none" | "clear" => Ok(None),
        "today" => Ok(Some(today)),
        "tomorrow" => Ok(Some(today + Duration::days(1))),
        _ => {
            let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
                format!(
                    "invalid date '{}' (expected: today, tomorrow, YYYY-MM-DD, none)",
                    s
                )
            })?;
            let midnight = Local.from_local_datetime(&date.and_time(chrono::NaiveTime::MIN));
            midnight
                .earliest()
                .map(|d| Some(d.with_timezone(&Utc)))
                .ok_or_else(|| format!("{} has no local midnight", s))
        }
    }
}

/// Parse a reminder time: RFC 3339, or `YYYY-MM-DD HH:MM` in local time.
fn parse_reminder(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(at) = DateTime::parse_from_rfc3339(s) {
        return Ok(at.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M")
        .map_err(|_| format!("invalid time '{}' (expected RFC 3339 or YYYY-MM-DD HH:MM)", s))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|d| d.with_timezone(&Utc))
        .ok_or_else(|| format!("{} does not exist in local time", s))
}

/// A bare ID resolved to whatever record carries it
fn bare_item(ws: &Workspace, id: &str) -> Option<DragItem> {
    if ws.task(id).is_some() {
        Some(DragItem::task(id))
    } else if ws.note(id).is_some() {
        Some(DragItem::note(id))
    } else if ws.project(id).is_some() {
        Some(DragItem::project(id))
    } else if ws.folder(id).is_some() {
        Some(DragItem::folder(id))
    } else {
        None
    }
}

fn parse_target(ws: &Workspace, index: &SidebarIndex, s: &str) -> Option<DropTarget> {
    DropTarget::parse(s, index).or_else(|| bare_item(ws, s).map(DropTarget::Item))
}

fn print_outcome(outcome: &Outcome, json: bool) -> CmdResult {
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome_to_json(outcome))?);
    } else {
        for line in format_outcome(outcome) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn print_task(deck: &Deck, id: &str) {
    if let Some(task) = deck.workspace.task(id) {
        println!("{}", format_task_line(task));
    }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(args: ListArgs, json: bool) -> CmdResult {
    let deck = load_deck_cwd()?;
    let ws = &deck.workspace;
    let owner = deck.owner();
    let include_completed = args.all || deck.config.ui.show_completed;
    let grep = args.grep.as_deref().map(Regex::new).transpose()?;
    let keep = |item: &ListItem<'_>| grep.as_ref().is_none_or(|re| re.is_match(item.title()));

    if let Some(project_id) = args.project {
        let mut view = views::project_view(ws, owner, &project_id, include_completed)
            .ok_or_else(|| format!("project not found: {}", project_id))?;
        view.unsectioned.retain(|i| keep(i));
        for block in &mut view.sections {
            block.items.retain(|i| keep(i));
        }
        if json {
            println!(
                "{}",
                serde_json::to_string_pretty(&project_view_to_json(ws, &view))?
            );
        } else {
            for line in format_project_view(&view) {
                println!("{}", line);
            }
        }
        return Ok(());
    }

    let smart: SmartList = args.smart.unwrap_or(SmartArg::Inbox).into();
    let mut items: Vec<ListItem> = match smart {
        SmartList::Inbox => views::inbox(ws, owner, include_completed),
        SmartList::Today => views::today(ws, owner, today_start())
            .into_iter()
            .map(ListItem::Task)
            .collect(),
        SmartList::NextSevenDays => views::next_seven_days(ws, owner, today_start())
            .into_iter()
            .map(ListItem::Task)
            .collect(),
    };
    items.retain(|i| keep(i));

    if json {
        let out: Vec<ItemJson> = items.iter().map(|i| item_to_json(ws, i)).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("== {} ==", smart.label());
        for item in &items {
            println!("{}", format_item_line(item));
        }
    }
    Ok(())
}

fn cmd_sidebar(json: bool) -> CmdResult {
    let deck = load_deck_cwd()?;
    let entries = views::sidebar(&deck.workspace, deck.owner());
    if json {
        let out: Vec<SidebarJson> = entries.iter().map(sidebar_to_json).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for line in format_sidebar(&entries) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, json: bool) -> CmdResult {
    let deck = load_deck_cwd()?;
    let ws = &deck.workspace;
    let id = args.id.as_str();

    if let Some(task) = ws.task(id) {
        if json {
            println!("{}", serde_json::to_string_pretty(&task_to_json(ws, task))?);
        } else {
            for line in format_task_detail(ws, task) {
                println!("{}", line);
            }
        }
    } else if let Some(note) = ws.note(id) {
        if json {
            println!("{}", serde_json::to_string_pretty(&note_to_json(note))?);
        } else {
            for line in format_note_detail(ws, note) {
                println!("{}", line);
            }
        }
    } else if let Some(view) = views::project_view(ws, deck.owner(), id, true) {
        if json {
            println!(
                "{}",
                serde_json::to_string_pretty(&project_view_to_json(ws, &view))?
            );
        } else {
            for line in format_project_view(&view) {
                println!("{}", line);
            }
        }
    } else if let Some(entry) = views::sidebar(ws, deck.owner())
        .into_iter()
        .find(|e| e.id() == id)
    {
        if json {
            println!("{}", serde_json::to_string_pretty(&sidebar_to_json(&entry))?);
        } else {
            for line in format_sidebar(std::slice::from_ref(&entry)) {
                println!("{}", line);
            }
        }
    } else {
        return Err(format!("not found: {}", id).into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Create commands
// ---------------------------------------------------------------------------

fn cmd_add(args: AddArgs, at: InsertAt) -> CmdResult {
    let (mut deck, _lock) = load_deck_locked()?;
    let owner = deck.owner().to_string();
    let to = destination(args.project, args.section);
    let id = records::create_task(&mut deck.workspace, &owner, &args.title, &to, at)?;
    deck.save()?;
    println!("{}", id);
    Ok(())
}

fn cmd_note(args: NoteArgs) -> CmdResult {
    let (mut deck, _lock) = load_deck_locked()?;
    let owner = deck.owner().to_string();
    let to = destination(args.project, args.section);
    let id = records::create_note(&mut deck.workspace, &owner, &args.title, args.body, &to)?;
    deck.save()?;
    println!("{}", id);
    Ok(())
}

fn cmd_sub(args: SubArgs) -> CmdResult {
    let (mut deck, _lock) = load_deck_locked()?;
    let owner = deck.owner().to_string();
    let id = records::create_subtask(&mut deck.workspace, &owner, &args.task_id, &args.title)?;
    deck.save()?;
    println!("{}", id);
    Ok(())
}

fn cmd_project(args: ProjectArgs) -> CmdResult {
    let (mut deck, _lock) = load_deck_locked()?;
    let owner = deck.owner().to_string();
    let id = records::create_project(
        &mut deck.workspace,
        &owner,
        &args.name,
        args.folder.as_deref(),
    )?;
    deck.save()?;
    println!("{}", id);
    Ok(())
}

fn cmd_folder(args: FolderArgs) -> CmdResult {
    let (mut deck, _lock) = load_deck_locked()?;
    let owner = deck.owner().to_string();
    let id = records::create_folder(&mut deck.workspace, &owner, &args.name)?;
    deck.save()?;
    println!("{}", id);
    Ok(())
}

fn cmd_section(args: SectionArgs) -> CmdResult {
    let (mut deck, _lock) = load_deck_locked()?;
    let owner = deck.owner().to_string();
    let id = records::create_section(&mut deck.workspace, &owner, &args.project_id, &args.name)?;
    deck.save()?;
    println!("{}", id);
    Ok(())
}

// ---------------------------------------------------------------------------
// Edit commands
// ---------------------------------------------------------------------------

fn cmd_status(args: IdsArgs, status: TaskStatus) -> CmdResult {
    let (mut deck, _lock) = load_deck_locked()?;
    let owner = deck.owner().to_string();
    for id in &args.ids {
        records::set_status(&mut deck.workspace, &owner, id, status)?;
    }
    deck.save()?;
    for id in &args.ids {
        print_task(&deck, id);
    }
    Ok(())
}

fn cmd_check(args: IdArg) -> CmdResult {
    let (mut deck, _lock) = load_deck_locked()?;
    let owner = deck.owner().to_string();
    let completed = records::toggle_subtask(&mut deck.workspace, &owner, &args.id)?;
    deck.save()?;
    println!("[{}] {}", if completed { 'x' } else { ' ' }, args.id);
    Ok(())
}

fn cmd_due(args: DueArgs) -> CmdResult {
    let due = parse_due(&args.date, Local::now())?;
    let (mut deck, _lock) = load_deck_locked()?;
    let owner = deck.owner().to_string();
    records::set_due_date(&mut deck.workspace, &owner, &args.id, due)?;
    deck.save()?;
    print_task(&deck, &args.id);
    Ok(())
}

fn cmd_priority(args: PriorityArgs) -> CmdResult {
    let priority = match args.level.as_str() {
        "none" => None,
        level => Some(Priority::parse(level).ok_or_else(|| {
            format!(
                "unknown priority '{}' (expected: low, medium, high, urgent, none)",
                level
            )
        })?),
    };
    let (mut deck, _lock) = load_deck_locked()?;
    let owner = deck.owner().to_string();
    records::set_priority(&mut deck.workspace, &owner, &args.id, priority)?;
    deck.save()?;
    print_task(&deck, &args.id);
    Ok(())
}

fn cmd_remind(args: RemindArgs) -> CmdResult {
    let at = parse_reminder(&args.at)?;
    let (mut deck, _lock) = load_deck_locked()?;
    let owner = deck.owner().to_string();
    let changed = if args.remove {
        records::remove_reminder(&mut deck.workspace, &owner, &args.id, at)?
    } else {
        records::add_reminder(&mut deck.workspace, &owner, &args.id, at)?
    };
    if !changed {
        println!("no change");
        return Ok(());
    }
    deck.save()?;
    print_task(&deck, &args.id);
    Ok(())
}

fn cmd_rename(args: RenameArgs) -> CmdResult {
    let (mut deck, _lock) = load_deck_locked()?;
    let owner = deck.owner().to_string();
    let record = RecordRef::new(args.kind.into(), args.id);
    records::rename(&mut deck.workspace, &owner, &record, &args.name)?;
    deck.save()?;
    Ok(())
}

fn cmd_delete(args: DeleteArgs, json: bool) -> CmdResult {
    let (mut deck, _lock) = load_deck_locked()?;
    let owner = deck.owner().to_string();
    let record = RecordRef::new(args.kind.into(), args.id);
    let outcome = records::delete(&mut deck.workspace, &owner, &record)?;
    deck.save()?;
    print_outcome(&outcome, json)
}

// ---------------------------------------------------------------------------
// Order and containment
// ---------------------------------------------------------------------------

fn cmd_mv(args: MvArgs, json: bool) -> CmdResult {
    let (mut deck, _lock) = load_deck_locked()?;
    let owner = deck.owner().to_string();

    let ctx = views::drag_context(&deck.workspace, &owner, today_start(), true);
    let active = token::decode(&args.active)
        .or_else(|| bare_item(&deck.workspace, &args.active))
        .ok_or_else(|| format!("not a draggable item: {}", args.active))?;
    let target = parse_target(&deck.workspace, &ctx.index, &args.target)
        .ok_or_else(|| format!("not a drop target: {}", args.target))?;

    let end = DragEnd {
        active,
        over: Some(Collision {
            target,
            contact: if args.beside {
                Contact::Intersecting
            } else {
                Contact::Within
            },
        }),
    };
    let Some(mutation) = dispatch_drop(&end, &ctx) else {
        return print_outcome(&Outcome::default(), json);
    };
    let outcome = moves::apply(&mut deck.workspace, &owner, &mutation)?;
    if !outcome.is_noop() {
        deck.save()?;
    }
    print_outcome(&outcome, json)
}

fn cmd_order(args: OrderArgs, json: bool) -> CmdResult {
    let (mut deck, _lock) = load_deck_locked()?;
    let owner = deck.owner().to_string();
    let records: Vec<RecordRef> = args
        .ids
        .iter()
        .map(|id| match token::decode(id) {
            Some(item) => item.record(),
            None => RecordRef::new(args.kind.into(), id.clone()),
        })
        .collect();
    let outcome = sort_order::renumber(&mut deck.workspace, &owner, &records)?;
    if !outcome.is_noop() {
        deck.save()?;
    }
    print_outcome(&outcome, json)
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn cmd_config(args: ConfigArgs) -> CmdResult {
    let start = start_dir()?;
    let root = workspace_io::discover_workspace(&start)?;
    let dir = root.join(WORKSPACE_DIR);
    let (config, mut doc) = config_io::read_config(&dir)?;
    logging::init_cli(Some(&config.log.level));

    match args.value {
        None => match config_io::get_value(&doc, &args.key)? {
            Some(value) => println!("{}", value),
            None => return Err(format!("{} is not set", args.key).into()),
        },
        Some(value) => {
            let _lock = FileLock::acquire_default(&dir)?;
            config_io::set_value(&mut doc, &args.key, &value)?;
            config_io::write_config(&dir, &doc)?;
            tracing::info!(key = %args.key, %value, "config updated");
        }
    }
    Ok(())
}
