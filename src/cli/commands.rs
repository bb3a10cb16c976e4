use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::model::SmartList;
use crate::store::RecordKind;

#[derive(Parser)]
#[command(name = "td", about = concat!("taskdeck v", env!("CARGO_PKG_VERSION"), " - tasks, notes, and the order you put them in"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different workspace directory
    #[arg(short = 'C', long = "workspace-dir", global = true)]
    pub workspace_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new workspace in the current directory
    Init(InitArgs),
    /// List tasks and notes in a smart list or project
    List(ListArgs),
    /// Show folders and projects in sidebar order
    Sidebar,
    /// Show one record in detail
    Show(ShowArgs),
    /// Add a task at the bottom of its container
    Add(AddArgs),
    /// Add a task at the top of its container
    Push(AddArgs),
    /// Add a note
    Note(NoteArgs),
    /// Add a subtask to a task
    Sub(SubArgs),
    /// Create a project
    Project(ProjectArgs),
    /// Create a folder
    Folder(FolderArgs),
    /// Create a section in a project
    Section(SectionArgs),
    /// Mark tasks completed
    Done(IdsArgs),
    /// Mark tasks pending again
    Reopen(IdsArgs),
    /// Toggle a subtask
    Check(IdArg),
    /// Set or clear a task's due date
    Due(DueArgs),
    /// Set or clear a task's priority
    Priority(PriorityArgs),
    /// Add or remove a reminder
    Remind(RemindArgs),
    /// Rename any record
    Rename(RenameArgs),
    /// Delete a record (children are detached, not deleted)
    Delete(DeleteArgs),
    /// Drop one item onto a target, exactly as a drag would
    Mv(MvArgs),
    /// Renumber siblings into the given order
    Order(OrderArgs),
    /// Read or set a config value
    Config(ConfigArgs),
}

/// Record kinds accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Task,
    Note,
    Project,
    Folder,
    Section,
    Subtask,
}

impl From<KindArg> for RecordKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Task => RecordKind::Task,
            KindArg::Note => RecordKind::Note,
            KindArg::Project => RecordKind::Project,
            KindArg::Folder => RecordKind::Folder,
            KindArg::Section => RecordKind::Section,
            KindArg::Subtask => RecordKind::Subtask,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SmartArg {
    Inbox,
    Today,
    Week,
}

impl From<SmartArg> for SmartList {
    fn from(smart: SmartArg) -> Self {
        match smart {
            SmartArg::Inbox => SmartList::Inbox,
            SmartArg::Today => SmartList::Today,
            SmartArg::Week => SmartList::NextSevenDays,
        }
    }
}

// ---------------------------------------------------------------------------
// Init args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Workspace name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// User ID to act as (default: $USER, else "local")
    #[arg(long)]
    pub owner: Option<String>,
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// Smart list to show (default: inbox)
    #[arg(long, value_enum, conflicts_with = "project")]
    pub smart: Option<SmartArg>,
    /// Project to show, with its sections
    #[arg(long)]
    pub project: Option<String>,
    /// Include completed tasks
    #[arg(long)]
    pub all: bool,
    /// Only items whose title matches this regex
    #[arg(long)]
    pub grep: Option<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Record ID
    pub id: String,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Project to add to (default: Inbox)
    #[arg(long)]
    pub project: Option<String>,
    /// Section within the project
    #[arg(long, requires = "project")]
    pub section: Option<String>,
}

#[derive(Args)]
pub struct NoteArgs {
    /// Note title
    pub title: String,
    /// Note body
    #[arg(long)]
    pub body: Option<String>,
    #[arg(long)]
    pub project: Option<String>,
    #[arg(long, requires = "project")]
    pub section: Option<String>,
}

#[derive(Args)]
pub struct SubArgs {
    /// Parent task ID
    pub task_id: String,
    /// Subtask title
    pub title: String,
}

#[derive(Args)]
pub struct ProjectArgs {
    pub name: String,
    /// Create inside this folder
    #[arg(long)]
    pub folder: Option<String>,
}

#[derive(Args)]
pub struct FolderArgs {
    pub name: String,
}

#[derive(Args)]
pub struct SectionArgs {
    /// Project ID
    pub project_id: String,
    pub name: String,
}

#[derive(Args)]
pub struct IdsArgs {
    /// Task IDs
    #[arg(required = true)]
    pub ids: Vec<String>,
}

#[derive(Args)]
pub struct IdArg {
    pub id: String,
}

#[derive(Args)]
pub struct DueArgs {
    /// Task ID
    pub id: String,
    /// today, tomorrow, YYYY-MM-DD, or none
    pub date: String,
}

#[derive(Args)]
pub struct PriorityArgs {
    /// Task ID
    pub id: String,
    /// low, medium, high, urgent, or none
    pub level: String,
}

#[derive(Args)]
pub struct RemindArgs {
    /// Task ID
    pub id: String,
    /// RFC 3339 timestamp or local "YYYY-MM-DD HH:MM"
    pub at: String,
    /// Remove the reminder instead of adding it
    #[arg(long)]
    pub remove: bool,
}

#[derive(Args)]
pub struct RenameArgs {
    #[arg(value_enum)]
    pub kind: KindArg,
    pub id: String,
    pub name: String,
}

#[derive(Args)]
pub struct DeleteArgs {
    #[arg(value_enum)]
    pub kind: KindArg,
    pub id: String,
}

#[derive(Args)]
pub struct MvArgs {
    /// Dragged item: task::ID, note::ID, project::ID, folder::ID, or a bare sidebar ID
    pub active: String,
    /// Drop target: an item token, smart-list:inbox, smart-list:today, no-folder,
    /// section::PROJECT::SECTION, unsectioned::PROJECT, or a bare sidebar ID
    pub target: String,
    /// Drop beside the target instead of into it (projects onto folders)
    #[arg(long)]
    pub beside: bool,
}

#[derive(Args)]
pub struct OrderArgs {
    /// Kind of bare IDs; typed tokens (kind::ID) override it
    #[arg(value_enum)]
    pub kind: KindArg,
    /// Every sibling, in the new order
    #[arg(required = true)]
    pub ids: Vec<String>,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Key as table.field, e.g. ui.show_completed
    pub key: String,
    /// New value; omit to print the current one
    pub value: Option<String>,
}
