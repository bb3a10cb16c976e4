//! Drag and drop end to end through the public API: a gesture on a
//! `DragSession`, the mutation it dispatches, and the store writes that
//! mutation produces.

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;

use taskdeck::dnd::{
    DragContext, DragItem, DragSession, DropTarget, Droppable, ListScope, Mutation, Point, Rect,
};
use taskdeck::model::{Folder, Note, Project, SmartList, Task, TaskStatus, Workspace};
use taskdeck::ops::{moves, sort_order, views};
use taskdeck::store::{OrderScope, Patch, Placement, RecordRef, Store, StoreError};

const ME: &str = "me";

/// Wraps a workspace and records every write; can be told to reject writes.
#[derive(Default)]
struct RecordingStore {
    inner: Workspace,
    patches: Vec<(RecordRef, Patch)>,
    reject: bool,
}

impl Store for RecordingStore {
    fn owner(&self, record: &RecordRef) -> Option<&str> {
        self.inner.owner(record)
    }

    fn placement(&self, record: &RecordRef) -> Option<Placement> {
        self.inner.placement(record)
    }

    fn sort_orders(&self, scope: &OrderScope) -> Vec<i64> {
        self.inner.sort_orders(scope)
    }

    fn patch(&mut self, record: &RecordRef, patch: &Patch) -> Result<(), StoreError> {
        if self.reject {
            return Err(StoreError::NotFound(record.clone()));
        }
        self.patches.push((record.clone(), patch.clone()));
        self.inner.patch(record, patch)
    }

    fn delete(&mut self, record: &RecordRef) -> Result<(), StoreError> {
        self.inner.delete(record)
    }
}

fn task(id: &str, project: Option<&str>, sort_order: i64) -> Task {
    let mut t = Task::new(id.into(), ME.into(), id.into());
    t.project_id = project.map(str::to_string);
    t.sort_order = sort_order;
    t
}

fn note(id: &str, project: Option<&str>, sort_order: i64) -> Note {
    let mut n = Note::new(id.into(), ME.into(), id.into());
    n.project_id = project.map(str::to_string);
    n.sort_order = sort_order;
    n
}

fn project(id: &str, folder: Option<&str>, sort_order: i64) -> Project {
    Project {
        id: id.into(),
        user_id: ME.into(),
        name: id.into(),
        folder_id: folder.map(str::to_string),
        sort_order,
    }
}

fn folder(id: &str, sort_order: i64) -> Folder {
    Folder {
        id: id.into(),
        user_id: ME.into(),
        name: id.into(),
        sort_order,
    }
}

/// Sidebar: folder f-a (holding p-1), project p-b, folder f-c.
/// Inbox: t-1, t-2. p-1 holds notes n-1..n-3. p-b holds t-3.
fn workspace() -> Workspace {
    let mut foreign = task("t-x", None, 5);
    foreign.user_id = "someone-else".into();
    Workspace {
        folders: vec![folder("f-a", 0), folder("f-c", 2)],
        projects: vec![project("p-1", Some("f-a"), 0), project("p-b", None, 1)],
        tasks: vec![
            task("t-1", None, 0),
            task("t-2", None, 1),
            task("t-3", Some("p-b"), 0),
            foreign,
        ],
        notes: vec![
            note("n-1", Some("p-1"), 0),
            note("n-2", Some("p-1"), 1),
            note("n-3", Some("p-1"), 2),
        ],
        ..Default::default()
    }
}

fn store() -> RecordingStore {
    RecordingStore {
        inner: workspace(),
        ..Default::default()
    }
}

fn ctx(store: &RecordingStore) -> DragContext {
    let today = Utc.with_ymd_and_hms(2026, 3, 10, 5, 0, 0).unwrap();
    views::drag_context(&store.inner, ME, today, false)
}

fn row(y: f64) -> Rect {
    Rect::new(0.0, y, 20.0, 1.0)
}

/// Pointer at the center of row `y` in column 5
fn at(y: f64) -> Point {
    Point::new(5.5, y + 0.5)
}

/// Press on `item` drawn at row `from`, move to row `to`, release.
fn mouse_drop(
    session: &mut DragSession,
    item: DragItem,
    from: f64,
    to: f64,
    droppables: &[Droppable],
    ctx: &DragContext,
) -> Option<Mutation> {
    session.start(item, at(from), row(from));
    session.drag_move(at(to), droppables);
    session.end(ctx).map(|d| d.mutation)
}

#[test]
fn today_beats_project_for_tasks() {
    let mut store = store();
    let ctx = ctx(&store);
    let droppables = vec![
        Droppable::new(DropTarget::Item(DragItem::project("p-b")), Rect::new(0.0, 0.0, 20.0, 3.0)),
        Droppable::new(DropTarget::SmartList(SmartList::Today), row(0.0)),
    ];
    let mut session = DragSession::new();
    let mutation =
        mouse_drop(&mut session, DragItem::task("t-1"), 6.0, 0.0, &droppables, &ctx).unwrap();
    assert_eq!(
        mutation,
        Mutation::ScheduleTask {
            task_id: "t-1".into(),
            due: ctx.today_start,
        }
    );

    moves::apply(&mut store, ME, &mutation).unwrap();
    assert_eq!(
        store.patches,
        vec![(RecordRef::task("t-1"), Patch::due_date(Some(ctx.today_start)))]
    );
}

#[test]
fn self_drop_issues_no_calls() {
    let store = store();
    let ctx = ctx(&store);
    let droppables = vec![
        Droppable::new(DropTarget::Item(DragItem::task("t-1")), row(0.0)),
        Droppable::new(DropTarget::Item(DragItem::task("t-2")), row(1.0)),
    ];
    let mut session = DragSession::new();
    let mutation = mouse_drop(&mut session, DragItem::task("t-1"), 0.0, 0.0, &droppables, &ctx);
    assert_eq!(mutation, None);
    assert!(store.patches.is_empty());
}

#[test]
fn task_appends_after_notes_in_mixed_container() {
    let mut store = store();
    let ctx = ctx(&store);
    let droppables = vec![Droppable::new(
        DropTarget::Item(DragItem::project("p-1")),
        row(0.0),
    )];
    let mut session = DragSession::new();
    let mutation =
        mouse_drop(&mut session, DragItem::task("t-1"), 4.0, 0.0, &droppables, &ctx).unwrap();
    moves::apply(&mut store, ME, &mutation).unwrap();

    assert_eq!(
        store.patches,
        vec![(
            RecordRef::task("t-1"),
            Patch::placement(Some("p-1".into()), None, 3)
        )]
    );
}

#[test]
fn reparent_to_inbox_is_one_patch() {
    let mut store = store();
    let ctx = ctx(&store);
    let droppables = vec![Droppable::new(DropTarget::SmartList(SmartList::Inbox), row(0.0))];
    let mut session = DragSession::new();
    let mutation =
        mouse_drop(&mut session, DragItem::task("t-3"), 4.0, 0.0, &droppables, &ctx).unwrap();
    let outcome = moves::apply(&mut store, ME, &mutation).unwrap();

    assert_eq!(outcome.writes(), 1);
    assert_eq!(
        store.patches,
        vec![(RecordRef::task("t-3"), Patch::placement(None, None, 2))]
    );
}

#[test]
fn reparent_to_current_container_writes_nothing() {
    let mut store = store();
    let ctx = ctx(&store);
    let droppables = vec![Droppable::new(DropTarget::SmartList(SmartList::Inbox), row(0.0))];
    let mut session = DragSession::new();
    let mutation =
        mouse_drop(&mut session, DragItem::task("t-1"), 4.0, 0.0, &droppables, &ctx).unwrap();
    let outcome = moves::apply(&mut store, ME, &mutation).unwrap();
    assert!(outcome.is_noop());
    assert!(store.patches.is_empty());
}

#[test]
fn sidebar_reorder_renumbers_unified_order() {
    let mut store = store();
    let ctx = ctx(&store);
    let sidebar = [
        DragItem::folder("f-a"),
        DragItem::project("p-b"),
        DragItem::folder("f-c"),
    ];
    let droppables: Vec<Droppable> = sidebar
        .iter()
        .enumerate()
        .map(|(i, item)| Droppable::new(DropTarget::Item(item.clone()), row(i as f64)))
        .collect();

    let mut session = DragSession::new();
    session.start(DragItem::folder("f-c"), at(2.0), row(2.0));
    session.drag_move(at(0.0), &droppables);
    let dropped = session.end(&ctx).unwrap();

    // The new order shows before the store confirms it
    assert_eq!(
        session.display(&ListScope::Sidebar, &sidebar),
        &[
            DragItem::folder("f-c"),
            DragItem::folder("f-a"),
            DragItem::project("p-b"),
        ]
    );

    moves::apply(&mut store, ME, &dropped.mutation).unwrap();
    assert_eq!(
        store.patches,
        vec![
            (RecordRef::folder("f-c"), Patch::sort_order(0)),
            (RecordRef::folder("f-a"), Patch::sort_order(1)),
            (RecordRef::project("p-b"), Patch::sort_order(2)),
        ]
    );
    assert!(session.settle(dropped.ticket.unwrap()));
}

#[test]
fn foldered_project_beside_sidebar_items_is_a_no_op() {
    let store = store();
    let ctx = ctx(&store);
    let droppables = vec![Droppable::new(DropTarget::Item(DragItem::project("p-b")), row(0.0))];
    let mut session = DragSession::new();
    let mutation = mouse_drop(&mut session, DragItem::project("p-1"), 3.0, 0.0, &droppables, &ctx);
    assert_eq!(mutation, None);
}

#[test]
fn keyboard_nudge_reorders_inbox() {
    let mut store = store();
    let ctx = ctx(&store);
    let mut session = DragSession::new();
    session.start_keyboard(DragItem::task("t-2"), &ctx);
    session.nudge(-1, &ctx);
    let dropped = session.end(&ctx).unwrap();
    moves::apply(&mut store, ME, &dropped.mutation).unwrap();

    let inbox: Vec<&str> = views::inbox(&store.inner, ME, false)
        .iter()
        .map(|i| i.id())
        .collect();
    assert_eq!(inbox, vec!["t-2", "t-1"]);
}

#[test]
fn reorder_with_completed_hidden_keeps_their_slots() {
    let mut done = task("a-done", None, 1);
    done.status = TaskStatus::Completed;
    let mut store = RecordingStore {
        inner: Workspace {
            tasks: vec![task("b", None, 0), done, task("c", None, 2)],
            ..Default::default()
        },
        ..Default::default()
    };
    let ctx = ctx(&store);
    let droppables = vec![
        Droppable::new(DropTarget::Item(DragItem::task("b")), row(0.0)),
        Droppable::new(DropTarget::Item(DragItem::task("c")), row(1.0)),
    ];
    let mut session = DragSession::new();
    let mutation =
        mouse_drop(&mut session, DragItem::task("c"), 1.0, 0.0, &droppables, &ctx).unwrap();
    moves::apply(&mut store, ME, &mutation).unwrap();

    let keys: Vec<(&str, i64)> = views::inbox(&store.inner, ME, true)
        .iter()
        .map(|i| (i.id(), i.sort_order()))
        .collect();
    assert_eq!(keys, vec![("c", 0), ("a-done", 1), ("b", 2)]);
}

#[test]
fn rejected_write_reverts_to_stored_order() {
    let mut store = store();
    store.reject = true;
    let ctx = ctx(&store);
    let stored = [DragItem::task("t-1"), DragItem::task("t-2")];

    let mut session = DragSession::new();
    session.start_keyboard(DragItem::task("t-2"), &ctx);
    session.nudge(-1, &ctx);
    let dropped = session.end(&ctx).unwrap();
    assert_eq!(
        session.display(&ListScope::inbox(), &stored)[0],
        DragItem::task("t-2")
    );

    assert!(moves::apply(&mut store, ME, &dropped.mutation).is_err());
    session.settle(dropped.ticket.unwrap());
    assert_eq!(session.display(&ListScope::inbox(), &stored), &stored);
}

#[test]
fn stale_settle_keeps_newer_order() {
    let store = store();
    let ctx = ctx(&store);
    let stored = [DragItem::task("t-1"), DragItem::task("t-2")];
    let mut session = DragSession::new();

    session.start_keyboard(DragItem::task("t-2"), &ctx);
    session.nudge(-1, &ctx);
    let first = session.end(&ctx).unwrap();
    session.start_keyboard(DragItem::task("t-1"), &ctx);
    session.nudge(1, &ctx);
    let second = session.end(&ctx).unwrap();

    // The first call finishing late must not clear the second's order
    assert!(!session.settle(first.ticket.unwrap()));
    assert_eq!(
        session.display(&ListScope::inbox(), &stored),
        &[DragItem::task("t-2"), DragItem::task("t-1")]
    );
    assert!(session.settle(second.ticket.unwrap()));
    assert_eq!(session.display(&ListScope::inbox(), &stored), &stored);
}

#[test]
fn renumber_skips_foreign_records() {
    let mut store = store();
    let outcome = sort_order::renumber(
        &mut store,
        ME,
        &[RecordRef::task("t-x"), RecordRef::task("t-2"), RecordRef::task("t-1")],
    )
    .unwrap();
    assert_eq!(outcome.skipped, vec![RecordRef::task("t-x")]);
    assert_eq!(
        store.patches,
        vec![
            (RecordRef::task("t-2"), Patch::sort_order(1)),
            (RecordRef::task("t-1"), Patch::sort_order(2)),
        ]
    );
    assert_eq!(store.inner.task("t-x").map(|t| t.sort_order), Some(5));
}
