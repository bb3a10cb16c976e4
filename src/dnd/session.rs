use super::collision::{self, Collision, CollisionInput, Contact, Droppable};
use super::dispatch::{self, DragContext, DragEnd, ListScope, Mutation};
use super::geometry::{Point, Rect};
use super::optimistic::{OptimisticOrder, Ticket};
use super::token::{DragItem, DropTarget};

#[derive(Debug, Clone)]
struct ActiveDrag {
    item: DragItem,
    /// Pointer position at drag start; `None` for keyboard drags
    origin: Option<Point>,
    origin_rect: Rect,
    over: Option<Collision>,
    /// Keyboard drags: index in the active item's list the item would land at
    cursor: Option<usize>,
}

/// A completed drop, ready to be applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dropped {
    pub mutation: Mutation,
    /// Set when the drop staged an optimistic order; settle it once applied
    pub ticket: Option<Ticket>,
}

/// Drag gesture state plus the optimistic order it produces.
///
/// Pointer drags call [`start`](Self::start), [`drag_move`](Self::drag_move)
/// and [`end`](Self::end). Keyboard drags call
/// [`start_keyboard`](Self::start_keyboard), [`nudge`](Self::nudge) and
/// [`end`](Self::end).
#[derive(Debug, Default)]
pub struct DragSession {
    active: Option<ActiveDrag>,
    optimistic: OptimisticOrder<ListScope, DragItem>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, item: DragItem, pointer: Point, rect: Rect) {
        tracing::debug!(%item, "drag started");
        self.active = Some(ActiveDrag {
            item,
            origin: Some(pointer),
            origin_rect: rect,
            over: None,
            cursor: None,
        });
    }

    pub fn start_keyboard(&mut self, item: DragItem, ctx: &DragContext) {
        let cursor = ctx.list_of(&item).and_then(|l| l.position(&item));
        tracing::debug!(%item, ?cursor, "keyboard drag started");
        self.active = Some(ActiveDrag {
            item,
            origin: None,
            origin_rect: Rect::default(),
            over: None,
            cursor,
        });
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&DragItem> {
        self.active.as_ref().map(|a| &a.item)
    }

    pub fn over(&self) -> Option<&Collision> {
        self.active.as_ref().and_then(|a| a.over.as_ref())
    }

    /// Pointer moved: re-run collision detection against the registered droppables.
    pub fn drag_move(&mut self, pointer: Point, droppables: &[Droppable]) -> Option<&Collision> {
        let active = self.active.as_mut()?;
        let origin = active.origin?;
        let rect = active
            .origin_rect
            .offset(pointer.x - origin.x, pointer.y - origin.y);
        let input = CollisionInput {
            pointer: Some(pointer),
            active_rect: rect,
            droppables,
        };
        active.over = collision::resolve(Some(active.item.kind), &input);
        active.over.as_ref()
    }

    /// Keyboard drag: move the landing spot `delta` rows within the item's own list.
    pub fn nudge(&mut self, delta: isize, ctx: &DragContext) -> Option<&Collision> {
        let active = self.active.as_mut()?;
        let list = ctx.list_of(&active.item)?;
        let current = active.cursor.or_else(|| list.position(&active.item))?;
        let last = list.items.len().saturating_sub(1) as isize;
        let next = (current as isize + delta).clamp(0, last) as usize;
        active.cursor = Some(next);
        active.over = Some(Collision {
            target: DropTarget::Item(list.items[next].clone()),
            contact: Contact::Intersecting,
        });
        active.over.as_ref()
    }

    pub fn cancel(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::debug!(item = %active.item, "drag cancelled");
        }
    }

    /// Finish the drag. Reorders stage their new order immediately so the
    /// caller can render it before the mutation is applied.
    pub fn end(&mut self, ctx: &DragContext) -> Option<Dropped> {
        let active = self.active.take()?;
        let drop = DragEnd {
            active: active.item,
            over: active.over,
        };
        let mutation = dispatch::dispatch(&drop, ctx)?;
        let ticket = match &mutation {
            Mutation::Renumber { scope, order } => {
                Some(self.optimistic.stage(scope.clone(), order.clone()))
            }
            _ => None,
        };
        Some(Dropped { mutation, ticket })
    }

    /// The mutation behind `ticket` finished. On failure this reverts the
    /// display to the stored order as well.
    pub fn settle(&mut self, ticket: Ticket) -> bool {
        self.optimistic.settle(ticket)
    }

    pub fn reconcile(&mut self, scope: &ListScope, stored: &[DragItem]) -> bool {
        self.optimistic.reconcile(scope, stored)
    }

    pub fn display<'a>(&'a self, scope: &ListScope, stored: &'a [DragItem]) -> &'a [DragItem] {
        self.optimistic.display(scope, stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dnd::dispatch::SortableList;
    use crate::model::SmartList;

    fn ctx() -> DragContext {
        DragContext {
            lists: vec![SortableList::new(
                ListScope::inbox(),
                vec![
                    DragItem::task("t-1"),
                    DragItem::task("t-2"),
                    DragItem::note("n-1"),
                ],
            )],
            ..Default::default()
        }
    }

    fn rows() -> Vec<Droppable> {
        vec![
            Droppable::new(
                DropTarget::SmartList(SmartList::Inbox),
                Rect::new(0.0, 0.0, 20.0, 1.0),
            ),
            Droppable::new(
                DropTarget::Item(DragItem::task("t-1")),
                Rect::new(30.0, 0.0, 40.0, 1.0),
            ),
            Droppable::new(
                DropTarget::Item(DragItem::task("t-2")),
                Rect::new(30.0, 1.0, 40.0, 1.0),
            ),
        ]
    }

    #[test]
    fn pointer_drag_reorders_and_stages() {
        let mut session = DragSession::new();
        session.start(
            DragItem::task("t-2"),
            Point::new(35.0, 1.5),
            Rect::new(30.0, 1.0, 40.0, 1.0),
        );
        let hit = session.drag_move(Point::new(35.0, 0.5), &rows()).cloned();
        assert_eq!(
            hit.map(|c| c.target),
            Some(DropTarget::Item(DragItem::task("t-1")))
        );

        let dropped = session.end(&ctx()).unwrap();
        let ticket = dropped.ticket.unwrap();
        let stored = ctx().lists[0].items.clone();
        assert_eq!(
            session.display(&ListScope::inbox(), &stored)[0],
            DragItem::task("t-2")
        );
        assert!(!session.is_dragging());
        assert!(session.settle(ticket));
        assert_eq!(session.display(&ListScope::inbox(), &stored), stored.as_slice());
    }

    #[test]
    fn pointer_drag_into_smart_list_stages_nothing() {
        let mut session = DragSession::new();
        session.start(
            DragItem::task("t-2"),
            Point::new(35.0, 1.5),
            Rect::new(30.0, 1.0, 40.0, 1.0),
        );
        session.drag_move(Point::new(5.0, 0.5), &rows());
        let dropped = session.end(&ctx()).unwrap();
        assert!(dropped.ticket.is_none());
        assert!(matches!(dropped.mutation, Mutation::MoveTask { .. }));
    }

    #[test]
    fn keyboard_nudge_clamps_to_list() {
        let mut session = DragSession::new();
        let ctx = ctx();
        session.start_keyboard(DragItem::task("t-1"), &ctx);
        session.nudge(1, &ctx);
        session.nudge(5, &ctx);
        assert_eq!(
            session.over().map(|c| c.target.clone()),
            Some(DropTarget::Item(DragItem::note("n-1")))
        );
        let dropped = session.end(&ctx).unwrap();
        assert_eq!(
            dropped.mutation,
            Mutation::Renumber {
                scope: ListScope::inbox(),
                order: vec![
                    DragItem::task("t-2"),
                    DragItem::note("n-1"),
                    DragItem::task("t-1"),
                ]
            }
        );
    }

    #[test]
    fn keyboard_nudge_back_to_start_is_noop() {
        let mut session = DragSession::new();
        let ctx = ctx();
        session.start_keyboard(DragItem::task("t-2"), &ctx);
        session.nudge(1, &ctx);
        session.nudge(-1, &ctx);
        assert_eq!(session.end(&ctx), None);
    }

    #[test]
    fn cancel_drops_the_gesture() {
        let mut session = DragSession::new();
        session.start_keyboard(DragItem::task("t-1"), &ctx());
        session.cancel();
        assert!(!session.is_dragging());
        assert_eq!(session.end(&ctx()), None);
    }
}
