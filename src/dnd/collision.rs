//! Drop target selection while a drag is in progress.
//!
//! Pointer containment is checked first: it identifies the container the
//! user is dropping *into*. When no container applies, the dragged rectangle
//! is intersected with sibling rows to find the one it should land *beside*.

use std::cmp::Ordering;

use super::geometry::{Point, Rect};
use super::token::{DropTarget, ItemKind};
use crate::model::SmartList;

/// How the winning target was hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// The pointer is inside the target: drop into it
    Within,
    /// The dragged rectangle overlaps the target: drop beside it
    Intersecting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub target: DropTarget,
    pub contact: Contact,
}

/// A registered drop region
#[derive(Debug, Clone, PartialEq)]
pub struct Droppable {
    pub target: DropTarget,
    pub rect: Rect,
}

impl Droppable {
    pub fn new(target: DropTarget, rect: Rect) -> Self {
        Droppable { target, rect }
    }
}

/// One pointer-move worth of input
#[derive(Debug, Clone, Copy)]
pub struct CollisionInput<'a> {
    /// `None` for keyboard drags, which have no pointer
    pub pointer: Option<Point>,
    /// Where the dragged item's rectangle currently is
    pub active_rect: Rect,
    pub droppables: &'a [Droppable],
}

/// Pick the single drop target for the current drag, if any.
pub fn resolve(active: Option<ItemKind>, input: &CollisionInput<'_>) -> Option<Collision> {
    let kind = active?;
    let within = pointer_within(input.pointer, input.droppables);
    let first_within = |accept: &dyn Fn(&DropTarget) -> bool| {
        within.iter().find(|d| accept(&d.target)).map(|d| Collision {
            target: d.target.clone(),
            contact: Contact::Within,
        })
    };
    let beside = |kinds: &[ItemKind]| {
        rect_intersection(input.active_rect, input.droppables, |t| t.is_item_of(kinds)).map(|d| {
            Collision {
                target: d.target.clone(),
                contact: Contact::Intersecting,
            }
        })
    };

    let collision = match kind {
        ItemKind::Task => first_within(&|t| {
            matches!(
                t,
                DropTarget::SmartList(SmartList::Inbox | SmartList::Today)
            )
        })
        .or_else(|| first_within(&is_container))
        .or_else(|| first_within(&|t| t.is_item_of(&[ItemKind::Project])))
        .or_else(|| beside(&[ItemKind::Task])),
        ItemKind::Note => first_within(&is_container)
            .or_else(|| first_within(&|t| t.is_item_of(&[ItemKind::Project])))
            .or_else(|| beside(&[ItemKind::Task, ItemKind::Note])),
        ItemKind::Project => first_within(&|t| matches!(t, DropTarget::NoFolder))
            .or_else(|| first_within(&|t| t.is_item_of(&[ItemKind::Folder])))
            .or_else(|| beside(&[ItemKind::Folder, ItemKind::Project])),
        ItemKind::Folder => beside(&[ItemKind::Folder, ItemKind::Project]),
    };
    tracing::trace!(?kind, ?collision, "resolved collision");
    collision
}

fn is_container(target: &DropTarget) -> bool {
    matches!(
        target,
        DropTarget::Section { .. } | DropTarget::Unsectioned { .. }
    )
}

/// Droppables containing the pointer, nearest first (mean distance to the corners).
pub fn pointer_within(pointer: Option<Point>, droppables: &[Droppable]) -> Vec<&Droppable> {
    let Some(pointer) = pointer else {
        return Vec::new();
    };
    let mut hits: Vec<(f64, &Droppable)> = droppables
        .iter()
        .filter(|d| d.rect.contains(pointer))
        .map(|d| {
            let corners = d.rect.corners();
            let mean = corners.iter().map(|c| c.distance(pointer)).sum::<f64>() / 4.0;
            (mean, d)
        })
        .collect();
    hits.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    hits.into_iter().map(|(_, d)| d).collect()
}

/// The accepted droppable with the largest overlap ratio; earlier entries win ties.
pub fn rect_intersection<'a>(
    rect: Rect,
    droppables: &'a [Droppable],
    accept: impl Fn(&DropTarget) -> bool,
) -> Option<&'a Droppable> {
    let mut best: Option<(f64, &Droppable)> = None;
    for d in droppables.iter().filter(|d| accept(&d.target)) {
        let ratio = rect.intersection_ratio(&d.rect);
        if ratio <= 0.0 {
            continue;
        }
        if best.is_none_or(|(r, _)| ratio > r) {
            best = Some((ratio, d));
        }
    }
    best.map(|(_, d)| d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dnd::token::DragItem;

    fn row(target: DropTarget, top: f64) -> Droppable {
        Droppable::new(target, Rect::new(0.0, top, 20.0, 1.0))
    }

    fn input<'a>(pointer: Point, droppables: &'a [Droppable]) -> CollisionInput<'a> {
        CollisionInput {
            pointer: Some(pointer),
            active_rect: Rect::new(pointer.x - 2.0, pointer.y, 20.0, 1.0),
            droppables,
        }
    }

    #[test]
    fn no_active_item_resolves_nothing() {
        let regions = vec![row(DropTarget::NoFolder, 0.0)];
        assert_eq!(resolve(None, &input(Point::new(1.0, 0.5), &regions)), None);
    }

    #[test]
    fn task_prefers_today_over_project() {
        // Overlapping regions: a Today row and a project row under the same pointer
        let regions = vec![
            Droppable::new(
                DropTarget::Item(DragItem::project("p-1")),
                Rect::new(0.0, 0.0, 20.0, 3.0),
            ),
            row(DropTarget::SmartList(SmartList::Today), 1.0),
        ];
        let hit = resolve(Some(ItemKind::Task), &input(Point::new(3.0, 1.5), &regions)).unwrap();
        assert_eq!(hit.target, DropTarget::SmartList(SmartList::Today));
        assert_eq!(hit.contact, Contact::Within);
    }

    #[test]
    fn task_prefers_section_over_project() {
        let regions = vec![
            Droppable::new(
                DropTarget::Item(DragItem::project("p-1")),
                Rect::new(0.0, 0.0, 20.0, 10.0),
            ),
            Droppable::new(
                DropTarget::Section {
                    project_id: "p-2".into(),
                    section_id: "s-1".into(),
                },
                Rect::new(0.0, 0.0, 20.0, 10.0),
            ),
        ];
        let hit = resolve(Some(ItemKind::Task), &input(Point::new(3.0, 4.0), &regions)).unwrap();
        assert!(matches!(hit.target, DropTarget::Section { .. }));
    }

    #[test]
    fn note_prefers_unsectioned_over_nearer_project() {
        let project = Droppable::new(
            DropTarget::Item(DragItem::project("p-1")),
            Rect::new(0.0, 3.0, 20.0, 2.0),
        );
        let unsectioned = Droppable::new(
            DropTarget::Unsectioned {
                project_id: "p-2".into(),
            },
            Rect::new(0.0, 0.0, 20.0, 10.0),
        );
        let pointer = Point::new(3.0, 4.0);

        let regions = vec![project.clone(), unsectioned];
        let hit = resolve(Some(ItemKind::Note), &input(pointer, &regions)).unwrap();
        assert!(matches!(hit.target, DropTarget::Unsectioned { .. }));
        assert_eq!(hit.contact, Contact::Within);

        let regions = vec![project];
        let hit = resolve(Some(ItemKind::Note), &input(pointer, &regions)).unwrap();
        assert_eq!(hit.target, DropTarget::Item(DragItem::project("p-1")));
    }

    #[test]
    fn note_ignores_smart_lists() {
        let regions = vec![
            row(DropTarget::SmartList(SmartList::Inbox), 0.0),
            row(DropTarget::Item(DragItem::note("n-2")), 5.0),
        ];
        assert_eq!(
            resolve(Some(ItemKind::Note), &input(Point::new(3.0, 0.5), &regions)),
            None
        );
    }

    #[test]
    fn task_falls_back_to_nearest_sibling_task() {
        let regions = vec![
            row(DropTarget::Item(DragItem::task("t-1")), 0.0),
            row(DropTarget::Item(DragItem::task("t-2")), 1.0),
            row(DropTarget::Item(DragItem::note("n-1")), 2.0),
        ];
        let mut inp = input(Point::new(3.0, 1.2), &regions);
        inp.active_rect = Rect::new(0.0, 1.2, 20.0, 1.0);
        let hit = resolve(Some(ItemKind::Task), &inp).unwrap();
        assert_eq!(hit.target, DropTarget::Item(DragItem::task("t-2")));
        assert_eq!(hit.contact, Contact::Intersecting);
    }

    #[test]
    fn note_reorders_among_tasks_and_notes() {
        let regions = vec![
            row(DropTarget::Item(DragItem::task("t-1")), 0.0),
            row(DropTarget::Item(DragItem::note("n-1")), 1.0),
        ];
        let mut inp = input(Point::new(3.0, 0.1), &regions);
        inp.active_rect = Rect::new(0.0, 0.1, 20.0, 1.0);
        let hit = resolve(Some(ItemKind::Note), &inp).unwrap();
        assert_eq!(hit.target, DropTarget::Item(DragItem::task("t-1")));
    }

    #[test]
    fn project_prefers_no_folder_then_folder() {
        let regions = vec![
            row(DropTarget::Item(DragItem::folder("f-1")), 0.0),
            row(DropTarget::NoFolder, 0.0),
        ];
        let hit = resolve(Some(ItemKind::Project), &input(Point::new(1.0, 0.5), &regions)).unwrap();
        assert_eq!(hit.target, DropTarget::NoFolder);

        let regions = vec![
            row(DropTarget::Item(DragItem::project("p-9")), 0.0),
            row(DropTarget::Item(DragItem::folder("f-1")), 1.0),
        ];
        let hit = resolve(Some(ItemKind::Project), &input(Point::new(1.0, 1.5), &regions)).unwrap();
        assert_eq!(hit.target, DropTarget::Item(DragItem::folder("f-1")));
        assert_eq!(hit.contact, Contact::Within);
    }

    #[test]
    fn folder_never_drops_into_anything() {
        let regions = vec![
            row(DropTarget::NoFolder, 0.0),
            row(DropTarget::Item(DragItem::folder("f-2")), 0.0),
        ];
        let hit = resolve(Some(ItemKind::Folder), &input(Point::new(1.0, 0.5), &regions)).unwrap();
        assert_eq!(hit.target, DropTarget::Item(DragItem::folder("f-2")));
        assert_eq!(hit.contact, Contact::Intersecting);
    }

    #[test]
    fn keyboard_drag_has_no_pointer_containment() {
        let regions = vec![
            row(DropTarget::SmartList(SmartList::Inbox), 0.0),
            row(DropTarget::Item(DragItem::task("t-3")), 0.0),
        ];
        let inp = CollisionInput {
            pointer: None,
            active_rect: Rect::new(0.0, 0.0, 20.0, 1.0),
            droppables: &regions,
        };
        let hit = resolve(Some(ItemKind::Task), &inp).unwrap();
        assert_eq!(hit.target, DropTarget::Item(DragItem::task("t-3")));
    }

    #[test]
    fn pointer_within_sorts_nearest_first() {
        let big = Droppable::new(DropTarget::NoFolder, Rect::new(0.0, 0.0, 100.0, 100.0));
        let small = Droppable::new(
            DropTarget::Item(DragItem::folder("f")),
            Rect::new(0.0, 0.0, 4.0, 4.0),
        );
        let regions = vec![big, small];
        let hits = pointer_within(Some(Point::new(2.0, 2.0)), &regions);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].target, DropTarget::Item(DragItem::folder("f")));
    }
}
