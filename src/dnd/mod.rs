//! Drag-and-drop reordering and moves.
//!
//! Flow: the gesture feeds [`session::DragSession`], which runs
//! [`collision::resolve`] on every pointer move and [`dispatch::dispatch`] on
//! release. The resulting [`Mutation`] is applied by [`crate::ops::moves`].

pub mod collision;
pub mod dispatch;
pub mod geometry;
pub mod optimistic;
pub mod session;
pub mod token;

pub use collision::{Collision, Contact, Droppable};
pub use dispatch::{DragContext, DragEnd, Destination, ListScope, Mutation, SortableList};
pub use geometry::{Point, Rect};
pub use session::{DragSession, Dropped};
pub use token::{DragItem, DropTarget, ItemKind, SidebarIndex};
