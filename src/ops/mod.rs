pub mod moves;
pub mod records;
pub mod sort_order;
pub mod views;

use crate::store::RecordRef;

/// Records touched by one operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub patched: Vec<RecordRef>,
    /// Foreign or missing records left alone
    pub skipped: Vec<RecordRef>,
    pub deleted: Vec<RecordRef>,
}

impl Outcome {
    pub fn is_noop(&self) -> bool {
        self.patched.is_empty() && self.deleted.is_empty()
    }

    pub fn writes(&self) -> usize {
        self.patched.len() + self.deleted.len()
    }
}
