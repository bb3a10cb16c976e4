use crate::store::{OrderScope, Patch, RecordRef, Store, StoreError};

use super::Outcome;

/// Position for a new last member of `scope`: one past the current maximum, or 0 if empty.
pub fn append<S: Store + ?Sized>(store: &S, scope: &OrderScope) -> i64 {
    store
        .sort_orders(scope)
        .into_iter()
        .max()
        .map_or(0, |max| max + 1)
}

/// Position for a new first member of `scope`: one below the current minimum, or 0 if empty.
pub fn prepend<S: Store + ?Sized>(store: &S, scope: &OrderScope) -> i64 {
    store
        .sort_orders(scope)
        .into_iter()
        .min()
        .map_or(0, |min| min - 1)
}

/// Persist `sort_order = index` for every record of a fully ordered sibling list.
///
/// One patch per record, in list order. Records owned by someone other than
/// `user_id` (or that no longer exist) are skipped and reported, never fatal.
pub fn renumber<S: Store + ?Sized>(
    store: &mut S,
    user_id: &str,
    ordered: &[RecordRef],
) -> Result<Outcome, StoreError> {
    let mut outcome = Outcome::default();
    for (index, record) in ordered.iter().enumerate() {
        match store.owner(record) {
            Some(owner) if owner == user_id => {
                store.patch(record, &Patch::sort_order(index as i64))?;
                outcome.patched.push(record.clone());
            }
            Some(_) => {
                tracing::warn!(%record, "renumber skipped record owned by another user");
                outcome.skipped.push(record.clone());
            }
            None => {
                tracing::warn!(%record, "renumber skipped missing record");
                outcome.skipped.push(record.clone());
            }
        }
    }
    tracing::debug!(
        patched = outcome.patched.len(),
        skipped = outcome.skipped.len(),
        "renumbered"
    );
    Ok(outcome)
}

/// Move the element at `from` so it ends up at index `to`, shifting the rest.
pub fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from >= items.len() || to >= items.len() || from == to {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}
