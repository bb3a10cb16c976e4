//! Locally computed order shown between a drop and its confirmation.

/// Identifies one staged order. Later stages always carry larger tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Clone)]
struct Pending<K, T> {
    ticket: Ticket,
    scope: K,
    order: Vec<T>,
}

/// Single-slot, last-write-wins cache of one list's optimistic order.
#[derive(Debug, Clone)]
pub struct OptimisticOrder<K, T> {
    last_seq: u64,
    pending: Option<Pending<K, T>>,
}

impl<K, T> Default for OptimisticOrder<K, T> {
    fn default() -> Self {
        OptimisticOrder {
            last_seq: 0,
            pending: None,
        }
    }
}

impl<K: PartialEq + std::fmt::Debug, T: PartialEq> OptimisticOrder<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `order` as the order to show for `scope`, replacing anything pending.
    pub fn stage(&mut self, scope: K, order: Vec<T>) -> Ticket {
        self.last_seq += 1;
        let ticket = Ticket(self.last_seq);
        if let Some(old) = &self.pending {
            tracing::debug!(replaced = old.ticket.0, "optimistic order overwritten");
        }
        tracing::debug!(seq = ticket.0, ?scope, len = order.len(), "optimistic order staged");
        self.pending = Some(Pending {
            ticket,
            scope,
            order,
        });
        ticket
    }

    /// The order to render for `scope`: the pending one if it belongs here,
    /// otherwise `stored`.
    pub fn display<'a>(&'a self, scope: &K, stored: &'a [T]) -> &'a [T] {
        match &self.pending {
            Some(p) if &p.scope == scope => &p.order,
            _ => stored,
        }
    }

    /// Feed a fresh stored order. Clears the pending order once they agree.
    pub fn reconcile(&mut self, scope: &K, stored: &[T]) -> bool {
        let matches = self
            .pending
            .as_ref()
            .is_some_and(|p| &p.scope == scope && p.order.as_slice() == stored);
        if matches {
            tracing::debug!(?scope, "stored order caught up");
            self.pending = None;
        }
        matches
    }

    /// The call behind `ticket` finished, successfully or not. Only the most
    /// recent stage is cleared; an older call settling leaves a newer order
    /// in place.
    pub fn settle(&mut self, ticket: Ticket) -> bool {
        match &self.pending {
            Some(p) if p.ticket == ticket => {
                self.pending = None;
                true
            }
            Some(p) => {
                tracing::debug!(settled = ticket.0, pending = p.ticket.0, "stale settle ignored");
                false
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn latest(&self) -> Option<Ticket> {
        self.pending.as_ref().map(|p| p.ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefers_pending_for_its_scope() {
        let mut cache = OptimisticOrder::new();
        cache.stage("sidebar", vec!['c', 'a', 'b']);
        let stored = ['a', 'b', 'c'];
        assert_eq!(cache.display(&"sidebar", &stored), &['c', 'a', 'b']);
        assert_eq!(cache.display(&"inbox", &stored), &stored);
    }

    #[test]
    fn reconcile_clears_only_on_exact_match() {
        let mut cache = OptimisticOrder::new();
        cache.stage("inbox", vec![1, 2, 3]);
        assert!(!cache.reconcile(&"inbox", &[1, 3, 2]));
        assert!(!cache.reconcile(&"sidebar", &[1, 2, 3]));
        assert!(cache.is_pending());
        assert!(cache.reconcile(&"inbox", &[1, 2, 3]));
        assert!(!cache.is_pending());
    }

    #[test]
    fn new_stage_overwrites_previous() {
        let mut cache = OptimisticOrder::new();
        cache.stage("inbox", vec![1, 2]);
        cache.stage("sidebar", vec![9]);
        assert_eq!(cache.display(&"inbox", &[2, 1]), &[2, 1]);
        assert_eq!(cache.display(&"sidebar", &[]), &[9]);
    }

    #[test]
    fn stale_settle_keeps_newer_order() {
        let mut cache = OptimisticOrder::new();
        let first = cache.stage("inbox", vec![2, 1]);
        let second = cache.stage("inbox", vec![1, 2]);
        assert!(first < second);
        assert!(!cache.settle(first));
        assert_eq!(cache.display(&"inbox", &[2, 1]), &[1, 2]);
        assert!(cache.settle(second));
        assert!(!cache.is_pending());
        assert!(!cache.settle(second));
    }
}
