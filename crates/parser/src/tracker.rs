//! Furthest-failure bookkeeping for a single match call.

use crate::node::ParserId;

#[derive(Debug, Clone, Copy)]
struct Failure {
    id: ParserId,
    attempt: u64,
}

/// Records where matching failed.
///
/// Every failure pushes `child_error_index` forward. Failures of
/// error-registering nodes also compete for `error_index`: one further than
/// the current index replaces the recorded set, one at the same index joins
/// it (once per node), anything earlier is ignored.
#[derive(Debug, Default)]
pub(crate) struct ErrorTracker {
    error_index: usize,
    child_error_index: usize,
    failures: Vec<Failure>,
    next_attempt: u64,
}

impl ErrorTracker {
    /// Number the start of an attempt, so recorded failures can be reported
    /// in the order their attempts began.
    pub(crate) fn begin_attempt(&mut self) -> u64 {
        let attempt = self.next_attempt;
        self.next_attempt += 1;
        attempt
    }

    pub(crate) fn node_failed(&mut self, offset: usize) {
        self.child_error_index = self.child_error_index.max(offset);
    }

    pub(crate) fn add_error(&mut self, id: ParserId, offset: usize, attempt: u64) {
        self.node_failed(offset);
        if offset > self.error_index {
            self.error_index = offset;
            self.failures.clear();
        } else if offset < self.error_index {
            return;
        }
        if !self.failures.iter().any(|f| f.id == id) {
            self.failures.push(Failure { id, attempt });
        }
    }

    pub(crate) fn error_index(&self) -> usize {
        self.error_index
    }

    pub(crate) fn child_error_index(&self) -> usize {
        self.child_error_index
    }

    /// Nodes that failed at the error index, in attempt order.
    pub(crate) fn into_errors(mut self) -> Vec<ParserId> {
        self.failures.sort_by_key(|f| f.attempt);
        self.failures.into_iter().map(|f| f.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: usize) -> ParserId {
        ParserId::new(n)
    }

    #[test]
    fn test_further_failure_replaces() {
        let mut tracker = ErrorTracker::default();
        let a = tracker.begin_attempt();
        let b = tracker.begin_attempt();
        tracker.add_error(id(1), 0, a);
        tracker.add_error(id(2), 4, b);
        assert_eq!(tracker.error_index(), 4);
        assert_eq!(tracker.into_errors(), vec![id(2)]);
    }

    #[test]
    fn test_earlier_failure_ignored() {
        let mut tracker = ErrorTracker::default();
        let a = tracker.begin_attempt();
        let b = tracker.begin_attempt();
        tracker.add_error(id(1), 5, a);
        tracker.add_error(id(2), 3, b);
        assert_eq!(tracker.error_index(), 5);
        assert_eq!(tracker.into_errors(), vec![id(1)]);
    }

    #[test]
    fn test_same_index_sorted_by_attempt_and_deduplicated() {
        let mut tracker = ErrorTracker::default();
        let outer = tracker.begin_attempt();
        let first = tracker.begin_attempt();
        let second = tracker.begin_attempt();
        // Inner failures are recorded before the outer one finishes.
        tracker.add_error(id(2), 7, first);
        tracker.add_error(id(3), 7, second);
        tracker.add_error(id(1), 7, outer);
        let again = tracker.begin_attempt();
        tracker.add_error(id(2), 7, again);
        assert_eq!(tracker.into_errors(), vec![id(1), id(2), id(3)]);
    }

    #[test]
    fn test_child_error_index_tracks_all_failures() {
        let mut tracker = ErrorTracker::default();
        tracker.node_failed(9);
        tracker.node_failed(2);
        assert_eq!(tracker.child_error_index(), 9);
        assert_eq!(tracker.error_index(), 0);
    }
}
