use dashmap::DashMap;

/// Orders concurrent searches per user.
///
/// Each dispatched search takes the next sequence number for its key. When a
/// response arrives, only the holder of the latest number may render it;
/// anything older lost the race against a newer keystroke and is dropped.
#[derive(Default)]
pub struct SearchSequencer {
    latest: DashMap<String, u64>,
}

impl SearchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new search for `key` and returns its sequence number.
    pub fn dispatch(&self, key: &str) -> u64 {
        let mut latest = self.latest.entry(key.to_string()).or_insert(0);
        *latest += 1;
        *latest
    }

    pub fn is_latest(&self, key: &str, sequence: u64) -> bool {
        self.latest
            .get(key)
            .map(|latest| *latest == sequence)
            .unwrap_or(false)
    }

    /// Drops the counter for `key`, e.g. on logout.
    pub fn forget(&self, key: &str) {
        self.latest.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn only_the_newest_search_is_current() {
        let sequencer = SearchSequencer::new();
        let first = sequencer.dispatch("admin-1");
        let second = sequencer.dispatch("admin-1");

        assert!(second > first);
        assert!(!sequencer.is_latest("admin-1", first));
        assert!(sequencer.is_latest("admin-1", second));
    }

    #[test]
    fn keys_are_independent() {
        let sequencer = SearchSequencer::new();
        let a = sequencer.dispatch("a");
        sequencer.dispatch("b");
        sequencer.dispatch("b");

        assert!(sequencer.is_latest("a", a));
    }

    #[test]
    fn forget_invalidates_in_flight_searches() {
        let sequencer = SearchSequencer::new();
        let seq = sequencer.dispatch("a");
        sequencer.forget("a");
        assert!(!sequencer.is_latest("a", seq));
    }

    #[tokio::test]
    async fn concurrent_dispatches_are_unique() {
        let sequencer = Arc::new(SearchSequencer::new());
        let handles: Vec<_> = (0..32)
            .map(|_| {
                let sequencer = sequencer.clone();
                tokio::spawn(async move { sequencer.dispatch("admin") })
            })
            .collect();

        let mut seen = Vec::new();
        for handle in handles {
            seen.push(handle.await.unwrap());
        }
        seen.sort_unstable();
        seen.dedup();

        assert_eq!(seen.len(), 32);
        assert!(sequencer.is_latest("admin", 32));
    }
}
