//! Duplicate suppression for move notifications.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;

/// Identical notifications within this window dispatch once.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_secs(2);

/// Identity of a move: the literal source and destination paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MoveKey {
    pub from: PathBuf,
    pub to: PathBuf,
}

impl MoveKey {
    pub fn new(from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Last sighting per [`MoveKey`], behind one lock.
#[derive(Debug)]
pub struct DebounceMap {
    window: Duration,
    seen: Mutex<HashMap<MoveKey, Instant>>,
}

impl Default for DebounceMap {
    fn default() -> Self {
        Self::new(DEBOUNCE_WINDOW)
    }
}

impl DebounceMap {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            seen: Mutex::new(HashMap::new()),
        }
    }

    /// `true` when `key` was not seen within the window; the sighting is
    /// recorded under the same lock acquisition.
    pub fn check_and_record(&self, key: MoveKey, now: Instant) -> bool {
        let mut seen = self.lock();
        match seen.get(&key) {
            Some(last_seen) if now.duration_since(*last_seen) < self.window => false,
            _ => {
                seen.insert(key, now);
                true
            }
        }
    }

    /// Drop sightings older than the window. Returns how many were removed.
    pub fn prune(&self, now: Instant) -> usize {
        let mut seen = self.lock();
        let before = seen.len();
        seen.retain(|_, seen_at| now.duration_since(*seen_at) < self.window);
        before - seen.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<MoveKey, Instant>> {
        // Entries stay valid even if a holder panicked.
        self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::time::advance;

    use super::*;

    fn key() -> MoveKey {
        MoveKey::new("/base/acme/svc", "/base/other/svc")
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn repeats_within_window_are_suppressed() {
        let map = DebounceMap::default();
        let mut dispatched = 0usize;

        for _ in 0..5 {
            if map.check_and_record(key(), Instant::now()) {
                dispatched += 1;
            }
            advance(Duration::from_millis(300)).await;
        }

        assert_eq!(dispatched, 1, "rapid repeats collapse to one dispatch");
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn repeat_after_window_dispatches_again() {
        let map = DebounceMap::default();
        assert!(map.check_and_record(key(), Instant::now()));
        advance(Duration::from_millis(2_100)).await;
        assert!(map.check_and_record(key(), Instant::now()));
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn distinct_keys_do_not_interfere() {
        let map = DebounceMap::default();
        let now = Instant::now();
        assert!(map.check_and_record(key(), now));
        assert!(map.check_and_record(MoveKey::new("/base/other/svc", "/base/acme/svc"), now));
        assert_eq!(map.len(), 2);
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn prune_drops_only_stale_entries() {
        let map = DebounceMap::default();
        map.check_and_record(key(), Instant::now());
        advance(Duration::from_secs(3)).await;
        map.check_and_record(MoveKey::new("/base/a/x", "/base/b/x"), Instant::now());

        assert_eq!(map.prune(Instant::now()), 1);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn concurrent_sightings_dispatch_once() {
        let map = Arc::new(DebounceMap::default());
        let now = Instant::now();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let map = Arc::clone(&map);
                std::thread::spawn(move || map.check_and_record(key(), now))
            })
            .collect();

        let dispatched = handles
            .into_iter()
            .map(|h| h.join().expect("join"))
            .filter(|accepted| *accepted)
            .count();
        assert_eq!(dispatched, 1);
    }
}
