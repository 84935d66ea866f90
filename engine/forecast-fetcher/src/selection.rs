//! Latest-selection-wins guard for overlapping fetches
//!
//! Each new stadium selection bumps a generation counter. A fetch started under an older
//! generation can still complete, but its result is dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct LatestSelection {
    generation: Arc<AtomicU64>,
}

/// Proof of which selection a fetch belongs to
#[derive(Debug, Clone)]
pub struct SelectionTicket {
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl LatestSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new selection, invalidating every earlier ticket
    pub fn begin(&self) -> SelectionTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        SelectionTicket { generation, latest: Arc::clone(&self.generation) }
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

impl SelectionTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.generation
    }

    /// Keep `value` only if no newer selection has started
    pub fn accept<T>(&self, value: T) -> Option<T> {
        if self.is_current() {
            Some(value)
        } else {
            debug!("Dropping stale result from selection {}", self.generation);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_newer_selection_invalidates_older() {
        let selection = LatestSelection::new();
        let first = selection.begin();
        assert!(first.is_current());

        let second = selection.begin();
        assert!(!first.is_current());
        assert!(second.is_current());
        assert_eq!(first.accept("blr"), None);
        assert_eq!(second.accept("mum"), Some("mum"));
        assert_eq!(selection.current_generation(), 2);
    }

    #[tokio::test]
    async fn test_slow_stale_fetch_loses_to_latest() {
        let selection = LatestSelection::new();

        let slow = selection.begin();
        let slow_task = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            slow.accept("blr")
        });

        let fast = selection.begin();
        let fast_task = tokio::spawn(async move { fast.accept("mum") });

        assert_eq!(fast_task.await.unwrap(), Some("mum"));
        assert_eq!(slow_task.await.unwrap(), None);
    }
}
