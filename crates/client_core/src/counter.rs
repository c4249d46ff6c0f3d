use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use tracing::debug;

/// Diagnostic count of acquisition calls. Clones share the same count, so a
/// test harness can hand one clone to the code under test and keep another.
#[derive(Debug, Clone, Default)]
pub struct CallCounter {
    count: Arc<AtomicU64>,
}

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one call and returns its 1-based number.
    pub fn increment(&self) -> u64 {
        let call = self.count.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(call, "acquisition call counted");
        call
    }

    pub fn get(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.count.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::CallCounter;

    #[test]
    fn clones_share_one_count() {
        let counter = CallCounter::new();
        let handle = counter.clone();

        assert_eq!(counter.increment(), 1);
        assert_eq!(handle.increment(), 2);
        assert_eq!(counter.get(), 2);

        handle.reset();
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn separate_counters_do_not_leak() {
        let first = CallCounter::new();
        let second = CallCounter::new();

        first.increment();
        assert_eq!(second.get(), 0);
    }
}
