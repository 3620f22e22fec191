use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic request counter.
///
/// Каждый запрос получает токен; ответ применяется только если его токен
/// всё ещё последний. Так устаревший ответ медленного фильтра не затирает
/// свежую таблицу.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    latest: Arc<AtomicU64>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new token; every earlier token becomes stale.
    pub fn next(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, token: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == token
    }

    /// Invalidates whatever is in flight without starting a request.
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_token_wins() {
        let tracker = RequestTracker::new();
        let first = tracker.next();
        let second = tracker.next();
        assert!(!tracker.is_current(first));
        assert!(tracker.is_current(second));
    }

    #[test]
    fn test_clones_share_counter() {
        let tracker = RequestTracker::new();
        let token = tracker.next();
        let clone = tracker.clone();
        clone.invalidate();
        assert!(!tracker.is_current(token));
    }
}
