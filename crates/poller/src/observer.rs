//! Progress reporting for a running poll

use parking_lot::Mutex;

/// Receives every status fetched during a poll
///
/// Called synchronously, once per successful fetch, in fetch order, with the
/// raw status string exactly as the endpoint returned it. Never called for a
/// round whose fetch failed.
pub trait StatusObserver: Send + Sync {
    fn notify(&self, status: &str);
}

impl<F> StatusObserver for F
where
    F: Fn(&str) + Send + Sync,
{
    fn notify(&self, status: &str) {
        self(status)
    }
}

/// Observer that records every status it is notified of
///
/// # Example
///
/// ```
/// use jobpoll::{StatusObserver, StatusTrace};
///
/// let trace = StatusTrace::new();
/// trace.notify("pending");
/// trace.notify("completed");
///
/// assert_eq!(trace.statuses(), vec!["pending", "completed"]);
/// ```
#[derive(Debug, Default)]
pub struct StatusTrace {
    statuses: Mutex<Vec<String>>,
}

impl StatusTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded statuses, oldest first
    pub fn statuses(&self) -> Vec<String> {
        self.statuses.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.statuses.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.lock().is_empty()
    }
}

impl StatusObserver for StatusTrace {
    fn notify(&self, status: &str) {
        self.statuses.lock().push(status.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_closure_observer() {
        let calls = AtomicUsize::new(0);
        let observer = |status: &str| {
            assert_eq!(status, "pending");
            calls.fetch_add(1, Ordering::SeqCst);
        };

        observer.notify("pending");
        observer.notify("pending");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_trace_preserves_order() {
        let trace = StatusTrace::new();
        assert!(trace.is_empty());

        for status in ["pending", "weird", "error"] {
            trace.notify(status);
        }

        assert_eq!(trace.len(), 3);
        assert_eq!(trace.statuses(), vec!["pending", "weird", "error"]);
    }
}
