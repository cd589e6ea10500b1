use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// Shared counters, so tests can observe how the server was hit.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub requests: Arc<AtomicUsize>,
    pub in_flight: Arc<AtomicUsize>,
    pub peak: Arc<AtomicUsize>,
}
impl AppState {
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
    /// Most requests that were ever handled at the same time.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn enter(&self) -> InFlight {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        InFlight { in_flight: self.in_flight.clone() }
    }
}

/// Decrements the in-flight count when the request finishes or is cancelled.
#[derive(Debug)]
pub struct InFlight {
    in_flight: Arc<AtomicUsize>,
}
impl Drop for InFlight {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_in_flight() {
        let state = AppState::default();
        let (a, b) = (state.enter(), state.enter());
        assert_eq!((state.in_flight(), state.peak()), (2, 2));
        drop(a);
        let c = state.enter();
        drop((b, c));
        assert_eq!((state.requests(), state.in_flight(), state.peak()), (3, 0, 2));
    }
}
