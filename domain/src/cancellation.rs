//! Cooperative cancellation signal shared by the Crew Scheduler, Swarm
//! Coordinator and Problem Solver.
//!
//! This crate has no runtime dependency, so cancellation here is a plain
//! flag checked between iterations/levels/tasks rather than a future — the
//! application layer is free to drive it from a timer or an external signal
//! handler.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_uncancelled_and_can_be_cancelled() {
        let flag = CancellationFlag::new();
        assert!(!flag.is_cancelled());
        let clone = flag.clone();
        clone.cancel();
        assert!(flag.is_cancelled());
    }
}
