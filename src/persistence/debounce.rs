//! Single-slot debounce deadline
//!
//! Scheduling always replaces the previous deadline, so a burst of requests
//! collapses into one firing `delay` after the last request.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Debouncer {
    deadline: Option<u64>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any pending deadline with `now + delay_ms`
    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64) {
        self.deadline = Some(now_ms.saturating_add(delay_ms));
    }

    pub fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_due(&self, now_ms: u64) -> bool {
        self.deadline.is_some_and(|d| now_ms >= d)
    }

    /// Clear the pending deadline, returning whether there was one
    pub fn take(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}
