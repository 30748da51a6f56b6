//! Request-generation tagging and debouncing.
//!
//! Each request takes a [`Ticket`] before it suspends; when it resumes, it
//! only applies its result if no newer ticket has been issued meanwhile.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
pub struct RequestSequence {
    issued: AtomicU64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }

    /// Mark every outstanding ticket stale without starting a request.
    pub fn invalidate(&self) {
        self.issued.fetch_add(1, Ordering::SeqCst);
    }
}

/// Trailing-edge debounce: a call proceeds only if no other call arrived
/// during its quiet period.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    calls: RequestSequence,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            calls: RequestSequence::new(),
        }
    }

    /// Wait out the quiet period. Returns `false` if a later call superseded
    /// this one.
    pub async fn settle(&self) -> bool {
        let ticket = self.calls.issue();
        if !self.quiet.is_zero() {
            tokio::time::sleep(self.quiet).await;
        }
        self.calls.is_latest(ticket)
    }

    /// Cancel the pending call, if any.
    pub fn cancel(&self) {
        self.calls.invalidate();
    }
}
