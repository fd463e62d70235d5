//! Request-generation counter used to drop responses to superseded requests.
//!
//! Every new request takes a [`Ticket`]. When its response arrives, the caller
//! checks the ticket with [`RequestGeneration::is_current`] and discards the
//! response if a newer request has been issued since.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct RequestGeneration {
    latest: AtomicU64,
}

impl RequestGeneration {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for a new request, superseding all earlier tickets.
    pub fn next(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}
