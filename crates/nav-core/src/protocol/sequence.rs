//! Per-session request sequence counter.
//!
//! # What is a request sequence?
//!
//! Every request carries a monotonically increasing integer, and the server
//! echoes it back in the matching response.  Because the client only ever
//! has one request outstanding, the echoed value is a consistency check:
//! a mismatch means the stream has lost alignment, not that two requests
//! raced each other.
//!
//! # Ownership
//!
//! The counter lives inside a [`Session`](crate::protocol::Session), which
//! is owned by exactly one client and mutated through `&mut`.  No atomics
//! are needed; the borrow checker already rules out concurrent callers.

/// First sequence number handed out after creation or [`RequestSequence::reset`].
pub const FIRST_REQUEST_SEQ: u64 = 1;

/// A monotonically increasing counter for request sequence numbers.
///
/// # Examples
///
/// ```rust
/// use nav_core::protocol::RequestSequence;
///
/// let mut seq = RequestSequence::new();
/// assert_eq!(seq.allocate(), 1);
/// assert_eq!(seq.allocate(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSequence {
    next: u64,
}

impl RequestSequence {
    /// Creates a new counter starting at [`FIRST_REQUEST_SEQ`].
    pub fn new() -> Self {
        Self {
            next: FIRST_REQUEST_SEQ,
        }
    }

    /// Returns the next sequence number and advances the counter.
    ///
    /// Post-increment: the value returned is the one before the increment.
    /// Saturates at `u64::MAX` instead of wrapping back to 0.
    pub fn allocate(&mut self) -> u64 {
        let current = self.next;
        self.next = self.next.saturating_add(1);
        current
    }

    /// Returns the value the next call to [`allocate`](Self::allocate) will hand out.
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Starts over at [`FIRST_REQUEST_SEQ`]; used when a new session is established.
    pub fn reset(&mut self) {
        self.next = FIRST_REQUEST_SEQ;
    }
}

impl Default for RequestSequence {
    fn default() -> Self {
        Self::new()
    }
}
