//! Attendance ledger: the only sanctioned mutator of linked studio state.
//!
//! # Responsibility
//! - Apply check-in/check-out across records, class attendee sets and member
//!   credit as one transition.
//! - Keep an open class detail view in step with the class collection.
//! - Apply top-ups to both credit counters together.
//!
//! # Invariants
//! - Every id is resolved before anything is mutated; a failed call leaves
//!   the snapshot untouched.
//! - Credit is consumed only when available; removal always refunds one.
//! - `total_purchased_classes` only moves through `top_up`.

mod attendance;
mod roster;

pub use attendance::{mark_attendance, remove_attendance, top_up};
pub use roster::{roster, RosterEntry};

use thiserror::Error;

pub type LedgerResult<T> = Result<T, LedgerError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("class not found: {0}")]
    UnknownClass(String),
    #[error("member not found: {0}")]
    UnknownMember(String),
    #[error("top-up amount must be at least 1")]
    InvalidAmount,
}

/// Effect of one `mark_attendance` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkOutcome {
    pub record_id: String,
    /// Whether a credit was consumed. `false` for members already at zero.
    pub credit_charged: bool,
    pub remaining_classes: u32,
}

/// Effect of one `remove_attendance` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveOutcome {
    pub records_removed: usize,
    /// Whether the member was in the attendee set before the call.
    pub was_present: bool,
    pub remaining_classes: u32,
}

/// Member balance after a top-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditBalance {
    pub remaining_classes: u32,
    pub total_purchased_classes: u32,
}
