//! In-memory studio state with durable write-through.
//!
//! # Responsibility
//! - Own the snapshot, the open class detail view and the change signal.
//! - Route every linked mutation through the ledger.
//! - Persist touched collections after each change without blocking it.
//!
//! # Invariants
//! - `revision` grows by exactly one per applied change.
//! - Subscribers never observe a half-applied change.
//! - A save failure is recorded, never rolled back into the in-memory state.

pub mod queries;
mod studio;

pub use studio::{ChangeOrigin, ReplaceOutcome, StoreChange, StudioError, StudioResult, StudioStore};
