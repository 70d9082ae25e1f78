//! Studio domain model.
//!
//! # Responsibility
//! - Define the canonical member/class/attendance/template records.
//! - Keep wire field names identical to the remote spreadsheet schema.
//!
//! # Invariants
//! - Every entity is identified by a stable client-generated string id.
//! - `Member::total_purchased_classes` never decreases.
//! - `StudioClass::attendees` has set semantics.

pub mod attendance;
pub mod class;
pub mod member;
pub mod schedule;
pub mod snapshot;
pub mod template;

use thiserror::Error;
use uuid::Uuid;

/// Field-level validation failures raised by create paths.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be blank")]
    Blank { field: &'static str },
    #[error("max capacity must be greater than zero")]
    ZeroCapacity,
    #[error("unknown package type `{0}`; expected single|package_10|monthly|unlimited")]
    UnknownPackageType(String),
}

/// Generates a fresh entity id.
pub fn new_entity_id() -> String {
    Uuid::new_v4().to_string()
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank { field });
    }
    Ok(())
}
