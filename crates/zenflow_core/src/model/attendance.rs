//! Attendance record model.

use super::class::ClassId;
use super::member::MemberId;
use super::new_entity_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type RecordId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

/// One check-in event. Records are created and deleted, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: RecordId,
    pub class_id: ClassId,
    pub member_id: MemberId,
    pub timestamp: DateTime<Utc>,
    pub status: AttendanceStatus,
}

impl AttendanceRecord {
    pub fn present(
        class_id: impl Into<ClassId>,
        member_id: impl Into<MemberId>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_entity_id(),
            class_id: class_id.into(),
            member_id: member_id.into(),
            timestamp: at,
            status: AttendanceStatus::Present,
        }
    }

    pub fn is_for(&self, class_id: &str, member_id: &str) -> bool {
        self.class_id == class_id && self.member_id == member_id
    }
}
