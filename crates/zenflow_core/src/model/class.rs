//! Scheduled class session model.
//!
//! # Invariants
//! - `attendees` never holds the same member twice.
//! - `max_capacity` is advisory; nothing rejects attendance above it.

use super::member::MemberId;
use super::template::ClassTemplate;
use super::{new_entity_id, require_text, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub type ClassId = String;

const DEFAULT_CLASS_TIME: &str = "19:00";
const DEFAULT_CLASS_CAPACITY: u32 = 10;
const DEFAULT_INSTRUCTOR: &str = "Teacher";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassStatus {
    Upcoming,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioClass {
    pub id: ClassId,
    pub title: String,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub location: String,
    pub max_capacity: u32,
    /// Serialized as a JSON array; duplicates in incoming data collapse.
    #[serde(default)]
    pub attendees: BTreeSet<MemberId>,
    #[serde(default)]
    pub instructor: String,
    pub status: ClassStatus,
}

/// Input for scheduling a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDraft {
    pub title: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub max_capacity: u32,
}

impl ClassDraft {
    /// Blank draft for `today` at the default evening slot.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            title: String::new(),
            date: today.format("%Y-%m-%d").to_string(),
            time: DEFAULT_CLASS_TIME.to_string(),
            location: String::new(),
            max_capacity: DEFAULT_CLASS_CAPACITY,
        }
    }

    /// Prefills the draft from a template.
    ///
    /// The title always comes from the template; location and capacity are
    /// only overridden when the template carries them.
    pub fn apply_template(&mut self, template: &ClassTemplate) {
        self.title = template.name.clone();
        if let Some(location) = template
            .default_location
            .as_ref()
            .filter(|value| !value.trim().is_empty())
        {
            self.location = location.clone();
        }
        if let Some(capacity) = template.default_capacity.filter(|value| *value > 0) {
            self.max_capacity = capacity;
        }
    }
}

impl StudioClass {
    /// Creates an upcoming class with no attendees.
    pub fn from_draft(draft: ClassDraft) -> Result<Self, ValidationError> {
        let class = Self {
            id: new_entity_id(),
            title: draft.title.trim().to_string(),
            date: draft.date.trim().to_string(),
            time: draft.time.trim().to_string(),
            location: draft.location.trim().to_string(),
            max_capacity: draft.max_capacity,
            attendees: BTreeSet::new(),
            instructor: DEFAULT_INSTRUCTOR.to_string(),
            status: ClassStatus::Upcoming,
        };
        class.validate()?;
        Ok(class)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("class id", &self.id)?;
        require_text("class title", &self.title)?;
        require_text("class date", &self.date)?;
        require_text("class time", &self.time)?;
        if self.max_capacity == 0 {
            return Err(ValidationError::ZeroCapacity);
        }
        Ok(())
    }

    pub fn is_attending(&self, member_id: &str) -> bool {
        self.attendees.contains(member_id)
    }

    pub fn headcount(&self) -> usize {
        self.attendees.len()
    }
}
