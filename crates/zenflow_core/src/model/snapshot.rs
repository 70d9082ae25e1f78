//! Full studio state as exchanged with storage and the remote endpoint.

use super::attendance::AttendanceRecord;
use super::class::StudioClass;
use super::member::Member;
use super::schedule::{normalize_date, normalize_time};
use super::template::ClassTemplate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub classes: Vec<StudioClass>,
    #[serde(default)]
    pub records: Vec<AttendanceRecord>,
    #[serde(default)]
    pub templates: Vec<ClassTemplate>,
}

impl Snapshot {
    pub fn member(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|member| member.id == id)
    }

    pub fn class(&self, id: &str) -> Option<&StudioClass> {
        self.classes.iter().find(|class| class.id == id)
    }

    pub fn template(&self, id: &str) -> Option<&ClassTemplate> {
        self.templates.iter().find(|template| template.id == id)
    }

    /// Rewrites spreadsheet-style date/time cells into `YYYY-MM-DD` / `HH:MM`.
    pub fn normalize_schedule(&mut self) {
        for class in &mut self.classes {
            class.date = normalize_date(&class.date);
            class.time = normalize_time(&class.time);
        }
        for member in &mut self.members {
            member.join_date = normalize_date(&member.join_date);
        }
    }
}
