//! Member domain model.
//!
//! # Responsibility
//! - Define the member record and its credit counters.
//! - Own the credit arithmetic so both counters move together.
//!
//! # Invariants
//! - `remaining_classes` never goes below zero.
//! - `total_purchased_classes` starts at the initial credit and only grows by
//!   top-up amounts.

use super::{new_entity_id, require_text, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub type MemberId = String;

/// Purchase plan a member signed up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PackageType {
    #[serde(rename = "single")]
    Single,
    #[serde(rename = "package_10")]
    Package10,
    #[serde(rename = "monthly")]
    Monthly,
    #[serde(rename = "unlimited")]
    Unlimited,
}

impl PackageType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Package10 => "package_10",
            Self::Monthly => "monthly",
            Self::Unlimited => "unlimited",
        }
    }
}

impl Display for PackageType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "package_10" | "package10" => Ok(Self::Package10),
            "monthly" => Ok(Self::Monthly),
            "unlimited" => Ok(Self::Unlimited),
            other => Err(ValidationError::UnknownPackageType(other.to_string())),
        }
    }
}

/// A studio member with a usable class credit balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    pub package_type: PackageType,
    pub remaining_classes: u32,
    /// Lifetime purchase count. Older snapshots may omit it.
    #[serde(default)]
    pub total_purchased_classes: u32,
    pub join_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Input for creating a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDraft {
    pub name: String,
    pub phone: String,
    pub package_type: PackageType,
    pub remaining_classes: u32,
}

impl Default for MemberDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            phone: String::new(),
            package_type: PackageType::Package10,
            remaining_classes: 10,
        }
    }
}

impl Member {
    /// Builds a new member from form input.
    ///
    /// # Invariants
    /// - `total_purchased_classes` is initialized to the starting credit.
    /// - `join_date` is rendered as `YYYY-MM-DD`.
    pub fn from_draft(draft: MemberDraft, join_date: NaiveDate) -> Result<Self, ValidationError> {
        let member = Self {
            id: new_entity_id(),
            name: draft.name.trim().to_string(),
            phone: draft.phone.trim().to_string(),
            package_type: draft.package_type,
            remaining_classes: draft.remaining_classes,
            total_purchased_classes: draft.remaining_classes,
            join_date: join_date.format("%Y-%m-%d").to_string(),
            note: None,
        };
        member.validate()?;
        Ok(member)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("member id", &self.id)?;
        require_text("member name", &self.name)
    }

    pub fn has_credit(&self) -> bool {
        self.remaining_classes > 0
    }

    /// Consumes one credit when available. Returns whether a credit was taken.
    pub fn consume_credit(&mut self) -> bool {
        if !self.has_credit() {
            return false;
        }
        self.remaining_classes -= 1;
        true
    }

    /// Returns one credit to the usable balance.
    ///
    /// Lifetime purchases are left alone: a refund is not a purchase.
    pub fn refund_credit(&mut self) {
        self.remaining_classes = self.remaining_classes.saturating_add(1);
    }

    /// Adds purchased credit to both counters.
    pub fn add_purchased_credit(&mut self, amount: u32) {
        self.remaining_classes = self.remaining_classes.saturating_add(amount);
        self.total_purchased_classes = self.total_purchased_classes.saturating_add(amount);
    }

    /// Case-insensitive name match or raw phone substring match. The query is
    /// used as typed, so surrounding spaces take part in the match; an empty
    /// query matches everyone.
    pub fn matches_query(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.to_lowercase()) || self.phone.contains(query)
    }
}
