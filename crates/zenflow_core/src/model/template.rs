//! Reusable class presets.

use super::{new_entity_id, require_text, ValidationError};
use serde::{Deserialize, Serialize};

pub type TemplateId = String;

const DEFAULT_TEMPLATE_CAPACITY: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassTemplate {
    pub id: TemplateId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_capacity: Option<u32>,
}

impl ClassTemplate {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        require_text("template name", name)?;
        Ok(Self {
            id: new_entity_id(),
            name: name.trim().to_string(),
            default_location: None,
            default_capacity: Some(DEFAULT_TEMPLATE_CAPACITY),
        })
    }
}
