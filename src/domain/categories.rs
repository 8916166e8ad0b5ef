//! Taxonomy records as the composer and directory see them.

use postdesk_api_types::{CategoryRecord, CreateCategoryRequest, FateRecord};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Selectable option bound to a post's `category_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

impl From<CategoryRecord> for Category {
    fn from(record: CategoryRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
        }
    }
}

/// Directory row with the fate elements flattened to their names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub fates: Vec<String>,
}

impl From<CategoryRecord> for CategoryEntry {
    fn from(record: CategoryRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            description: record.description.unwrap_or_default(),
            fates: record.fates.into_iter().map(|fate| fate.element).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fate {
    pub id: String,
    pub element: String,
}

impl From<FateRecord> for Fate {
    fn from(record: FateRecord) -> Self {
        Self {
            id: record.id,
            element: record.element,
        }
    }
}

/// Input for creating a category. Every field is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub description: String,
    pub fate_ids: Vec<String>,
}

impl NewCategory {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("category name is required"));
        }
        if self.description.trim().is_empty() {
            return Err(DomainError::validation("category description is required"));
        }
        if self.fate_ids.iter().all(|id| id.trim().is_empty()) {
            return Err(DomainError::validation("select at least one fate"));
        }
        Ok(())
    }

    pub fn into_request(self) -> CreateCategoryRequest {
        CreateCategoryRequest {
            description: self.description.trim().to_string(),
            fate_id: self
                .fate_ids
                .into_iter()
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .collect(),
            name: self.name.trim().to_string(),
        }
    }
}
