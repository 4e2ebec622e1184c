//! Category entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{CatalogValidationError, validate_catalog_id, validate_name};

/// Category identifier - alphanumeric + hyphens, max 64 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryId(String);

impl CategoryId {
    pub fn new(id: impl Into<String>) -> Result<Self, CatalogValidationError> {
        let id = id.into();
        validate_catalog_id(&id)?;
        Ok(Self(id))
    }

    /// Generate a random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CategoryId {
    type Error = CatalogValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CategoryId> for String {
    fn from(id: CategoryId) -> Self {
        id.0
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Product category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(id: CategoryId, name: impl Into<String>) -> Result<Self, CatalogValidationError> {
        let name = name.into();
        validate_name(&name)?;
        let now = Utc::now();

        Ok(Self {
            id,
            name,
            description: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> &CategoryId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), CatalogValidationError> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        self.touch();
        Ok(())
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_category() {
        let category = Category::new(CategoryId::new("books").unwrap(), "Books")
            .unwrap()
            .with_description("Printed matter");

        assert_eq!(category.id().as_str(), "books");
        assert_eq!(category.name(), "Books");
        assert_eq!(category.description(), Some("Printed matter"));
    }

    #[test]
    fn test_rename_updates_timestamp() {
        let mut category = Category::new(CategoryId::new("books").unwrap(), "Books").unwrap();
        let before = category.updated_at();

        category.set_name("Novels").unwrap();
        assert_eq!(category.name(), "Novels");
        assert!(category.updated_at() >= before);
        assert!(category.set_name("").is_err());
    }

    #[test]
    fn test_id_deserialization_validates() {
        let ok: Result<CategoryId, _> = serde_json::from_str("\"books\"");
        assert!(ok.is_ok());

        let bad: Result<CategoryId, _> = serde_json::from_str("\"no spaces\"");
        assert!(bad.is_err());
    }
}
