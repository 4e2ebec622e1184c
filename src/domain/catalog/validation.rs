//! Catalog validation

use thiserror::Error;

/// Errors that can occur during catalog validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CatalogValidationError {
    #[error("ID cannot be empty")]
    EmptyId,

    #[error("ID cannot exceed {0} characters")]
    IdTooLong(usize),

    #[error("ID can only contain alphanumeric characters and hyphens")]
    InvalidIdCharacters,

    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Name cannot exceed {0} characters")]
    NameTooLong(usize),

    #[error("Price cannot be negative")]
    NegativePrice,
}

const MAX_ID_LENGTH: usize = 64;
const MAX_NAME_LENGTH: usize = 120;

/// Validate a product or category ID
pub fn validate_catalog_id(id: &str) -> Result<(), CatalogValidationError> {
    if id.is_empty() {
        return Err(CatalogValidationError::EmptyId);
    }

    if id.len() > MAX_ID_LENGTH {
        return Err(CatalogValidationError::IdTooLong(MAX_ID_LENGTH));
    }

    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(CatalogValidationError::InvalidIdCharacters);
    }

    Ok(())
}

/// Validate a product or category name
pub fn validate_name(name: &str) -> Result<(), CatalogValidationError> {
    if name.trim().is_empty() {
        return Err(CatalogValidationError::EmptyName);
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(CatalogValidationError::NameTooLong(MAX_NAME_LENGTH));
    }

    Ok(())
}

/// Validate a price in cents
pub fn validate_price(price_cents: i64) -> Result<(), CatalogValidationError> {
    if price_cents < 0 {
        return Err(CatalogValidationError::NegativePrice);
    }

    Ok(())
}
