//! Product entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::category::CategoryId;
use super::validation::{
    CatalogValidationError, validate_catalog_id, validate_name, validate_price,
};

/// Product identifier - alphanumeric + hyphens, max 64 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductId(String);

impl ProductId {
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

impl TryFrom<String> for ProductId {
    type Error = CatalogValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProductId> for String {
    fn from(id: ProductId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A sellable item in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    /// Price in the smallest currency unit
    price_cents: i64,
    category_id: CategoryId,
    stock: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        price_cents: i64,
        category_id: CategoryId,
    ) -> Result<Self, CatalogValidationError> {
        let name = name.into();
        validate_name(&name)?;
        validate_price(price_cents)?;
        let now = Utc::now();

        Ok(Self {
            id,
            name,
            description: None,
            price_cents,
            category_id,
            stock: 0,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = stock;
        self
    }

    // Getters

    pub fn id(&self) -> &ProductId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn price_cents(&self) -> i64 {
        self.price_cents
    }

    pub fn category_id(&self) -> &CategoryId {
        &self.category_id
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Case-insensitive match against name and description
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();

        self.name.to_lowercase().contains(&term)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&term))
    }

    // Mutators

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

    pub fn set_price(&mut self, price_cents: i64) -> Result<(), CatalogValidationError> {
        validate_price(price_cents)?;
        self.price_cents = price_cents;
        self.touch();
        Ok(())
    }

    pub fn set_category(&mut self, category_id: CategoryId) {
        self.category_id = category_id;
        self.touch();
    }

    pub fn set_stock(&mut self, stock: u32) {
        self.stock = stock;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> Product {
        Product::new(
            ProductId::new("1").unwrap(),
            "Widget",
            1999,
            CategoryId::new("tools").unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_product() {
        let product = widget().with_stock(3);

        assert_eq!(product.id().as_str(), "1");
        assert_eq!(product.name(), "Widget");
        assert_eq!(product.price_cents(), 1999);
        assert_eq!(product.category_id().as_str(), "tools");
        assert_eq!(product.stock(), 3);
    }

    #[test]
    fn test_negative_price_rejected() {
        let result = Product::new(
            ProductId::new("1").unwrap(),
            "Widget",
            -5,
            CategoryId::new("tools").unwrap(),
        );
        assert_eq!(result.unwrap_err(), CatalogValidationError::NegativePrice);

        let mut product = widget();
        assert!(product.set_price(-1).is_err());
        assert_eq!(product.price_cents(), 1999);
    }

    #[test]
    fn test_matches_name_and_description() {
        let product = widget().with_description("Heavy duty steel");

        assert!(product.matches("widg"));
        assert!(product.matches(" STEEL "));
        assert!(!product.matches("plastic"));
    }

    #[test]
    fn test_json_roundtrip_keeps_identity() {
        let product = widget();
        let json = serde_json::to_string(&product).unwrap();
        let back: Product = serde_json::from_str(&json).unwrap();

        assert_eq!(back, product);
    }
}
