//! Product endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::catalog::{CreateProduct, Page, PageRequest, Product, UpdateProduct};

/// Paging parameters shared by list and search
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl PageParams {
    pub fn to_request(&self) -> PageRequest {
        PageRequest::new(
            self.page.unwrap_or(1),
            self.page_size.unwrap_or(PageRequest::DEFAULT_PAGE_SIZE),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl SearchParams {
    fn paging(&self) -> PageParams {
        PageParams {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductApiRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_cents: i64,
    pub category_id: String,
    #[serde(default)]
    pub stock: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProductApiRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub category_id: Option<String>,
    pub stock: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price_cents: i64,
    pub category_id: String,
    pub stock: u32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Product> for ProductResponse {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id().as_str().to_string(),
            name: product.name().to_string(),
            description: product.description().map(String::from),
            price_cents: product.price_cents(),
            category_id: product.category_id().as_str().to_string(),
            stock: product.stock(),
            created_at: product.created_at().to_rfc3339(),
            updated_at: product.updated_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductPageResponse {
    pub items: Vec<ProductResponse>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
}

impl From<&Page<Product>> for ProductPageResponse {
    fn from(page: &Page<Product>) -> Self {
        Self {
            items: page.items.iter().map(ProductResponse::from).collect(),
            page: page.page,
            page_size: page.page_size,
            total: page.total,
        }
    }
}

/// GET /api/products
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<ProductPageResponse>, ApiError> {
    let page = params.to_request();
    debug!(page = page.page, page_size = page.page_size, "Listing products");

    let result = state
        .catalog
        .list_products(&state.cache_context(), page)
        .await?;

    Ok(Json(ProductPageResponse::from(&result)))
}

/// GET /api/products/search
pub async fn search_products(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ProductPageResponse>, ApiError> {
    debug!(term = %params.q, "Searching products");

    let result = state
        .catalog
        .search_products(&state.cache_context(), &params.q, params.paging().to_request())
        .await
        .map_err(|e| ApiError::from(e).with_param("q"))?;

    Ok(Json(ProductPageResponse::from(&result)))
}

/// GET /api/products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state.catalog.get_product(&state.cache_context(), &id).await?;

    Ok(Json(ProductResponse::from(&product)))
}

/// POST /api/products
pub async fn create_product(
    State(state): State<AppState>,
    Json(request): Json<CreateProductApiRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    debug!(name = %request.name, category = %request.category_id, "Creating product");

    let command = CreateProduct {
        id: request.id,
        name: request.name,
        description: request.description,
        price_cents: request.price_cents,
        category_id: request.category_id,
        stock: request.stock,
    };

    let product = state
        .catalog
        .create_product(&state.cache_context(), command)
        .await?;

    Ok((StatusCode::CREATED, Json(ProductResponse::from(&product))))
}

/// PUT /api/products/{id}
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateProductApiRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let command = UpdateProduct {
        id,
        name: request.name,
        description: request.description,
        price_cents: request.price_cents,
        category_id: request.category_id,
        stock: request.stock,
    };

    let product = state
        .catalog
        .update_product(&state.cache_context(), command)
        .await?;

    Ok(Json(ProductResponse::from(&product)))
}

/// DELETE /api/products/{id}
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .catalog
        .delete_product(&state.cache_context(), &id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
