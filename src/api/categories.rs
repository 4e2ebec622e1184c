//! Category endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::catalog::{Category, CreateCategory, UpdateCategory};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryApiRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategoryApiRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Category> for CategoryResponse {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id().as_str().to_string(),
            name: category.name().to_string(),
            description: category.description().map(String::from),
            created_at: category.created_at().to_rfc3339(),
            updated_at: category.updated_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListCategoriesResponse {
    pub categories: Vec<CategoryResponse>,
    pub total: usize,
}

/// GET /api/categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<ListCategoriesResponse>, ApiError> {
    let categories = state
        .catalog
        .list_categories(&state.cache_context())
        .await?;

    let categories: Vec<CategoryResponse> = categories.iter().map(CategoryResponse::from).collect();
    let total = categories.len();

    Ok(Json(ListCategoriesResponse { categories, total }))
}

/// GET /api/categories/{id}
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category = state
        .catalog
        .get_category(&state.cache_context(), &id)
        .await?;

    Ok(Json(CategoryResponse::from(&category)))
}

/// POST /api/categories
pub async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<CreateCategoryApiRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    debug!(name = %request.name, "Creating category");

    let command = CreateCategory {
        id: request.id,
        name: request.name,
        description: request.description,
    };

    let category = state
        .catalog
        .create_category(&state.cache_context(), command)
        .await?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(&category))))
}

/// PUT /api/categories/{id}
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateCategoryApiRequest>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let command = UpdateCategory {
        id,
        name: request.name,
        description: request.description,
    };

    let category = state
        .catalog
        .update_category(&state.cache_context(), command)
        .await?;

    Ok(Json(CategoryResponse::from(&category)))
}

/// DELETE /api/categories/{id}
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .catalog
        .delete_category(&state.cache_context(), &id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
