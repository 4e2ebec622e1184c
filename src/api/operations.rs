//! Dashboard and cache operator endpoints

use axum::extract::{Path, State};
use serde::Serialize;
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::catalog::DashboardStats;

/// GET /api/dashboard/stats
pub async fn dashboard_stats(
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>, ApiError> {
    let stats = state
        .catalog
        .dashboard_stats(&state.cache_context())
        .await?;

    Ok(Json(stats))
}

#[derive(Debug, Clone, Serialize)]
pub struct FlushResponse {
    pub prefix: String,
    pub removed: usize,
    pub backend: &'static str,
}

/// DELETE /api/cache/{prefix}
///
/// Drops every cached read under the prefix. A degraded backend reports 0.
pub async fn flush_cache_prefix(
    State(state): State<AppState>,
    Path(prefix): Path<String>,
) -> Result<Json<FlushResponse>, ApiError> {
    info!(prefix = %prefix, "Operator cache flush");

    let removed = state
        .catalog
        .flush_prefix(&state.cache_context(), &prefix)
        .await
        .map_err(|e| ApiError::from(e).with_param("prefix"))?;

    Ok(Json(FlushResponse {
        prefix,
        removed,
        backend: state.catalog.store().backend_name(),
    }))
}
