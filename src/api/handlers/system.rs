use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::api::response::{ApiError, JSend};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub media_items_deleted: u64,
    pub contact_submissions_deleted: u64,
    pub company_profiles_deleted: u64,
    pub admin_grants_deleted: u64,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn health() -> Json<JSend<HealthResponse>> {
    JSend::success(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn purge(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<PurgeResponse>>, ApiError> {
    let stats = state.store.purge_all().await?;

    tracing::warn!(
        media_items = stats.media_items,
        contact_submissions = stats.contact_submissions,
        admin_grants = stats.admin_grants,
        "Purged all data"
    );

    Ok(JSend::success(PurgeResponse {
        media_items_deleted: stats.media_items,
        contact_submissions_deleted: stats.contact_submissions,
        company_profiles_deleted: stats.company_profiles,
        admin_grants_deleted: stats.admin_grants,
    }))
}
