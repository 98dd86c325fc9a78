use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::api::auth::{MaybeUser, RequireAdmin};
use crate::api::response::{ApiError, AppJson, JSend};
use crate::forms::AdminGrantForm;
use crate::identity::Identity;
use crate::storage::models::AdminGrant;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub is_admin: bool,
    pub user: Option<Identity>,
}

#[derive(Debug, Serialize)]
pub struct GrantResponse {
    pub added_at: String,
    pub email: String,
    pub is_admin: bool,
    pub uid: String,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub admin_count: u64,
    pub media_count: u64,
    pub submission_count: u64,
    pub unread_count: u64,
}

// ============================================================================
// Handlers
// ============================================================================

/// Who is signed in and whether the portal should unlock for them.
pub async fn session(
    State(state): State<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
) -> Json<JSend<SessionResponse>> {
    let is_admin = match &user {
        Some(identity) => match state.store.is_admin(&identity.uid).await {
            Ok(is_admin) => is_admin,
            Err(e) => {
                tracing::error!(uid = %identity.uid, error = %e, "Admin check failed");
                false
            }
        },
        None => false,
    };

    JSend::success(SessionResponse { is_admin, user })
}

pub async fn list_grants(
    State(state): State<Arc<AppState>>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<JSend<Vec<GrantResponse>>>, ApiError> {
    let grants = state.store.list_admin_grants().await?;
    Ok(JSend::success(grants.iter().map(grant_to_response).collect()))
}

pub async fn grant_admin(
    State(state): State<Arc<AppState>>,
    RequireAdmin(admin): RequireAdmin,
    Path(uid): Path<String>,
    AppJson(form): AppJson<AdminGrantForm>,
) -> Result<Json<JSend<GrantResponse>>, ApiError> {
    let (uid, email) = form.validate(&uid)?;
    let grant = AdminGrant::new(uid, email);
    state.store.put_admin_grant(&grant).await?;

    tracing::info!(uid = %grant.uid, granted_by = %admin.uid, "Granted admin access");
    Ok(JSend::success(grant_to_response(&grant)))
}

pub async fn revoke_admin(
    State(state): State<Arc<AppState>>,
    RequireAdmin(admin): RequireAdmin,
    Path(uid): Path<String>,
) -> Result<Json<JSend<()>>, ApiError> {
    if uid == admin.uid {
        return Err(ApiError::bad_request("Admins cannot revoke their own access"));
    }

    if !state.store.delete_admin_grant(&uid).await? {
        return Err(ApiError::not_found("Admin grant not found"));
    }

    tracing::info!(uid = %uid, revoked_by = %admin.uid, "Revoked admin access");
    Ok(JSend::success(()))
}

/// Dashboard counters
pub async fn stats(
    State(state): State<Arc<AppState>>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<JSend<StatsResponse>>, ApiError> {
    // The allow-list stays small; it is listed so cleared flags are not counted.
    let grants = state.store.list_admin_grants().await?;

    Ok(JSend::success(StatsResponse {
        admin_count: grants.iter().filter(|g| g.authorizes()).count() as u64,
        media_count: state.store.count_media().await?,
        submission_count: state.store.count_contacts(false).await?,
        unread_count: state.store.count_contacts(true).await?,
    }))
}

// ============================================================================
// Helpers
// ============================================================================

fn grant_to_response(grant: &AdminGrant) -> GrantResponse {
    GrantResponse {
        added_at: grant.added_at.to_rfc3339(),
        email: grant.email.clone(),
        is_admin: grant.is_admin,
        uid: grant.uid.clone(),
    }
}
