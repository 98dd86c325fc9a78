use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use super::{paginate, ListParams};
use crate::api::auth::RequireAdmin;
use crate::api::response::{ApiError, AppJson, AppQuery, JSend, JSendPaginated};
use crate::forms::{MediaForm, MediaUpdateForm};
use crate::storage::models::MediaItem;
use crate::video::youtube_thumbnail;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct MediaResponse {
    pub artist: String,
    pub created_at: String,
    pub id: String,
    pub thumbnail_url: Option<String>,
    pub title: String,
    pub video_url: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Public gallery listing, newest first
pub async fn list_media(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<ListParams>,
) -> Result<Json<JSendPaginated<MediaResponse>>, ApiError> {
    let items = state.store.list_media().await?;
    paginate(&items, params.limit, params.offset, media_to_response)
}

pub async fn create_media(
    State(state): State<Arc<AppState>>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(req): AppJson<MediaForm>,
) -> Result<Json<JSend<MediaResponse>>, ApiError> {
    let new_item = req.validate()?;
    let item = state.store.create_media(new_item).await?;

    tracing::info!(media_id = %item.id, admin = %admin.uid, "Created media item");
    Ok(JSend::success(media_to_response(&item)))
}

pub async fn update_media(
    State(state): State<Arc<AppState>>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    AppJson(req): AppJson<MediaUpdateForm>,
) -> Result<Json<JSend<MediaResponse>>, ApiError> {
    let patch = req.validate()?;

    let item = state
        .store
        .update_media(&id, &patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Media item not found"))?;

    tracing::info!(media_id = %id, admin = %admin.uid, "Updated media item");
    Ok(JSend::success(media_to_response(&item)))
}

pub async fn delete_media(
    State(state): State<Arc<AppState>>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<JSend<()>>, ApiError> {
    if !state.store.delete_media(&id).await? {
        return Err(ApiError::not_found("Media item not found"));
    }

    tracing::info!(media_id = %id, admin = %admin.uid, "Deleted media item");
    Ok(JSend::success(()))
}

// ============================================================================
// Helpers
// ============================================================================

pub(crate) fn media_to_response(item: &MediaItem) -> MediaResponse {
    MediaResponse {
        artist: item.artist.clone(),
        created_at: item.created_at.to_rfc3339(),
        id: item.id.clone(),
        thumbnail_url: youtube_thumbnail(&item.video_url),
        title: item.title.clone(),
        video_url: item.video_url.clone(),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::api::create_router;
    use crate::testutil::{body_json, grant_admin, test_state, ADMIN_TOKEN, VISITOR_TOKEN};

    fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_create_requires_sign_in() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(state);

        let body = json!({ "title": "T", "artist": "A", "video_url": "https://youtu.be/x" });
        let resp = app
            .oneshot(json_request(Method::POST, "/api/admin/media", None, body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_rejects_non_admin() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(state);

        let body = json!({ "title": "T", "artist": "A", "video_url": "https://youtu.be/x" });
        let resp = app
            .oneshot(json_request(
                Method::POST,
                "/api/admin/media",
                Some(VISITOR_TOKEN),
                body,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_create_update_delete() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        grant_admin(&state).await;
        let app = create_router(state.clone());

        let body = json!({
            "title": "Heer Ranjha",
            "artist": "Folk Ensemble",
            "video_url": "https://www.youtube.com/watch?v=abc123"
        });
        let resp = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/admin/media",
                Some(ADMIN_TOKEN),
                body,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let created = body_json(resp).await;
        let id = created["data"]["id"].as_str().unwrap().to_string();
        assert_eq!(
            created["data"]["thumbnail_url"],
            "https://img.youtube.com/vi/abc123/hqdefault.jpg"
        );

        let resp = app
            .clone()
            .oneshot(json_request(
                Method::PUT,
                &format!("/api/admin/media/{id}"),
                Some(ADMIN_TOKEN),
                json!({ "title": "Heer Ranjha (Live)" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let updated = body_json(resp).await;
        assert_eq!(updated["data"]["title"], "Heer Ranjha (Live)");
        assert_eq!(updated["data"]["artist"], "Folk Ensemble");

        let resp = app
            .clone()
            .oneshot(json_request(
                Method::DELETE,
                &format!("/api/admin/media/{id}"),
                Some(ADMIN_TOKEN),
                Value::Null,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(state.store.get_media(&id).await.unwrap().is_none());

        let resp = app
            .oneshot(json_request(
                Method::DELETE,
                &format!("/api/admin/media/{id}"),
                Some(ADMIN_TOKEN),
                Value::Null,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_reports_field_errors() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        grant_admin(&state).await;
        let app = create_router(state);

        let body = json!({ "title": "", "artist": "A", "video_url": "nope" });
        let resp = app
            .oneshot(json_request(
                Method::POST,
                "/api/admin/media",
                Some(ADMIN_TOKEN),
                body,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let json = body_json(resp).await;
        assert_eq!(json["status"], "fail");
        let fields: Vec<&str> = json["data"]["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["title", "video_url"]);
    }

    #[tokio::test]
    async fn test_public_list_is_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(state.clone());

        for title in ["First", "Second", "Third"] {
            state
                .store
                .create_media(crate::storage::models::NewMediaItem {
                    title: title.to_string(),
                    artist: "Artist".to_string(),
                    video_url: "https://example.com/v".to_string(),
                })
                .await
                .unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/media?limit=2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        let titles: Vec<&str> = json["data"]["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["Third", "Second"]);
        assert_eq!(json["data"]["pagination"]["total"], 3);
    }
}
