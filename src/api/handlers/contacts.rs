use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{default_limit, paginate};
use crate::api::auth::RequireAdmin;
use crate::api::response::{ApiError, AppJson, AppQuery, JSend, JSendPaginated};
use crate::forms::ContactForm;
use crate::storage::models::ContactSubmission;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub created_at: String,
    pub email: String,
    pub id: String,
    pub is_read: bool,
    pub message: String,
    pub name: String,
    pub phone: String,
    pub service_label: &'static str,
    pub service_type: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ContactListParams {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    pub is_read: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// Public contact form submission (JSON)
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    AppJson(form): AppJson<ContactForm>,
) -> Result<Json<JSend<ContactResponse>>, ApiError> {
    let submission = form.validate()?;
    let record = state.store.create_contact(submission).await?;

    tracing::info!(
        contact_id = %record.id,
        service_type = %record.service_type,
        "Received contact submission"
    );
    Ok(JSend::success(contact_to_response(&record)))
}

pub async fn list_contacts(
    State(state): State<Arc<AppState>>,
    RequireAdmin(_admin): RequireAdmin,
    AppQuery(params): AppQuery<ContactListParams>,
) -> Result<Json<JSendPaginated<ContactResponse>>, ApiError> {
    let mut records = state.store.list_contacts().await?;
    if params.unread_only {
        records.retain(|c| !c.is_read);
    }

    paginate(&records, params.limit, params.offset, contact_to_response)
}

pub async fn mark_contact(
    State(state): State<Arc<AppState>>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    AppJson(req): AppJson<MarkReadRequest>,
) -> Result<Json<JSend<ContactResponse>>, ApiError> {
    let record = state
        .store
        .set_contact_read(&id, req.is_read)
        .await?
        .ok_or_else(|| ApiError::not_found("Contact submission not found"))?;

    tracing::debug!(contact_id = %id, is_read = req.is_read, admin = %admin.uid, "Marked contact");
    Ok(JSend::success(contact_to_response(&record)))
}

pub async fn delete_contact(
    State(state): State<Arc<AppState>>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<JSend<()>>, ApiError> {
    if !state.store.delete_contact(&id).await? {
        return Err(ApiError::not_found("Contact submission not found"));
    }

    tracing::info!(contact_id = %id, admin = %admin.uid, "Deleted contact submission");
    Ok(JSend::success(()))
}

// ============================================================================
// Helpers
// ============================================================================

fn contact_to_response(record: &ContactSubmission) -> ContactResponse {
    ContactResponse {
        created_at: record.created_at.to_rfc3339(),
        email: record.email.clone(),
        id: record.id.clone(),
        is_read: record.is_read,
        message: record.message.clone(),
        name: record.name.clone(),
        phone: record.phone.clone(),
        service_label: record.service_type.label(),
        service_type: record.service_type.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::api::create_router;
    use crate::testutil::{body_json, grant_admin, test_state, ADMIN_TOKEN};

    fn contact_body() -> Value {
        json!({
            "name": "Harleen Kaur",
            "email": "harleen@example.com",
            "phone": "+91 90000 00000",
            "service_type": "advertisement",
            "message": "We would like a slot during the weekend show.",
            "accept_terms": true
        })
    }

    fn post_contact(body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/contacts")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn admin_request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", format!("Bearer {ADMIN_TOKEN}"));
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_submit_contact_stores_unread() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(state.clone());

        let resp = app.oneshot(post_contact(contact_body())).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        assert_eq!(json["data"]["is_read"], false);
        assert_eq!(json["data"]["service_type"], "advertisement");

        let stored = state.store.list_contacts().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "Harleen Kaur");
    }

    #[tokio::test]
    async fn test_submit_contact_validation_stores_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(state.clone());

        let mut body = contact_body();
        body["email"] = json!("not-an-email");
        body["accept_terms"] = json!(false);

        let resp = app.oneshot(post_contact(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let json = body_json(resp).await;
        assert_eq!(json["status"], "fail");
        assert_eq!(json["data"]["errors"].as_array().unwrap().len(), 2);
        assert!(state.store.list_contacts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_admin_marks_and_filters_unread() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        grant_admin(&state).await;
        let app = create_router(state.clone());

        for _ in 0..2 {
            let resp = app.clone().oneshot(post_contact(contact_body())).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
        }
        let first_id = state.store.list_contacts().await.unwrap()[0].id.clone();

        let resp = app
            .clone()
            .oneshot(admin_request(
                Method::PUT,
                &format!("/api/admin/contacts/{first_id}/read"),
                Some(json!({ "is_read": true })),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["data"]["is_read"], true);

        let resp = app
            .clone()
            .oneshot(admin_request(
                Method::GET,
                "/api/admin/contacts?unread_only=true",
                None,
            ))
            .await
            .unwrap();
        let json = body_json(resp).await;
        assert_eq!(json["data"]["pagination"]["total"], 1);

        let resp = app
            .oneshot(admin_request(
                Method::PUT,
                "/api/admin/contacts/missing/read",
                Some(json!({ "is_read": true })),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_contacts_requires_admin() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(state);

        let resp = app
            .oneshot(admin_request(Method::GET, "/api/admin/contacts", None))
            .await
            .unwrap();
        // Token is valid but no grant exists yet
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
