use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::api::auth::RequireAdmin;
use crate::api::response::{ApiError, AppJson, JSend};
use crate::forms::CompanyForm;
use crate::storage::models::CompanyProfile;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CompanyResponse {
    pub address: String,
    pub artists_featured: String,
    pub description: String,
    pub email: String,
    pub id: String,
    pub mission: String,
    pub phone: String,
    pub shows_produced: String,
    pub years_experience: String,
}

pub async fn get_company(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<CompanyResponse>>, ApiError> {
    let profile = state
        .store
        .get_company()
        .await?
        .ok_or_else(|| ApiError::not_found("Company profile has not been set up"))?;

    Ok(JSend::success(company_to_response(profile)))
}

/// Replace the company details, creating the profile on first save.
pub async fn upsert_company(
    State(state): State<Arc<AppState>>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(form): AppJson<CompanyForm>,
) -> Result<Json<JSend<CompanyResponse>>, ApiError> {
    let details = form.validate()?;
    let profile = state.store.upsert_company(&details).await?;

    tracing::info!(company_id = %profile.id, admin = %admin.uid, "Saved company profile");
    Ok(JSend::success(company_to_response(profile)))
}

fn company_to_response(profile: CompanyProfile) -> CompanyResponse {
    let d = profile.details;
    CompanyResponse {
        address: d.address,
        artists_featured: d.artists_featured,
        description: d.description,
        email: d.email,
        id: profile.id,
        mission: d.mission,
        phone: d.phone,
        shows_produced: d.shows_produced,
        years_experience: d.years_experience,
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::api::create_router;
    use crate::testutil::{body_json, grant_admin, test_state, ADMIN_TOKEN};

    fn get_company() -> Request<Body> {
        Request::builder()
            .uri("/api/company")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_company_missing_then_upserted_once() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        grant_admin(&state).await;
        let app = create_router(state.clone());

        let resp = app.clone().oneshot(get_company()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let mut body = json!({
            "description": "Production house",
            "mission": "Showcase artists",
            "shows_produced": "10+",
            "artists_featured": "20+",
            "years_experience": "5",
            "phone": "+91 1",
            "email": "hello@studio.example",
            "address": "Jalandhar"
        });

        let mut ids = Vec::new();
        for shows in ["10+", "12+"] {
            body["shows_produced"] = json!(shows);
            let resp = app
                .clone()
                .oneshot(
                    Request::builder()
                        .method(Method::PUT)
                        .uri("/api/admin/company")
                        .header("authorization", format!("Bearer {ADMIN_TOKEN}"))
                        .header("content-type", "application/json")
                        .body(Body::from(body.to_string()))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
            ids.push(body_json(resp).await["data"]["id"].as_str().unwrap().to_string());
        }
        assert_eq!(ids[0], ids[1]);

        let resp = app.oneshot(get_company()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["data"]["shows_produced"], "12+");
    }

    #[tokio::test]
    async fn test_upsert_company_rejects_blank_fields() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        grant_admin(&state).await;
        let app = create_router(state.clone());

        let resp = app
            .oneshot(
                Request::builder()
                    .method(Method::PUT)
                    .uri("/api/admin/company")
                    .header("authorization", format!("Bearer {ADMIN_TOKEN}"))
                    .header("content-type", "application/json")
                    .body(Body::from(json!({ "description": "Only this" }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(state.store.get_company().await.unwrap().is_none());
    }
}
