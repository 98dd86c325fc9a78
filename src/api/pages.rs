//! Server-rendered public pages and the admin portal shell.
//!
//! Pages never fail on a store error: the affected section renders empty and a
//! generic notice is shown instead.

use std::sync::Arc;

use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::api::response::AppForm;
use crate::document_store::StoreError;
use crate::forms::{ContactForm, ValidationErrors};
use crate::storage::models::{CompanyDetails, MediaItem, ServiceType};
use crate::video::youtube_thumbnail;
use crate::AppState;

const STORE_NOTICE: &str =
    "Some content could not be loaded right now. Please try again in a moment.";
const SUBMIT_NOTICE: &str =
    "Your message could not be sent right now. Please try again in a moment.";

/// Media cards shown on the home page
const FEATURED_COUNT: usize = 3;

// ============================================================================
// View models
// ============================================================================

struct MediaCard {
    title: String,
    artist: String,
    video_url: String,
    thumbnail_url: Option<String>,
}

impl From<&MediaItem> for MediaCard {
    fn from(item: &MediaItem) -> Self {
        MediaCard {
            title: item.title.clone(),
            artist: item.artist.clone(),
            video_url: item.video_url.clone(),
            thumbnail_url: youtube_thumbnail(&item.video_url),
        }
    }
}

struct ServiceOption {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

fn service_options(selected: &str) -> Vec<ServiceOption> {
    ServiceType::ALL
        .into_iter()
        .map(|t| ServiceOption {
            value: t.as_str(),
            label: t.label(),
            selected: t.as_str() == selected,
        })
        .collect()
}

// ============================================================================
// Templates
// ============================================================================

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    nav: &'static str,
    notice: Option<&'static str>,
    company: Option<CompanyDetails>,
    featured: Vec<MediaCard>,
}

#[derive(Template)]
#[template(path = "about.html")]
struct AboutTemplate {
    nav: &'static str,
    notice: Option<&'static str>,
    company: Option<CompanyDetails>,
}

#[derive(Template)]
#[template(path = "gallery.html")]
struct GalleryTemplate {
    nav: &'static str,
    notice: Option<&'static str>,
    company: Option<CompanyDetails>,
    media: Vec<MediaCard>,
}

#[derive(Template)]
#[template(path = "contact.html")]
struct ContactTemplate {
    nav: &'static str,
    notice: Option<&'static str>,
    company: Option<CompanyDetails>,
    form: ContactForm,
    errors: ValidationErrors,
    services: Vec<ServiceOption>,
    sent: bool,
}

#[derive(Template)]
#[template(path = "admin.html")]
struct AdminTemplate {
    nav: &'static str,
    notice: Option<&'static str>,
    company: Option<CompanyDetails>,
}

#[derive(Template)]
#[template(path = "not_found.html")]
struct NotFoundTemplate {
    nav: &'static str,
    notice: Option<&'static str>,
    company: Option<CompanyDetails>,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn home(State(state): State<Arc<AppState>>) -> Response {
    let mut notice = None;
    let company = load_company(&state, &mut notice).await;
    let featured = or_notice(state.store.list_media().await, "media", &mut notice)
        .iter()
        .take(FEATURED_COUNT)
        .map(MediaCard::from)
        .collect();

    render(
        &HomeTemplate {
            nav: "home",
            notice,
            company,
            featured,
        },
        StatusCode::OK,
    )
}

pub async fn about(State(state): State<Arc<AppState>>) -> Response {
    let mut notice = None;
    let company = load_company(&state, &mut notice).await;

    render(
        &AboutTemplate {
            nav: "about",
            notice,
            company,
        },
        StatusCode::OK,
    )
}

pub async fn gallery(State(state): State<Arc<AppState>>) -> Response {
    let mut notice = None;
    let company = load_company(&state, &mut notice).await;
    let media = or_notice(state.store.list_media().await, "media", &mut notice)
        .iter()
        .map(MediaCard::from)
        .collect();

    render(
        &GalleryTemplate {
            nav: "gallery",
            notice,
            company,
            media,
        },
        StatusCode::OK,
    )
}

pub async fn contact(State(state): State<Arc<AppState>>) -> Response {
    let mut notice = None;
    let company = load_company(&state, &mut notice).await;

    render(
        &contact_page(company, notice, ContactForm::default(), ValidationErrors::default(), false),
        StatusCode::OK,
    )
}

/// Urlencoded contact form post. Re-renders the form with field errors, or a
/// blank form with a confirmation once stored.
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    AppForm(form): AppForm<ContactForm>,
) -> Response {
    let mut notice = None;
    let company = load_company(&state, &mut notice).await;

    let submission = match form.validate() {
        Ok(submission) => submission,
        Err(errors) => {
            tracing::debug!(fields = errors.errors().len(), "Contact form rejected");
            return render(
                &contact_page(company, notice, form, errors, false),
                StatusCode::BAD_REQUEST,
            );
        }
    };

    match state.store.create_contact(submission).await {
        Ok(record) => {
            tracing::info!(contact_id = %record.id, "Received contact form");
            render(
                &contact_page(company, notice, ContactForm::default(), ValidationErrors::default(), true),
                StatusCode::OK,
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to store contact submission");
            render(
                &contact_page(company, Some(SUBMIT_NOTICE), form, ValidationErrors::default(), false),
                StatusCode::BAD_GATEWAY,
            )
        }
    }
}

/// Portal shell; data is fetched client-side from the admin API.
pub async fn admin() -> Response {
    render(
        &AdminTemplate {
            nav: "admin",
            notice: None,
            company: None,
        },
        StatusCode::OK,
    )
}

pub async fn not_found() -> Response {
    render(
        &NotFoundTemplate {
            nav: "",
            notice: None,
            company: None,
        },
        StatusCode::NOT_FOUND,
    )
}

// ============================================================================
// Helpers
// ============================================================================

fn contact_page(
    company: Option<CompanyDetails>,
    notice: Option<&'static str>,
    form: ContactForm,
    errors: ValidationErrors,
    sent: bool,
) -> ContactTemplate {
    let services = service_options(form.service_type.trim());
    ContactTemplate {
        nav: "contact",
        notice,
        company,
        form,
        errors,
        services,
        sent,
    }
}

async fn load_company(
    state: &AppState,
    notice: &mut Option<&'static str>,
) -> Option<CompanyDetails> {
    or_notice(state.store.get_company().await, "company profile", notice).map(|p| p.details)
}

/// Unwrap a store read, falling back to an empty value and setting the page notice.
fn or_notice<T: Default>(
    result: Result<T, StoreError>,
    what: &str,
    notice: &mut Option<&'static str>,
) -> T {
    result.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to load {what} for page");
        *notice = Some(STORE_NOTICE);
        T::default()
    })
}

fn render(template: &impl Template, status: StatusCode) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Template render failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<h1>Something went wrong</h1>".to_string()),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use tower::ServiceExt;

    use crate::api::create_router;
    use crate::seed::initialize_defaults;
    use crate::testutil::{body_text, test_state};

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_form(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/contact")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_pages_render_seeded_content() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        initialize_defaults(state.store.as_ref(), None).await.unwrap();
        let app = create_router(state);

        let resp = app.clone().oneshot(get("/")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains("premier Punjabi music production house"));

        let resp = app.clone().oneshot(get("/gallery")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert!(html.contains("Modern Punjabi Hit"));
        assert!(html.contains("https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg"));

        let resp = app.oneshot(get("/about")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains("500+"));
    }

    #[tokio::test]
    async fn test_pages_render_without_content() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(&dir));

        for uri in ["/", "/about", "/gallery", "/contact", "/admin"] {
            let resp = app.clone().oneshot(get(uri)).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_admin_shell_has_management_sections() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(&dir));

        let resp = app.oneshot(get("/admin")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        for id in [
            "admin-media-form",
            "admin-media",
            "admin-contacts",
            "admin-grant-form",
            "admin-grants",
            "admin-company-form",
            "admin-error",
        ] {
            assert!(html.contains(&format!("id=\"{id}\"")), "{id}");
        }
        assert!(!html.contains("data-api-key"));
        assert!(!html.contains("Google account"));
    }

    #[tokio::test]
    async fn test_contact_form_shows_field_errors() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(state.clone());

        let resp = app
            .oneshot(post_form("name=&email=a%40b.co&phone=1&service_type=other&message=hi"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let html = body_text(resp).await;
        assert!(html.contains("Name is required"));
        assert!(html.contains("Please accept the terms"));
        // Entered values are kept
        assert!(html.contains("a@b.co"));
        assert!(state.store.list_contacts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_contact_form_success() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(state.clone());

        let resp = app
            .oneshot(post_form(
                "name=Jas&email=jas%40example.com&phone=123&service_type=collaboration\
                 &message=Hello&accept_terms=on",
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains("Thank you"));

        let stored = state.store.list_contacts().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert!(!stored[0].is_read);
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(&dir));

        let resp = app.oneshot(get("/no-such-page")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(body_text(resp).await.contains("Page not found"));
    }
}
