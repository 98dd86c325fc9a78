use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::{handlers, pages};
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_body_size;

    let mut router = Router::new()
        // Pages
        .route("/", get(pages::home))
        .route("/about", get(pages::about))
        .route("/gallery", get(pages::gallery))
        .route("/contact", get(pages::contact).post(pages::submit_contact))
        .route("/admin", get(pages::admin))
        // Public API
        .route("/api/media", get(handlers::list_media))
        .route("/api/company", get(handlers::get_company))
        .route("/api/contacts", post(handlers::submit_contact))
        .route("/api/session", get(handlers::session))
        // Admin API
        .route("/api/admin/media", post(handlers::create_media))
        .route(
            "/api/admin/media/:id",
            put(handlers::update_media).delete(handlers::delete_media),
        )
        .route("/api/admin/contacts", get(handlers::list_contacts))
        .route("/api/admin/contacts/:id", delete(handlers::delete_contact))
        .route("/api/admin/contacts/:id/read", put(handlers::mark_contact))
        .route("/api/admin/company", put(handlers::upsert_company))
        .route("/api/admin/grants", get(handlers::list_grants))
        .route(
            "/api/admin/grants/:uid",
            put(handlers::grant_admin).delete(handlers::revoke_admin),
        )
        .route("/api/admin/stats", get(handlers::stats))
        // Internal
        .route("/_internal/health", get(handlers::health))
        .nest_service("/assets", ServeDir::new(&state.config.server.assets_dir));

    // Test-only routes
    if state.config.test_mode {
        tracing::warn!("Test mode enabled, purge route is available.");
        router = router.route("/_internal/purge", delete(handlers::purge));
    }

    router
        .fallback(pages::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
