use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studio_site::{
    api,
    config::{Config, IdentityBackend, StoreBackend},
    document_store::{DocumentStore, FirestoreStore, LocalStore},
    identity::{FirebaseIdentity, IdentityProvider, StaticIdentity},
    seed,
    storage::Database,
    AppState,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    match log_format.to_lowercase().as_str() {
        "gcp" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_stackdriver::layer())
                .init();
        }
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_list(false),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    info!(version = env!("CARGO_PKG_VERSION"), "studio-site starting");

    let config = Config::load()?;

    // Document store backend
    let store: Arc<dyn DocumentStore> = match (&config.store.backend, &config.store.firestore) {
        (StoreBackend::Firestore, Some(firestore)) => {
            let store = FirestoreStore::new(firestore)?;
            info!(
                project = %firestore.project_id,
                emulator = firestore.emulator_host.is_some(),
                "Using Firestore document store"
            );
            Arc::new(store)
        }
        (StoreBackend::Firestore, None) => {
            anyhow::bail!("FIRESTORE_PROJECT_ID is required when STORE_BACKEND=firestore")
        }
        (StoreBackend::Local, _) => {
            let db = Database::open(&config.store.data_dir)?;
            info!("Database opened at: {}", config.store.data_dir);
            Arc::new(LocalStore::new(db))
        }
    };

    // Identity provider
    let identity: Arc<dyn IdentityProvider> = match config.identity.backend {
        IdentityBackend::Firebase => {
            let api_key = config
                .identity
                .firebase_api_key
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("FIREBASE_API_KEY is required"))?;
            let provider =
                FirebaseIdentity::new(api_key, config.identity.firebase_emulator_host.as_deref())?;
            info!("Verifying sign-ins with Firebase Authentication");
            Arc::new(provider)
        }
        IdentityBackend::Static => {
            let provider = StaticIdentity::parse(&config.identity.static_identities)
                .map_err(|e| anyhow::anyhow!("Invalid STATIC_IDENTITIES: {e}"))?;
            info!(tokens = provider.len(), "Using static identity tokens");
            Arc::new(provider)
        }
    };

    if config.seed_defaults {
        match seed::initialize_defaults(store.as_ref(), config.bootstrap_admin.as_ref()).await {
            Ok(report) => info!(
                company_created = report.company_created,
                media_created = report.media_created,
                admin_bootstrapped = report.admin_bootstrapped,
                "Default content checked"
            ),
            Err(e) => tracing::error!(error = %e, "Failed to initialize default content"),
        }
    }

    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        identity,
    });

    // Build and start the HTTP server
    let app = api::create_router(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
    info!("Listening on: {}", config.server.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
