//! studio-site - Marketing site and content panel for a media production studio
//!
//! This crate serves the public pages and a small admin API with:
//! - Swappable document store backends (embedded redb, hosted Firestore)
//! - Identity verification against a hosted identity provider
//! - An admin allow-list stored as explicit grant records
//! - Server-rendered pages via askama and a JSend JSON API

pub mod api;
pub mod config;
pub mod document_store;
pub mod forms;
pub mod identity;
pub mod seed;
pub mod storage;
#[cfg(test)]
pub mod testutil;
pub mod video;

use std::sync::Arc;

use config::Config;
use document_store::DocumentStore;
use identity::IdentityProvider;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn DocumentStore>,
    pub identity: Arc<dyn IdentityProvider>,
}
