mod firestore;
mod local;

pub use firestore::{FirestoreConfig, FirestoreStore};
pub use local::LocalStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::storage::models::{
    AdminGrant, CompanyDetails, CompanyProfile, ContactSubmission, MediaItem, MediaPatch,
    NewContactSubmission, NewMediaItem,
};
use crate::storage::{DatabaseError, PurgeStats};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Backend error: {0}")]
    Backend(String),
    #[error("Malformed document: {0}")]
    Malformed(String),
    #[error("Operation not supported by this backend: {0}")]
    Unsupported(&'static str),
    #[error("Invalid document id: {0:?}")]
    InvalidId(String),
}

/// Abstraction over the document database backing the site.
///
/// Each call is a single round trip; failures are returned as-is and never retried.
/// Missing records are `Ok(None)` / `Ok(false)`, not errors.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    // Media items
    async fn list_media(&self) -> Result<Vec<MediaItem>, StoreError>;
    async fn get_media(&self, id: &str) -> Result<Option<MediaItem>, StoreError>;
    async fn create_media(&self, item: NewMediaItem) -> Result<MediaItem, StoreError>;
    async fn update_media(
        &self,
        id: &str,
        patch: &MediaPatch,
    ) -> Result<Option<MediaItem>, StoreError>;
    async fn delete_media(&self, id: &str) -> Result<bool, StoreError>;
    async fn count_media(&self) -> Result<u64, StoreError>;

    // Contact submissions
    async fn list_contacts(&self) -> Result<Vec<ContactSubmission>, StoreError>;
    async fn create_contact(
        &self,
        submission: NewContactSubmission,
    ) -> Result<ContactSubmission, StoreError>;
    async fn set_contact_read(
        &self,
        id: &str,
        is_read: bool,
    ) -> Result<Option<ContactSubmission>, StoreError>;
    async fn delete_contact(&self, id: &str) -> Result<bool, StoreError>;
    /// Number of submissions, or of unread ones only.
    async fn count_contacts(&self, unread_only: bool) -> Result<u64, StoreError>;

    // Company profile
    async fn get_company(&self) -> Result<Option<CompanyProfile>, StoreError>;
    async fn upsert_company(&self, details: &CompanyDetails) -> Result<CompanyProfile, StoreError>;

    // Admin allow-list
    async fn list_admin_grants(&self) -> Result<Vec<AdminGrant>, StoreError>;
    async fn get_admin_grant(&self, uid: &str) -> Result<Option<AdminGrant>, StoreError>;
    async fn put_admin_grant(&self, grant: &AdminGrant) -> Result<(), StoreError>;
    async fn delete_admin_grant(&self, uid: &str) -> Result<bool, StoreError>;

    /// Remove every record. Only reachable in test mode.
    async fn purge_all(&self) -> Result<PurgeStats, StoreError>;

    /// An identity is an admin iff a grant exists for it with the flag set.
    async fn is_admin(&self, uid: &str) -> Result<bool, StoreError> {
        Ok(self
            .get_admin_grant(uid)
            .await?
            .is_some_and(|grant| grant.authorizes()))
    }
}

/// Fresh document id for client-generated keys.
pub(crate) fn new_document_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
