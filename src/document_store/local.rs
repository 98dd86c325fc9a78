use async_trait::async_trait;
use chrono::Utc;

use super::{new_document_id, DocumentStore, StoreError};
use crate::storage::models::{
    AdminGrant, CompanyDetails, CompanyProfile, ContactSubmission, MediaItem, MediaPatch,
    NewContactSubmission, NewMediaItem,
};
use crate::storage::{Database, PurgeStats};

/// Embedded redb document store for development, testing, and single-node deploys.
pub struct LocalStore {
    db: Database,
}

impl LocalStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DocumentStore for LocalStore {
    async fn list_media(&self) -> Result<Vec<MediaItem>, StoreError> {
        Ok(self.db.list_media()?)
    }

    async fn get_media(&self, id: &str) -> Result<Option<MediaItem>, StoreError> {
        Ok(self.db.get_media(id)?)
    }

    async fn create_media(&self, item: NewMediaItem) -> Result<MediaItem, StoreError> {
        let record = item.into_record(new_document_id(), Utc::now());
        self.db.put_media(&record)?;
        Ok(record)
    }

    async fn update_media(
        &self,
        id: &str,
        patch: &MediaPatch,
    ) -> Result<Option<MediaItem>, StoreError> {
        Ok(self.db.update_media(id, patch)?)
    }

    async fn delete_media(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.db.delete_media(id)?)
    }

    async fn count_media(&self) -> Result<u64, StoreError> {
        Ok(self.db.count_media()?)
    }

    async fn list_contacts(&self) -> Result<Vec<ContactSubmission>, StoreError> {
        Ok(self.db.list_contacts()?)
    }

    async fn create_contact(
        &self,
        submission: NewContactSubmission,
    ) -> Result<ContactSubmission, StoreError> {
        let record = submission.into_record(new_document_id(), Utc::now());
        self.db.put_contact(&record)?;
        Ok(record)
    }

    async fn set_contact_read(
        &self,
        id: &str,
        is_read: bool,
    ) -> Result<Option<ContactSubmission>, StoreError> {
        Ok(self.db.set_contact_read(id, is_read)?)
    }

    async fn delete_contact(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.db.delete_contact(id)?)
    }

    async fn count_contacts(&self, unread_only: bool) -> Result<u64, StoreError> {
        Ok(self.db.count_contacts(unread_only)?)
    }

    async fn get_company(&self) -> Result<Option<CompanyProfile>, StoreError> {
        Ok(self.db.get_company()?)
    }

    async fn upsert_company(&self, details: &CompanyDetails) -> Result<CompanyProfile, StoreError> {
        Ok(self.db.upsert_company(details, &new_document_id())?)
    }

    async fn list_admin_grants(&self) -> Result<Vec<AdminGrant>, StoreError> {
        Ok(self.db.list_admin_grants()?)
    }

    async fn get_admin_grant(&self, uid: &str) -> Result<Option<AdminGrant>, StoreError> {
        Ok(self.db.get_admin_grant(uid)?)
    }

    async fn put_admin_grant(&self, grant: &AdminGrant) -> Result<(), StoreError> {
        Ok(self.db.put_admin_grant(grant)?)
    }

    async fn delete_admin_grant(&self, uid: &str) -> Result<bool, StoreError> {
        Ok(self.db.delete_admin_grant(uid)?)
    }

    async fn purge_all(&self) -> Result<PurgeStats, StoreError> {
        Ok(self.db.purge_all()?)
    }

    async fn is_admin(&self, uid: &str) -> Result<bool, StoreError> {
        Ok(self.db.is_admin(uid)?)
    }
}
