use super::db::{Database, DatabaseError};
use super::models::{MediaItem, MediaPatch};
use super::tables::MEDIA_ITEMS;

impl Database {
    // ========================================================================
    // Media item operations
    // ========================================================================

    /// Store a media item (insert or overwrite)
    pub fn put_media(&self, item: &MediaItem) -> Result<(), DatabaseError> {
        debug_assert!(!item.id.is_empty(), "media id must not be empty");
        self.put_record(MEDIA_ITEMS, &item.id, item)
    }

    pub fn get_media(&self, id: &str) -> Result<Option<MediaItem>, DatabaseError> {
        self.get_record(MEDIA_ITEMS, id)
    }

    /// All media items, newest first
    pub fn list_media(&self) -> Result<Vec<MediaItem>, DatabaseError> {
        let mut items: Vec<MediaItem> = self.all_records(MEDIA_ITEMS)?;
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    /// Apply a partial update. Returns the updated item, or `None` if it does not exist.
    pub fn update_media(
        &self,
        id: &str,
        patch: &MediaPatch,
    ) -> Result<Option<MediaItem>, DatabaseError> {
        self.modify_record(MEDIA_ITEMS, id, |item: &mut MediaItem| patch.apply(item))
    }

    pub fn delete_media(&self, id: &str) -> Result<bool, DatabaseError> {
        self.remove_record(MEDIA_ITEMS, id)
    }

    pub fn count_media(&self) -> Result<u64, DatabaseError> {
        self.count_records(MEDIA_ITEMS)
    }
}
