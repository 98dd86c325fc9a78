use super::db::{Database, DatabaseError};
use super::models::ContactSubmission;
use super::tables::CONTACT_SUBMISSIONS;

impl Database {
    // ========================================================================
    // Contact submission operations
    // ========================================================================

    pub fn put_contact(&self, submission: &ContactSubmission) -> Result<(), DatabaseError> {
        debug_assert!(!submission.id.is_empty(), "submission id must not be empty");
        self.put_record(CONTACT_SUBMISSIONS, &submission.id, submission)
    }

    pub fn get_contact(&self, id: &str) -> Result<Option<ContactSubmission>, DatabaseError> {
        self.get_record(CONTACT_SUBMISSIONS, id)
    }

    /// All submissions, newest first
    pub fn list_contacts(&self) -> Result<Vec<ContactSubmission>, DatabaseError> {
        let mut submissions: Vec<ContactSubmission> = self.all_records(CONTACT_SUBMISSIONS)?;
        submissions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(submissions)
    }

    /// Set the read flag. Returns the updated submission, or `None` if it does not exist.
    pub fn set_contact_read(
        &self,
        id: &str,
        is_read: bool,
    ) -> Result<Option<ContactSubmission>, DatabaseError> {
        self.modify_record(CONTACT_SUBMISSIONS, id, |s: &mut ContactSubmission| {
            s.is_read = is_read
        })
    }

    pub fn delete_contact(&self, id: &str) -> Result<bool, DatabaseError> {
        self.remove_record(CONTACT_SUBMISSIONS, id)
    }

    pub fn count_contacts(&self, unread_only: bool) -> Result<u64, DatabaseError> {
        if !unread_only {
            return self.count_records(CONTACT_SUBMISSIONS);
        }
        let submissions: Vec<ContactSubmission> = self.all_records(CONTACT_SUBMISSIONS)?;
        Ok(submissions.iter().filter(|s| !s.is_read).count() as u64)
    }
}
