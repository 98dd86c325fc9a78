use super::db::{Database, DatabaseError};
use super::models::AdminGrant;
use super::tables::ADMIN_GRANTS;

impl Database {
    // ========================================================================
    // Admin allow-list operations
    // ========================================================================

    /// Store a grant keyed by its uid (insert or overwrite)
    pub fn put_admin_grant(&self, grant: &AdminGrant) -> Result<(), DatabaseError> {
        debug_assert!(!grant.uid.is_empty(), "grant uid must not be empty");
        self.put_record(ADMIN_GRANTS, &grant.uid, grant)
    }

    pub fn get_admin_grant(&self, uid: &str) -> Result<Option<AdminGrant>, DatabaseError> {
        self.get_record(ADMIN_GRANTS, uid)
    }

    pub fn list_admin_grants(&self) -> Result<Vec<AdminGrant>, DatabaseError> {
        self.all_records(ADMIN_GRANTS)
    }

    pub fn delete_admin_grant(&self, uid: &str) -> Result<bool, DatabaseError> {
        self.remove_record(ADMIN_GRANTS, uid)
    }

    /// An identity is an admin iff a grant exists for it with the flag set
    pub fn is_admin(&self, uid: &str) -> Result<bool, DatabaseError> {
        Ok(self
            .get_admin_grant(uid)?
            .is_some_and(|grant| grant.authorizes()))
    }
}
