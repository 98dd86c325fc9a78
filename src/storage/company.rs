use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::{CompanyDetails, CompanyProfile};
use super::tables::COMPANY_PROFILES;

impl Database {
    // ========================================================================
    // Company profile operations
    // ========================================================================

    /// The canonical profile: the first row in the table, if any
    pub fn get_company(&self) -> Result<Option<CompanyProfile>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(COMPANY_PROFILES)?;

        let profile = match table.first()? {
            Some((_, data)) => Some(rmp_serde::from_slice(data.value())?),
            None => None,
        };
        Ok(profile)
    }

    /// Overwrite the canonical profile, creating it under `new_id` if none exists.
    /// Read and write happen in one transaction so a second profile is never created.
    pub fn upsert_company(
        &self,
        details: &CompanyDetails,
        new_id: &str,
    ) -> Result<CompanyProfile, DatabaseError> {
        let write_txn = self.begin_write()?;

        let existing_id: Option<String> = {
            let table = write_txn.open_table(COMPANY_PROFILES)?;
            let first = table.first()?;
            let result = first.map(|(k, _)| k.value().to_string());
            result
        };

        let profile = CompanyProfile {
            id: existing_id.unwrap_or_else(|| new_id.to_string()),
            details: details.clone(),
        };

        {
            let mut table = write_txn.open_table(COMPANY_PROFILES)?;
            let data = rmp_serde::to_vec_named(&profile)?;
            table.insert(profile.id.as_str(), data.as_slice())?;
        }

        write_txn.commit()?;
        Ok(profile)
    }
}
