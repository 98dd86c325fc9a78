use redb::{
    Database as RedbDatabase, ReadTransaction, ReadableTable, ReadableTableMetadata,
    TableDefinition, WriteTransaction,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use super::tables::*;

/// Every collection table shares this shape: string key -> msgpack record.
pub(super) type RecordTable = TableDefinition<'static, &'static str, &'static [u8]>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Commit error: {0}")]
    Commit(Box<redb::CommitError>),
    #[error("Database error: {0}")]
    Redb(Box<redb::Error>),
    #[error("Database error: {0}")]
    RedbDatabase(Box<redb::DatabaseError>),
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] rmp_serde::decode::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),
    #[error("Storage error: {0}")]
    Storage(Box<redb::StorageError>),
    #[error("Table error: {0}")]
    Table(Box<redb::TableError>),
    #[error("Transaction error: {0}")]
    Transaction(Box<redb::TransactionError>),
}

impl From<redb::CommitError> for DatabaseError {
    fn from(e: redb::CommitError) -> Self {
        DatabaseError::Commit(Box::new(e))
    }
}

impl From<redb::DatabaseError> for DatabaseError {
    fn from(e: redb::DatabaseError) -> Self {
        DatabaseError::RedbDatabase(Box::new(e))
    }
}

impl From<redb::Error> for DatabaseError {
    fn from(e: redb::Error) -> Self {
        DatabaseError::Redb(Box::new(e))
    }
}

impl From<redb::StorageError> for DatabaseError {
    fn from(e: redb::StorageError) -> Self {
        DatabaseError::Storage(Box::new(e))
    }
}

impl From<redb::TableError> for DatabaseError {
    fn from(e: redb::TableError) -> Self {
        DatabaseError::Table(Box::new(e))
    }
}

impl From<redb::TransactionError> for DatabaseError {
    fn from(e: redb::TransactionError) -> Self {
        DatabaseError::Transaction(Box::new(e))
    }
}

pub struct Database {
    db: Arc<RedbDatabase>,
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
        }
    }
}

/// Statistics from a purge operation
#[derive(Debug, Default)]
pub struct PurgeStats {
    pub media_items: u64,
    pub contact_submissions: u64,
    pub company_profiles: u64,
    pub admin_grants: u64,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, DatabaseError> {
        std::fs::create_dir_all(data_dir.as_ref())?;
        let db_path = data_dir.as_ref().join("studio-site.redb");
        let db = Arc::new(RedbDatabase::create(db_path)?);

        // Initialize application tables
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(MEDIA_ITEMS)?;
            let _ = write_txn.open_table(CONTACT_SUBMISSIONS)?;
            let _ = write_txn.open_table(COMPANY_PROFILES)?;
            let _ = write_txn.open_table(ADMIN_GRANTS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Begin a read transaction
    pub fn begin_read(&self) -> Result<ReadTransaction, DatabaseError> {
        Ok(self.db.begin_read()?)
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> Result<WriteTransaction, DatabaseError> {
        Ok(self.db.begin_write()?)
    }

    // ========================================================================
    // Record helpers shared by the collection modules
    // ========================================================================

    pub(super) fn put_record<T: Serialize>(
        &self,
        table: RecordTable,
        key: &str,
        record: &T,
    ) -> Result<(), DatabaseError> {
        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(table)?;
            let data = rmp_serde::to_vec_named(record)?;
            table.insert(key, data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub(super) fn get_record<T: DeserializeOwned>(
        &self,
        table: RecordTable,
        key: &str,
    ) -> Result<Option<T>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(table)?;

        match table.get(key)? {
            Some(data) => Ok(Some(rmp_serde::from_slice(data.value())?)),
            None => Ok(None),
        }
    }

    /// All records of a table in key order.
    pub(super) fn all_records<T: DeserializeOwned>(
        &self,
        table: RecordTable,
    ) -> Result<Vec<T>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(table)?;

        let mut records = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            records.push(rmp_serde::from_slice(value.value())?);
        }

        Ok(records)
    }

    /// Read-modify-write a single record inside one transaction.
    /// Returns the stored result, or `None` if the key does not exist.
    pub(super) fn modify_record<T, F>(
        &self,
        table: RecordTable,
        key: &str,
        modify: F,
    ) -> Result<Option<T>, DatabaseError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut T),
    {
        let write_txn = self.begin_write()?;

        let existing: Option<T> = {
            let table = write_txn.open_table(table)?;
            let result = match table.get(key)? {
                Some(data) => Some(rmp_serde::from_slice(data.value())?),
                None => None,
            };
            result
        };

        let updated = match existing {
            Some(mut record) => {
                modify(&mut record);
                let serialized = rmp_serde::to_vec_named(&record)?;
                let mut table = write_txn.open_table(table)?;
                table.insert(key, serialized.as_slice())?;
                Some(record)
            }
            None => None,
        };

        write_txn.commit()?;
        Ok(updated)
    }

    pub(super) fn remove_record(&self, table: RecordTable, key: &str) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(table)?;
            let removed = table.remove(key)?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(removed)
    }

    pub(super) fn count_records(&self, table: RecordTable) -> Result<u64, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(table)?;
        Ok(table.len()?)
    }

    // ========================================================================
    // Admin operations
    // ========================================================================

    /// Purge all data - for testing only
    pub fn purge_all(&self) -> Result<PurgeStats, DatabaseError> {
        let write_txn = self.begin_write()?;
        let stats = PurgeStats {
            media_items: clear_table(&write_txn, MEDIA_ITEMS)?,
            contact_submissions: clear_table(&write_txn, CONTACT_SUBMISSIONS)?,
            company_profiles: clear_table(&write_txn, COMPANY_PROFILES)?,
            admin_grants: clear_table(&write_txn, ADMIN_GRANTS)?,
        };
        write_txn.commit()?;
        Ok(stats)
    }
}

fn clear_table(write_txn: &WriteTransaction, table: RecordTable) -> Result<u64, DatabaseError> {
    let keys: Vec<String> = {
        let table = write_txn.open_table(table)?;
        let keys = table
            .iter()?
            .map(|r| r.map(|(k, _)| k.value().to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        keys
    };

    let mut table = write_txn.open_table(table)?;
    for key in &keys {
        table.remove(key.as_str())?;
    }
    Ok(keys.len() as u64)
}
