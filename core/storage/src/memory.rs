//! In-memory store for testing and development.

use async_trait::async_trait;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::store::{AccountStore, RecordStore};
use passvault_common::{
    Account, Error, OwnerId, RecordId, Result, SealedFields, StoredRecord,
};

#[derive(Default)]
struct Tables {
    /// Insertion ordered.
    records: Vec<StoredRecord>,
    accounts: Vec<Account>,
}

/// In-memory store.
///
/// All data is held in process memory and lost on drop.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| Error::Storage("Memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| Error::Storage("Memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn create(&self, owner: &OwnerId, fields: SealedFields) -> Result<StoredRecord> {
        let record = StoredRecord {
            id: RecordId::generate(),
            owner_id: owner.clone(),
            fields,
        };
        self.write()?.records.push(record.clone());
        Ok(record)
    }

    async fn find_all_by_owner(&self, owner: &OwnerId) -> Result<Vec<StoredRecord>> {
        Ok(self
            .read()?
            .records
            .iter()
            .filter(|r| &r.owner_id == owner)
            .cloned()
            .collect())
    }

    async fn update_by_id_and_owner(
        &self,
        id: &RecordId,
        owner: &OwnerId,
        patch: SealedFields,
    ) -> Result<Option<StoredRecord>> {
        let mut tables = self.write()?;
        let record = tables
            .records
            .iter_mut()
            .find(|r| &r.id == id && &r.owner_id == owner);

        Ok(record.map(|record| {
            record.fields.apply(patch);
            record.clone()
        }))
    }

    async fn delete_by_id_and_owner(&self, id: &RecordId, owner: &OwnerId) -> Result<bool> {
        let mut tables = self.write()?;
        let before = tables.records.len();
        tables
            .records
            .retain(|r| !(&r.id == id && &r.owner_id == owner));
        Ok(tables.records.len() < before)
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_account(&self, account: Account) -> Result<Account> {
        let mut tables = self.write()?;
        if tables.accounts.iter().any(|a| a.email == account.email) {
            return Err(Error::AlreadyExists(format!(
                "Account already exists: {}",
                account.email
            )));
        }
        tables.accounts.push(account.clone());
        Ok(account)
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        Ok(self
            .read()?
            .accounts
            .iter()
            .find(|a| a.email == email)
            .cloned())
    }
}
