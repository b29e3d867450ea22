//! Store trait definitions.

use async_trait::async_trait;

use passvault_common::{Account, OwnerId, RecordId, Result, SealedFields, StoredRecord};

/// Persistence boundary for vault records.
///
/// Every operation is scoped by owner. Implementations must never return or
/// modify a record whose owner differs from the one passed in.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Get the backend name (e.g., "memory", "sqlite").
    fn name(&self) -> &str;

    /// Persist a new record.
    ///
    /// # Postconditions
    /// - The record gets a fresh id assigned by the store
    /// - `owner` is stamped on the record and never changes afterwards
    ///
    /// # Errors
    /// - Backend failure
    async fn create(&self, owner: &OwnerId, fields: SealedFields) -> Result<StoredRecord>;

    /// List every record belonging to `owner`, oldest first.
    async fn find_all_by_owner(&self, owner: &OwnerId) -> Result<Vec<StoredRecord>>;

    /// Overwrite the fields present in `patch` on one record.
    ///
    /// # Postconditions
    /// - Fields absent from `patch` keep their stored value
    /// - The change is applied atomically
    ///
    /// # Returns
    /// - `Ok(None)` if no record matches both `id` and `owner`
    async fn update_by_id_and_owner(
        &self,
        id: &RecordId,
        owner: &OwnerId,
        patch: SealedFields,
    ) -> Result<Option<StoredRecord>>;

    /// Hard-delete one record.
    ///
    /// # Returns
    /// - `Ok(false)` if no record matches both `id` and `owner`
    async fn delete_by_id_and_owner(&self, id: &RecordId, owner: &OwnerId) -> Result<bool>;
}

/// Persistence for login accounts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account.
    ///
    /// # Errors
    /// - `Error::AlreadyExists` if the email is already registered
    async fn create_account(&self, account: Account) -> Result<Account>;

    /// Find an account by exact email.
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>>;
}
