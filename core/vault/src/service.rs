//! Vault service: the authenticated record operations.
//!
//! Every operation authenticates first. The owner used for storage comes
//! from the verified credential only, so a caller can never read, change or
//! remove another owner's records.

use std::sync::Arc;

use crate::gate::AccessGate;
use crate::transform::RecordTransformer;
use passvault_common::{Error, OwnerId, PlainFields, RecordId, Result, StoredRecord, VaultRecord};
use passvault_storage::RecordStore;

/// Record operations on behalf of credential holders.
#[derive(Clone)]
pub struct VaultService {
    gate: Arc<AccessGate>,
    transformer: RecordTransformer,
    store: Arc<dyn RecordStore>,
}

impl VaultService {
    pub fn new(
        gate: Arc<AccessGate>,
        transformer: RecordTransformer,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            gate,
            transformer,
            store,
        }
    }

    /// Check a credential without touching any record.
    pub fn authorize(&self, authorization: Option<&str>) -> Result<OwnerId> {
        self.gate.authenticate(authorization)
    }

    /// Save a new record for the caller.
    ///
    /// # Postconditions
    /// - The stored record belongs to the authenticated owner
    /// - Every present field is persisted sealed
    ///
    /// # Errors
    /// - `Error::Unauthorized` before any field is sealed
    /// - Store failures
    pub async fn create(
        &self,
        authorization: Option<&str>,
        fields: PlainFields,
    ) -> Result<StoredRecord> {
        let owner = self.gate.authenticate(authorization)?;
        let sealed = self.transformer.seal_fields(fields)?;
        let record = self.store.create(&owner, sealed).await?;

        tracing::info!(owner = %owner, record = %record.id, "Vault record created");
        Ok(record)
    }

    /// List the caller's records, decrypted.
    ///
    /// Fields that cannot be decrypted come back raw and are listed in
    /// each record's `undecrypted`.
    pub async fn list(&self, authorization: Option<&str>) -> Result<Vec<VaultRecord>> {
        let owner = self.gate.authenticate(authorization)?;
        let stored = self.store.find_all_by_owner(&owner).await?;

        tracing::debug!(owner = %owner, count = stored.len(), "Vault records listed");
        Ok(stored
            .into_iter()
            .map(|record| self.transformer.from_storage(record))
            .collect())
    }

    /// Replace the fields present in `patch` on one of the caller's records.
    ///
    /// Absent fields keep their current value. Returns the updated record,
    /// decrypted.
    ///
    /// # Errors
    /// - `Error::Unauthorized`
    /// - `Error::NotFound` if the record does not exist or belongs to
    ///   someone else
    pub async fn update(
        &self,
        authorization: Option<&str>,
        id: &RecordId,
        patch: PlainFields,
    ) -> Result<VaultRecord> {
        let owner = self.gate.authenticate(authorization)?;
        let sealed = self.transformer.seal_fields(patch)?;
        let updated = self
            .store
            .update_by_id_and_owner(id, &owner, sealed)
            .await?
            .ok_or_else(|| not_found(id))?;

        tracing::info!(owner = %owner, record = %id, "Vault record updated");
        Ok(self.transformer.from_storage(updated))
    }

    /// Permanently remove one of the caller's records.
    ///
    /// # Errors
    /// - `Error::Unauthorized`
    /// - `Error::NotFound` if nothing was removed
    pub async fn delete(&self, authorization: Option<&str>, id: &RecordId) -> Result<()> {
        let owner = self.gate.authenticate(authorization)?;
        if !self.store.delete_by_id_and_owner(id, &owner).await? {
            return Err(not_found(id));
        }

        tracing::info!(owner = %owner, record = %id, "Vault record deleted");
        Ok(())
    }
}

fn not_found(id: &RecordId) -> Error {
    Error::NotFound(format!("Vault record not found: {}", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use passvault_common::{RecordField, Sealed, SealedFields};
    use passvault_crypto::{FieldCipher, RootKey};
    use passvault_storage::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Fixture {
        service: VaultService,
        gate: Arc<AccessGate>,
        store: MemoryStore,
    }

    fn fixture() -> Fixture {
        let gate = Arc::new(AccessGate::new(b"jwt", Duration::from_secs(600)));
        let cipher = Arc::new(FieldCipher::new(RootKey::from_bytes([3u8; 32])));
        let store = MemoryStore::new();
        let service = VaultService::new(
            gate.clone(),
            RecordTransformer::new(cipher),
            Arc::new(store.clone()),
        );
        Fixture {
            service,
            gate,
            store,
        }
    }

    fn bearer(gate: &AccessGate, user: &str) -> String {
        format!("Bearer {}", gate.issue(&OwnerId::new(user).unwrap()).unwrap())
    }

    fn login_fields() -> PlainFields {
        PlainFields::default()
            .with(RecordField::Title, "bank")
            .with(RecordField::Username, "alice")
            .with(RecordField::Password, "hunter2")
    }

    #[tokio::test]
    async fn test_create_then_list_is_owner_scoped() {
        let f = fixture();
        let u1 = bearer(&f.gate, "u1");
        let u2 = bearer(&f.gate, "u2");

        let stored = f.service.create(Some(&u1), login_fields()).await.unwrap();
        assert_eq!(stored.owner_id.as_str(), "u1");
        assert_ne!(stored.fields.password.as_ref().unwrap().as_str(), "hunter2");

        let listed = f.service.list(Some(&u1)).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, stored.id);
        assert_eq!(listed[0].fields, login_fields());
        assert!(listed[0].undecrypted.is_empty());

        assert!(f.service.list(Some(&u2)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unauthenticated_calls_never_reach_store() {
        struct Untouchable(AtomicUsize);

        #[async_trait]
        impl RecordStore for Untouchable {
            fn name(&self) -> &str {
                "untouchable"
            }
            async fn create(&self, _: &OwnerId, _: SealedFields) -> Result<StoredRecord> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Err(Error::Storage("touched".into()))
            }
            async fn find_all_by_owner(&self, _: &OwnerId) -> Result<Vec<StoredRecord>> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Err(Error::Storage("touched".into()))
            }
            async fn update_by_id_and_owner(
                &self,
                _: &RecordId,
                _: &OwnerId,
                _: SealedFields,
            ) -> Result<Option<StoredRecord>> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Err(Error::Storage("touched".into()))
            }
            async fn delete_by_id_and_owner(&self, _: &RecordId, _: &OwnerId) -> Result<bool> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Err(Error::Storage("touched".into()))
            }
        }

        let gate = Arc::new(AccessGate::new(b"jwt", Duration::from_secs(600)));
        let cipher = Arc::new(FieldCipher::new(RootKey::from_bytes([3u8; 32])));
        let store = Arc::new(Untouchable(AtomicUsize::new(0)));
        let service = VaultService::new(gate, RecordTransformer::new(cipher), store.clone());
        let id = RecordId::new("r1").unwrap();

        for auth in [None, Some("Bearer garbage")] {
            assert!(matches!(
                service.create(auth, login_fields()).await,
                Err(Error::Unauthorized)
            ));
            assert!(matches!(service.list(auth).await, Err(Error::Unauthorized)));
            assert!(matches!(
                service.update(auth, &id, login_fields()).await,
                Err(Error::Unauthorized)
            ));
            assert!(matches!(service.delete(auth, &id).await, Err(Error::Unauthorized)));
        }
        assert_eq!(store.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_partial_update_leaves_other_fields() {
        let f = fixture();
        let u1 = bearer(&f.gate, "u1");
        let stored = f.service.create(Some(&u1), login_fields()).await.unwrap();

        let patch = PlainFields::default().with(RecordField::Password, "correct horse");
        let updated = f.service.update(Some(&u1), &stored.id, patch).await.unwrap();

        assert_eq!(updated.id, stored.id);
        assert_eq!(updated.fields.password.as_deref(), Some("correct horse"));
        assert_eq!(updated.fields.title.as_deref(), Some("bank"));
        assert_eq!(updated.fields.username.as_deref(), Some("alice"));
        assert!(updated.fields.url.is_none());

        let listed = f.service.list(Some(&u1)).await.unwrap();
        assert_eq!(listed, vec![updated]);
    }

    #[tokio::test]
    async fn test_cross_owner_update_and_delete_not_found() {
        let f = fixture();
        let u1 = bearer(&f.gate, "u1");
        let u2 = bearer(&f.gate, "u2");
        let stored = f.service.create(Some(&u1), login_fields()).await.unwrap();

        let patch = PlainFields::default().with(RecordField::Password, "stolen");
        assert!(matches!(
            f.service.update(Some(&u2), &stored.id, patch).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            f.service.delete(Some(&u2), &stored.id).await,
            Err(Error::NotFound(_))
        ));

        let listed = f.service.list(Some(&u1)).await.unwrap();
        assert_eq!(listed[0].fields.password.as_deref(), Some("hunter2"));
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let f = fixture();
        let u1 = bearer(&f.gate, "u1");
        let stored = f.service.create(Some(&u1), login_fields()).await.unwrap();

        f.service.delete(Some(&u1), &stored.id).await.unwrap();
        assert!(matches!(
            f.service.delete(Some(&u1), &stored.id).await,
            Err(Error::NotFound(_))
        ));
        assert!(f.service.list(Some(&u1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_legacy_rows_listed_raw() {
        let f = fixture();
        let owner = OwnerId::new("u1").unwrap();
        let legacy = SealedFields::default()
            .with(RecordField::Title, Sealed::from_stored("old title"))
            .with(RecordField::Password, Sealed::from_stored("U2FsdGVkX1+notours"));
        f.store.create(&owner, legacy).await.unwrap();

        let listed = f.service.list(Some(&bearer(&f.gate, "u1"))).await.unwrap();
        assert_eq!(listed[0].fields.title.as_deref(), Some("old title"));
        assert_eq!(
            listed[0].fields.password.as_deref(),
            Some("U2FsdGVkX1+notours")
        );
        assert_eq!(
            listed[0].undecrypted,
            vec![RecordField::Title, RecordField::Password]
        );
    }
}
