//! Record transformer: maps records between their plaintext and stored forms.
//!
//! Identity (`id`, `ownerId`) always passes through in the clear. Each present
//! text field is sealed or opened on its own, so one bad field never affects
//! its neighbours.

use std::sync::Arc;

use passvault_common::{PlainFields, Result, Sealed, SealedFields, StoredRecord, VaultRecord};
use passvault_crypto::FieldCipher;

/// What happened when a stored field value was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOutcome {
    /// Decrypted normally.
    Opened,
    /// Not an envelope at all: a value written before encryption existed.
    Legacy,
    /// Shaped like an envelope but failed to open (wrong key or corruption).
    Undecryptable,
}

/// Applies the field cipher across whole records.
#[derive(Debug, Clone)]
pub struct RecordTransformer {
    cipher: Arc<FieldCipher>,
}

impl RecordTransformer {
    pub fn new(cipher: Arc<FieldCipher>) -> Self {
        Self { cipher }
    }

    /// Seal every present field. Absent fields stay absent.
    ///
    /// This is the write path for new records and patches: the store
    /// assigns the id, so there is no whole record to convert yet.
    ///
    /// # Errors
    /// - Any field failing to seal fails the whole call
    pub fn seal_fields(&self, fields: PlainFields) -> Result<SealedFields> {
        fields.try_map(|_, value| self.cipher.seal(&value))
    }

    /// Convert a whole plaintext record, id and owner included, to its
    /// stored form. Used when re-sealing records that already exist, such
    /// as after [`from_storage`](Self::from_storage).
    ///
    /// `undecrypted` is ignored; every present field is sealed afresh.
    pub fn to_storage(&self, record: VaultRecord) -> Result<StoredRecord> {
        Ok(StoredRecord {
            id: record.id,
            owner_id: record.owner_id,
            fields: self.seal_fields(record.fields)?,
        })
    }

    /// Open a single stored value.
    ///
    /// Never fails: a value that cannot be opened is returned unchanged,
    /// along with the reason.
    pub fn open_field(&self, value: Sealed) -> (String, FieldOutcome) {
        if !FieldCipher::is_sealed(value.as_str()) {
            return (value.into_inner(), FieldOutcome::Legacy);
        }
        match self.cipher.open(value.as_str()) {
            Ok(plaintext) => (plaintext, FieldOutcome::Opened),
            Err(_) => (value.into_inner(), FieldOutcome::Undecryptable),
        }
    }

    /// Convert a stored record back to plaintext.
    ///
    /// # Postconditions
    /// - Identity is copied unchanged
    /// - Every field that could not be opened holds its stored value verbatim
    ///   and is listed in `undecrypted`
    pub fn from_storage(&self, record: StoredRecord) -> VaultRecord {
        let mut undecrypted = Vec::new();
        let fields = record.fields.map(|field, value| {
            let (text, outcome) = self.open_field(value);
            match outcome {
                FieldOutcome::Opened => {}
                FieldOutcome::Legacy => undecrypted.push(field),
                FieldOutcome::Undecryptable => {
                    tracing::warn!(
                        record = %record.id,
                        field = %field,
                        "Stored field failed to decrypt, returning raw value"
                    );
                    undecrypted.push(field);
                }
            }
            text
        });

        VaultRecord {
            id: record.id,
            owner_id: record.owner_id,
            fields,
            undecrypted,
        }
    }
}
