//! Vault record data model.
//!
//! A record has two identity fields (`id`, `ownerId`) that are never
//! encrypted and a fixed set of free-text fields that are always encrypted at
//! rest. The free-text fields are generic over their value type so the
//! plaintext and stored views cannot be mixed up:
//!
//! - [`PlainFields`] (`RecordFields<String>`) is what clients send and receive.
//! - [`SealedFields`] (`RecordFields<Sealed>`) is what the store holds.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{OwnerId, RecordId};

/// Encryptable free-text fields of a vault record.
///
/// This list is the single source of truth for which properties get sealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordField {
    Title,
    Username,
    Password,
    Url,
    Notes,
}

impl RecordField {
    /// All encryptable fields, in storage column order.
    pub const ALL: [RecordField; 5] = [
        RecordField::Title,
        RecordField::Username,
        RecordField::Password,
        RecordField::Url,
        RecordField::Notes,
    ];

    /// Wire and column name of the field.
    pub fn name(self) -> &'static str {
        match self {
            RecordField::Title => "title",
            RecordField::Username => "username",
            RecordField::Password => "password",
            RecordField::Url => "url",
            RecordField::Notes => "notes",
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A ciphertext string produced by the field cipher.
///
/// Only the crypto layer constructs these from fresh encryption; the store
/// hands them back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sealed(String);

impl Sealed {
    /// Wrap a stored value.
    ///
    /// The value is not validated: legacy rows may hold plaintext here.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// The free-text fields of a record. Absent fields are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFields<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<T>,
}

/// Plaintext field values.
pub type PlainFields = RecordFields<String>;

/// Encrypted field values as persisted.
pub type SealedFields = RecordFields<Sealed>;

impl<T> Default for RecordFields<T> {
    fn default() -> Self {
        Self {
            title: None,
            username: None,
            password: None,
            url: None,
            notes: None,
        }
    }
}

impl<T> RecordFields<T> {
    fn slot(&self, field: RecordField) -> &Option<T> {
        match field {
            RecordField::Title => &self.title,
            RecordField::Username => &self.username,
            RecordField::Password => &self.password,
            RecordField::Url => &self.url,
            RecordField::Notes => &self.notes,
        }
    }

    fn slot_mut(&mut self, field: RecordField) -> &mut Option<T> {
        match field {
            RecordField::Title => &mut self.title,
            RecordField::Username => &mut self.username,
            RecordField::Password => &mut self.password,
            RecordField::Url => &mut self.url,
            RecordField::Notes => &mut self.notes,
        }
    }

    /// Get the value of a field, if present.
    pub fn get(&self, field: RecordField) -> Option<&T> {
        self.slot(field).as_ref()
    }

    /// Set (or clear) a field.
    pub fn set(&mut self, field: RecordField, value: Option<T>) {
        *self.slot_mut(field) = value;
    }

    /// Builder-style setter.
    pub fn with(mut self, field: RecordField, value: impl Into<T>) -> Self {
        self.set(field, Some(value.into()));
        self
    }

    /// True when no field is present.
    pub fn is_empty(&self) -> bool {
        RecordField::ALL.iter().all(|f| self.slot(*f).is_none())
    }

    /// Iterate over the present fields.
    pub fn present(&self) -> impl Iterator<Item = (RecordField, &T)> + '_ {
        RecordField::ALL
            .into_iter()
            .filter_map(move |f| self.get(f).map(|v| (f, v)))
    }

    /// Transform every present field, leaving absent fields absent.
    pub fn map<U>(self, mut f: impl FnMut(RecordField, T) -> U) -> RecordFields<U> {
        let mut out = RecordFields::default();
        let mut this = self;
        for field in RecordField::ALL {
            if let Some(value) = this.slot_mut(field).take() {
                out.set(field, Some(f(field, value)));
            }
        }
        out
    }

    /// Fallible [`map`](Self::map). Stops at the first error.
    pub fn try_map<U, E>(
        self,
        mut f: impl FnMut(RecordField, T) -> Result<U, E>,
    ) -> Result<RecordFields<U>, E> {
        let mut out = RecordFields::default();
        let mut this = self;
        for field in RecordField::ALL {
            if let Some(value) = this.slot_mut(field).take() {
                out.set(field, Some(f(field, value)?));
            }
        }
        Ok(out)
    }

    /// Overlay the present fields of `patch` onto `self`.
    ///
    /// Fields absent from `patch` keep their current value.
    pub fn apply(&mut self, patch: RecordFields<T>) {
        let mut patch = patch;
        for field in RecordField::ALL {
            if let Some(value) = patch.slot_mut(field).take() {
                self.set(field, Some(value));
            }
        }
    }
}

/// A record as held by the store: identity in the clear, fields sealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub id: RecordId,
    pub owner_id: OwnerId,
    #[serde(flatten)]
    pub fields: SealedFields,
}

/// A record as returned to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultRecord {
    pub id: RecordId,
    pub owner_id: OwnerId,
    #[serde(flatten)]
    pub fields: PlainFields,
    /// Fields whose stored value could not be decrypted and is returned raw.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub undecrypted: Vec<RecordField>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_fields_not_serialized() {
        let fields = PlainFields::default()
            .with(RecordField::Title, "bank")
            .with(RecordField::Notes, "");
        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json, serde_json::json!({"title": "bank", "notes": ""}));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let fields: PlainFields =
            serde_json::from_str(r#"{"title":"t","ownerId":"evil","extra":"x"}"#).unwrap();
        assert_eq!(fields.get(RecordField::Title).map(String::as_str), Some("t"));
        assert_eq!(fields.present().count(), 1);
    }

    #[test]
    fn test_map_preserves_absence() {
        let fields = PlainFields::default().with(RecordField::Url, "https://x");
        let mapped = fields.map(|f, v| format!("{}={}", f, v));
        assert_eq!(mapped.url.as_deref(), Some("url=https://x"));
        assert!(mapped.title.is_none());
        assert!(mapped.password.is_none());
    }

    #[test]
    fn test_try_map_stops_on_error() {
        let fields = PlainFields::default()
            .with(RecordField::Title, "a")
            .with(RecordField::Password, "b");
        let result: Result<RecordFields<String>, &str> = fields.try_map(|f, v| {
            if f == RecordField::Password {
                Err("boom")
            } else {
                Ok(v)
            }
        });
        assert_eq!(result, Err("boom"));
    }

    #[test]
    fn test_apply_keeps_untouched_fields() {
        let mut current = PlainFields::default()
            .with(RecordField::Title, "old")
            .with(RecordField::Username, "alice");
        current.apply(PlainFields::default().with(RecordField::Title, "new"));
        assert_eq!(current.title.as_deref(), Some("new"));
        assert_eq!(current.username.as_deref(), Some("alice"));
    }

    #[test]
    fn test_stored_record_wire_shape() {
        let record = StoredRecord {
            id: RecordId::new("r1").unwrap(),
            owner_id: OwnerId::new("u1").unwrap(),
            fields: SealedFields::default().with(RecordField::Title, Sealed::from_stored("ct")),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "r1", "ownerId": "u1", "title": "ct"})
        );
    }

    #[test]
    fn test_vault_record_hides_empty_undecrypted() {
        let record = VaultRecord {
            id: RecordId::new("r1").unwrap(),
            owner_id: OwnerId::new("u1").unwrap(),
            fields: PlainFields::default(),
            undecrypted: Vec::new(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("undecrypted").is_none());
    }
}
