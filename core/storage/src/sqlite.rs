//! SQLite store.
//!
//! The connection is opened lazily on first use and cached for the lifetime
//! of the store. A failed open is not cached: the next call tries again.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::store::{AccountStore, RecordStore};
use passvault_common::{
    Account, Error, OwnerId, RecordField, RecordId, Result, Sealed, SealedFields, StoredRecord,
};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS vault_items (
        seq      INTEGER PRIMARY KEY AUTOINCREMENT,
        id       TEXT NOT NULL UNIQUE,
        owner_id TEXT NOT NULL,
        title    TEXT,
        username TEXT,
        password TEXT,
        url      TEXT,
        notes    TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_vault_items_owner ON vault_items (owner_id);
    CREATE TABLE IF NOT EXISTS accounts (
        id            TEXT PRIMARY KEY,
        email         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at    TEXT NOT NULL
    );
";

const RECORD_COLUMNS: &str = "id, owner_id, title, username, password, url, notes";

/// SQLite-backed store for records and accounts.
pub struct SqliteStore {
    path: PathBuf,
    conn: OnceCell<Arc<Mutex<Connection>>>,
}

impl SqliteStore {
    /// Create a store for the database file at `path`.
    ///
    /// Does not touch the filesystem; the database is opened (and created if
    /// missing) by the first operation.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            conn: OnceCell::new(),
        }
    }

    /// Database file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn connection(&self) -> Result<Arc<Mutex<Connection>>> {
        self.conn
            .get_or_try_init(|| async {
                let path = self.path.clone();
                let conn = tokio::task::spawn_blocking(move || open_database(&path))
                    .await
                    .map_err(|e| Error::Storage(format!("Database open task failed: {}", e)))??;
                info!(path = %self.path.display(), "SQLite store opened");
                Ok::<_, Error>(Arc::new(Mutex::new(conn)))
            })
            .await
            .cloned()
    }

    /// Run a blocking closure against the connection.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = self.connection().await?;
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| Error::Storage("Connection lock poisoned".to_string()))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| Error::Storage(format!("Storage task failed: {}", e)))?
    }
}

fn open_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path).map_err(storage_err)?;
    conn.execute_batch(SCHEMA).map_err(storage_err)?;
    Ok(conn)
}

fn storage_err(err: rusqlite::Error) -> Error {
    Error::Storage(err.to_string())
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

/// Column values of one `vault_items` row before validation.
struct RawRecord {
    id: String,
    owner_id: String,
    fields: [Option<String>; 5],
}

impl RawRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            fields: [row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?, row.get(6)?],
        })
    }

    fn into_record(self) -> Result<StoredRecord> {
        let mut fields = SealedFields::default();
        for (field, value) in RecordField::ALL.into_iter().zip(self.fields) {
            fields.set(field, value.map(Sealed::from_stored));
        }
        Ok(StoredRecord {
            id: RecordId::new(self.id)?,
            owner_id: OwnerId::new(self.owner_id)?,
            fields,
        })
    }
}

fn sealed_column(fields: &SealedFields, field: RecordField) -> Option<String> {
    fields.get(field).map(|s| s.as_str().to_string())
}

#[async_trait]
impl RecordStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn create(&self, owner: &OwnerId, fields: SealedFields) -> Result<StoredRecord> {
        let record = StoredRecord {
            id: RecordId::generate(),
            owner_id: owner.clone(),
            fields,
        };
        let row = record.clone();

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO vault_items (id, owner_id, title, username, password, url, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    row.id.as_str(),
                    row.owner_id.as_str(),
                    sealed_column(&row.fields, RecordField::Title),
                    sealed_column(&row.fields, RecordField::Username),
                    sealed_column(&row.fields, RecordField::Password),
                    sealed_column(&row.fields, RecordField::Url),
                    sealed_column(&row.fields, RecordField::Notes),
                ],
            )
            .map_err(storage_err)?;
            Ok(())
        })
        .await?;

        debug!(id = %record.id, "Record inserted");
        Ok(record)
    }

    async fn find_all_by_owner(&self, owner: &OwnerId) -> Result<Vec<StoredRecord>> {
        let owner = owner.clone();
        let raws = self
            .with_conn(move |conn| {
                let mut stmt = conn
                    .prepare(&format!(
                        "SELECT {} FROM vault_items WHERE owner_id = ?1 ORDER BY seq",
                        RECORD_COLUMNS
                    ))
                    .map_err(storage_err)?;
                let rows = stmt
                    .query_map(params![owner.as_str()], RawRecord::from_row)
                    .map_err(storage_err)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
                    .map_err(storage_err)
            })
            .await?;

        raws.into_iter().map(RawRecord::into_record).collect()
    }

    async fn update_by_id_and_owner(
        &self,
        id: &RecordId,
        owner: &OwnerId,
        patch: SealedFields,
    ) -> Result<Option<StoredRecord>> {
        let id = id.clone();
        let owner = owner.clone();

        // Absent patch fields bind NULL, which COALESCE turns into "keep".
        let raw = self
            .with_conn(move |conn| {
                conn.query_row(
                    &format!(
                        "UPDATE vault_items SET
                            title    = COALESCE(?3, title),
                            username = COALESCE(?4, username),
                            password = COALESCE(?5, password),
                            url      = COALESCE(?6, url),
                            notes    = COALESCE(?7, notes)
                         WHERE id = ?1 AND owner_id = ?2
                         RETURNING {}",
                        RECORD_COLUMNS
                    ),
                    params![
                        id.as_str(),
                        owner.as_str(),
                        sealed_column(&patch, RecordField::Title),
                        sealed_column(&patch, RecordField::Username),
                        sealed_column(&patch, RecordField::Password),
                        sealed_column(&patch, RecordField::Url),
                        sealed_column(&patch, RecordField::Notes),
                    ],
                    RawRecord::from_row,
                )
                .optional()
                .map_err(storage_err)
            })
            .await?;

        raw.map(RawRecord::into_record).transpose()
    }

    async fn delete_by_id_and_owner(&self, id: &RecordId, owner: &OwnerId) -> Result<bool> {
        let id = id.clone();
        let owner = owner.clone();
        let removed = self
            .with_conn(move |conn| {
                conn.execute(
                    "DELETE FROM vault_items WHERE id = ?1 AND owner_id = ?2",
                    params![id.as_str(), owner.as_str()],
                )
                .map_err(storage_err)
            })
            .await?;
        Ok(removed > 0)
    }
}

#[async_trait]
impl AccountStore for SqliteStore {
    async fn create_account(&self, account: Account) -> Result<Account> {
        let row = account.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO accounts (id, email, password_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    row.id.as_str(),
                    row.email,
                    row.password_hash,
                    row.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    Error::AlreadyExists(format!("Account already exists: {}", row.email))
                } else {
                    storage_err(e)
                }
            })?;
            Ok(())
        })
        .await?;
        Ok(account)
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let email = email.to_string();
        let raw = self
            .with_conn(move |conn| {
                conn.query_row(
                    "SELECT id, email, password_hash, created_at FROM accounts WHERE email = ?1",
                    params![email],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                        ))
                    },
                )
                .optional()
                .map_err(storage_err)
            })
            .await?;

        raw.map(|(id, email, password_hash, created_at)| {
            let created_at = DateTime::parse_from_rfc3339(&created_at)
                .map_err(|e| Error::Storage(format!("Invalid account timestamp: {}", e)))?
                .with_timezone(&Utc);
            Ok(Account {
                id: OwnerId::new(id)?,
                email,
                password_hash,
                created_at,
            })
        })
        .transpose()
    }
}
