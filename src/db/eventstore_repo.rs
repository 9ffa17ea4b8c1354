use std::path::Path;

use rusqlite::{params, Connection};

use super::persistence::{Persistence, StoredDocument};
use super::schema;
use crate::error::{SocratesError, SocratesResult};

fn stored_version(version: i64) -> SocratesResult<u64> {
    u64::try_from(version).map_err(|_| SocratesError::OutOfRange {
        field: "version".into(),
        value: version,
    })
}

fn column_version(version: u64) -> SocratesResult<i64> {
    i64::try_from(version).map_err(|_| SocratesError::OutOfRange {
        field: "version".into(),
        value: i64::MAX,
    })
}

/// SQLite-backed document store, one row per document id.
pub struct SqlitePersistence {
    conn: Connection,
}

impl SqlitePersistence {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens (or creates) the database file and makes sure the schema exists.
    pub fn open(db_path: &Path) -> SocratesResult<Self> {
        let conn = Connection::open(db_path)?;
        schema::initialize(&conn)?;
        Ok(Self::new(conn))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn current_version(&self, id: &str) -> SocratesResult<Option<u64>> {
        let result = self.conn.query_row(
            "SELECT version FROM eventstore WHERE id = ?1",
            params![id],
            |row| row.get::<_, i64>(0),
        );
        match result {
            Ok(version) => Ok(Some(stored_version(version)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl Persistence for SqlitePersistence {
    fn get_by_id(&self, id: &str) -> SocratesResult<Option<StoredDocument>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, version, state FROM eventstore WHERE id = ?1")?;

        let result = stmt.query_row(params![id], |row| {
            let id: String = row.get(0)?;
            let version: i64 = row.get(1)?;
            let state: String = row.get(2)?;
            Ok((id, version, state))
        });

        match result {
            Ok((id, version, state)) => Ok(Some(StoredDocument {
                id,
                version: stored_version(version)?,
                state: serde_json::from_str(&state)?,
            })),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save_with_version(&self, document: &StoredDocument) -> SocratesResult<u64> {
        let state = serde_json::to_string(&document.state)?;
        let expected = column_version(document.version)?;
        let next = expected
            .checked_add(1)
            .ok_or_else(|| SocratesError::OutOfRange {
                field: "version".into(),
                value: expected,
            })?;

        let changed = if document.version == 0 {
            self.conn.execute(
                "INSERT OR IGNORE INTO eventstore (id, version, state) VALUES (?1, ?2, ?3)",
                params![document.id, next, state],
            )?
        } else {
            self.conn.execute(
                "UPDATE eventstore SET version = ?1, state = ?2, updated_at = datetime('now')
                 WHERE id = ?3 AND version = ?4",
                params![next, state, document.id, expected],
            )?
        };

        if changed == 1 {
            return stored_version(next);
        }

        Err(SocratesError::VersionConflict {
            id: document.id.clone(),
            expected: document.version,
            actual: self.current_version(&document.id)?.unwrap_or(0),
        })
    }
}
