use thiserror::Error;

#[derive(Debug, Error)]
pub enum SocratesError {
    #[error("{field} cannot be blank")]
    BlankField { field: String },

    #[error("{field} must be positive")]
    NonPositive { field: String },

    #[error("{field} is out of range: {value}")]
    OutOfRange { field: String, value: i64 },

    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    #[error("{entity_type} already exists: {identifier}")]
    AlreadyExists {
        entity_type: String,
        identifier: String,
    },

    #[error("Conflicting versions for {id}: expected {expected}, found {actual}")]
    VersionConflict { id: String, expected: u64, actual: u64 },

    #[error("Unsupported snapshot schema version {found} (latest known: {supported})")]
    UnsupportedSchema { found: u32, supported: u32 },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl SocratesError {
    /// True for errors a caller may resolve by reloading and retrying.
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, SocratesError::VersionConflict { .. })
    }
}

pub type SocratesResult<T> = Result<T, SocratesError>;
