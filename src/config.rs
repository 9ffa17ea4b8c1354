use std::env;
use std::path::PathBuf;

use crate::error::{SocratesError, SocratesResult};
use crate::validation;

const DEFAULT_DB_PATH: &str = ".data/socrates.db";
const DEFAULT_SAVE_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    /// How often a registration is attempted before a version conflict is
    /// reported to the caller.
    pub save_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            save_attempts: DEFAULT_SAVE_ATTEMPTS,
        }
    }
}

impl Config {
    /// Reads `SOCRATES_DB` and `SOCRATES_SAVE_ATTEMPTS`, falling back to defaults.
    pub fn from_env() -> SocratesResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> SocratesResult<Self> {
        let mut config = Self::default();
        if let Some(path) = lookup("SOCRATES_DB").filter(|p| !p.trim().is_empty()) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(raw) = lookup("SOCRATES_SAVE_ATTEMPTS") {
            let parsed: i64 = raw.trim().parse().map_err(|_| {
                SocratesError::Other(format!(
                    "SOCRATES_SAVE_ATTEMPTS is not a number: {}",
                    raw
                ))
            })?;
            config.save_attempts = validation::positive(parsed, "SOCRATES_SAVE_ATTEMPTS")?;
        }
        Ok(config)
    }
}
