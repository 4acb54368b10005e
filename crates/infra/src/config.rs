//! Configuration loading and representation.
//!
//! Read from the process environment:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `KONVEKSI_MAX_COMMIT_ATTEMPTS` | `5` | read-validate-commit attempts before a concurrency failure is surfaced |
//! | `USE_PERSISTENT_STORES` | `false` | use Postgres instead of the in-memory store |
//! | `DATABASE_URL` | none | required when `USE_PERSISTENT_STORES=true` |

use thiserror::Error;

pub const DEFAULT_MAX_COMMIT_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    InMemory,
    Postgres { database_url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryConfig {
    pub max_commit_attempts: u32,
    pub backend: StoreBackend,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            max_commit_attempts: DEFAULT_MAX_COMMIT_ATTEMPTS,
            backend: StoreBackend::InMemory,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be {expected} (got {value:?})")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("{0} must be set when USE_PERSISTENT_STORES=true")]
    Missing(&'static str),
}

impl InventoryConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup (tests pass a map here).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let max_commit_attempts = match lookup("KONVEKSI_MAX_COMMIT_ATTEMPTS") {
            None => DEFAULT_MAX_COMMIT_ATTEMPTS,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "KONVEKSI_MAX_COMMIT_ATTEMPTS",
                        expected: "a positive integer",
                        value: raw,
                    });
                }
            },
        };

        let use_persistent = match lookup("USE_PERSISTENT_STORES") {
            None => false,
            Some(raw) => raw.trim().parse::<bool>().map_err(|_| ConfigError::Invalid {
                var: "USE_PERSISTENT_STORES",
                expected: "true or false",
                value: raw.clone(),
            })?,
        };

        let backend = if use_persistent {
            let database_url = lookup("DATABASE_URL")
                .filter(|url| !url.trim().is_empty())
                .ok_or(ConfigError::Missing("DATABASE_URL"))?;
            StoreBackend::Postgres { database_url }
        } else {
            StoreBackend::InMemory
        };

        Ok(Self {
            max_commit_attempts,
            backend,
        })
    }
}
