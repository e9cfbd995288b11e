use serde::{Deserialize, Serialize};

use super::super::domain::{ApplicationId, DocumentRef};
use super::domain::Application;

/// Versioned envelope around the aggregate so concurrent deciders race on a
/// compare-and-set instead of last-write-wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub application: Application,
    pub version: u64,
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    /// Compare-and-set: succeeds only when the stored version still matches
    /// `record.version`, then bumps it. The requirement mutation and the
    /// recomputed aggregate status land in the same call.
    fn update(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;
    /// Applications still awaiting a commission decision, oldest first.
    fn pending(&self, limit: usize) -> Result<Vec<ApplicationRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("version check failed: expected {expected}, found {found}")]
    StaleVersion { expected: u64, found: u64 },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Document storage collaborator. The engine hands bytes over once and keeps
/// only the returned reference.
pub trait DocumentStore: Send + Sync {
    fn store(&self, file_name: &str, content: &[u8]) -> Result<DocumentRef, StorageError>;
    fn fetch(&self, reference: &DocumentRef) -> Result<Vec<u8>, StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("document storage unavailable: {0}")]
    Unavailable(String),
    #[error("no document stored at '{0}'")]
    Missing(String),
}
