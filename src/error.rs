//! Vault error types.

use thiserror::Error;

use crate::record::RecordId;
#[cfg(feature = "async")]
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("No authenticated user")]
    NotAuthenticated,
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Credential not found: {0}")]
    NotFound(RecordId),
    #[error("Failed to generate a strong secret after {attempts} attempts")]
    Generation { attempts: usize },
    #[cfg(feature = "async")]
    #[error(transparent)]
    Store(#[from] StoreError),
}
