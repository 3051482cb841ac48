//! Credential vault core
//!
//! This library provides the password strength classifier shared by every
//! credential write path, a secret generator, and a vault over a pluggable
//! per-user document store with soft-delete and restore.
//!
//! # Features
//!
//! - `async` (default): Enables the document store, the in-memory backend and
//!   the vault, with change subscriptions and cancellable watches
//! - `tracing`: Enables logging via tracing crate
//!
//! # Environment Variables
//!
//! - `PWD_VAULT_POLICY_PATH`: Path to a JSON strength policy file
//!   (default: built-in policy)
//!
//! # Example
//!
//! ```rust
//! use pwd_vault::{classify, Tier};
//!
//! let verdict = classify("Abc12345!", "alice", "github");
//! assert_eq!(verdict.tier, Tier::Strong);
//!
//! let leaky = classify("Alice#2024", "alice", "github");
//! assert!(!leaky.is_strong);
//! ```
//!
//! ```rust,no_run
//! # #[cfg(feature = "async")]
//! # async fn demo() -> Result<(), pwd_vault::VaultError> {
//! use pwd_vault::{CredentialDraft, MemoryStore, StaticIdentity, UserId, Vault};
//!
//! let vault = Vault::new(MemoryStore::new(), StaticIdentity::signed_in(UserId::new("uid-1")));
//! let saved = vault.add(CredentialDraft::new("github", "alice", "hunter22")).await?;
//! for entry in vault.weak("").await? {
//!     println!("{} needs a better password", entry.credential.label());
//! }
//! vault.soft_delete(saved.id).await?;
//! vault.restore(saved.id).await?;
//! # Ok(())
//! # }
//! ```

// Internal modules
mod checks;
mod classifier;
mod error;
mod generator;
mod identity;
mod policy;
mod record;

#[cfg(feature = "async")]
pub mod store;
#[cfg(feature = "async")]
mod vault;

// Public API
pub use classifier::{
    classify, classify_secret, classify_secret_with, classify_with, try_classify, Classification, Context, Tier,
    Weakness,
};
pub use error::VaultError;
pub use generator::{
    alphabet, generate_secret, generate_secret_with, generate_strong_secret, generate_strong_secret_with, MAX_STRONG_ATTEMPTS,
};
pub use identity::{IdentityProvider, StaticIdentity};
pub use policy::{get_policy_path, load_policy, load_policy_from_path, ConfigError, StrengthPolicy, POLICY_PATH_ENV};
pub use record::{Credential, CredentialDraft, RecordId, UserId};

#[cfg(feature = "async")]
pub use store::{Collection, DocumentStore, MemoryStore, StoreError};
#[cfg(feature = "async")]
pub use vault::{Detail, EditOutcome, Entry, Saved, Vault};
