//! Credential vault - every read and write path over the document store.
//!
//! All writes classify through the shared classifier, so the stored
//! `is_strong` flag is computed the same way no matter which path wrote it.

use chrono::Utc;
use secrecy::SecretString;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::classifier::{Classification, Context};
use crate::error::VaultError;
use crate::generator::generate_strong_secret;
use crate::identity::IdentityProvider;
use crate::policy::{ConfigError, StrengthPolicy};
use crate::record::{Credential, CredentialDraft, RecordId, UserId};
use crate::store::{Collection, DocumentStore, StoreError};

/// A record together with its id.
#[derive(Debug, Clone)]
pub struct Entry {
    pub id: RecordId,
    pub credential: Credential,
}

/// Result of a successful `add`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Saved {
    pub id: RecordId,
    pub classification: Classification,
}

/// A record with its current classification, for display.
#[derive(Debug, Clone)]
pub struct Detail {
    pub id: RecordId,
    pub credential: Credential,
    pub classification: Classification,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The draft matched the stored record; nothing was written.
    Unchanged,
    Updated { classification: Classification },
}

pub struct Vault<S, I> {
    store: S,
    identity: I,
    policy: StrengthPolicy,
}

impl<S: DocumentStore, I: IdentityProvider> Vault<S, I> {
    pub fn new(store: S, identity: I) -> Self {
        Self {
            store,
            identity,
            policy: StrengthPolicy::default(),
        }
    }

    /// Builds a vault with a custom policy.
    ///
    /// # Errors
    ///
    /// `ConfigError::Invalid` if the policy fails [`StrengthPolicy::validate`].
    pub fn with_policy(store: S, identity: I, policy: StrengthPolicy) -> Result<Self, ConfigError> {
        policy.validate()?;
        Ok(Self { store, identity, policy })
    }

    pub fn policy(&self) -> &StrengthPolicy {
        &self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn identity(&self) -> &I {
        &self.identity
    }

    fn user(&self) -> Result<UserId, VaultError> {
        self.identity.current_user().ok_or(VaultError::NotAuthenticated)
    }

    /// Generates a strong secret for a new credential.
    pub fn suggest_secret(&self, account: &str, label: &str) -> Result<SecretString, VaultError> {
        generate_strong_secret(&self.policy, &Context::new(account, label))
    }

    /// Validates, classifies and stores a new credential.
    pub async fn add(&self, draft: CredentialDraft) -> Result<Saved, VaultError> {
        let user = self.user()?;
        let (credential, classification) = Credential::create(draft, &self.policy, Utc::now())?;
        let id = self.store.create(&user, Collection::Active, credential).await?;

        #[cfg(feature = "tracing")]
        tracing::info!("added credential {} ({})", id, classification.tier);

        Ok(Saved { id, classification })
    }

    pub async fn detail(&self, id: RecordId) -> Result<Detail, VaultError> {
        let user = self.user()?;
        let credential = self
            .store
            .get(&user, Collection::Active, id)
            .await?
            .ok_or(VaultError::NotFound(id))?;
        let classification = credential.classification(&self.policy);
        Ok(Detail {
            id,
            credential,
            classification,
        })
    }

    /// Applies an edit, recomputing the strength flag with the full rule.
    ///
    /// A draft identical to the stored record writes nothing.
    pub async fn edit(&self, id: RecordId, draft: CredentialDraft) -> Result<EditOutcome, VaultError> {
        let user = self.user()?;
        let mut credential = self
            .store
            .get(&user, Collection::Active, id)
            .await?
            .ok_or(VaultError::NotFound(id))?;

        if credential.matches_draft(&draft) {
            #[cfg(feature = "tracing")]
            tracing::debug!("edit of {} has no changes", id);
            return Ok(EditOutcome::Unchanged);
        }

        let classification = credential.revise(draft, &self.policy, Utc::now())?;
        self.store
            .replace(&user, Collection::Active, id, credential)
            .await
            .map_err(not_found)?;

        #[cfg(feature = "tracing")]
        tracing::info!("updated credential {} ({})", id, classification.tier);

        Ok(EditOutcome::Updated { classification })
    }

    /// Active records matching `search`, sorted by label.
    pub async fn list(&self, search: &str) -> Result<Vec<Entry>, VaultError> {
        let user = self.user()?;
        self.collect(&user, Collection::Active, |c| c.matches_search(search))
            .await
    }

    /// Active records not flagged strong, matching `search`, sorted by label.
    pub async fn weak(&self, search: &str) -> Result<Vec<Entry>, VaultError> {
        let user = self.user()?;
        self.weak_for(&user, search).await
    }

    async fn weak_for(&self, user: &UserId, search: &str) -> Result<Vec<Entry>, VaultError> {
        self.collect(user, Collection::Active, |c| !c.is_strong() && c.matches_search(search))
            .await
    }

    /// Soft-deleted records, sorted by label.
    pub async fn deleted(&self) -> Result<Vec<Entry>, VaultError> {
        let user = self.user()?;
        self.collect(&user, Collection::Deleted, |_| true).await
    }

    /// Moves a record to the deleted collection.
    pub async fn soft_delete(&self, id: RecordId) -> Result<(), VaultError> {
        self.move_record(id, Collection::Active, Collection::Deleted).await
    }

    /// Moves a soft-deleted record back to the active collection.
    pub async fn restore(&self, id: RecordId) -> Result<(), VaultError> {
        self.move_record(id, Collection::Deleted, Collection::Active).await
    }

    /// Permanently removes a soft-deleted record.
    pub async fn purge(&self, id: RecordId) -> Result<(), VaultError> {
        let user = self.user()?;
        self.store
            .delete(&user, Collection::Deleted, id)
            .await
            .map_err(not_found)?;

        #[cfg(feature = "tracing")]
        tracing::info!("purged credential {}", id);

        Ok(())
    }

    /// Rewrites every active record whose stored flag disagrees with the
    /// classifier. Returns how many were rewritten.
    pub async fn reclassify(&self) -> Result<usize, VaultError> {
        let user = self.user()?;
        let mut rewritten = 0;
        for (id, mut credential) in self.store.list(&user, Collection::Active).await? {
            if !credential.reclassify(&self.policy) {
                continue;
            }
            match self.store.replace(&user, Collection::Active, id, credential).await {
                Ok(()) => rewritten += 1,
                // deleted since the listing
                Err(StoreError::NotFound { .. }) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        #[cfg(feature = "tracing")]
        tracing::info!("reclassified {} credential(s)", rewritten);

        Ok(rewritten)
    }

    /// Sends the weak list now and again after every change to the active
    /// collection.
    ///
    /// Returns when `token` is cancelled, the receiver is dropped or the
    /// store closes its change feed.
    pub async fn watch_weak(
        &self,
        search: &str,
        token: CancellationToken,
        tx: mpsc::Sender<Vec<Entry>>,
    ) -> Result<(), VaultError> {
        let user = self.user()?;
        // subscribe before the first listing so no change falls in between
        let mut subscription = self.store.subscribe(&user, Collection::Active);

        #[cfg(feature = "tracing")]
        tracing::info!("weak list watch started");

        loop {
            if token.is_cancelled() {
                break;
            }

            let weak = self.weak_for(&user, search).await?;
            match token.run_until_cancelled(tx.send(weak)).await {
                Some(Ok(())) => {}
                Some(Err(_)) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("weak list receiver dropped");
                    break;
                }
                None => break,
            }

            match token.run_until_cancelled(subscription.changed()).await {
                Some(Some(_change)) => {}
                Some(None) | None => break,
            }
        }

        #[cfg(feature = "tracing")]
        tracing::info!("weak list watch stopped");

        Ok(())
    }

    async fn move_record(&self, id: RecordId, from: Collection, to: Collection) -> Result<(), VaultError> {
        let user = self.user()?;
        self.store.transfer(&user, from, to, id).await.map_err(not_found)?;

        #[cfg(feature = "tracing")]
        tracing::info!("moved credential {} from {} to {}", id, from, to);

        Ok(())
    }

    async fn collect<F>(&self, user: &UserId, collection: Collection, keep: F) -> Result<Vec<Entry>, VaultError>
    where
        F: Fn(&Credential) -> bool,
    {
        let mut entries: Vec<Entry> = self
            .store
            .list(user, collection)
            .await?
            .into_iter()
            .filter(|(_, credential)| keep(credential))
            .map(|(id, credential)| Entry { id, credential })
            .collect();
        entries.sort_by_cached_key(|e| {
            (
                e.credential.label().to_lowercase(),
                e.credential.account().to_lowercase(),
                e.id,
            )
        });
        Ok(entries)
    }
}

fn not_found(err: StoreError) -> VaultError {
    match err {
        StoreError::NotFound { id, .. } => VaultError::NotFound(id),
        other => VaultError::Store(other),
    }
}
