//! Credential records and the inputs that create or revise them.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::classifier::{classify_secret_with, Classification, Context};
use crate::error::VaultError;
use crate::policy::StrengthPolicy;

/// Opaque record identifier assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Identifier of the end-user account that owns records.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Form input for creating or editing a credential.
#[derive(Debug)]
pub struct CredentialDraft {
    pub label: String,
    pub account: String,
    pub secret: SecretString,
}

impl CredentialDraft {
    pub fn new(label: impl Into<String>, account: impl Into<String>, secret: impl Into<String>) -> Self {
        let secret: String = secret.into();
        Self {
            label: label.into(),
            account: account.into(),
            secret: SecretString::new(secret.into()),
        }
    }

    pub fn context(&self) -> Context<'_> {
        Context::new(&self.account, &self.label)
    }

    /// Every field is required.
    pub fn validate(&self) -> Result<(), VaultError> {
        let fields = [
            ("label", self.label.as_str()),
            ("account", self.account.as_str()),
            ("secret", self.secret.expose_secret()),
        ];
        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(VaultError::InvalidArgument(format!("{} is required", name))),
            None => Ok(()),
        }
    }
}

/// A stored credential.
///
/// `is_strong` is derived from the secret and context whenever the record is
/// written through [`Credential::create`], [`Credential::revise`] or
/// [`Credential::reclassify`]; it has no setter.
#[derive(Debug, Serialize, Deserialize)]
pub struct Credential {
    label: String,
    account: String,
    #[serde(with = "secret_serde")]
    secret: SecretString,
    is_strong: bool,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_modified: Option<DateTime<Utc>>,
}

impl Credential {
    /// Builds a new record from a validated draft.
    pub fn create(
        draft: CredentialDraft,
        policy: &StrengthPolicy,
        now: DateTime<Utc>,
    ) -> Result<(Self, Classification), VaultError> {
        draft.validate()?;
        let classification = classify_secret_with(policy, &draft.secret, &draft.context());
        let credential = Self {
            label: draft.label,
            account: draft.account,
            secret: draft.secret,
            is_strong: classification.is_strong,
            created_at: now,
            last_modified: None,
        };
        Ok((credential, classification))
    }

    /// Replaces the editable fields and recomputes the strength flag.
    pub fn revise(
        &mut self,
        draft: CredentialDraft,
        policy: &StrengthPolicy,
        now: DateTime<Utc>,
    ) -> Result<Classification, VaultError> {
        draft.validate()?;
        let classification = classify_secret_with(policy, &draft.secret, &draft.context());
        self.label = draft.label;
        self.account = draft.account;
        self.secret = draft.secret;
        self.is_strong = classification.is_strong;
        self.last_modified = Some(now);
        Ok(classification)
    }

    /// Recomputes the strength flag; returns true if it changed.
    pub fn reclassify(&mut self, policy: &StrengthPolicy) -> bool {
        let is_strong = self.classification(policy).is_strong;
        let changed = is_strong != self.is_strong;
        self.is_strong = is_strong;
        changed
    }

    /// Classifies the stored secret against the stored context.
    pub fn classification(&self, policy: &StrengthPolicy) -> Classification {
        classify_secret_with(policy, &self.secret, &Context::new(&self.account, &self.label))
    }

    /// True if the draft carries exactly the stored label, account and secret.
    pub fn matches_draft(&self, draft: &CredentialDraft) -> bool {
        self.label == draft.label
            && self.account == draft.account
            && self.secret.expose_secret() == draft.secret.expose_secret()
    }

    /// Case-insensitive substring match on label or account.
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.label.to_lowercase().contains(&query)
            || self.account.to_lowercase().contains(&query)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn secret(&self) -> &SecretString {
        &self.secret
    }

    pub fn is_strong(&self) -> bool {
        self.is_strong
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }
}

impl Clone for Credential {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            account: self.account.clone(),
            secret: SecretString::new(self.secret.expose_secret().to_owned().into()),
            is_strong: self.is_strong,
            created_at: self.created_at,
            last_modified: self.last_modified,
        }
    }
}

mod secret_serde {
    use secrecy::{ExposeSecret, SecretString};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(secret.expose_secret())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
        let secret = String::deserialize(deserializer)?;
        Ok(SecretString::new(secret.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Tier;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn create(label: &str, account: &str, secret: &str) -> (Credential, Classification) {
        Credential::create(CredentialDraft::new(label, account, secret), &StrengthPolicy::default(), at(1_000))
            .expect("valid draft")
    }

    #[test]
    fn test_create_sets_flag_from_full_rule() {
        let (credential, verdict) = create("github", "alice", "Abc12345!");
        assert!(credential.is_strong());
        assert_eq!(verdict.tier, Tier::Strong);
        assert_eq!(credential.created_at(), at(1_000));
        assert_eq!(credential.last_modified(), None);

        let (leaky, verdict) = create("github", "alice", "Alice#12345");
        assert!(!leaky.is_strong());
        assert_eq!(verdict.tier, Tier::Weak);
    }

    #[test]
    fn test_create_requires_all_fields() {
        for (label, account, secret, field) in [
            ("", "alice", "Abc12345!", "label"),
            ("github", "  ", "Abc12345!", "account"),
            ("github", "alice", "", "secret"),
        ] {
            let result = Credential::create(
                CredentialDraft::new(label, account, secret),
                &StrengthPolicy::default(),
                at(0),
            );
            match result {
                Err(VaultError::InvalidArgument(msg)) => assert!(msg.contains(field)),
                other => panic!("expected InvalidArgument for {}, got {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_revise_recomputes_flag_with_context() {
        let (mut credential, _) = create("github", "alice", "abcdefgh");
        assert!(!credential.is_strong());

        let verdict = credential
            .revise(CredentialDraft::new("github", "alice", "Zz9(Zz9(Zz9("), &StrengthPolicy::default(), at(2_000))
            .unwrap();
        assert!(verdict.is_strong);
        assert!(credential.is_strong());
        assert_eq!(credential.created_at(), at(1_000));
        assert_eq!(credential.last_modified(), Some(at(2_000)));

        // otherwise strong, but now contains the account
        let verdict = credential
            .revise(CredentialDraft::new("github", "zz9", "Zz9(Zz9(Zz9("), &StrengthPolicy::default(), at(3_000))
            .unwrap();
        assert!(!verdict.is_strong);
        assert!(!credential.is_strong());
    }

    #[test]
    fn test_reclassify_repairs_stale_flag() {
        let json = r#"{
            "label": "github",
            "account": "alice",
            "secret": "Alice#12345",
            "is_strong": true,
            "created_at": "2024-01-01T00:00:00Z"
        }"#;
        let mut credential: Credential = serde_json::from_str(json).unwrap();
        assert!(credential.is_strong());
        assert!(credential.reclassify(&StrengthPolicy::default()));
        assert!(!credential.is_strong());
        assert!(!credential.reclassify(&StrengthPolicy::default()));
    }

    #[test]
    fn test_document_shape() {
        let (credential, _) = create("github", "alice", "Abc12345!");
        let value = serde_json::to_value(&credential).unwrap();
        assert_eq!(value["label"], "github");
        assert_eq!(value["account"], "alice");
        assert_eq!(value["secret"], "Abc12345!");
        assert_eq!(value["is_strong"], true);
        assert!(value.get("created_at").is_some());
        assert!(value.get("last_modified").is_none());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let (credential, _) = create("github", "alice", "Abc12345!");
        assert!(!format!("{:?}", credential).contains("Abc12345!"));
    }

    #[test]
    fn test_matches_draft_and_search() {
        let (credential, _) = create("GitHub", "alice", "Abc12345!");
        assert!(credential.matches_draft(&CredentialDraft::new("GitHub", "alice", "Abc12345!")));
        assert!(!credential.matches_draft(&CredentialDraft::new("GitHub", "alice", "Abc12345?")));

        assert!(credential.matches_search(""));
        assert!(credential.matches_search("git"));
        assert!(credential.matches_search("ALI"));
        assert!(!credential.matches_search("gitlab"));
    }

    #[test]
    fn test_record_id_parse() {
        let id = RecordId::new();
        assert_eq!(id.to_string().parse::<RecordId>().unwrap(), id);
        assert!("not-a-uuid".parse::<RecordId>().is_err());
    }
}
