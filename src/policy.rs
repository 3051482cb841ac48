//! Strength policy management
//!
//! Holds the tunable constants of the strength rule and loads them from an
//! optional JSON file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming the policy file.
pub const POLICY_PATH_ENV: &str = "PWD_VAULT_POLICY_PATH";

const DEFAULT_MIN_LENGTH: usize = 8;
const DEFAULT_SPECIALS: &str = "!@#$%^&*()";
const DEFAULT_GENERATED_LENGTH: usize = 12;
// lowercase, uppercase, digit, special
const MIN_GENERATED_LENGTH: usize = 4;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Policy file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Failed to read policy file: {0}")]
    Read(#[from] std::io::Error),
    #[error("Policy file is empty")]
    Empty,
    #[error("Failed to parse policy file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid policy: {0}")]
    Invalid(String),
}

/// Constants used by the classifier and the secret generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrengthPolicy {
    /// Minimum number of characters for Medium or Strong.
    pub min_length: usize,
    /// Characters that count as "special".
    pub specials: String,
    /// Length of secrets produced by the generator.
    pub generated_length: usize,
}

impl Default for StrengthPolicy {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            specials: DEFAULT_SPECIALS.to_string(),
            generated_length: DEFAULT_GENERATED_LENGTH,
        }
    }
}

impl StrengthPolicy {
    /// Returns true if `c` belongs to the special character set.
    pub fn is_special(&self, c: char) -> bool {
        self.specials.contains(c)
    }

    /// Checks the policy for values the classifier cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_length == 0 {
            return Err(ConfigError::Invalid("min_length must be positive".to_string()));
        }
        if self.specials.is_empty() {
            return Err(ConfigError::Invalid("specials must not be empty".to_string()));
        }
        if let Some(c) = self.specials.chars().find(|c| c.is_alphanumeric() || c.is_whitespace()) {
            return Err(ConfigError::Invalid(format!(
                "specials must not contain letters, digits or whitespace (found {:?})",
                c
            )));
        }
        if self.generated_length < MIN_GENERATED_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "generated_length must be at least {} to cover every character class",
                MIN_GENERATED_LENGTH
            )));
        }
        if self.generated_length < self.min_length {
            return Err(ConfigError::Invalid(format!(
                "generated_length {} is below min_length {}",
                self.generated_length, self.min_length
            )));
        }
        Ok(())
    }
}

/// Returns the policy file path, if one is configured.
///
/// Only the environment variable `PWD_VAULT_POLICY_PATH` is consulted.
pub fn get_policy_path() -> Option<PathBuf> {
    std::env::var(POLICY_PATH_ENV).ok().map(PathBuf::from)
}

/// Loads the strength policy.
///
/// Reads the file named by `PWD_VAULT_POLICY_PATH`; when the variable is not
/// set the default policy is returned.
///
/// # Errors
///
/// Same as [`load_policy_from_path`].
pub fn load_policy() -> Result<StrengthPolicy, ConfigError> {
    match get_policy_path() {
        Some(path) => load_policy_from_path(path),
        None => Ok(StrengthPolicy::default()),
    }
}

/// Loads the strength policy from a specific JSON file.
///
/// Fields missing from the file keep their default values.
///
/// # Errors
///
/// Returns error if:
/// - File does not exist
/// - File cannot be read
/// - File is empty
/// - File is not valid JSON for a policy
/// - The resulting policy fails [`StrengthPolicy::validate`]
///
/// # Example
///
/// ```rust,ignore
/// let policy = pwd_vault::load_policy_from_path("/etc/myapp/policy.json")?;
/// ```
pub fn load_policy_from_path<P: AsRef<Path>>(path: P) -> Result<StrengthPolicy, ConfigError> {
    let path = path.as_ref();

    if !path.exists() {
        #[cfg(feature = "tracing")]
        tracing::error!("Policy load FAILED: FileNotFound {:?}", path);
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;

    if content.trim().is_empty() {
        #[cfg(feature = "tracing")]
        tracing::error!("Policy load FAILED: Empty file {:?}", path);
        return Err(ConfigError::Empty);
    }

    let policy: StrengthPolicy = serde_json::from_str(&content)?;
    policy.validate()?;

    #[cfg(feature = "tracing")]
    tracing::info!(
        "Policy loaded from {:?}: min_length={}, generated_length={}",
        path,
        policy.min_length,
        policy.generated_length
    );

    Ok(policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper to safely set env var in tests
    fn set_env(key: &str, value: &str) {
        // SAFETY: env-mutating tests are serialized
        unsafe { std::env::set_var(key, value); }
    }

    /// Helper to safely remove env var in tests
    fn remove_env(key: &str) {
        // SAFETY: env-mutating tests are serialized
        unsafe { std::env::remove_var(key); }
    }

    fn policy_file(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        write!(temp_file, "{}", content).expect("Failed to write");
        temp_file
    }

    #[test]
    fn test_default_policy() {
        let policy = StrengthPolicy::default();
        assert_eq!(policy.min_length, 8);
        assert_eq!(policy.specials, "!@#$%^&*()");
        assert_eq!(policy.generated_length, 12);
        assert!(policy.validate().is_ok());
        assert!(policy.is_special('!'));
        assert!(!policy.is_special('-'));
    }

    #[test]
    #[serial]
    fn test_get_policy_path_unset() {
        remove_env(POLICY_PATH_ENV);
        assert_eq!(get_policy_path(), None);
    }

    #[test]
    #[serial]
    fn test_get_policy_path_from_env() {
        set_env(POLICY_PATH_ENV, "/custom/path/policy.json");
        assert_eq!(get_policy_path(), Some(PathBuf::from("/custom/path/policy.json")));
        remove_env(POLICY_PATH_ENV);
    }

    #[test]
    #[serial]
    fn test_load_policy_defaults_without_env() {
        remove_env(POLICY_PATH_ENV);
        let policy = load_policy().expect("defaults should load");
        assert_eq!(policy, StrengthPolicy::default());
    }

    #[test]
    #[serial]
    fn test_load_policy_from_env() {
        let temp_file = policy_file(r#"{ "min_length": 10, "generated_length": 16 }"#);
        set_env(POLICY_PATH_ENV, temp_file.path().to_str().unwrap());

        let policy = load_policy().expect("policy should load");
        assert_eq!(policy.min_length, 10);
        assert_eq!(policy.generated_length, 16);
        assert_eq!(policy.specials, "!@#$%^&*()");

        remove_env(POLICY_PATH_ENV);
    }

    #[test]
    fn test_load_policy_file_not_found() {
        let result = load_policy_from_path("/nonexistent/path/policy.json");
        match result {
            Err(ConfigError::FileNotFound(_)) => {}
            _ => panic!("Expected FileNotFound error"),
        }
    }

    #[test]
    fn test_load_policy_empty_file() {
        let temp_file = policy_file("   \n");
        let result = load_policy_from_path(temp_file.path());
        assert!(matches!(result, Err(ConfigError::Empty)));
    }

    #[test]
    fn test_load_policy_malformed_json() {
        let temp_file = policy_file("min_length = 8");
        let result = load_policy_from_path(temp_file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_policy_rejects_invalid_values() {
        let zero = policy_file(r#"{ "min_length": 0 }"#);
        assert!(matches!(load_policy_from_path(zero.path()), Err(ConfigError::Invalid(_))));

        let letters = policy_file(r#"{ "specials": "!a" }"#);
        assert!(matches!(load_policy_from_path(letters.path()), Err(ConfigError::Invalid(_))));

        let short = policy_file(r#"{ "min_length": 12, "generated_length": 10 }"#);
        assert!(matches!(load_policy_from_path(short.path()), Err(ConfigError::Invalid(_))));

        let tiny = policy_file(r#"{ "min_length": 2, "generated_length": 3 }"#);
        assert!(matches!(load_policy_from_path(tiny.path()), Err(ConfigError::Invalid(_))));
    }
}
