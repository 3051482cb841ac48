//! Length check - secret minimum length.

use secrecy::{ExposeSecret, SecretString};

use super::CheckResult;
use crate::classifier::{Context, Weakness};
use crate::policy::StrengthPolicy;

/// Checks if the secret meets the policy's minimum length.
///
/// Length is counted in characters, not bytes.
pub fn length_check(secret: &SecretString, _context: &Context<'_>, policy: &StrengthPolicy) -> CheckResult {
    if secret.expose_secret().chars().count() < policy.min_length {
        return vec![Weakness::TooShort { min: policy.min_length }];
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(pwd: &str) -> CheckResult {
        let pwd = SecretString::new(pwd.to_string().into());
        length_check(&pwd, &Context::default(), &StrengthPolicy::default())
    }

    #[test]
    fn test_length_check_too_short() {
        assert_eq!(check("Short1!"), vec![Weakness::TooShort { min: 8 }]);
    }

    #[test]
    fn test_length_check_exactly_minimum() {
        assert!(check("12345678").is_empty());
    }

    #[test]
    fn test_length_check_counts_chars_not_bytes() {
        // 7 chars, 14 bytes
        assert_eq!(check("ñññññññ"), vec![Weakness::TooShort { min: 8 }]);
        assert!(check("ññññññññ").is_empty());
    }

    #[test]
    fn test_length_check_uses_policy() {
        let pwd = SecretString::new("LongEnough1!".to_string().into());
        let policy = StrengthPolicy { min_length: 16, ..StrengthPolicy::default() };
        assert_eq!(
            length_check(&pwd, &Context::default(), &policy),
            vec![Weakness::TooShort { min: 16 }]
        );
    }
}
