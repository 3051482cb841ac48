//! Character variety check - lowercase, uppercase, digits, special chars.

use secrecy::{ExposeSecret, SecretString};

use super::CheckResult;
use crate::classifier::{Context, Weakness};
use crate::policy::StrengthPolicy;

/// Checks which character classes the secret is missing.
///
/// Letters are classified with Unicode case, digits are ASCII `0-9` and
/// specials come from the policy.
pub fn character_variety_check(
    secret: &SecretString,
    _context: &Context<'_>,
    policy: &StrengthPolicy,
) -> CheckResult {
    let pwd = secret.expose_secret();
    let has_lower = pwd.chars().any(|c| c.is_lowercase());
    let has_upper = pwd.chars().any(|c| c.is_uppercase());
    let has_digit = pwd.chars().any(|c| c.is_ascii_digit());
    let has_special = pwd.chars().any(|c| policy.is_special(c));

    [
        (has_lower, Weakness::MissingLowercase),
        (has_upper, Weakness::MissingUppercase),
        (has_digit, Weakness::MissingDigit),
        (has_special, Weakness::MissingSpecial),
    ]
    .into_iter()
    .filter_map(|(present, weakness)| (!present).then_some(weakness))
    .collect()
}
