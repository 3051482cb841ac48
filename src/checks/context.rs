//! Context check - secret must not leak the account identifier or label.

use secrecy::{ExposeSecret, SecretString};

use super::CheckResult;
use crate::classifier::{Context, Weakness};
use crate::policy::StrengthPolicy;

/// Checks the secret against the account identifier and label.
///
/// Comparison is a case-insensitive substring match using Unicode lowercase.
/// Blank context strings impose no constraint.
pub fn context_check(secret: &SecretString, context: &Context<'_>, _policy: &StrengthPolicy) -> CheckResult {
    let folded = secret.expose_secret().to_lowercase();

    [
        (context.account, Weakness::ContainsAccount),
        (context.label, Weakness::ContainsLabel),
    ]
    .into_iter()
    .filter_map(|(needle, weakness)| leaks(&folded, needle).then_some(weakness))
    .collect()
}

fn leaks(folded_secret: &str, needle: &str) -> bool {
    let needle = needle.trim();
    !needle.is_empty() && folded_secret.contains(&needle.to_lowercase())
}
