//! Password strength classifier - the one rule every write path applies.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::checks::{context_check, character_variety_check, length_check, CheckResult};
use crate::error::VaultError;
use crate::policy::StrengthPolicy;

/// Categorical strength verdict, ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Weak,
    Medium,
    Strong,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Weak => "weak",
            Tier::Medium => "medium",
            Tier::Strong => "strong",
        };
        f.write_str(name)
    }
}

/// A single reason a secret falls short of Strong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Weakness {
    TooShort { min: usize },
    MissingLowercase,
    MissingUppercase,
    MissingDigit,
    MissingSpecial,
    ContainsAccount,
    ContainsLabel,
}

impl fmt::Display for Weakness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Weakness::TooShort { min } => write!(f, "Password must be at least {} characters", min),
            Weakness::MissingLowercase => f.write_str("Missing: lowercase"),
            Weakness::MissingUppercase => f.write_str("Missing: uppercase"),
            Weakness::MissingDigit => f.write_str("Missing: numbers"),
            Weakness::MissingSpecial => f.write_str("Missing: special characters"),
            Weakness::ContainsAccount => f.write_str("Password contains the account name"),
            Weakness::ContainsLabel => f.write_str("Password contains the site name"),
        }
    }
}

/// Identifying strings a secret must not contain.
///
/// Blank strings mean "not given" and impose no constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Context<'a> {
    pub account: &'a str,
    pub label: &'a str,
}

impl<'a> Context<'a> {
    pub fn new(account: &'a str, label: &'a str) -> Self {
        Self { account, label }
    }
}

/// Classifier output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub tier: Tier,
    /// True iff `tier` is Strong. Medium never counts as strong.
    pub is_strong: bool,
    /// Failed checks in rule order; empty for Strong.
    pub reasons: Vec<Weakness>,
}

impl Classification {
    fn from_reasons(reasons: Vec<Weakness>) -> Self {
        let tier = tier_for(&reasons);
        Self {
            tier,
            is_strong: tier == Tier::Strong,
            reasons,
        }
    }
}

/// Strong when nothing failed; Medium when length and context hold and at
/// least one of the letter-case or digit+special pairs is complete.
fn tier_for(reasons: &[Weakness]) -> Tier {
    if reasons.is_empty() {
        return Tier::Strong;
    }
    let failed = |w: Weakness| reasons.contains(&w);

    let too_short = reasons.iter().any(|r| matches!(r, Weakness::TooShort { .. }));
    let leaks = failed(Weakness::ContainsAccount) || failed(Weakness::ContainsLabel);
    let cases = !failed(Weakness::MissingLowercase) && !failed(Weakness::MissingUppercase);
    let symbols = !failed(Weakness::MissingDigit) && !failed(Weakness::MissingSpecial);

    if !too_short && !leaks && (cases || symbols) {
        Tier::Medium
    } else {
        Tier::Weak
    }
}

/// Classifies a secret with the default policy.
///
/// `account` and `label` may be empty.
///
/// # Example
///
/// ```rust
/// use pwd_vault::{classify, Tier};
///
/// let verdict = classify("Abc12345!", "", "");
/// assert_eq!(verdict.tier, Tier::Strong);
/// assert!(verdict.is_strong);
/// ```
pub fn classify(secret: &str, account: &str, label: &str) -> Classification {
    let secret = SecretString::new(secret.to_owned().into());
    classify_secret_with(&StrengthPolicy::default(), &secret, &Context::new(account, label))
}

/// Classifies a secret with an explicit policy.
pub fn classify_with(policy: &StrengthPolicy, secret: &str, context: &Context<'_>) -> Classification {
    let secret = SecretString::new(secret.to_owned().into());
    classify_secret_with(policy, &secret, context)
}

/// Classifies a secrecy-wrapped secret with the default policy.
pub fn classify_secret(secret: &SecretString, context: &Context<'_>) -> Classification {
    classify_secret_with(&StrengthPolicy::default(), secret, context)
}

/// Classifies a secrecy-wrapped secret.
///
/// Runs the length, variety and context checks in that order and derives
/// the tier from everything they report.
pub fn classify_secret_with(
    policy: &StrengthPolicy,
    secret: &SecretString,
    context: &Context<'_>,
) -> Classification {
    let checks: [(&str, fn(&SecretString, &Context<'_>, &StrengthPolicy) -> CheckResult); 3] = [
        ("length", length_check),
        ("variety", character_variety_check),
        ("context", context_check),
    ];

    let mut reasons = Vec::new();
    for (_check_name, check_fn) in checks {
        let found = check_fn(secret, context, policy);
        #[cfg(feature = "tracing")]
        {
            if !found.is_empty() {
                tracing::trace!("check {} reported {} weakness(es)", _check_name, found.len());
            }
        }
        reasons.extend(found);
    }

    Classification::from_reasons(reasons)
}

/// Classifies a secret that may be missing.
///
/// # Errors
///
/// `VaultError::InvalidArgument` when `secret` is `None`.
pub fn try_classify(secret: Option<&str>, account: &str, label: &str) -> Result<Classification, VaultError> {
    let secret = secret.ok_or_else(|| VaultError::InvalidArgument("secret is missing".to_string()))?;
    Ok(classify(secret, account, label))
}
