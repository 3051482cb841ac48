//! Strength checks
//!
//! Each check inspects one aspect of a secret and reports the weaknesses it
//! finds. The classifier derives the tier from the combined findings.

mod context;
mod length;
mod variety;

pub use context::context_check;
pub use length::length_check;
pub use variety::character_variety_check;

/// Result type for check functions.
/// - empty - check passed
/// - otherwise - weaknesses found, in rule order
pub type CheckResult = Vec<crate::classifier::Weakness>;
