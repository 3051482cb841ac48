//! Random secret generation.

use rand::Rng;
use secrecy::SecretString;

use crate::classifier::{classify_secret_with, Context};
use crate::error::VaultError;
use crate::policy::StrengthPolicy;

const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";

/// Upper bound on draws before `generate_strong_secret` gives up.
pub const MAX_STRONG_ATTEMPTS: usize = 64;

/// Returns the generator alphabet: letters, digits and the policy specials.
pub fn alphabet(policy: &StrengthPolicy) -> Vec<char> {
    let mut chars: Vec<char> = LOWERCASE.chars().chain(UPPERCASE.chars()).chain(DIGITS.chars()).collect();
    for c in policy.specials.chars() {
        if !chars.contains(&c) {
            chars.push(c);
        }
    }
    chars
}

/// Draws `length` characters uniformly from the alphabet using the thread RNG.
pub fn generate_secret(length: usize, policy: &StrengthPolicy) -> SecretString {
    generate_secret_with(&mut rand::rng(), length, policy)
}

/// Draws `length` characters uniformly from the alphabet.
pub fn generate_secret_with<R: Rng + ?Sized>(rng: &mut R, length: usize, policy: &StrengthPolicy) -> SecretString {
    let chars = alphabet(policy);
    let secret: String = (0..length).map(|_| chars[rng.random_range(0..chars.len())]).collect();
    SecretString::new(secret.into())
}

/// Generates a secret of `policy.generated_length` that classifies Strong
/// for `context`.
///
/// # Errors
///
/// `VaultError::Generation` if no draw classified Strong within
/// [`MAX_STRONG_ATTEMPTS`].
pub fn generate_strong_secret(policy: &StrengthPolicy, context: &Context<'_>) -> Result<SecretString, VaultError> {
    generate_strong_secret_with(&mut rand::rng(), policy, context)
}

/// Same as [`generate_strong_secret`] with an explicit RNG.
pub fn generate_strong_secret_with<R: Rng + ?Sized>(
    rng: &mut R,
    policy: &StrengthPolicy,
    context: &Context<'_>,
) -> Result<SecretString, VaultError> {
    for _attempt in 0..MAX_STRONG_ATTEMPTS {
        let secret = generate_secret_with(rng, policy.generated_length, policy);
        if classify_secret_with(policy, &secret, context).is_strong {
            return Ok(secret);
        }
        #[cfg(feature = "tracing")]
        tracing::trace!("generated secret rejected on attempt {}", _attempt + 1);
    }

    #[cfg(feature = "tracing")]
    tracing::warn!("no strong secret after {} attempts", MAX_STRONG_ATTEMPTS);
    Err(VaultError::Generation { attempts: MAX_STRONG_ATTEMPTS })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{classify_secret, Tier};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use secrecy::ExposeSecret;

    #[test]
    fn test_alphabet_default() {
        let chars = alphabet(&StrengthPolicy::default());
        assert_eq!(chars.len(), 26 + 26 + 10 + 10);
        assert!(chars.contains(&'a') && chars.contains(&'Z') && chars.contains(&'7') && chars.contains(&')'));
    }

    #[test]
    fn test_generate_secret_length_and_alphabet() {
        let policy = StrengthPolicy::default();
        let chars = alphabet(&policy);
        let mut rng = StdRng::seed_from_u64(7);
        for length in [0, 1, 12, 64] {
            let secret = generate_secret_with(&mut rng, length, &policy);
            assert_eq!(secret.expose_secret().chars().count(), length);
            assert!(secret.expose_secret().chars().all(|c| chars.contains(&c)));
        }
    }

    #[test]
    fn test_generate_secret_covers_alphabet() {
        let policy = StrengthPolicy::default();
        let mut rng = StdRng::seed_from_u64(42);
        let secret = generate_secret_with(&mut rng, 4096, &policy);
        for c in alphabet(&policy) {
            assert!(secret.expose_secret().contains(c), "{:?} never drawn", c);
        }
    }

    #[test]
    fn test_generate_strong_secret_is_strong() {
        let policy = StrengthPolicy::default();
        let context = Context::new("alice", "mail");
        for _ in 0..50 {
            let secret = generate_strong_secret(&policy, &context).expect("generation should succeed");
            assert_eq!(secret.expose_secret().chars().count(), 12);
            assert_eq!(classify_secret(&secret, &context).tier, Tier::Strong);
        }
    }

    #[test]
    fn test_generate_strong_secret_impossible_policy() {
        // Two characters can never cover four character classes
        let policy = StrengthPolicy {
            min_length: 2,
            generated_length: 2,
            ..StrengthPolicy::default()
        };
        let result = generate_strong_secret(&policy, &Context::default());
        assert!(matches!(result, Err(VaultError::Generation { attempts: MAX_STRONG_ATTEMPTS })));
    }
}
