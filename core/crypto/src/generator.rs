//! Random password generation.

use rand::rngs::OsRng;
use rand::Rng;

const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
const DIGITS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()_+[]{}|;:,.<>?";

/// Characters that are easy to misread for one another.
const LOOK_ALIKES: &[char] = &['O', 'I', 'o', 'l', '0', '1'];

/// Which character classes a generated password draws from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub length: usize,
    pub upper: bool,
    pub lower: bool,
    pub digits: bool,
    pub symbols: bool,
    /// Drop `O I o l 0 1` from the alphabet.
    pub exclude_look_alikes: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            length: 16,
            upper: true,
            lower: true,
            digits: true,
            symbols: true,
            exclude_look_alikes: true,
        }
    }
}

impl PasswordPolicy {
    /// The alphabet this policy draws from, in a stable order.
    pub fn alphabet(&self) -> Vec<char> {
        let classes = [
            (self.upper, UPPER),
            (self.lower, LOWER),
            (self.digits, DIGITS),
            (self.symbols, SYMBOLS),
        ];

        classes
            .into_iter()
            .filter(|(enabled, _)| *enabled)
            .flat_map(|(_, chars)| chars.chars())
            .filter(|c| !(self.exclude_look_alikes && LOOK_ALIKES.contains(c)))
            .collect()
    }
}

/// Generate a password according to `policy`.
///
/// Each character is drawn uniformly from the policy's alphabet using the OS
/// random number generator. Returns an empty string when no character class
/// is enabled.
pub fn generate_password(policy: &PasswordPolicy) -> String {
    let alphabet = policy.alphabet();
    if alphabet.is_empty() {
        return String::new();
    }

    let mut rng = OsRng;
    (0..policy.length)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
        .collect()
}
