//! Registration password policy.

use serde::{Deserialize, Serialize};

/// Password requirements applied at registration.
///
/// The defaults match what the identity provider enforces on its side, so a
/// password accepted locally is also accepted upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordPolicy {
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    #[serde(default = "default_true")]
    pub require_numbers: bool,
    #[serde(default = "default_true")]
    pub require_special_chars: bool,
    #[serde(default = "default_true")]
    pub require_uppercase: bool,
    #[serde(default = "default_true")]
    pub require_lowercase: bool,
}

fn default_min_length() -> usize {
    8
}

fn default_true() -> bool {
    true
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            require_numbers: true,
            require_special_chars: true,
            require_uppercase: true,
            require_lowercase: true,
        }
    }
}

const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

impl PasswordPolicy {
    /// Check a candidate password against the policy.
    pub fn validate(&self, password: &str) -> bool {
        if password.chars().count() < self.min_length {
            return false;
        }
        if self.require_numbers && !password.chars().any(|c| c.is_ascii_digit()) {
            return false;
        }
        if self.require_special_chars && !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
            return false;
        }
        if self.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
            return false;
        }
        if self.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
            return false;
        }
        true
    }

    /// Human-readable rejection message for the `password` field.
    pub fn requirement_message(&self) -> String {
        format!(
            "Password must be at least {} characters long and meet security requirements",
            self.min_length
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_conforming_password() {
        assert!(PasswordPolicy::default().validate("Abcdef1!"));
    }

    #[test]
    fn rejects_short_passwords() {
        assert!(!PasswordPolicy::default().validate("Ab1!"));
    }

    #[test]
    fn rejects_missing_character_classes() {
        let policy = PasswordPolicy::default();
        assert!(!policy.validate("abcdefg1!")); // no uppercase
        assert!(!policy.validate("ABCDEFG1!")); // no lowercase
        assert!(!policy.validate("Abcdefgh!")); // no digit
        assert!(!policy.validate("Abcdefg12")); // no special char
    }

    #[test]
    fn relaxed_policy_only_checks_length() {
        let policy = PasswordPolicy {
            min_length: 6,
            require_numbers: false,
            require_special_chars: false,
            require_uppercase: false,
            require_lowercase: false,
        };
        assert!(policy.validate("abcdef"));
        assert!(!policy.validate("abcde"));
    }
}
