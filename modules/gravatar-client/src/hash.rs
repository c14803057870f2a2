//! Lookup key derivation.
//!
//! Gravatar identifies an account by the MD5 of its email address, lowercased
//! and trimmed, rendered as 32 lowercase hex characters.

use std::fmt;

/// Hex-encoded MD5 of a normalized email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupKey(String);

impl LookupKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the lookup key for an email address.
///
/// Callers skip records without an email before calling; an empty input still
/// hashes, it just never matches an account.
pub fn derive_key(email: &str) -> LookupKey {
    let normalized = email.trim().to_lowercase();
    let digest = md5::compute(normalized.as_bytes());
    LookupKey(format!("{digest:x}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_and_whitespace_do_not_change_key() {
        assert_eq!(derive_key(" Foo@Bar.COM "), derive_key("foo@bar.com"));
    }

    #[test]
    fn key_matches_known_gravatar_hash() {
        // Example from the Gravatar developer docs.
        assert_eq!(
            derive_key("MyEmailAddress@example.com ").as_str(),
            "0bc83cb571cd1c50ba6f3e8a78ef1346"
        );
    }

    #[test]
    fn key_is_32_lowercase_hex_chars() {
        let key = derive_key("jane.doe@example.com");
        assert_eq!(key.as_str().len(), 32);
        assert!(key
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn different_emails_produce_different_keys() {
        assert_ne!(derive_key("a@example.com"), derive_key("b@example.com"));
    }
}
