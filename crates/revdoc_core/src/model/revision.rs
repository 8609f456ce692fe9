//! Revision tokens for optimistic concurrency.
//!
//! # Responsibility
//! - Mint a fresh token for every successful document write.
//! - Parse persisted tokens back into their structured form.
//!
//! # Invariants
//! - Token format is `<generation>-<32 lowercase hex>`.
//! - Generation starts at 1 and grows by exactly one per write, so two
//!   successive states of one document never share a token.
//! - The hex suffix is random and cannot be guessed from earlier tokens.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

const SUFFIX_LEN: usize = 32;

/// Opaque revision token attached to every document state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Revision {
    generation: u64,
    suffix: String,
}

/// Parse failure for persisted or caller-supplied revision text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionParseError(String);

impl Display for RevisionParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "malformed revision token `{}`", self.0)
    }
}

impl Error for RevisionParseError {}

impl Revision {
    /// Revision issued on document creation.
    pub fn first() -> Self {
        Self::with_generation(1)
    }

    /// Revision that follows `self` on the next successful write.
    pub fn next(&self) -> Self {
        Self::with_generation(self.generation.saturating_add(1))
    }

    /// Numeric write counter encoded in the token.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn with_generation(generation: u64) -> Self {
        Self {
            generation,
            suffix: Uuid::new_v4().simple().to_string(),
        }
    }
}

impl Display for Revision {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.generation, self.suffix)
    }
}

impl FromStr for Revision {
    type Err = RevisionParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || RevisionParseError(value.to_string());
        let (generation, suffix) = value.split_once('-').ok_or_else(malformed)?;

        let canonical = !generation.is_empty()
            && !generation.starts_with('0')
            && generation.bytes().all(|byte| byte.is_ascii_digit());
        if !canonical {
            return Err(malformed());
        }
        let generation = generation.parse::<u64>().map_err(|_| malformed())?;

        let suffix_ok = suffix.len() == SUFFIX_LEN
            && suffix
                .chars()
                .all(|ch| ch.is_ascii_digit() || ('a'..='f').contains(&ch));
        if !suffix_ok {
            return Err(malformed());
        }

        Ok(Self {
            generation,
            suffix: suffix.to_string(),
        })
    }
}

impl TryFrom<String> for Revision {
    type Error = RevisionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Revision> for String {
    fn from(value: Revision) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::Revision;

    #[test]
    fn first_revision_starts_at_generation_one() {
        assert_eq!(Revision::first().generation(), 1);
    }

    #[test]
    fn next_increments_generation_and_changes_token() {
        let first = Revision::first();
        let second = first.next();
        assert_eq!(second.generation(), 2);
        assert_ne!(first, second);
    }

    #[test]
    fn display_and_parse_agree() {
        let revision = Revision::first().next().next();
        let text = revision.to_string();
        assert!(text.starts_with("3-"));
        assert_eq!(text.parse::<Revision>().unwrap(), revision);
    }

    #[test]
    fn parse_rejects_malformed_tokens() {
        for bad in [
            "",
            "1",
            "0-0123456789abcdef0123456789abcdef",
            "x-0123456789abcdef0123456789abcdef",
            "1-0123456789ABCDEF0123456789ABCDEF",
            "1-short",
            "+1-0123456789abcdef0123456789abcdef",
            "01-0123456789abcdef0123456789abcdef",
            "-0123456789abcdef0123456789abcdef",
            "18446744073709551616-0123456789abcdef0123456789abcdef",
        ] {
            assert!(bad.parse::<Revision>().is_err(), "`{bad}` should be rejected");
        }
    }

    #[test]
    fn parse_accepts_only_canonical_generations() {
        let token = "10-0123456789abcdef0123456789abcdef";
        let revision = token.parse::<Revision>().unwrap();
        assert_eq!(revision.generation(), 10);
        assert_eq!(revision.to_string(), token);
    }
}
