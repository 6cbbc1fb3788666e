use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised when building identifiers from raw strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IdError {
    #[error("user id must not be empty")]
    EmptyUserId,

    #[error("challenge slug must not be empty")]
    EmptySlug,

    #[error("invalid character {ch:?} in challenge slug {slug:?}")]
    InvalidSlugChar { slug: String, ch: char },
}

/// Stable identifier of an authenticated learner.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Creates a new `UserId` from a non-empty value (surrounding whitespace is trimmed).
    ///
    /// # Errors
    ///
    /// Returns `IdError::EmptyUserId` if nothing remains after trimming.
    pub fn new(raw: impl Into<String>) -> Result<Self, IdError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(IdError::EmptyUserId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// URL slug identifying a challenge.
///
/// Restricted to ASCII alphanumerics, `-` and `_` so it can be embedded in
/// storage keys and URL paths without escaping.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChallengeSlug(String);

impl ChallengeSlug {
    /// Creates a new `ChallengeSlug`.
    ///
    /// # Errors
    ///
    /// Returns `IdError::EmptySlug` for an empty slug and
    /// `IdError::InvalidSlugChar` for characters outside `[A-Za-z0-9_-]`.
    pub fn new(raw: impl Into<String>) -> Result<Self, IdError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(IdError::EmptySlug);
        }
        if let Some(ch) = raw
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(IdError::InvalidSlugChar { slug: raw, ch });
        }
        Ok(Self(raw))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Debug for ChallengeSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChallengeSlug({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ChallengeSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── Conversions ───────────────────────────────────────────────────────────────

impl FromStr for UserId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl FromStr for ChallengeSlug {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for UserId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for ChallengeSlug {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl From<ChallengeSlug> for String {
    fn from(value: ChallengeSlug) -> Self {
        value.0
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_trims() {
        let id: UserId = "  learner-7 ".parse().unwrap();
        assert_eq!(id.as_str(), "learner-7");
        assert_eq!(id.to_string(), "learner-7");
    }

    #[test]
    fn test_user_id_rejects_blank() {
        assert_eq!("   ".parse::<UserId>(), Err(IdError::EmptyUserId));
    }

    #[test]
    fn test_slug_accepts_url_safe_chars() {
        let slug = ChallengeSlug::new("maze_level-3").unwrap();
        assert_eq!(slug.as_str(), "maze_level-3");
    }

    #[test]
    fn test_slug_rejects_separators() {
        let err = ChallengeSlug::new("maze:3").unwrap_err();
        assert_eq!(
            err,
            IdError::InvalidSlugChar {
                slug: "maze:3".into(),
                ch: ':'
            }
        );
        assert_eq!(ChallengeSlug::new(""), Err(IdError::EmptySlug));
    }

    #[test]
    fn test_slug_serde_validates() {
        let ok: ChallengeSlug = serde_json::from_str("\"loops-1\"").unwrap();
        assert_eq!(ok.as_str(), "loops-1");
        assert!(serde_json::from_str::<ChallengeSlug>("\"a b\"").is_err());
    }
}
