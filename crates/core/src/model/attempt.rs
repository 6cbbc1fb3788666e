use std::fmt;

use crate::model::ids::{ChallengeSlug, UserId};

//
// ─── ATTEMPT IDENTITY ─────────────────────────────────────────────────────────
//

/// The (user, challenge) pair that partitions persisted attempt state.
///
/// A missing user routes to the shared `anonymous` partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttemptIdentity {
    user: Option<UserId>,
    challenge: ChallengeSlug,
}

impl AttemptIdentity {
    #[must_use]
    pub fn new(user: Option<UserId>, challenge: ChallengeSlug) -> Self {
        Self { user, challenge }
    }

    #[must_use]
    pub fn for_user(user: UserId, challenge: ChallengeSlug) -> Self {
        Self::new(Some(user), challenge)
    }

    #[must_use]
    pub fn anonymous(challenge: ChallengeSlug) -> Self {
        Self::new(None, challenge)
    }

    #[must_use]
    pub fn user(&self) -> Option<&UserId> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn challenge(&self) -> &ChallengeSlug {
        &self.challenge
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.user.is_none()
    }

    /// Prefix shared by every field key of this attempt.
    ///
    /// `attempt:{slug}:user={len}:{id}:` or `attempt:{slug}:anonymous:`. The slug
    /// cannot contain `:` and the user id is length-prefixed, so distinct
    /// identities never share a prefix.
    #[must_use]
    pub fn key_prefix(&self) -> String {
        match &self.user {
            Some(user) => format!(
                "attempt:{}:user={}:{}:",
                self.challenge,
                user.as_str().len(),
                user
            ),
            None => format!("attempt:{}:anonymous:", self.challenge),
        }
    }

    /// Storage key for one field of this attempt.
    #[must_use]
    pub fn key(&self, field: AttemptField) -> String {
        let mut key = self.key_prefix();
        key.push_str(field.as_str());
        key
    }

    /// Keys of all four attempt fields, in `AttemptField::ALL` order.
    #[must_use]
    pub fn keys(&self) -> [String; 4] {
        AttemptField::ALL.map(|field| self.key(field))
    }
}

impl fmt::Display for AttemptIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.user {
            Some(user) => write!(f, "{user}/{}", self.challenge),
            None => write!(f, "anonymous/{}", self.challenge),
        }
    }
}

//
// ─── ATTEMPT FIELDS ───────────────────────────────────────────────────────────
//

/// The four persisted entries that make up one attempt record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttemptField {
    /// Wall-clock millis at which the running segment began.
    Start,
    /// Whether a running segment exists.
    Active,
    /// Millis accumulated by earlier, completed segments.
    TimeSpent,
    /// One-shot resume marker written by the resume trigger.
    IsResumed,
}

impl AttemptField {
    pub const ALL: [AttemptField; 4] = [
        AttemptField::Start,
        AttemptField::Active,
        AttemptField::TimeSpent,
        AttemptField::IsResumed,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AttemptField::Start => "start",
            AttemptField::Active => "active",
            AttemptField::TimeSpent => "timeSpent",
            AttemptField::IsResumed => "isResumed",
        }
    }
}

impl fmt::Display for AttemptField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session-store key under which a reused solution waits for the challenge page.
#[must_use]
pub fn solution_key(challenge: &ChallengeSlug) -> String {
    format!("solution:{challenge}")
}
