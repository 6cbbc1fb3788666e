use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::model::elapsed::ElapsedTime;
use crate::model::ids::ChallengeSlug;

//
// ─── STATUS & RESULTS ─────────────────────────────────────────────────────────
//

/// Outcome the challenge widget reports for a solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Every test case passed.
    Passed,
    /// At least one test case failed.
    Failed,
    /// The solution could not be evaluated.
    Error,
}

impl SubmissionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionStatus::Passed => "passed",
            SubmissionStatus::Failed => "failed",
            SubmissionStatus::Error => "error",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "passed" => Some(Self::Passed),
            "failed" => Some(Self::Failed),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single test case run against the solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseResult {
    pub name: String,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

//
// ─── SUBMISSION RECORDS ───────────────────────────────────────────────────────
//

/// Partial record handed over by the challenge page on submit.
///
/// Everything except the identifier and the elapsed time, which the tracker
/// fills in at finalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionDraft {
    pub challenge: ChallengeSlug,
    pub solution: String,
    pub status: SubmissionStatus,
    pub score: u32,
    pub test_results: Vec<TestCaseResult>,
}

impl SubmissionDraft {
    #[must_use]
    pub fn new(challenge: ChallengeSlug, solution: impl Into<String>, status: SubmissionStatus) -> Self {
        Self {
            challenge,
            solution: solution.into(),
            status,
            score: 0,
            test_results: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_score(mut self, score: u32) -> Self {
        self.score = score;
        self
    }

    #[must_use]
    pub fn with_test_results(mut self, results: Vec<TestCaseResult>) -> Self {
        self.test_results = results;
        self
    }
}

/// Finalized record delivered to the grading backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Idempotency key for the grading backend.
    pub submission_id: Uuid,
    pub challenge: ChallengeSlug,
    pub solution: String,
    pub status: SubmissionStatus,
    pub score: u32,
    pub test_results: Vec<TestCaseResult>,
    pub time_spent_ms: u64,
}

impl Submission {
    /// Complete a draft with a fresh id and the measured elapsed time.
    #[must_use]
    pub fn from_draft(draft: SubmissionDraft, time_spent: ElapsedTime) -> Self {
        Self::with_id(Uuid::new_v4(), draft, time_spent)
    }

    #[must_use]
    pub fn with_id(submission_id: Uuid, draft: SubmissionDraft, time_spent: ElapsedTime) -> Self {
        Self {
            submission_id,
            challenge: draft.challenge,
            solution: draft.solution,
            status: draft.status,
            score: draft.score,
            test_results: draft.test_results,
            time_spent_ms: time_spent.as_millis(),
        }
    }

    #[must_use]
    pub fn time_spent(&self) -> ElapsedTime {
        ElapsedTime::from_millis(self.time_spent_ms)
    }
}
