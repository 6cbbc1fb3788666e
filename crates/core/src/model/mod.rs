mod attempt;
mod elapsed;
mod ids;
mod record;
mod route;
mod submission;

pub use attempt::{AttemptField, AttemptIdentity, solution_key};
pub use elapsed::{DurationParseError, ElapsedTime};
pub use ids::{ChallengeSlug, IdError, UserId};
pub use record::{AttemptRecord, ResumeToken, decode_flag, decode_millis, encode_flag, encode_millis};
pub use route::{ChallengeRoutes, RouteError};
pub use submission::{Submission, SubmissionDraft, SubmissionStatus, TestCaseResult};
