mod machine;
mod mounted;

pub use machine::{AttemptTimer, MountKind, TimerState};
pub use mounted::{ElapsedListener, MountedAttempt};
