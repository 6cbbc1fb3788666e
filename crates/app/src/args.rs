use std::fmt;

use attempt_core::model::{ChallengeSlug, SubmissionStatus, UserId};

use crate::logging::LogFormat;

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFlag { command: Command, flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidUser { raw: String },
    InvalidChallenge { raw: String },
    InvalidNumber { flag: &'static str, raw: String },
    InvalidStatus { raw: String },
    InvalidLogFormat { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { command, flag } => {
                write!(f, "{} requires {flag}", command.name())
            }
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidUser { raw } => write!(f, "invalid --user value: {raw:?}"),
            ArgsError::InvalidChallenge { raw } => write!(f, "invalid --challenge value: {raw:?}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidStatus { raw } => {
                write!(f, "invalid --status value (expected passed|failed|error): {raw}")
            }
            ArgsError::InvalidLogFormat { raw } => {
                write!(f, "invalid --log-format value (expected human|json): {raw}")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Resume,
    Submit,
    Show,
    Reset,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "start" => Some(Self::Start),
            "resume" => Some(Self::Resume),
            "submit" => Some(Self::Submit),
            "show" => Some(Self::Show),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Resume => "resume",
            Command::Submit => "submit",
            Command::Show => "show",
            Command::Reset => "reset",
        }
    }
}

/// Values read from the environment before flags are applied.
#[derive(Debug, Clone, Default)]
pub struct EnvDefaults {
    pub db_url: Option<String>,
    pub user: Option<String>,
    pub tick_ms: Option<String>,
    pub site_url: Option<String>,
}

impl EnvDefaults {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            db_url: std::env::var("BLOCKS_DB_URL").ok(),
            user: std::env::var("BLOCKS_USER_ID").ok(),
            tick_ms: std::env::var("BLOCKS_TICK_MS").ok(),
            site_url: std::env::var("BLOCKS_SITE_URL").ok(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Args {
    pub command: Command,
    pub db_url: String,
    pub site_url: String,
    pub user: Option<UserId>,
    pub challenge: ChallengeSlug,
    pub tick_ms: u64,
    pub seconds: u64,
    pub elapsed: Option<String>,
    pub solution: Option<String>,
    pub status: SubmissionStatus,
    pub score: u32,
    pub verbosity: u8,
    pub log_format: LogFormat,
}

pub enum Parsed {
    Help,
    Run(Box<Args>),
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_number<T: std::str::FromStr>(flag: &'static str, raw: String) -> Result<T, ArgsError> {
    raw.parse::<T>()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

fn parse_user(raw: String) -> Result<UserId, ArgsError> {
    UserId::new(raw.clone()).map_err(|_| ArgsError::InvalidUser { raw })
}

impl Args {
    /// Parse `argv` (without the program name). Flags override `env`.
    pub fn parse(
        argv: impl IntoIterator<Item = String>,
        env: &EnvDefaults,
    ) -> Result<Parsed, ArgsError> {
        let mut args = argv.into_iter();
        let command = match args.next() {
            None => return Ok(Parsed::Help),
            Some(first) if first == "--help" || first == "-h" => return Ok(Parsed::Help),
            Some(first) => {
                Command::from_arg(&first).ok_or(ArgsError::UnknownCommand(first))?
            }
        };

        let mut db_url = env
            .db_url
            .clone()
            .map_or_else(|| "sqlite://attempts.sqlite3".into(), normalize_sqlite_url);
        let mut site_url = env
            .site_url
            .clone()
            .unwrap_or_else(|| "http://localhost:3000".into());
        let mut user = match env.user.clone() {
            Some(raw) if !raw.trim().is_empty() => Some(parse_user(raw)?),
            _ => None,
        };
        let mut tick_ms = match env.tick_ms.clone() {
            Some(raw) => parse_number("BLOCKS_TICK_MS", raw)?,
            None => 1_000,
        };
        let mut challenge = None;
        let mut seconds = 5;
        let mut elapsed = None;
        let mut solution = None;
        let mut status = SubmissionStatus::Passed;
        let mut score = 0;
        let mut verbosity = 0_u8;
        let mut log_format = LogFormat::Human;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--site" => site_url = require_value(&mut args, "--site")?,
                "--user" => user = Some(parse_user(require_value(&mut args, "--user")?)?),
                "--challenge" => {
                    let value = require_value(&mut args, "--challenge")?;
                    challenge = Some(
                        ChallengeSlug::new(value.clone())
                            .map_err(|_| ArgsError::InvalidChallenge { raw: value })?,
                    );
                }
                "--tick-ms" => {
                    tick_ms = parse_number("--tick-ms", require_value(&mut args, "--tick-ms")?)?;
                }
                "--seconds" => {
                    seconds = parse_number("--seconds", require_value(&mut args, "--seconds")?)?;
                }
                "--elapsed" => elapsed = Some(require_value(&mut args, "--elapsed")?),
                "--solution" => solution = Some(require_value(&mut args, "--solution")?),
                "--status" => {
                    let value = require_value(&mut args, "--status")?;
                    status = SubmissionStatus::parse(&value)
                        .ok_or(ArgsError::InvalidStatus { raw: value })?;
                }
                "--score" => {
                    score = parse_number("--score", require_value(&mut args, "--score")?)?;
                }
                "--log-format" => {
                    let value = require_value(&mut args, "--log-format")?;
                    log_format = LogFormat::parse(&value)
                        .ok_or(ArgsError::InvalidLogFormat { raw: value })?;
                }
                "-v" => verbosity = verbosity.saturating_add(1),
                "-vv" => verbosity = verbosity.saturating_add(2),
                "--help" | "-h" => return Ok(Parsed::Help),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let challenge = challenge.ok_or(ArgsError::MissingFlag {
            command,
            flag: "--challenge",
        })?;
        if tick_ms == 0 {
            return Err(ArgsError::InvalidNumber {
                flag: "--tick-ms",
                raw: "0".into(),
            });
        }
        match command {
            Command::Resume if elapsed.is_none() => {
                return Err(ArgsError::MissingFlag {
                    command,
                    flag: "--elapsed",
                });
            }
            Command::Resume | Command::Submit if solution.is_none() => {
                return Err(ArgsError::MissingFlag {
                    command,
                    flag: "--solution",
                });
            }
            _ => {}
        }

        Ok(Parsed::Run(Box::new(Self {
            command,
            db_url,
            site_url,
            user,
            challenge,
            tick_ms,
            seconds,
            elapsed,
            solution,
            status,
            score,
            verbosity,
            log_format,
        })))
    }
}

pub const USAGE: &str = "\
Usage:
  app start  --challenge <slug> [--seconds <n>]
  app resume --challenge <slug> --elapsed <HH:MM:SS> --solution <text>
  app submit --challenge <slug> --solution <text> [--status passed|failed|error] [--score <n>]
  app show   --challenge <slug>
  app reset  --challenge <slug>

Common options:
  --db <sqlite_url>      default: sqlite://attempts.sqlite3
  --user <id>            omit for an anonymous, unpersisted attempt
  --site <url>           default: http://localhost:3000
  --tick-ms <n>          default: 1000
  --log-format human|json, -v / -vv

`resume` seeds the stored attempt; the next `start` continues from the given
elapsed time. The reused solution lives in a per-process session store and is
not carried over to later invocations.

Environment:
  BLOCKS_DB_URL, BLOCKS_USER_ID, BLOCKS_SITE_URL, BLOCKS_TICK_MS, BLOCKS_LOG,
  BLOCKS_API_BASE_URL, BLOCKS_API_TOKEN
";

pub fn print_usage() {
    eprint!("{USAGE}");
}

pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    fn run_args(raw: &[&str], env: &EnvDefaults) -> Args {
        match Args::parse(argv(raw), env) {
            Ok(Parsed::Run(args)) => *args,
            Ok(Parsed::Help) => panic!("unexpected help"),
            Err(err) => panic!("unexpected error: {err}"),
        }
    }

    #[test]
    fn flags_override_environment() {
        let env = EnvDefaults {
            db_url: Some("sqlite:///tmp/env.sqlite3".into()),
            user: Some("env-user".into()),
            tick_ms: Some("250".into()),
            site_url: None,
        };
        let args = run_args(
            &["start", "--challenge", "maze-1", "--user", "cli-user", "--tick-ms", "500"],
            &env,
        );

        assert_eq!(args.command, Command::Start);
        assert_eq!(args.db_url, "sqlite:///tmp/env.sqlite3");
        assert_eq!(args.user.as_ref().map(UserId::as_str), Some("cli-user"));
        assert_eq!(args.tick_ms, 500);
        assert_eq!(args.site_url, "http://localhost:3000");
    }

    #[test]
    fn blank_env_user_means_anonymous() {
        let env = EnvDefaults {
            user: Some("  ".into()),
            ..EnvDefaults::default()
        };
        let args = run_args(&["show", "--challenge", "maze-1"], &env);
        assert!(args.user.is_none());
    }

    #[test]
    fn resume_requires_elapsed_and_solution() {
        let env = EnvDefaults::default();
        assert!(matches!(
            Args::parse(argv(&["resume", "--challenge", "maze-1"]), &env),
            Err(ArgsError::MissingFlag { flag: "--elapsed", .. })
        ));
        assert!(matches!(
            Args::parse(
                argv(&["resume", "--challenge", "maze-1", "--elapsed", "00:01:00"]),
                &env
            ),
            Err(ArgsError::MissingFlag { flag: "--solution", .. })
        ));
    }

    #[test]
    fn rejects_bad_values() {
        let env = EnvDefaults::default();
        assert!(matches!(
            Args::parse(argv(&["start", "--challenge", "a b"]), &env),
            Err(ArgsError::InvalidChallenge { .. })
        ));
        assert!(matches!(
            Args::parse(argv(&["submit", "--challenge", "x", "--status", "ok"]), &env),
            Err(ArgsError::InvalidStatus { .. })
        ));
        assert!(matches!(
            Args::parse(argv(&["launch"]), &env),
            Err(ArgsError::UnknownCommand(_))
        ));
        assert!(matches!(
            Args::parse(argv(&["start", "--challenge", "x", "--tick-ms", "0"]), &env),
            Err(ArgsError::InvalidNumber { flag: "--tick-ms", .. })
        ));
    }

    #[test]
    fn no_arguments_shows_help() {
        assert!(matches!(
            Args::parse(Vec::new(), &EnvDefaults::default()),
            Ok(Parsed::Help)
        ));
    }

    #[test]
    fn usage_explains_resume_handoff() {
        assert!(USAGE.starts_with("Usage:"));
        assert!(USAGE.contains("not carried over to later invocations"));
    }

    #[test]
    fn memory_and_absolute_urls_are_kept() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///var/db.sqlite3".into()),
            "sqlite:///var/db.sqlite3"
        );
        assert_eq!(normalize_sqlite_url("/var/db.sqlite3".into()), "sqlite:///var/db.sqlite3");
    }
}
