mod args;
mod logging;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use attempt_core::model::{AttemptIdentity, ElapsedTime, Submission, SubmissionDraft};
use services::{
    Clock, HttpSubmissionSink, NavigationError, Navigator, SubmissionError, SubmissionSink,
    TrackerConfig, TrackerServices,
};
use url::Url;

use crate::args::{Args, ArgsError, Command, EnvDefaults, Parsed, USAGE, print_usage};
use crate::logging::init_logging;

/// Prints the page a resumed attempt should open.
struct PrintNavigator;

#[async_trait]
impl Navigator for PrintNavigator {
    async fn navigate(&self, target: &Url) -> Result<(), NavigationError> {
        println!("open {target}");
        Ok(())
    }
}

/// Used when no submission API is configured: the submission is written to stdout.
struct StdoutSink;

#[async_trait]
impl SubmissionSink for StdoutSink {
    async fn submit(&self, submission: &Submission) -> Result<(), SubmissionError> {
        let json = serde_json::to_string_pretty(submission)
            .map_err(|e| SubmissionError::Rejected(e.to_string()))?;
        println!("{json}");
        Ok(())
    }
}

fn submission_sink() -> Arc<dyn SubmissionSink> {
    let http = HttpSubmissionSink::from_env();
    if http.enabled() {
        Arc::new(http)
    } else {
        tracing::info!("BLOCKS_API_BASE_URL not set; printing submissions to stdout");
        Arc::new(StdoutSink)
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let env = EnvDefaults::from_env();
    let parsed = Args::parse(std::env::args().skip(1), &env)?;
    let args = match parsed {
        Parsed::Help => {
            print_usage();
            return Ok(());
        }
        Parsed::Run(args) => *args,
    };

    init_logging(args.log_format, args.verbosity);

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&args.db_url)?;
    let config = TrackerConfig::default().with_tick_period(Duration::from_millis(args.tick_ms));
    let services = TrackerServices::new_sqlite(
        &args.db_url,
        &args.site_url,
        Clock::default_clock(),
        config,
        Arc::new(PrintNavigator),
        submission_sink(),
    )
    .await?;

    let identity = AttemptIdentity::new(args.user.clone(), args.challenge.clone());
    if identity.is_anonymous() {
        tracing::warn!(attempt = %identity, "no user id; the attempt will not be persisted");
    }

    match args.command {
        Command::Start => start(&services, identity, args.seconds).await,
        Command::Resume => resume(&services, &identity, &args).await,
        Command::Submit => submit(&services, identity, &args).await,
        Command::Show => show(&services, &identity).await,
        Command::Reset => {
            services.tracker().reset(&identity).await?;
            println!("reset {identity}");
            Ok(())
        }
    }
}

async fn start(
    services: &TrackerServices,
    identity: AttemptIdentity,
    seconds: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener = Arc::new(|elapsed: ElapsedTime| println!("elapsed {elapsed}"));
    let mounted = services.tracker().mount(identity, listener).await?;

    tokio::select! {
        () = tokio::time::sleep(Duration::from_secs(seconds)) => {}
        result = tokio::signal::ctrl_c() => result?,
    }

    let elapsed = mounted.elapsed().await;
    mounted.unmount();
    println!("paused at {elapsed}");
    Ok(())
}

async fn resume(
    services: &TrackerServices,
    identity: &AttemptIdentity,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    let (Some(elapsed), Some(solution)) = (&args.elapsed, &args.solution) else {
        return Err(ArgsError::MissingFlag {
            command: Command::Resume,
            flag: "--elapsed",
        }
        .into());
    };
    services.resume().resume(identity, solution, elapsed).await?;
    Ok(())
}

async fn submit(
    services: &TrackerServices,
    identity: AttemptIdentity,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    let solution = args.solution.clone().ok_or(ArgsError::MissingFlag {
        command: Command::Submit,
        flag: "--solution",
    })?;
    let draft = SubmissionDraft::new(identity.challenge().clone(), solution, args.status)
        .with_score(args.score);

    let mut mounted = services
        .tracker()
        .mount(identity, Arc::new(|_: ElapsedTime| {}))
        .await?;
    let submission = services.finalizer().finalize(&mut mounted, draft).await?;
    eprintln!(
        "submitted {} after {}",
        submission.submission_id,
        submission.time_spent()
    );
    Ok(())
}

async fn show(
    services: &TrackerServices,
    identity: &AttemptIdentity,
) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = services.tracker();
    println!("attempt {identity}");
    for (field, value) in tracker.raw_entries(identity).await? {
        println!("  {}: {}", identity.key(field), value.as_deref().unwrap_or("-"));
    }
    let record = tracker.inspect(identity).await?;
    println!("  decoded: {record:?}");
    Ok(())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

/// Text printed for a failed run. Argument errors are followed by the usage.
fn failure_report(err: &(dyn std::error::Error + 'static)) -> String {
    if err.is::<ArgsError>() {
        format!("{err}\n{USAGE}")
    } else {
        format!("{err}\n")
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprint!("{}", failure_report(err.as_ref()));
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_errors_are_reported_once_with_usage() {
        let err: Box<dyn std::error::Error> = Box::new(ArgsError::UnknownArg("--bogus".into()));
        let report = failure_report(err.as_ref());

        assert_eq!(report.matches("unknown argument: --bogus").count(), 1);
        assert!(report.contains("Usage:"));
    }

    #[test]
    fn other_errors_skip_usage() {
        let err: Box<dyn std::error::Error> =
            Box::new(NavigationError::new("window closed"));
        let report = failure_report(err.as_ref());

        assert_eq!(report, "navigation failed: window closed\n");
    }
}
