mod logging;

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use event_engine::{
    parse_instant, validate_with_policy, CandidateEvent, EnginePolicy, ValidateOptions,
};

use crate::logging::{init_logging, LogFormat};

/// Exit status for a candidate that parsed but failed validation.
const EXIT_INVALID: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "event-check")]
#[command(version, about = "Validate candidate events and preview their join-window timeline")]
struct Cli {
    /// Log output format (logs are written to stderr, filtered by RUST_LOG).
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a candidate event and print the outcome as JSON.
    ///
    /// Exits with status 2 when the candidate has blocking errors.
    Validate {
        #[command(flatten)]
        candidate: CandidateArgs,

        /// Print single-line JSON.
        #[arg(long)]
        compact: bool,
    },
    /// Print the candidate's timeline pinned to absolute instants.
    Timeline {
        #[command(flatten)]
        candidate: CandidateArgs,

        /// IANA timezone for local rendering.
        #[arg(long, default_value = "UTC")]
        tz: String,
    },
}

#[derive(Debug, Args)]
struct CandidateArgs {
    /// Candidate event JSON file (reads stdin when omitted).
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Validate as an edit of a persisted event (skips the lead-time check).
    #[arg(long)]
    edit: bool,

    /// Reference instant as RFC 3339 (defaults to the system clock).
    #[arg(long)]
    now: Option<String>,

    /// Policy JSON file overriding the default limits.
    #[arg(long)]
    policy: Option<PathBuf>,
}

impl CandidateArgs {
    fn load(&self) -> Result<(CandidateEvent, ValidateOptions, EnginePolicy)> {
        let json = match &self.input {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?,
            None => {
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .context("failed to read stdin")?;
                buf
            }
        };
        let candidate = CandidateEvent::from_json(&json)?;

        let now = match &self.now {
            Some(s) => parse_instant(s)?,
            None => chrono::Utc::now(),
        };

        let policy = match &self.policy {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                EnginePolicy::from_json(&text)?
            }
            None => EnginePolicy::default(),
        };

        let options = ValidateOptions {
            now,
            is_creation: !self.edit,
        };
        Ok((candidate, options, policy))
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    match cli.command {
        Command::Validate { candidate, compact } => {
            let (candidate, options, policy) = candidate.load()?;
            let outcome = validate_with_policy(&candidate, &options, &policy);
            let output = if compact {
                serde_json::to_string(&outcome)?
            } else {
                serde_json::to_string_pretty(&outcome)?
            };
            println!("{output}");
            if outcome.is_valid {
                Ok(ExitCode::SUCCESS)
            } else {
                tracing::info!(errors = outcome.field_errors.len(), "candidate rejected");
                Ok(ExitCode::from(EXIT_INVALID))
            }
        }
        Command::Timeline { candidate, tz } => {
            let (candidate, options, policy) = candidate.load()?;
            let outcome = validate_with_policy(&candidate, &options, &policy);
            let points = outcome.timeline.localize(candidate.start_at, &tz)?;
            println!("{}", serde_json::to_string_pretty(&points)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
