//! CLI for the sqlexec retry and result-cursor core.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use sqlexec_core::config::{self, ClientConfig};
use sqlexec_core::retry::NoRetryReason;
use std::path::PathBuf;

use commands::{
    run_backoff, run_completions, run_config, run_explain, run_man, run_simulate, ExplainArgs,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sqlexec")]
#[command(about = "sqlexec: retry policy and diagnostics for a remote SQL client", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the XDG config dir.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Terminal reason accepted by `explain --reason`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReasonArg {
    OutOfTime,
    OutOfAttempts,
    NotRetryable,
}

impl From<ReasonArg> for NoRetryReason {
    fn from(r: ReasonArg) -> Self {
        match r {
            ReasonArg::OutOfTime => NoRetryReason::OutOfTime,
            ReasonArg::OutOfAttempts => NoRetryReason::OutOfAttempts,
            ReasonArg::NotRetryable => NoRetryReason::NotRetryable,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Show the config file path and the effective configuration.
    Config,

    /// Print the backoff schedule of the effective retry policy.
    Backoff {
        /// Number of failed attempts to plan for (default: the policy's max attempts).
        #[arg(long, value_name = "N")]
        attempts: Option<u32>,
        /// Pretend the server sent `Retry-After: SECS` on every failure.
        #[arg(long, value_name = "SECS")]
        retry_after: Option<f64>,
        /// Disable jitter so the schedule is reproducible.
        #[arg(long)]
        no_jitter: bool,
    },

    /// Render the diagnostic log line and the user message for a failure.
    Explain(ExplainArgs),

    /// Run the attempt loop against an operation that fails N times, then succeeds.
    Simulate {
        /// Number of failures before the operation succeeds.
        #[arg(long, default_value = "2", value_name = "N")]
        failures: u32,
        /// HTTP status each failure reports.
        #[arg(long, default_value = "503", value_name = "CODE")]
        http_code: u16,
        /// Operation name used in diagnostics.
        #[arg(long, default_value = "ExecuteStatement")]
        method: String,
        /// Rows in the result of the successful attempt.
        #[arg(long, default_value = "25000", value_name = "N")]
        rows: usize,
    },

    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Print the man page (roff).
    Man,
}

fn load_config(path: Option<&PathBuf>) -> Result<ClientConfig> {
    match path {
        Some(p) => config::load_from_path(p),
        None => config::load_or_init(),
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Completions { shell } => return run_completions(shell),
            CliCommand::Man => return run_man(),
            _ => {}
        }

        let cfg = load_config(cli.config.as_ref())?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Config => run_config(&cfg, cli.config.as_deref())?,
            CliCommand::Backoff {
                attempts,
                retry_after,
                no_jitter,
            } => run_backoff(&cfg, attempts, retry_after, no_jitter)?,
            CliCommand::Explain(args) => run_explain(&cfg, &args)?,
            CliCommand::Simulate {
                failures,
                http_code,
                method,
                rows,
            } => run_simulate(&cfg, failures, http_code, &method, rows).await?,
            CliCommand::Completions { .. } | CliCommand::Man => {}
        }

        Ok(())
    }
}
