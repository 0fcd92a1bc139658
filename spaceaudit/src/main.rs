//! SpaceAPI directory audit
//!
//! Fetches every endpoint listed in the SpaceAPI directory, checks it, and
//! mails the operators of non-conforming endpoints. Run output goes to
//! stdout, logs to stderr.

#![forbid(unsafe_code)]

mod report;

use anyhow::{Context, Result, bail};
use chrono::{Months, Utc};
use clap::Parser;
use spaceaudit_common::config::{Severity, validate_config};
use spaceaudit_common::{
    AuditConfig, Auditor, DryRunMailer, Fetcher, Mailer, Notifier, SendmailMailer, UreqClient,
    Validator, init_logging,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};

#[derive(Parser)]
#[command(name = "spaceaudit")]
#[command(author, version, about = "Audit SpaceAPI endpoints and notify their operators")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the directory URL
    #[arg(long)]
    directory_url: Option<String>,

    /// Log mail instead of sending it
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Raise fetch failures as issues
    #[arg(long)]
    notify_fetch_errors: bool,

    /// Print the run report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = AuditConfig::load(cli.config.as_deref())?;
    let env_overrides = config.apply_env();
    apply_cli(&mut config, &cli);

    let mut log_config = config.log_config().with_json(cli.json_logs);
    if cli.verbose {
        log_config = log_config.with_level("debug");
    }
    init_logging(&log_config).context("failed to initialize logging")?;

    for var in &env_overrides.applied {
        debug!("Configuration overridden by {}", var);
    }
    for err in &env_overrides.errors {
        warn!("Ignoring environment override: {}", err);
    }

    let warnings = validate_config(&config);
    for warning in &warnings {
        match warning.severity {
            Severity::Warning => warn!("{}", warning),
            Severity::Error => error!("{}", warning),
        }
    }
    if warnings.iter().any(|w| w.severity == Severity::Error) {
        bail!("invalid configuration");
    }

    if config.notify.dry_run {
        info!("Dry run, no mail will be sent");
        run(&cli, &config, DryRunMailer)
    } else {
        run(&cli, &config, SendmailMailer::new(&config.notify.sendmail_path))
    }
}

fn apply_cli(config: &mut AuditConfig, cli: &Cli) {
    if let Some(url) = &cli.directory_url {
        config.directory.url = url.clone();
    }
    if cli.dry_run {
        config.notify.dry_run = true;
    }
    if cli.notify_fetch_errors {
        config.notify.notify_fetch_errors = true;
    }
}

fn run<M: Mailer>(cli: &Cli, config: &AuditConfig, mailer: M) -> Result<ExitCode> {
    let auditor = Auditor::new(
        Fetcher::new(UreqClient, config.fetch_policy()),
        Validator::new(config.validation_policy()),
        Notifier::new(mailer, config.message_template()),
    )
    .with_fetch_error_notifications(config.notify.notify_fetch_errors);

    let now = Utc::now();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if !cli.json {
        writeln!(out, "\n## Validate Space api json file {}", now.format("%Y-%m-%d %H:%M"))?;
        let cutoff = now
            .checked_sub_months(Months::new(config.validation.staleness_months))
            .unwrap_or(now);
        writeln!(out, "Date to old : {}", cutoff.format("%Y-%m-%d %H:%M"))?;
    }

    let entries = match auditor.load_directory(&config.directory.url) {
        Ok(entries) => entries,
        Err(e) => {
            error!("{}", e);
            writeln!(out, "{e}")?;
            return Ok(ExitCode::FAILURE);
        }
    };
    info!("Loaded {} directory entries", entries.len());

    let mut render_error = None;
    let run_report = auditor.run_with(&entries, now, |entry| {
        if cli.json || render_error.is_some() {
            return;
        }
        if let Err(e) = report::render_entry(&mut out, entry) {
            render_error = Some(e);
        }
    });
    if let Some(e) = render_error {
        return Err(e).context("failed to write run output");
    }

    if cli.json {
        serde_json::to_writer_pretty(&mut out, &run_report)?;
        writeln!(out)?;
    } else {
        report::render_summary(&mut out, &run_report)?;
    }

    Ok(ExitCode::SUCCESS)
}
