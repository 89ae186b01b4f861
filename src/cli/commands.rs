//! Command implementations

use std::io;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::json;
use tracing::{info, warn};

use crate::adapters::TomlConfigAdapter;
use crate::app::{AppContainer, CompressionSession, DefaultAppContainer, JobUpdate};
use crate::cli::args::{CompressArgs, ConfigArgs, ValidateArgs};
use crate::config_initialization::AppConfig;
use crate::domain::model::{CompressionJobRecord, JobStatus, ValidationResult};
use crate::domain::rules::FileValidator;
use crate::output::{ConsoleReporter, JobReporter, JsonReporter};
use crate::utils::format_file_size;
use crate::utils::media_type::probe_candidate;

/// Execute the compress command
pub async fn compress(args: CompressArgs, config: AppConfig) -> Result<()> {
    info!("Starting compress operation");
    info!("Input: {}", args.input.display());

    let container = DefaultAppContainer::new(config).context("Invalid configuration")?;
    let candidate = probe_candidate(&args.input, args.mime.as_deref())
        .await
        .with_context(|| format!("Cannot read {}", args.input.display()))?;

    let mut reporter: Box<dyn JobReporter> = if args.json {
        Box::new(JsonReporter::new(io::stdout()))
    } else {
        Box::new(ConsoleReporter::new(io::stdout()))
    };

    let mut session = container.session();
    let file = session.submit_file(candidate).await?;
    if let Some(error) = file.validation_error() {
        reporter.on_rejected(&file)?;
        bail!("{} was rejected: {}", file.name, error.message);
    }

    let mut retries_left = args.retries;
    loop {
        let started = session
            .current_job()
            .cloned()
            .context("Compression did not start")?;
        reporter.on_start(&started)?;

        let outcome = drive_to_terminal(&mut session, reporter.as_mut()).await?;
        match outcome.status {
            JobStatus::Complete => {
                reporter.on_complete(&outcome)?;
                info!("Compress operation completed successfully");
                return Ok(());
            }
            JobStatus::Error if retries_left > 0 => {
                reporter.on_error(&outcome, true)?;
                retries_left -= 1;
                warn!("Attempt failed, {} retries left", retries_left);
                session.retry().await?;
            }
            JobStatus::Error => {
                reporter.on_error(&outcome, false)?;
                let message = outcome
                    .error
                    .map(|error| error.message)
                    .unwrap_or_else(|| "Compression failed".to_string());
                bail!(message);
            }
            JobStatus::Compressing => bail!("Compression stopped before finishing"),
        }
    }
}

/// Feed progress to the reporter until the current job is terminal.
///
/// Ctrl-C cancels the job and aborts the command.
async fn drive_to_terminal(
    session: &mut CompressionSession,
    reporter: &mut dyn JobReporter,
) -> Result<CompressionJobRecord> {
    loop {
        let update = tokio::select! {
            update = session.next_update() => update,
            _ = tokio::signal::ctrl_c() => {
                session.clear().await;
                bail!("Interrupted");
            }
        };

        match update {
            Some(JobUpdate::Progress(record)) => reporter.on_progress(&record)?,
            Some(terminal) => return Ok(terminal.record().clone()),
            None => {
                return session
                    .current_job()
                    .cloned()
                    .context("Job was cleared before finishing")
            }
        }
    }
}

/// Execute the validate command
pub async fn validate(args: ValidateArgs, config: AppConfig) -> Result<()> {
    let policy = config.validation_policy().context("Invalid [validation] settings")?;
    let candidate = probe_candidate(&args.input, args.mime.as_deref())
        .await
        .with_context(|| format!("Cannot read {}", args.input.display()))?;

    let result = FileValidator::validate(&candidate, &policy);
    let file = candidate.validated(result.clone());

    if args.json {
        let report = json!({
            "valid": result.is_valid(),
            "file": file,
            "max_size_mb": policy.max_size_mb(),
            "allowed_types": policy.allowed_types,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize validation result")?
        );
    } else {
        match &result {
            ValidationResult::Valid => println!(
                "Valid: {} ({}, {})",
                file.name,
                file.mime_type,
                format_file_size(file.size)
            ),
            ValidationResult::Invalid(error) => {
                println!("Invalid: {} ({})", file.name, error.message)
            }
        }
    }

    match result {
        ValidationResult::Valid => Ok(()),
        ValidationResult::Invalid(error) => bail!("{} ({})", error.message, error.kind),
    }
}

/// Execute the config command.
///
/// With `--write` the configuration is saved to `config_path`, or to the
/// platform default location when no file was given.
pub fn show_config(args: ConfigArgs, config: &AppConfig, config_path: Option<&Path>) -> Result<()> {
    let rendered = if args.json {
        serde_json::to_string_pretty(config).context("Failed to serialize configuration")?
    } else {
        TomlConfigAdapter::serialize(config).context("Failed to serialize configuration")?
    };
    println!("{}", rendered);

    if args.write {
        let adapter = match config_path {
            Some(path) => TomlConfigAdapter::with_path(path),
            None => TomlConfigAdapter::new(),
        };
        let target = adapter.config_file_path();
        adapter
            .save(config)
            .with_context(|| format!("Failed to write {}", target.display()))?;
        info!("Configuration written to {}", target.display());
        eprintln!("Saved configuration to {}", target.display());
    }
    Ok(())
}
