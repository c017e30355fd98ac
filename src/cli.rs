use crate::config::{Credentials, ResolvedConfig};
use crate::errors::{AppError, AppResult};
use crate::logging;
use crate::models::RunSummary;
use crate::portal::{authenticate, Exporter};
use crate::sources::load_sources;
use crate::utils::format_duration;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info};

// CLI metadata constants
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_ABOUT: &str = env!("CARGO_PKG_DESCRIPTION");

fn command() -> Command<'static> {
    Command::new("annotation-exporter")
        .version(APP_VERSION)
        .about(APP_ABOUT)
        .after_help(
            "Credentials are read from ANNOTATIONS_USERNAME and ANNOTATIONS_PASSWORD\n\
             (a .env file in the working directory is loaded first).\n\
             Example:\n  annotation-exporter --config exporter.toml --output-dir metadata",
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to a TOML configuration file")
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("sources")
                .short('s')
                .long("sources")
                .help("CSV file with 'Source' and 'URL' columns")
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("output_dir")
                .short('o')
                .long("output-dir")
                .help("Directory receiving one folder per source")
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
}

/// Resolves configuration from the parsed arguments.
///
/// Starts from the TOML file when `--config` is given (defaults otherwise), then applies
/// the `--sources` and `--output-dir` overrides.
fn resolve_config(matches: &ArgMatches) -> AppResult<ResolvedConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => ResolvedConfig::from_toml_file(path)?,
        None => ResolvedConfig::default(),
    };
    if let Some(sources) = matches.get_one::<PathBuf>("sources") {
        config.sources_file = sources.clone();
    }
    if let Some(output_dir) = matches.get_one::<PathBuf>("output_dir") {
        config.output_dir = output_dir.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Parses command-line arguments, sets up logging, and runs the export workflow.
///
/// Every error is reported exactly once: on stderr when it happens before logging is
/// set up, through the log afterwards.
///
/// # Returns
///
/// Returns `Ok(())` once every source has been attempted, even if some exports failed.
/// Returns an error if configuration or credentials are invalid, the source list cannot
/// be read, or login fails.
pub async fn cli() -> AppResult<()> {
    let matches = command().get_matches();
    let config = resolve_config(&matches).map_err(report_before_logging)?;
    logging::init(&config).map_err(report_before_logging)?;

    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            error!(error = %e, "Missing credentials");
            return Err(e);
        }
    };

    run_workflow(&config, &credentials).await?;
    Ok(())
}

fn report_before_logging(err: AppError) -> AppError {
    eprintln!("Error: {err}");
    err
}

/// Logs in once and exports every listed source in order.
///
/// Sources are processed strictly one after another. A failed export is logged and the
/// run moves on to the next source; a failed login stops the run before any source is
/// touched.
///
/// # Errors
///
/// Returns an error if the source list cannot be loaded or authentication fails.
pub async fn run_workflow(
    config: &ResolvedConfig,
    credentials: &Credentials,
) -> AppResult<RunSummary> {
    let started = Instant::now();
    info!("Starting downloading process for annotations");

    let sources = load_sources(&config.sources_file).map_err(|e| {
        error!(path = %config.sources_file.display(), error = %e, "Failed to load source list");
        e
    })?;
    info!(sources = sources.len(), "Loaded source list");

    let session = match authenticate(config, credentials).await {
        Ok(session) => session,
        Err(e) => {
            error!(error = %e, "Login failed");
            return Err(match e {
                AppError::AuthFailure(_) => e,
                other => AppError::AuthFailure(other.to_string()),
            });
        }
    };

    let exporter = Exporter::from_config(config);
    let mut summary = RunSummary::default();
    for source in &sources {
        let outcome = exporter.export_source(&session, source).await;
        debug!(source = %source.name, outcome = outcome.label(), "Source finished");
        summary.record(&outcome);
    }

    info!(
        saved = summary.saved,
        skipped = summary.skipped,
        failed = summary.failed,
        elapsed = %format_duration(started.elapsed()),
        "Script finished"
    );
    Ok(summary)
}
