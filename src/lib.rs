//! annotation-exporter library
//!
//! This crate provides the core functionality for the `annotation-exporter` binary:
//! logging in to a session-based annotation portal and saving each source's
//! annotation export to disk.
//!
//! ## Overview
//!
//! - [`portal`] - Login session, anti-forgery token extraction, and per-source export
//! - [`sources`] - Reads the list of sources (`Source`, `URL`) from CSV
//! - [`cli`] - Command-line entry point and the sequential export workflow
//! - [`config`] - TOML configuration and environment credentials
//! - [`logging`] - Console and log-file output
//! - [`models`] - Source records and export outcomes
//! - [`errors`] - Error types used throughout the application
//!
//! ## Example Usage
//!
//! ```no_run
//! use annotation_exporter::{cli, config::{Credentials, ResolvedConfig}, errors::AppResult};
//!
//! # async fn example() -> AppResult<()> {
//! let config = ResolvedConfig::default();
//! let credentials = Credentials::from_env()?;
//! let summary = cli::run_workflow(&config, &credentials).await?;
//! println!("{} saved, {} skipped, {} failed", summary.saved, summary.skipped, summary.failed);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod logging;
pub mod models;
pub mod portal;
pub mod sources;
pub mod utils;
