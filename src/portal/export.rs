use super::csrf::extract_csrf_token;
use super::session::Session;
use crate::config::ResolvedConfig;
use crate::constants::{EXPORT_PATH, OPTIONAL_COLUMNS_FIELD};
use crate::errors::{AppError, AppResult};
use crate::models::{ExportOutcome, SourceRecord};
use reqwest::header::{CONTENT_DISPOSITION, REFERER};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info};
use url::Url;

/// Builds the export endpoint for a source page URL.
///
/// Source URLs are expected to end in `/`; one is appended when missing so that
/// `export/annotations/` lands below the source page instead of replacing its last
/// path segment.
pub fn export_url(source_url: &str) -> AppResult<Url> {
    let mut base = Url::parse(source_url)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(EXPORT_PATH)?)
}

/// Exports annotation files for individual sources.
#[derive(Debug, Clone)]
pub struct Exporter {
    output_dir: PathBuf,
    annotations_filename: String,
    csrf_field: String,
    optional_columns: Vec<String>,
}

impl Exporter {
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            annotations_filename: config.annotations_filename.clone(),
            csrf_field: config.csrf_field.clone(),
            optional_columns: config.optional_columns.clone(),
        }
    }

    /// Returns `<output_dir>/<source>/<annotations_filename>`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for names that are empty or are not a single plain path
    /// component (separators, `.`/`..`, absolute paths).
    pub fn annotations_path(&self, source_name: &str) -> AppResult<PathBuf> {
        let mut components = Path::new(source_name).components();
        let plain = !source_name.contains(&['/', '\\'][..]);
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) if plain => Ok(self
                .output_dir
                .join(source_name)
                .join(&self.annotations_filename)),
            _ => Err(AppError::InvalidInput(format!(
                "Source name '{source_name}' cannot be used as a folder name"
            ))),
        }
    }

    /// Exports one source's annotations.
    ///
    /// If the annotations file already exists the source is skipped without any network
    /// traffic. Otherwise the source page is fetched for a fresh anti-forgery token, the
    /// export form is posted, and a response carrying a `Content-Disposition` header is
    /// written to disk. Every failure is logged here and returned as
    /// [`ExportOutcome::Failed`]; nothing is retried.
    pub async fn export_source(
        &self,
        session: &Session,
        source: &SourceRecord,
    ) -> ExportOutcome {
        match self.try_export(session, source).await {
            Ok(outcome) => outcome,
            Err(err) => {
                log_failure(source, &err);
                ExportOutcome::Failed(err)
            }
        }
    }

    async fn try_export(
        &self,
        session: &Session,
        source: &SourceRecord,
    ) -> AppResult<ExportOutcome> {
        let annotations_path = self.annotations_path(&source.name)?;
        if annotations_path.exists() {
            info!(
                source = %source.name,
                path = %annotations_path.display(),
                "Annotations file already exists, skipping"
            );
            return Ok(ExportOutcome::Skipped(annotations_path));
        }

        let export_url = export_url(&source.url)?;
        info!(source = %source.name, url = %source.url, "Downloading annotations");

        let response = session.client().get(&source.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ExportFailure(format!(
                "HTTP {status} fetching source page"
            )));
        }
        let page = response.text().await?;
        let token = extract_csrf_token(&page, &self.csrf_field)?;

        let mut payload: Vec<(&str, &str)> = self
            .optional_columns
            .iter()
            .map(|column| (OPTIONAL_COLUMNS_FIELD, column.as_str()))
            .collect();
        payload.push((self.csrf_field.as_str(), token.as_str()));

        debug!(source = %source.name, url = %export_url, "Requesting export");
        let response = session
            .client()
            .post(export_url.as_str())
            .header(REFERER, export_url.as_str())
            .form(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() || !response.headers().contains_key(CONTENT_DISPOSITION) {
            return Err(AppError::ExportFailure(format!(
                "no attachment returned (HTTP {status})"
            )));
        }

        let body = response.bytes().await?;
        write_atomically(&annotations_path, &body).await?;

        info!(
            source = %source.name,
            path = %annotations_path.display(),
            bytes = body.len(),
            "Download successful"
        );
        Ok(ExportOutcome::Saved(annotations_path))
    }
}

/// Writes `contents` to a `.part` sibling of `path` and renames it into place,
/// creating the parent directory first.
async fn write_atomically(path: &Path, contents: &[u8]) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(|e| {
            AppError::IoError(format!(
                "Failed to create directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".part");
    let tmp_path = PathBuf::from(tmp_name);

    fs::write(&tmp_path, contents).await.map_err(|e| {
        AppError::IoError(format!(
            "Failed to write temp file {}: {e}",
            tmp_path.display()
        ))
    })?;

    fs::rename(&tmp_path, path).await.map_err(|e| {
        AppError::IoError(format!(
            "Failed to rename temp file {} to {}: {e}",
            tmp_path.display(),
            path.display()
        ))
    })
}

fn log_failure(source: &SourceRecord, err: &AppError) {
    let message = match err {
        AppError::Timeout(_) => "Request timed out",
        AppError::ConnectionError(_) => "Connection error",
        AppError::NetworkError(_) => "Request failed",
        AppError::ParseError(_) => "Anti-forgery token not found on source page",
        _ => "Download failed",
    };
    error!(source = %source.name, url = %source.url, error = %err, "{message}");
}
