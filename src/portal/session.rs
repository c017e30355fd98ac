use super::csrf::extract_csrf_token;
use crate::config::{Credentials, ResolvedConfig};
use crate::errors::{AppError, AppResult};
use reqwest::header::REFERER;
use std::time::Duration;
use tracing::{debug, error, info};

/// An HTTP client whose cookie jar carries the portal login.
///
/// Created once per run and shared by every request that follows. The same timeout
/// applies to all requests made through it.
#[derive(Debug, Clone)]
pub struct Session {
    client: reqwest::Client,
}

impl Session {
    /// Builds an unauthenticated session with an empty cookie jar.
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

/// Logs in to the portal and returns the authenticated session.
///
/// Fetches the login page, reads the anti-forgery token from it, and posts the
/// credentials together with that token back to the same URL.
///
/// # Errors
///
/// - `AuthFailure` if either request fails at the transport level or returns a
///   non-success status. Nothing is retried.
/// - `ParseError` if the login page carries no anti-forgery field.
pub async fn authenticate(
    config: &ResolvedConfig,
    credentials: &Credentials,
) -> AppResult<Session> {
    let session = Session::new(config.request_timeout())?;
    let login_url = config.login_url.as_str();

    debug!(url = login_url, "Fetching login page");
    let response = session
        .client
        .get(login_url)
        .send()
        .await
        .map_err(|e| login_transport_error("Login page request failed", e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::AuthFailure(format!(
            "HTTP {status} fetching login page"
        )));
    }

    let page = response
        .text()
        .await
        .map_err(|e| login_transport_error("Failed to read login page", e))?;
    let token = extract_csrf_token(&page, &config.csrf_field)?;

    let payload = [
        ("username", credentials.username.as_str()),
        ("password", credentials.password.as_str()),
        ("stay_signed_in", "on"),
        (config.csrf_field.as_str(), token.as_str()),
    ];

    let response = session
        .client
        .post(login_url)
        .header(REFERER, login_url)
        .form(&payload)
        .send()
        .await
        .map_err(|e| login_transport_error("Login request failed", e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::AuthFailure(format!("HTTP {status} from login form")));
    }

    info!(username = %credentials.username, "Login successful");
    Ok(session)
}

fn login_transport_error(context: &str, err: reqwest::Error) -> AppError {
    let err = AppError::from(err);
    error!(error = %err, "{context}");
    AppError::AuthFailure(format!("{context}: {err}"))
}
