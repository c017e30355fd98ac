use std::fmt;

#[derive(Debug)]
pub enum AppError {
    /// Request did not complete before the configured timeout
    Timeout(String),
    /// Could not connect to the remote host
    ConnectionError(String),
    /// Any other network-layer failure
    NetworkError(String),
    /// Anti-forgery field missing from a fetched page
    ParseError(String),
    /// Login was rejected or the login page could not be used
    AuthFailure(String),
    /// Export request failed or returned no file attachment
    ExportFailure(String),
    /// Invalid URL format
    UrlError(String),
    /// Invalid input or configuration
    InvalidInput(String),
    /// Source list could not be read
    CsvError(String),
    /// IO operation failed
    IoError(String),
}

impl AppError {
    /// Returns true for the transport-level variants (timeout, connection, other network).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AppError::Timeout(_) | AppError::ConnectionError(_) | AppError::NetworkError(_)
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Timeout(msg) => write!(f, "Request timed out: {msg}"),
            AppError::ConnectionError(msg) => write!(f, "Connection error: {msg}"),
            AppError::NetworkError(msg) => write!(f, "Network error: {msg}"),
            AppError::ParseError(msg) => write!(f, "Parse error: {msg}"),
            AppError::AuthFailure(msg) => write!(f, "Login failed: {msg}"),
            AppError::ExportFailure(msg) => write!(f, "Export failed: {msg}"),
            AppError::UrlError(msg) => write!(f, "Invalid URL: {msg}"),
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            AppError::CsvError(msg) => write!(f, "Source list error: {msg}"),
            AppError::IoError(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

// Conversion implementations for common errors
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout(err.to_string())
        } else if err.is_connect() {
            AppError::ConnectionError(err.to_string())
        } else {
            AppError::NetworkError(err.to_string())
        }
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::UrlError(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::CsvError(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

// Custom type alias for Results in this application
pub type AppResult<T> = Result<T, AppError>;
