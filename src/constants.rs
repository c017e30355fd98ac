// Portal endpoints
pub const DEFAULT_LOGIN_URL: &str = "https://coralnet.ucsd.edu/accounts/login/";
pub const EXPORT_PATH: &str = "export/annotations/";

// Form fields
pub const DEFAULT_CSRF_FIELD: &str = "csrfmiddlewaretoken";
pub const OPTIONAL_COLUMNS_FIELD: &str = "optional_columns";
pub const DEFAULT_OPTIONAL_COLUMNS: &[&str] = &[
    "annotator_info",
    "machine_suggestions",
    "metadata_date_aux",
    "metadata_other",
];

// Local files
pub const DEFAULT_SOURCES_FILE: &str = "sources_data.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "metadata";
pub const DEFAULT_ANNOTATIONS_FILENAME: &str = "annotations.csv";
pub const DEFAULT_LOG_FILE: &str = "scrape_annotations.log";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// Credential environment variables
pub const USERNAME_ENV: &str = "ANNOTATIONS_USERNAME";
pub const PASSWORD_ENV: &str = "ANNOTATIONS_PASSWORD";

// Source list columns
pub const SOURCE_COLUMN: &str = "Source";
pub const URL_COLUMN: &str = "URL";
