//! Talking to the annotation portal.
//!
//! Logging in happens once through [`authenticate`], which yields a cookie-carrying
//! [`Session`]. Each source is then exported through [`Exporter::export_source`], which
//! fetches a fresh anti-forgery token from the source page before posting the export form.

mod csrf;
mod export;
mod session;

// Re-export public API
pub use csrf::extract_csrf_token;
pub use export::{export_url, Exporter};
pub use session::{authenticate, Session};
