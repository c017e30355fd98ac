//! Common test utilities for integration tests: an in-process fake annotation portal.
//!
//! Routes:
//! - `GET  /accounts/login/` serves a login form carrying [`LOGIN_TOKEN`]
//! - `POST /accounts/login/` sets the session cookie when the token matches
//! - `GET  /<source>/` serves the source page with [`SOURCE_TOKEN`], but only to
//!   requests carrying the session cookie
//! - `POST /<source>/export/annotations/` returns [`EXPORT_BODY`] as an attachment
//!
//! Source name prefixes pick a failure mode:
//! - `denied`: the export returns an HTML page instead of an attachment
//! - `slow`: the source page is delayed by [`SLOW_DELAY`]
//! - `missing`: the source page answers 404
//! - `stalled`: the export response is delayed by [`SLOW_DELAY`]
//! - `broken`: the export answers 500 while still sending `Content-Disposition`

use annotation_exporter::config::ResolvedConfig;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::Router;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

#[allow(dead_code)]
pub const LOGIN_TOKEN: &str = "login-token-7f3a9c";
#[allow(dead_code)]
pub const SOURCE_TOKEN: &str = "source-token-b21e04";
#[allow(dead_code)]
pub const SESSION_COOKIE: &str = "sessionid=portal-session-1";
#[allow(dead_code)]
pub const EXPORT_BODY: &[u8] = b"id,label\n1,coral\n";
#[allow(dead_code)]
pub const SLOW_DELAY: Duration = Duration::from_secs(5);

/// How the fake portal treats the login form.
#[derive(Debug, Clone)]
pub struct PortalBehavior {
    pub login_status: StatusCode,
    pub login_page_has_token: bool,
}

impl Default for PortalBehavior {
    fn default() -> Self {
        Self {
            login_status: StatusCode::OK,
            login_page_has_token: true,
        }
    }
}

/// One request as seen by the fake portal.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: String,
    pub cookie: Option<String>,
    pub referer: Option<String>,
}

impl RecordedRequest {
    /// Decoded `application/x-www-form-urlencoded` body, in order.
    #[allow(dead_code)]
    pub fn form(&self) -> Vec<(String, String)> {
        url::form_urlencoded::parse(self.body.as_bytes())
            .into_owned()
            .collect()
    }

    #[allow(dead_code)]
    pub fn form_value(&self, key: &str) -> Option<String> {
        self.form()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

pub struct Portal {
    behavior: PortalBehavior,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl Portal {
    #[allow(dead_code)]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    pub fn requests_to(&self, method: Method, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }
}

/// A running fake portal and its base URL (no trailing slash).
pub struct TestPortal {
    pub base_url: String,
    pub portal: Arc<Portal>,
}

#[allow(dead_code)]
impl TestPortal {
    pub fn login_url(&self) -> String {
        format!("{}/accounts/login/", self.base_url)
    }

    pub fn source_url(&self, name: &str) -> String {
        format!("{}/{name}/", self.base_url)
    }

    /// Configuration pointing at this portal and writing below `root`.
    pub fn config(&self, root: &Path) -> ResolvedConfig {
        ResolvedConfig {
            login_url: self.login_url(),
            sources_file: root.join("sources_data.csv"),
            output_dir: root.join("metadata"),
            log_file: root.join("scrape_annotations.log"),
            request_timeout_secs: 1,
            ..ResolvedConfig::default()
        }
    }
}

#[allow(dead_code)]
pub async fn start_portal(behavior: PortalBehavior) -> TestPortal {
    let portal = Arc::new(Portal {
        behavior,
        requests: Mutex::new(Vec::new()),
    });
    let app = Router::new().fallback(handle).with_state(portal.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestPortal {
        base_url: format!("http://{addr}"),
        portal,
    }
}

/// An address nothing listens on.
#[allow(dead_code)]
pub async fn closed_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

#[allow(dead_code)]
pub fn write_sources(path: &Path, rows: &[(&str, &str)]) {
    let mut contents = String::from("Source,URL\n");
    for (name, url) in rows {
        contents.push_str(&format!("{name},{url}\n"));
    }
    std::fs::write(path, contents).unwrap();
}

async fn handle(
    State(portal): State<Arc<Portal>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let request = RecordedRequest {
        method: method.clone(),
        path: uri.path().to_string(),
        body,
        cookie: header_value(header::COOKIE),
        referer: header_value(header::REFERER),
    };
    portal.requests.lock().unwrap().push(request.clone());

    let logged_in = request
        .cookie
        .as_deref()
        .map_or(false, |c| c.contains(SESSION_COOKIE));
    let segments: Vec<&str> = request.path.split('/').filter(|s| !s.is_empty()).collect();

    match (method.as_str(), segments.as_slice()) {
        ("GET", ["accounts", "login"]) => {
            let token_input = if portal.behavior.login_page_has_token {
                format!(
                    r#"<input type="hidden" name="csrfmiddlewaretoken" value="{LOGIN_TOKEN}">"#
                )
            } else {
                String::new()
            };
            Html(format!(
                r#"<html><body><form method="post">{token_input}
                <input type="text" name="username"><input type="password" name="password">
                </form></body></html>"#
            ))
            .into_response()
        }
        ("POST", ["accounts", "login"]) => {
            let status = portal.behavior.login_status;
            let token_ok =
                request.form_value("csrfmiddlewaretoken").as_deref() == Some(LOGIN_TOKEN);
            if status.is_success() && token_ok {
                (
                    status,
                    [(header::SET_COOKIE, format!("{SESSION_COOKIE}; Path=/"))],
                    Html("<html><body>Welcome</body></html>"),
                )
                    .into_response()
            } else if status.is_success() {
                (StatusCode::FORBIDDEN, Html("CSRF verification failed")).into_response()
            } else {
                (status, Html("<html><body>Login rejected</body></html>")).into_response()
            }
        }
        ("GET", [name]) => {
            if name.starts_with("slow") {
                tokio::time::sleep(SLOW_DELAY).await;
            }
            if name.starts_with("missing") {
                return (StatusCode::NOT_FOUND, Html("<html><body>Not found</body></html>"))
                    .into_response();
            }
            if !logged_in {
                return Html("<html><body>Please sign in</body></html>").into_response();
            }
            Html(format!(
                r#"<html><body><h1>{name}</h1><form method="post" action="export/annotations/">
                <input type="hidden" name="csrfmiddlewaretoken" value="{SOURCE_TOKEN}">
                <input type="checkbox" name="optional_columns" value="annotator_info">
                </form></body></html>"#
            ))
            .into_response()
        }
        ("POST", [name, "export", "annotations"]) => {
            if !logged_in || name.starts_with("denied") {
                return Html("<html><body>You don't have permission</body></html>")
                    .into_response();
            }
            if name.starts_with("stalled") {
                tokio::time::sleep(SLOW_DELAY).await;
            }
            let status = if name.starts_with("broken") {
                StatusCode::INTERNAL_SERVER_ERROR
            } else {
                StatusCode::OK
            };
            Response::builder()
                .status(status)
                .header(header::CONTENT_TYPE, "text/csv")
                .header(
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=annotations.csv",
                )
                .body(Body::from(EXPORT_BODY))
                .unwrap()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}
