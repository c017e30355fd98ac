use crate::errors::{AppError, AppResult};
use scraper::{Html, Selector};
use std::sync::OnceLock;

const INPUT_SELECTOR: &str = "input";

/// Cached CSS selector for form inputs.
static INPUT_SELECTOR_CACHED: OnceLock<Selector> = OnceLock::new();

/// Extracts the anti-forgery token from a page's markup.
///
/// Looks for the first `<input>` whose `name` attribute equals `field` and returns its
/// `value` attribute. Forms served by the portal embed the token as a hidden input, so
/// this is the value that must be echoed back with the next POST.
///
/// # Errors
///
/// Returns `ParseError` if no such input exists, or if the first matching input
/// carries no `value` attribute.
pub fn extract_csrf_token(html: &str, field: &str) -> AppResult<String> {
    let document = Html::parse_document(html);

    let selector = INPUT_SELECTOR_CACHED.get_or_init(|| {
        Selector::parse(INPUT_SELECTOR).expect("INPUT_SELECTOR is a valid CSS selector")
    });

    let input = document
        .select(selector)
        .find(|el| el.value().attr("name") == Some(field))
        .ok_or_else(|| {
            AppError::ParseError(format!("token not found: no input named '{field}'"))
        })?;

    input
        .value()
        .attr("value")
        .map(str::to_string)
        .ok_or_else(|| {
            AppError::ParseError(format!("token not found: input '{field}' has no value"))
        })
}
