//! Extraction of the course `ENV` object from a saved grades page.

use anyhow::{Context, Result, anyhow};
use regex::Regex;
use std::sync::LazyLock;

use crate::grading::types::CourseEnv;

static ENV_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"ENV\s*=\s*(\{[\s\S]*?\})\s*;\s*BRANDABLE_CSS_HANDLEBARS_INDEX\s*=")
        .expect("ENV pattern is valid")
});

/// Returns the raw JSON text of the `ENV = {...};` assignment in `page`.
///
/// # Errors
///
/// Returns an error if the page has no `ENV` assignment.
pub fn extract_env_json(page: &str) -> Result<&str> {
    ENV_ASSIGNMENT
        .captures(page)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| anyhow!("No ENV found in page"))
}

/// Parses a course `ENV` from either a full grades page or bare JSON.
///
/// # Errors
///
/// Returns an error if no `ENV` object can be located, or if it is missing
/// fields the calculation needs.
pub fn parse_env(input: &str) -> Result<CourseEnv> {
    let json = if input.trim_start().starts_with('{') {
        input
    } else {
        extract_env_json(input)?
    };

    serde_json::from_str(json).context("ENV is not a valid course grades object")
}
