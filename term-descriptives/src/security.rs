//! Identifier checks for SQL assembled by the session helpers.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{DescriptivesError, Result};

const MAX_IDENTIFIER_LENGTH: usize = 128;

static IDENTIFIER_REGEX: Lazy<Regex> = Lazy::new(|| {
    // Hard-coded pattern, always valid.
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*(\.[a-zA-Z_][a-zA-Z0-9_]*)*$")
        .expect("Hard-coded regex pattern should be valid")
});

/// Validates a table or column name before it is spliced into SQL.
///
/// Accepts letters, digits and underscores, optionally dot-qualified, and
/// nothing that could terminate or comment out a statement.
pub fn validate_identifier(identifier: &str) -> Result<()> {
    if identifier.trim().is_empty() {
        return Err(DescriptivesError::invalid_argument(
            "SQL identifier cannot be empty or whitespace-only",
        ));
    }
    if identifier.len() > MAX_IDENTIFIER_LENGTH {
        return Err(DescriptivesError::invalid_argument(format!(
            "SQL identifier too long (max {MAX_IDENTIFIER_LENGTH} characters)"
        )));
    }
    if !IDENTIFIER_REGEX.is_match(identifier) {
        return Err(DescriptivesError::invalid_argument(format!(
            "Invalid SQL identifier format: '{identifier}'"
        )));
    }
    Ok(())
}

/// Validates and double-quotes each dot-separated part of an identifier.
pub fn quote_identifier(identifier: &str) -> Result<String> {
    validate_identifier(identifier)?;
    Ok(identifier
        .split('.')
        .map(|part| format!("\"{part}\""))
        .collect::<Vec<_>>()
        .join("."))
}
