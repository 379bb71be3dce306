use crate::error::{AppError, Result};

const MAX_SERVER_NAME_CHARS: usize = 64;

pub fn validate_server_id(server_id: &str) -> Result<()> {
    if uuid::Uuid::parse_str(server_id).is_err() {
        return Err(AppError::invalid_server_id(server_id));
    }
    Ok(())
}

/// Returns the trimmed name.
pub fn validate_server_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::invalid_server_name("Server name is required"));
    }
    if name.chars().count() > MAX_SERVER_NAME_CHARS {
        return Err(AppError::invalid_server_name(format!(
            "Server name must be at most {} characters",
            MAX_SERVER_NAME_CHARS
        )));
    }
    Ok(name)
}

/// Reject blank values for a required text field, returning the trimmed value.
pub fn require_text<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::field_required(field));
    }
    Ok(value)
}
