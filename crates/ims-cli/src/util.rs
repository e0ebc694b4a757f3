use crate::error::invalid_input;
use anyhow::Result;
use ims_core::{FieldErrors, InteractionId};
use std::str::FromStr;

pub fn parse_interaction_id(raw: &str) -> Result<InteractionId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid_input("interaction id cannot be empty"));
    }
    match InteractionId::from_str(trimmed) {
        Ok(id) if id.get() > 0 => Ok(id),
        _ => Err(invalid_input(format!("invalid interaction id: {}", trimmed))),
    }
}

/// Prints one `field: message` line per error to stderr.
pub fn report_field_errors(errors: &FieldErrors) {
    for (field, message) in errors.iter() {
        eprintln!("  {}: {}", field.api_name(), message);
    }
}

pub fn or_dash(value: Option<&str>) -> &str {
    match value {
        Some(text) if !text.is_empty() => text,
        _ => "-",
    }
}
