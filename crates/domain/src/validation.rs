// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::profile::SELECTION_SEPARATOR;
use crate::types::{Preset, PresetScope};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

/// Validates an item name.
///
/// A name must survive the stored selection format unchanged, so it may not
/// contain the selection separator or a line break, nor start or end with
/// whitespace.
///
/// # Errors
///
/// Returns an error if the name is empty or cannot be stored as a selection.
pub fn validate_item_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidName(String::from(
            "Name cannot be empty",
        )));
    }
    if name.trim() != name {
        return Err(DomainError::InvalidName(format!(
            "Name '{name}' cannot start or end with whitespace"
        )));
    }
    if name.contains(SELECTION_SEPARATOR) || name.contains(['\n', '\r']) {
        return Err(DomainError::InvalidName(format!(
            "Name '{name}' cannot contain '{SELECTION_SEPARATOR}' or a line break"
        )));
    }
    Ok(())
}

/// Validates an item id.
///
/// # Errors
///
/// Returns an error if the id is zero or negative.
pub const fn validate_item_id(item_id: i64) -> Result<(), DomainError> {
    if item_id <= 0 {
        return Err(DomainError::InvalidItemId(item_id));
    }
    Ok(())
}

/// Validates that a preset scope selects at least one entity.
///
/// # Errors
///
/// Returns an error if categories, courses and tags are all empty.
pub fn validate_preset_scope(scope: &PresetScope) -> Result<(), DomainError> {
    if scope.is_empty() {
        return Err(DomainError::EmptyPreset);
    }
    Ok(())
}

/// Validates a preset before it is saved.
///
/// # Errors
///
/// Returns an error if:
/// - The name is empty
/// - No category, course or tag is selected
pub fn validate_preset(preset: &Preset) -> Result<(), DomainError> {
    validate_item_name(&preset.name)?;
    validate_preset_scope(&preset.scope)?;
    Ok(())
}

/// Parses an enrolled-until date.
///
/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates, which are read
/// as midnight UTC.
///
/// # Errors
///
/// Returns an error if the value matches neither format.
pub fn parse_date(value: &str) -> Result<OffsetDateTime, DomainError> {
    if let Ok(ts) = OffsetDateTime::parse(value, &Rfc3339) {
        return Ok(ts);
    }
    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .map(|date| date.midnight().assume_utc())
        .map_err(|e| DomainError::DateParseError {
            date_string: value.to_string(),
            error: e.to_string(),
        })
}
