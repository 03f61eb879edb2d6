// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The item type string is not one of `tag`, `course`, `category`, `preset`.
    InvalidItemType(String),
    /// The profile field shortname is not known.
    InvalidProfileField(String),
    /// Item identifiers must be positive.
    InvalidItemId(i64),
    /// Item names must not be empty.
    InvalidName(String),
    /// A comma-joined identifier list contained a non-integer token.
    InvalidIdList {
        /// The raw list as stored.
        raw: String,
        /// The offending token.
        token: String,
    },
    /// A preset must reference at least one category, course or tag.
    EmptyPreset,
    /// A user selected a value the field does not offer.
    ValueNotAllowed {
        /// The field shortname.
        field: String,
        /// The rejected value.
        value: String,
    },
    /// A date value could not be parsed.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidItemType(value) => write!(
                f,
                "Invalid item type '{value}'. Must be one of tag, course, category, preset"
            ),
            Self::InvalidProfileField(value) => write!(f, "Unknown profile field '{value}'"),
            Self::InvalidItemId(id) => write!(f, "Invalid item id {id}: must be positive"),
            Self::InvalidName(msg) => write!(f, "Invalid name: {msg}"),
            Self::InvalidIdList { raw, token } => {
                write!(f, "Invalid id list '{raw}': '{token}' is not an integer")
            }
            Self::EmptyPreset => write!(
                f,
                "You must select at least one of the following entities: category, course, tag"
            ),
            Self::ValueNotAllowed { field, value } => {
                write!(f, "'{value}' is not an allowed value of field '{field}'")
            }
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
