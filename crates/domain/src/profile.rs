// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Profile field value lists.
//!
//! A multi-value profile field has two encodings:
//! - the field's allowed values, one per line, sorted and unique
//! - each user's selection, values joined by `", "` in the order the user chose them

use crate::types::ProfileField;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Separator used when encoding a user's selection.
pub const SELECTION_SEPARATOR: &str = ", ";

/// The allowed values list of a multi-value profile field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedValues {
    values: Vec<String>,
}

impl AllowedValues {
    /// Parses the newline-delimited stored form. Blank lines are dropped.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let values: Vec<String> = raw
            .unwrap_or_default()
            .lines()
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        let mut allowed: Self = Self { values };
        allowed.normalize();
        allowed
    }

    fn normalize(&mut self) {
        self.values.sort();
        self.values.dedup();
    }

    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// Inserts the value if absent. Returns whether the list changed.
    pub fn add(&mut self, value: &str) -> bool {
        if self.contains(value) {
            return false;
        }
        self.values.push(value.to_string());
        self.normalize();
        true
    }

    /// Removes the value if present. Returns whether the list changed.
    pub fn remove(&mut self, value: &str) -> bool {
        let before: usize = self.values.len();
        self.values.retain(|v| v != value);
        before != self.values.len()
    }

    /// Replaces `old` with `new`, keeping the list sorted and unique.
    ///
    /// When `old` is absent, `new` is still ensured to be present.
    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        if old == new {
            return self.add(new);
        }
        let removed: bool = self.remove(old);
        let added: bool = self.add(new);
        removed || added
    }

    /// Encodes the list for storage.
    #[must_use]
    pub fn encode(&self) -> String {
        self.values.join("\n")
    }
}

/// The values one user selected in a multi-value profile field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSelection {
    values: Vec<String>,
}

impl UserSelection {
    /// Decodes a stored selection. Both `", "` and newlines delimit values.
    #[must_use]
    pub fn parse(data: &str) -> Self {
        let values: Vec<String> = data
            .lines()
            .flat_map(|line| line.split(SELECTION_SEPARATOR))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(String::from)
            .collect();
        Self { values }
    }

    #[must_use]
    pub fn from_values(values: Vec<String>) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// Replaces the first exact occurrence of `old` with `new` at the same position.
    ///
    /// Returns whether a value was replaced.
    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        match self.values.iter().position(|v| v == old) {
            Some(index) => {
                self.values[index] = new.to_string();
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn encode(&self) -> String {
        self.values.join(SELECTION_SEPARATOR)
    }
}

/// A user's profile data as seen by membership rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: i64,
    pub selections: HashMap<ProfileField, UserSelection>,
    /// Date fields as unix timestamps. `0` means unset.
    pub dates: HashMap<ProfileField, i64>,
}

impl UserProfile {
    #[must_use]
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn selection(&self, field: ProfileField) -> Option<&UserSelection> {
        self.selections.get(&field)
    }

    #[must_use]
    pub fn date(&self, field: ProfileField) -> Option<i64> {
        self.dates.get(&field).copied().filter(|ts| *ts != 0)
    }
}
