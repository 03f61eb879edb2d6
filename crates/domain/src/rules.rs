// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::profile::UserProfile;
use crate::types::{ItemType, ProfileField};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A single predicate of a membership rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    /// One of the values the user selected in `field` equals `value`.
    ProfileFieldEquals { field: ProfileField, value: String },
    /// The date in `field` is unset or later than now.
    DateEmptyOrFuture { field: ProfileField },
}

impl Condition {
    #[must_use]
    pub fn matches(&self, profile: &UserProfile, now: OffsetDateTime) -> bool {
        match self {
            Self::ProfileFieldEquals { field, value } => profile
                .selection(*field)
                .is_some_and(|selection| selection.contains(value)),
            Self::DateEmptyOrFuture { field } => profile
                .date(*field)
                .is_none_or(|ts| ts > now.unix_timestamp()),
        }
    }

    /// Stable name used when persisting conditions.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ProfileFieldEquals { .. } => "profile_field_equals",
            Self::DateEmptyOrFuture { .. } => "date_empty_or_future",
        }
    }
}

/// A dynamic-membership predicate bound to one group.
///
/// Lifecycle: absent -> created disabled -> enabled -> (renamed)* -> deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipRule {
    /// `None` until the rule has been persisted.
    pub rule_id: Option<i64>,
    pub group_id: i64,
    pub name: String,
    pub enabled: bool,
    pub conditions: Vec<Condition>,
}

impl MembershipRule {
    /// Builds the standard two-condition rule for an item's group, not yet enabled.
    #[must_use]
    pub fn for_item(group_id: i64, item_type: ItemType, name: &str) -> Self {
        Self {
            rule_id: None,
            group_id,
            name: name.to_string(),
            enabled: false,
            conditions: vec![
                Condition::ProfileFieldEquals {
                    field: item_type.profile_field(),
                    value: name.to_string(),
                },
                Condition::DateEmptyOrFuture {
                    field: ProfileField::EnrolledUntil,
                },
            ],
        }
    }

    /// Updates the rule name and the comparison value of its equality condition.
    ///
    /// Date conditions are left untouched.
    pub fn rename(&mut self, new_name: &str) {
        self.name = new_name.to_string();
        for condition in &mut self.conditions {
            if let Condition::ProfileFieldEquals { value, .. } = condition {
                *value = new_name.to_string();
            }
        }
    }

    /// Whether a user with this profile belongs to the rule's group.
    #[must_use]
    pub fn matches(&self, profile: &UserProfile, now: OffsetDateTime) -> bool {
        self.enabled && self.conditions.iter().all(|c| c.matches(profile, now))
    }
}
