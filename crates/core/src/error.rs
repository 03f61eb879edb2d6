// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use enrolsync_domain::{DomainError, ItemRef};

/// Errors raised while reconciling or dispatching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// A task payload lacks a required field.
    MissingField(String),
    /// A task expected a group binding that does not exist.
    GroupNotFound(ItemRef),
    /// The referenced preset does not exist.
    PresetNotFound(i64),
    /// The role with this shortname is not configured.
    RoleNotFound(String),
    /// The content engine failed.
    Engine(String),
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::MissingField(field) => write!(f, "Missing required field: {field}"),
            Self::GroupNotFound(item) => write!(f, "No group is bound to {item}"),
            Self::PresetNotFound(id) => write!(f, "Preset {id} not found"),
            Self::RoleNotFound(shortname) => write!(f, "Role '{shortname}' not found"),
            Self::Engine(msg) => write!(f, "Content engine error: {msg}"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
