// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use enrolsync::CoreError;
use enrolsync_domain::DomainError;
use enrolsync_persistence::PersistenceError;

/// Failures of the actor checks performed before every handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The actor id or role could not be accepted.
    AuthenticationFailed {
        reason: String,
    },
    /// The actor's role is too weak for `action`.
    Unauthorized {
        action: String,
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// Errors returned to administrative callers.
///
/// Lower layers never surface directly; each is translated into one of
/// these variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The caller's identity could not be established.
    AuthenticationFailed {
        reason: String,
    },
    /// The caller's role does not permit the action.
    Unauthorized {
        action: String,
        required_role: String,
    },
    /// A preset or catalog rule rejected the change, e.g. a preset with no
    /// categories, courses or tags.
    DomainRuleViolation {
        /// Short machine-readable rule name such as `preset_not_empty`.
        rule: String,
        message: String,
    },
    /// A request field failed validation.
    InvalidInput {
        field: String,
        message: String,
    },
    /// A preset, task or catalog record does not exist.
    ResourceNotFound {
        /// `Preset`, `Task`, `Group` or `Record`.
        resource_type: String,
        message: String,
    },
    /// Engine or storage failure.
    Internal { message: String },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidItemType(value) => ApiError::InvalidInput {
            field: String::from("item_type"),
            message: format!("Unknown item type '{value}'"),
        },
        DomainError::InvalidProfileField(value) => ApiError::InvalidInput {
            field: String::from("field"),
            message: format!("'{value}' is not a selectable profile field"),
        },
        DomainError::InvalidItemId(id) => ApiError::InvalidInput {
            field: String::from("id"),
            message: format!("Id {id} must be positive"),
        },
        DomainError::InvalidName(msg) => ApiError::InvalidInput {
            field: String::from("name"),
            message: msg,
        },
        DomainError::InvalidIdList { raw, token } => ApiError::InvalidInput {
            field: String::from("ids"),
            message: format!("'{token}' in '{raw}' is not an integer"),
        },
        err @ DomainError::EmptyPreset => ApiError::DomainRuleViolation {
            rule: String::from("preset_not_empty"),
            message: err.to_string(),
        },
        err @ DomainError::ValueNotAllowed { .. } => ApiError::DomainRuleViolation {
            rule: String::from("allowed_values"),
            message: err.to_string(),
        },
        DomainError::DateParseError { date_string, error } => ApiError::InvalidInput {
            field: String::from("enrolled_until"),
            message: format!("Failed to parse date '{date_string}': {error}"),
        },
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::PresetNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Preset"),
            message: format!("Preset {id} does not exist"),
        },
        CoreError::GroupNotFound(item) => ApiError::ResourceNotFound {
            resource_type: String::from("Group"),
            message: format!("No group is bound to {item}"),
        },
        err @ (CoreError::MissingField(_) | CoreError::RoleNotFound(_) | CoreError::Engine(_)) => {
            ApiError::Internal {
                message: err.to_string(),
            }
        }
    }
}

/// Translates a persistence error into an API error.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::InvalidInput(domain_err) => translate_domain_error(domain_err),
        PersistenceError::Reconciliation(core_err) => translate_core_error(core_err),
        PersistenceError::PresetNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Preset"),
            message: format!("Preset {id} does not exist"),
        },
        PersistenceError::TaskNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Task"),
            message: format!("No failed task with id {id}"),
        },
        PersistenceError::NotFound(msg) => ApiError::ResourceNotFound {
            resource_type: String::from("Record"),
            message: msg,
        },
        PersistenceError::Conflict(msg) => ApiError::DomainRuleViolation {
            rule: String::from("catalog_integrity"),
            message: msg,
        },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
