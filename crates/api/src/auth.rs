// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types.

use enrolsync_events::Actor;

use crate::error::AuthError;

/// Actor roles for authorization.
///
/// Roles apply to operators of enrolsync, never to the users whose
/// enrolments it manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Site administrators: may change presets, the catalog, user profiles
    /// and the task queue.
    Admin,
    /// Read-only operators.
    Viewer,
}

impl Role {
    /// Parses a role name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns an error for anything other than `admin` or `viewer`.
    pub fn parse(value: &str) -> Result<Self, AuthError> {
        match value.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "viewer" => Ok(Self::Viewer),
            _ => Err(AuthError::AuthenticationFailed {
                reason: format!("Invalid role: '{value}'. Must be 'admin' or 'viewer'"),
            }),
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Viewer => "viewer",
        }
    }
}

/// An authenticated actor with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The role assigned to this actor.
    pub role: Role,
}

impl AuthenticatedActor {
    #[must_use]
    pub const fn new(id: String, role: Role) -> Self {
        Self { id, role }
    }

    /// The actor recorded on preset audit columns and events.
    #[must_use]
    pub fn to_event_actor(&self) -> Actor {
        Actor::new(self.id.clone(), self.role.as_str().to_string())
    }
}

/// Role checks for state-changing operations.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks that the actor may perform an administrative `action`.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Viewer => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("Admin"),
            }),
        }
    }
}

/// Builds an authenticated actor from caller-supplied credentials.
///
/// Identity is asserted by the caller; there is no session store.
///
/// # Errors
///
/// Returns an error if the actor id is blank or the role is unknown.
pub fn authenticate_stub(actor_id: &str, role: &str) -> Result<AuthenticatedActor, AuthError> {
    if actor_id.trim().is_empty() {
        return Err(AuthError::AuthenticationFailed {
            reason: String::from("actor_id must not be empty"),
        });
    }
    let role: Role = Role::parse(role)?;
    Ok(AuthenticatedActor::new(actor_id.to_string(), role))
}
