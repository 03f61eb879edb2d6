// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::engine::EnrolmentStore;
use crate::error::CoreError;
use tracing::debug;

/// Shortname of the role granted by every enrolment method.
pub const STUDENT_ROLE: &str = "student";

/// Values resolved once per task and passed down explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileContext {
    pub student_role_id: i64,
}

impl ReconcileContext {
    #[must_use]
    pub const fn new(student_role_id: i64) -> Self {
        Self { student_role_id }
    }

    /// Looks up the student role in the content engine.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::RoleNotFound` if no role has the student shortname.
    pub fn resolve<E: EnrolmentStore>(engine: &mut E) -> Result<Self, CoreError> {
        let role_id: i64 = engine
            .find_role(STUDENT_ROLE)?
            .ok_or_else(|| CoreError::RoleNotFound(STUDENT_ROLE.to_string()))?;
        debug!(role_id, "Resolved student role");
        Ok(Self::new(role_id))
    }
}
