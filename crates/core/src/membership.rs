// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::engine::{GroupStore, ProfileStore, RuleStore};
use crate::error::CoreError;
use enrolsync_domain::{GroupBinding, UserProfile};
use time::OffsetDateTime;

/// Groups whose enabled rule matches the user's profile at `now`.
///
/// # Errors
///
/// Returns an error if the rule, profile or group store fails.
pub fn groups_for_user<E: GroupStore + ProfileStore + RuleStore>(
    engine: &mut E,
    user_id: i64,
    now: OffsetDateTime,
) -> Result<Vec<GroupBinding>, CoreError> {
    let profile: UserProfile = engine.user_profile(user_id)?;
    let mut groups: Vec<GroupBinding> = Vec::new();
    for rule in engine.list_rules()? {
        if !rule.matches(&profile, now) {
            continue;
        }
        if let Some(group) = engine.get_group(rule.group_id)? {
            groups.push(group);
        }
    }
    groups.sort_by_key(|g| g.group_id);
    groups.dedup_by_key(|g| g.group_id);
    Ok(groups)
}
