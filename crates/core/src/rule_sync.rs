// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Rule Synchronizer: exactly one enabled rule per group binding.

use crate::engine::RuleStore;
use crate::error::CoreError;
use enrolsync_domain::{GroupBinding, MembershipRule};
use tracing::{debug, info};

/// Creates the group's rule if it has none, then makes sure it is enabled.
///
/// # Errors
///
/// Returns an error if the rule store fails.
pub fn ensure_rule<E: RuleStore>(
    engine: &mut E,
    group: &GroupBinding,
    name: &str,
) -> Result<(), CoreError> {
    let existing: Vec<MembershipRule> = engine.find_rules(group.group_id)?;

    if let Some(rule) = existing.first() {
        if rule.enabled {
            debug!(group_id = group.group_id, "Rule already present");
            return Ok(());
        }
        if let Some(rule_id) = rule.rule_id {
            engine.set_rule_enabled(rule_id, true)?;
            info!(group_id = group.group_id, rule_id, "Enabled existing rule");
        }
        return Ok(());
    }

    let rule: MembershipRule = MembershipRule::for_item(group.group_id, group.item.item_type, name);
    let rule_id: i64 = engine.create_rule(&rule)?;
    engine.set_rule_enabled(rule_id, true)?;
    info!(group_id = group.group_id, rule_id, name, "Created rule");
    Ok(())
}

/// Renames the group's rule and its equality condition. Date conditions stay.
///
/// # Errors
///
/// Returns an error if the rule store fails.
pub fn rename_rule<E: RuleStore>(
    engine: &mut E,
    group: &GroupBinding,
    new_name: &str,
) -> Result<(), CoreError> {
    for mut rule in engine.find_rules(group.group_id)? {
        rule.rename(new_name);
        engine.update_rule(&rule)?;
        info!(group_id = group.group_id, rule_id = ?rule.rule_id, new_name, "Renamed rule");
    }
    Ok(())
}

/// Deletes every rule of the group together with its conditions.
///
/// # Errors
///
/// Returns an error if the rule store fails.
pub fn delete_rules<E: RuleStore>(engine: &mut E, group: &GroupBinding) -> Result<(), CoreError> {
    for rule in engine.find_rules(group.group_id)? {
        if let Some(rule_id) = rule.rule_id {
            engine.delete_rule(rule_id)?;
            info!(group_id = group.group_id, rule_id, "Deleted rule");
        }
    }
    Ok(())
}
