// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use enrolsync_domain::{Condition, MembershipRule};
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{rule_conditions, rules};
use crate::error::PersistenceError;

fn insert_conditions(
    conn: &mut SqliteConnection,
    rule_id: i64,
    conditions: &[Condition],
) -> Result<(), PersistenceError> {
    for (position, condition) in conditions.iter().enumerate() {
        let position: i32 = i32::try_from(position)
            .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;
        let (field, value): (String, Option<String>) = match condition {
            Condition::ProfileFieldEquals { field, value } => {
                (field.shortname().to_string(), Some(value.clone()))
            }
            Condition::DateEmptyOrFuture { field } => (field.shortname().to_string(), None),
        };
        diesel::insert_into(rule_conditions::table)
            .values((
                rule_conditions::rule_id.eq(rule_id),
                rule_conditions::position.eq(position),
                rule_conditions::kind.eq(condition.kind()),
                rule_conditions::field.eq(field),
                rule_conditions::value.eq(value),
            ))
            .execute(conn)?;
    }
    Ok(())
}

/// Inserts a rule with its conditions. The rule is always stored disabled.
///
/// # Errors
///
/// Returns an error if the group does not exist or an insert fails.
pub fn create_rule(
    conn: &mut SqliteConnection,
    rule: &MembershipRule,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(rules::table)
        .values((
            rules::group_id.eq(rule.group_id),
            rules::name.eq(&rule.name),
            rules::enabled.eq(0),
        ))
        .execute(conn)?;
    let rule_id: i64 = conn.get_last_insert_rowid()?;
    insert_conditions(conn, rule_id, &rule.conditions)?;
    info!(rule_id, group_id = rule.group_id, name = %rule.name, "Created rule");
    Ok(rule_id)
}

/// # Errors
///
/// Returns `NotFound` if the rule does not exist.
pub fn set_rule_enabled(
    conn: &mut SqliteConnection,
    rule_id: i64,
    enabled: bool,
) -> Result<(), PersistenceError> {
    let affected: usize = diesel::update(rules::table.filter(rules::rule_id.eq(rule_id)))
        .set(rules::enabled.eq(i32::from(enabled)))
        .execute(conn)?;
    if affected == 0 {
        return Err(PersistenceError::NotFound(format!("Rule {rule_id}")));
    }
    debug!(rule_id, enabled, "Set rule state");
    Ok(())
}

/// Rewrites a rule's name and replaces its conditions.
///
/// # Errors
///
/// Returns an error if the rule has no id or does not exist.
pub fn update_rule(
    conn: &mut SqliteConnection,
    rule: &MembershipRule,
) -> Result<(), PersistenceError> {
    let rule_id: i64 = rule.rule_id.ok_or_else(|| {
        PersistenceError::QueryFailed(String::from("Cannot update a rule without an id"))
    })?;
    let affected: usize = diesel::update(rules::table.filter(rules::rule_id.eq(rule_id)))
        .set(rules::name.eq(&rule.name))
        .execute(conn)?;
    if affected == 0 {
        return Err(PersistenceError::NotFound(format!("Rule {rule_id}")));
    }
    diesel::delete(rule_conditions::table.filter(rule_conditions::rule_id.eq(rule_id)))
        .execute(conn)?;
    insert_conditions(conn, rule_id, &rule.conditions)?;
    Ok(())
}

/// Deletes a rule. Its conditions cascade.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_rule(conn: &mut SqliteConnection, rule_id: i64) -> Result<(), PersistenceError> {
    diesel::delete(rules::table.filter(rules::rule_id.eq(rule_id))).execute(conn)?;
    debug!(rule_id, "Deleted rule");
    Ok(())
}
