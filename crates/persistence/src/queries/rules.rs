// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use enrolsync_domain::{Condition, MembershipRule, ProfileField};
use std::str::FromStr;

use crate::diesel_schema::{rule_conditions, rules};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = rules)]
struct RuleRow {
    rule_id: i64,
    group_id: i64,
    name: String,
    enabled: i32,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = rule_conditions)]
struct ConditionRow {
    rule_id: i64,
    kind: String,
    field: String,
    value: Option<String>,
}

impl TryFrom<ConditionRow> for Condition {
    type Error = PersistenceError;

    fn try_from(row: ConditionRow) -> Result<Self, Self::Error> {
        let field: ProfileField = ProfileField::from_str(&row.field)?;
        match (row.kind.as_str(), row.value) {
            ("profile_field_equals", Some(value)) => Ok(Self::ProfileFieldEquals { field, value }),
            ("date_empty_or_future", _) => Ok(Self::DateEmptyOrFuture { field }),
            (kind, _) => Err(PersistenceError::SerializationError(format!(
                "Malformed condition '{kind}' on rule {}",
                row.rule_id
            ))),
        }
    }
}

fn load_conditions(
    conn: &mut SqliteConnection,
    rule_ids: &[i64],
) -> Result<Vec<ConditionRow>, PersistenceError> {
    Ok(rule_conditions::table
        .filter(rule_conditions::rule_id.eq_any(rule_ids))
        .select(ConditionRow::as_select())
        .order((rule_conditions::rule_id.asc(), rule_conditions::position.asc()))
        .load(conn)?)
}

fn assemble(
    conn: &mut SqliteConnection,
    rows: Vec<RuleRow>,
) -> Result<Vec<MembershipRule>, PersistenceError> {
    let rule_ids: Vec<i64> = rows.iter().map(|r| r.rule_id).collect();
    let mut conditions: Vec<ConditionRow> = load_conditions(conn, &rule_ids)?;

    let mut result: Vec<MembershipRule> = Vec::with_capacity(rows.len());
    for row in rows {
        let (mine, rest): (Vec<ConditionRow>, Vec<ConditionRow>) = conditions
            .into_iter()
            .partition(|c| c.rule_id == row.rule_id);
        conditions = rest;
        result.push(MembershipRule {
            rule_id: Some(row.rule_id),
            group_id: row.group_id,
            name: row.name,
            enabled: row.enabled != 0,
            conditions: mine
                .into_iter()
                .map(Condition::try_from)
                .collect::<Result<Vec<Condition>, PersistenceError>>()?,
        });
    }
    Ok(result)
}

/// Rules attached to a group, with their conditions in stored order.
///
/// # Errors
///
/// Returns an error if the query fails or a stored condition is malformed.
pub fn find_rules(
    conn: &mut SqliteConnection,
    group_id: i64,
) -> Result<Vec<MembershipRule>, PersistenceError> {
    let rows: Vec<RuleRow> = rules::table
        .filter(rules::group_id.eq(group_id))
        .select(RuleRow::as_select())
        .order(rules::rule_id.asc())
        .load(conn)?;
    assemble(conn, rows)
}

/// # Errors
///
/// Returns an error if the query fails or a stored condition is malformed.
pub fn list_rules(conn: &mut SqliteConnection) -> Result<Vec<MembershipRule>, PersistenceError> {
    let rows: Vec<RuleRow> = rules::table
        .select(RuleRow::as_select())
        .order(rules::rule_id.asc())
        .load(conn)?;
    assemble(conn, rows)
}
