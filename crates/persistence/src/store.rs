// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The embedded content engine.
//!
//! [`SqliteStore`] borrows one connection and implements every engine trait
//! the reconciler needs, so a task runs entirely on the caller's transaction.

use diesel::SqliteConnection;
use enrolsync::{
    CoreError, EnrolmentStore, GroupStore, ItemCatalog, PresetStore, ProfileStore, RuleStore,
};
use enrolsync_domain::{
    AllowedValues, EnrolmentMethod, GroupBinding, Item, ItemRef, ItemType, MembershipRule, Preset,
    PresetScope, ProfileField, UserProfile, UserSelection,
};
use std::collections::BTreeSet;

use crate::data_models::PresetRecord;
use crate::{mutations, queries};

/// Content engine view over a borrowed `SQLite` connection.
pub struct SqliteStore<'a> {
    conn: &'a mut SqliteConnection,
}

impl<'a> SqliteStore<'a> {
    pub const fn new(conn: &'a mut SqliteConnection) -> Self {
        Self { conn }
    }
}

impl ItemCatalog for SqliteStore<'_> {
    fn list_items(&mut self, item_type: ItemType) -> Result<Vec<Item>, CoreError> {
        Ok(queries::catalog::list_items(self.conn, item_type)?)
    }

    fn courses_in_category(&mut self, category_id: i64) -> Result<BTreeSet<i64>, CoreError> {
        Ok(queries::catalog::courses_in_category(self.conn, category_id)?)
    }

    fn courses_with_tag(&mut self, tag_id: i64) -> Result<BTreeSet<i64>, CoreError> {
        Ok(queries::catalog::courses_with_tag(self.conn, tag_id)?)
    }

    fn course_category(&mut self, course_id: i64) -> Result<Option<i64>, CoreError> {
        Ok(queries::catalog::get_course(self.conn, course_id)?.map(|(_, category_id)| category_id))
    }

    fn course_tags(&mut self, course_id: i64) -> Result<BTreeSet<i64>, CoreError> {
        Ok(queries::catalog::course_tags(self.conn, course_id)?)
    }
}

impl GroupStore for SqliteStore<'_> {
    fn find_group(&mut self, item: ItemRef) -> Result<Option<GroupBinding>, CoreError> {
        Ok(queries::groups::find_group(self.conn, item)?)
    }

    fn create_group(
        &mut self,
        item: ItemRef,
        name: &str,
        description: &str,
    ) -> Result<GroupBinding, CoreError> {
        Ok(mutations::groups::create_group(
            self.conn,
            item,
            name,
            description,
        )?)
    }

    fn get_group(&mut self, group_id: i64) -> Result<Option<GroupBinding>, CoreError> {
        Ok(queries::groups::get_group(self.conn, group_id)?)
    }

    fn rename_group(&mut self, group_id: i64, name: &str) -> Result<(), CoreError> {
        Ok(mutations::groups::rename_group(self.conn, group_id, name)?)
    }

    fn delete_group(&mut self, group_id: i64) -> Result<(), CoreError> {
        Ok(mutations::groups::delete_group(self.conn, group_id)?)
    }
}

impl EnrolmentStore for SqliteStore<'_> {
    fn enrolment_exists(&mut self, method: EnrolmentMethod) -> Result<bool, CoreError> {
        Ok(queries::enrolments::enrolment_exists(self.conn, method)?)
    }

    fn add_enrolment(&mut self, method: EnrolmentMethod) -> Result<(), CoreError> {
        mutations::enrolments::add_enrolment(self.conn, method)?;
        Ok(())
    }

    fn remove_enrolment(&mut self, method: EnrolmentMethod) -> Result<(), CoreError> {
        mutations::enrolments::remove_enrolment(self.conn, method)?;
        Ok(())
    }

    fn enrolments_for_group(&mut self, group_id: i64) -> Result<Vec<EnrolmentMethod>, CoreError> {
        Ok(queries::enrolments::enrolments_for_group(self.conn, group_id)?)
    }

    fn enrolments_for_course(
        &mut self,
        course_id: i64,
    ) -> Result<Vec<EnrolmentMethod>, CoreError> {
        Ok(queries::enrolments::enrolments_for_course(self.conn, course_id)?)
    }

    fn find_role(&mut self, shortname: &str) -> Result<Option<i64>, CoreError> {
        Ok(queries::enrolments::find_role(self.conn, shortname)?)
    }
}

impl RuleStore for SqliteStore<'_> {
    fn find_rules(&mut self, group_id: i64) -> Result<Vec<MembershipRule>, CoreError> {
        Ok(queries::rules::find_rules(self.conn, group_id)?)
    }

    fn create_rule(&mut self, rule: &MembershipRule) -> Result<i64, CoreError> {
        Ok(mutations::rules::create_rule(self.conn, rule)?)
    }

    fn set_rule_enabled(&mut self, rule_id: i64, enabled: bool) -> Result<(), CoreError> {
        Ok(mutations::rules::set_rule_enabled(self.conn, rule_id, enabled)?)
    }

    fn update_rule(&mut self, rule: &MembershipRule) -> Result<(), CoreError> {
        Ok(mutations::rules::update_rule(self.conn, rule)?)
    }

    fn delete_rule(&mut self, rule_id: i64) -> Result<(), CoreError> {
        Ok(mutations::rules::delete_rule(self.conn, rule_id)?)
    }

    fn list_rules(&mut self) -> Result<Vec<MembershipRule>, CoreError> {
        Ok(queries::rules::list_rules(self.conn)?)
    }
}

impl ProfileStore for SqliteStore<'_> {
    fn allowed_values(&mut self, field: ProfileField) -> Result<AllowedValues, CoreError> {
        Ok(queries::profile::allowed_values(self.conn, field)?)
    }

    fn set_allowed_values(
        &mut self,
        field: ProfileField,
        values: &AllowedValues,
    ) -> Result<(), CoreError> {
        Ok(mutations::profile::set_allowed_values(
            self.conn, field, values,
        )?)
    }

    fn selections_containing(
        &mut self,
        field: ProfileField,
        value: &str,
    ) -> Result<Vec<(i64, UserSelection)>, CoreError> {
        Ok(queries::profile::selections_containing(
            self.conn, field, value,
        )?)
    }

    fn set_selection(
        &mut self,
        user_id: i64,
        field: ProfileField,
        selection: &UserSelection,
    ) -> Result<(), CoreError> {
        Ok(mutations::profile::set_selection(
            self.conn, user_id, field, selection,
        )?)
    }

    fn set_user_date(
        &mut self,
        user_id: i64,
        field: ProfileField,
        timestamp: Option<i64>,
    ) -> Result<(), CoreError> {
        Ok(mutations::profile::set_user_date(
            self.conn, user_id, field, timestamp,
        )?)
    }

    fn user_profile(&mut self, user_id: i64) -> Result<UserProfile, CoreError> {
        Ok(queries::profile::user_profile(self.conn, user_id)?)
    }
}

impl PresetStore for SqliteStore<'_> {
    fn get_preset(&mut self, preset_id: i64) -> Result<Option<Preset>, CoreError> {
        let record: Option<PresetRecord> = queries::presets::get_preset(self.conn, preset_id)?;
        Ok(record.map(Preset::from))
    }

    fn list_presets(&mut self) -> Result<Vec<Preset>, CoreError> {
        let records: Vec<PresetRecord> = queries::presets::list_presets(self.conn)?;
        Ok(records.into_iter().map(Preset::from).collect())
    }

    fn presets_referencing(&mut self, item: ItemRef) -> Result<Vec<Preset>, CoreError> {
        let records: Vec<PresetRecord> = queries::presets::presets_referencing(self.conn, item)?;
        Ok(records.into_iter().map(Preset::from).collect())
    }

    fn update_preset_scope(
        &mut self,
        preset_id: i64,
        scope: &PresetScope,
    ) -> Result<(), CoreError> {
        Ok(mutations::presets::update_preset_scope(
            self.conn, preset_id, scope,
        )?)
    }
}
