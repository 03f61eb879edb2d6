// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The content engine as seen by the reconciler.
//!
//! Groups, rules, enrolment methods and profile fields live in the content
//! engine's storage. These traits are the only way the reconciler touches
//! them. All methods take `&mut self` so an implementation can run every
//! call of one task on the same transaction.

use crate::error::CoreError;
use enrolsync_domain::{
    AllowedValues, EnrolmentMethod, GroupBinding, Item, ItemRef, ItemType, MembershipRule, Preset,
    PresetScope, ProfileField, UserProfile, UserSelection,
};
use std::collections::BTreeSet;

/// Read access to the tag, course and category catalog.
pub trait ItemCatalog {
    /// Lists the live items of a catalog type, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read.
    fn list_items(&mut self, item_type: ItemType) -> Result<Vec<Item>, CoreError>;

    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read.
    fn courses_in_category(&mut self, category_id: i64) -> Result<BTreeSet<i64>, CoreError>;

    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read.
    fn courses_with_tag(&mut self, tag_id: i64) -> Result<BTreeSet<i64>, CoreError>;

    /// The current category of a course, `None` if the course is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read.
    fn course_category(&mut self, course_id: i64) -> Result<Option<i64>, CoreError>;

    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read.
    fn course_tags(&mut self, course_id: i64) -> Result<BTreeSet<i64>, CoreError>;
}

/// Groups and their `(item_type, item_id)` metadata.
pub trait GroupStore {
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn find_group(&mut self, item: ItemRef) -> Result<Option<GroupBinding>, CoreError>;

    /// Creates a group stamped with the item's metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if a group for the item already exists or the write fails.
    fn create_group(
        &mut self,
        item: ItemRef,
        name: &str,
        description: &str,
    ) -> Result<GroupBinding, CoreError>;

    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn get_group(&mut self, group_id: i64) -> Result<Option<GroupBinding>, CoreError>;

    /// Updates the group label. Metadata is never changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn rename_group(&mut self, group_id: i64, name: &str) -> Result<(), CoreError>;

    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn delete_group(&mut self, group_id: i64) -> Result<(), CoreError>;
}

/// Group-based course enrolment methods.
pub trait EnrolmentStore {
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn enrolment_exists(&mut self, method: EnrolmentMethod) -> Result<bool, CoreError>;

    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn add_enrolment(&mut self, method: EnrolmentMethod) -> Result<(), CoreError>;

    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn remove_enrolment(&mut self, method: EnrolmentMethod) -> Result<(), CoreError>;

    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn enrolments_for_group(&mut self, group_id: i64) -> Result<Vec<EnrolmentMethod>, CoreError>;

    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn enrolments_for_course(&mut self, course_id: i64)
    -> Result<Vec<EnrolmentMethod>, CoreError>;

    /// Resolves a role id by shortname.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn find_role(&mut self, shortname: &str) -> Result<Option<i64>, CoreError>;
}

/// Dynamic membership rules and their conditions.
pub trait RuleStore {
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn find_rules(&mut self, group_id: i64) -> Result<Vec<MembershipRule>, CoreError>;

    /// Persists a rule and its conditions in the disabled state. Returns the rule id.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn create_rule(&mut self, rule: &MembershipRule) -> Result<i64, CoreError>;

    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn set_rule_enabled(&mut self, rule_id: i64, enabled: bool) -> Result<(), CoreError>;

    /// Replaces the rule's name and conditions.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule has no id or the write fails.
    fn update_rule(&mut self, rule: &MembershipRule) -> Result<(), CoreError>;

    /// Deletes the rule together with its conditions.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn delete_rule(&mut self, rule_id: i64) -> Result<(), CoreError>;

    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn list_rules(&mut self) -> Result<Vec<MembershipRule>, CoreError>;
}

/// Custom profile fields and the data users entered in them.
pub trait ProfileStore {
    /// # Errors
    ///
    /// Returns an error if the field cannot be read.
    fn allowed_values(&mut self, field: ProfileField) -> Result<AllowedValues, CoreError>;

    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn set_allowed_values(
        &mut self,
        field: ProfileField,
        values: &AllowedValues,
    ) -> Result<(), CoreError>;

    /// Users whose stored selection for `field` may contain `value`.
    ///
    /// Implementations may over-report; callers match tokens exactly.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn selections_containing(
        &mut self,
        field: ProfileField,
        value: &str,
    ) -> Result<Vec<(i64, UserSelection)>, CoreError>;

    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn set_selection(
        &mut self,
        user_id: i64,
        field: ProfileField,
        selection: &UserSelection,
    ) -> Result<(), CoreError>;

    /// Stores a date field as a unix timestamp; `None` clears it.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn set_user_date(
        &mut self,
        user_id: i64,
        field: ProfileField,
        timestamp: Option<i64>,
    ) -> Result<(), CoreError>;

    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn user_profile(&mut self, user_id: i64) -> Result<UserProfile, CoreError>;
}

/// Presets as far as the reconciler needs them.
///
/// Administrative create, update and delete live with the storage layer
/// because they carry audit columns the reconciler never reads.
pub trait PresetStore {
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn get_preset(&mut self, preset_id: i64) -> Result<Option<Preset>, CoreError>;

    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn list_presets(&mut self) -> Result<Vec<Preset>, CoreError>;

    /// Presets whose category, course or tag set contains the item.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn presets_referencing(&mut self, item: ItemRef) -> Result<Vec<Preset>, CoreError>;

    /// Overwrites a preset's id sets.
    ///
    /// # Errors
    ///
    /// Returns an error if the preset does not exist or the write fails.
    fn update_preset_scope(&mut self, preset_id: i64, scope: &PresetScope)
    -> Result<(), CoreError>;
}

/// Everything the reconciler needs from the content engine.
pub trait ContentEngine:
    ItemCatalog + GroupStore + EnrolmentStore + RuleStore + ProfileStore + PresetStore
{
}

impl<T> ContentEngine for T where
    T: ItemCatalog + GroupStore + EnrolmentStore + RuleStore + ProfileStore + PresetStore
{
}
