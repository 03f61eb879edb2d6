// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! In-memory content engine used by the core tests.

use crate::{
    CoreError, EnrolmentStore, GroupStore, ItemCatalog, PresetStore, ProfileStore,
    ReconcileContext, RuleStore, Task, execute,
};
use enrolsync_domain::{
    AllowedValues, EnrolmentMethod, GroupBinding, IdSet, Item, ItemRef, ItemType, MembershipRule,
    Preset, PresetScope, ProfileField, UserProfile, UserSelection,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub const STUDENT_ROLE_ID: i64 = 5;

#[derive(Debug, Default)]
pub struct MemoryEngine {
    pub categories: BTreeMap<i64, String>,
    /// course id -> (name, category id)
    pub courses: BTreeMap<i64, (String, i64)>,
    pub tags: BTreeMap<i64, String>,
    /// (course id, tag id)
    pub course_tags: BTreeSet<(i64, i64)>,
    pub groups: BTreeMap<i64, GroupBinding>,
    pub enrolments: BTreeSet<EnrolmentMethod>,
    pub rules: BTreeMap<i64, MembershipRule>,
    pub allowed: HashMap<ProfileField, AllowedValues>,
    pub selections: HashMap<(i64, ProfileField), UserSelection>,
    pub dates: HashMap<(i64, ProfileField), i64>,
    pub presets: BTreeMap<i64, Preset>,
    next_id: i64,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self {
            next_id: 100,
            ..Self::default()
        }
    }

    const fn next(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn add_category(&mut self, id: i64, name: &str) {
        self.categories.insert(id, name.to_string());
    }

    pub fn add_course(&mut self, id: i64, name: &str, category_id: i64) {
        self.courses.insert(id, (name.to_string(), category_id));
    }

    pub fn move_course(&mut self, id: i64, category_id: i64) {
        if let Some(course) = self.courses.get_mut(&id) {
            course.1 = category_id;
        }
    }

    pub fn tag_course(&mut self, course_id: i64, tag_id: i64, tag_name: &str) {
        self.tags.insert(tag_id, tag_name.to_string());
        self.course_tags.insert((course_id, tag_id));
    }

    pub fn untag_course(&mut self, course_id: i64, tag_id: i64) {
        self.course_tags.remove(&(course_id, tag_id));
    }

    pub fn add_preset(&mut self, id: i64, name: &str, scope: PresetScope) -> Preset {
        let preset: Preset = Preset::with_id(id, name, scope);
        self.presets.insert(id, preset.clone());
        preset
    }

    pub fn group_of(&self, item: ItemRef) -> Option<&GroupBinding> {
        self.groups.values().find(|g| g.item == item)
    }

    pub fn is_enrolled(&self, item: ItemRef, course_id: i64) -> bool {
        self.group_of(item).is_some_and(|group| {
            self.enrolments.contains(&EnrolmentMethod {
                group_id: group.group_id,
                course_id,
                role_id: STUDENT_ROLE_ID,
            })
        })
    }

    pub fn rules_of(&self, item: ItemRef) -> Vec<&MembershipRule> {
        self.group_of(item).map_or_else(Vec::new, |group| {
            self.rules
                .values()
                .filter(|r| r.group_id == group.group_id)
                .collect()
        })
    }

    pub fn allowed_of(&self, field: ProfileField) -> Vec<String> {
        self.allowed
            .get(&field)
            .map(|a| a.values().to_vec())
            .unwrap_or_default()
    }

    pub fn select(&mut self, user_id: i64, field: ProfileField, data: &str) {
        self.selections
            .insert((user_id, field), UserSelection::parse(data));
    }
}

impl ItemCatalog for MemoryEngine {
    fn list_items(&mut self, item_type: ItemType) -> Result<Vec<Item>, CoreError> {
        let items: Vec<Item> = match item_type {
            ItemType::Tag => self
                .tags
                .iter()
                .map(|(id, name)| Item::new(ItemRef::tag(*id), name.as_str()))
                .collect(),
            ItemType::Category => self
                .categories
                .iter()
                .map(|(id, name)| Item::new(ItemRef::category(*id), name.as_str()))
                .collect(),
            ItemType::Course => self
                .courses
                .iter()
                .map(|(id, (name, _))| Item::new(ItemRef::course(*id), name.as_str()))
                .collect(),
            ItemType::Preset => Vec::new(),
        };
        Ok(items)
    }

    fn courses_in_category(&mut self, category_id: i64) -> Result<BTreeSet<i64>, CoreError> {
        Ok(self
            .courses
            .iter()
            .filter(|(_, (_, cat))| *cat == category_id)
            .map(|(id, _)| *id)
            .collect())
    }

    fn courses_with_tag(&mut self, tag_id: i64) -> Result<BTreeSet<i64>, CoreError> {
        Ok(self
            .course_tags
            .iter()
            .filter(|(_, tag)| *tag == tag_id)
            .map(|(course, _)| *course)
            .collect())
    }

    fn course_category(&mut self, course_id: i64) -> Result<Option<i64>, CoreError> {
        Ok(self.courses.get(&course_id).map(|(_, cat)| *cat))
    }

    fn course_tags(&mut self, course_id: i64) -> Result<BTreeSet<i64>, CoreError> {
        Ok(self
            .course_tags
            .iter()
            .filter(|(course, _)| *course == course_id)
            .map(|(_, tag)| *tag)
            .collect())
    }
}

impl GroupStore for MemoryEngine {
    fn find_group(&mut self, item: ItemRef) -> Result<Option<GroupBinding>, CoreError> {
        Ok(self.group_of(item).cloned())
    }

    fn create_group(
        &mut self,
        item: ItemRef,
        name: &str,
        _description: &str,
    ) -> Result<GroupBinding, CoreError> {
        if self.group_of(item).is_some() {
            return Err(CoreError::Engine(format!("duplicate group for {item}")));
        }
        let group: GroupBinding = GroupBinding {
            group_id: self.next(),
            item,
            name: name.to_string(),
        };
        self.groups.insert(group.group_id, group.clone());
        Ok(group)
    }

    fn get_group(&mut self, group_id: i64) -> Result<Option<GroupBinding>, CoreError> {
        Ok(self.groups.get(&group_id).cloned())
    }

    fn rename_group(&mut self, group_id: i64, name: &str) -> Result<(), CoreError> {
        if let Some(group) = self.groups.get_mut(&group_id) {
            group.name = name.to_string();
        }
        Ok(())
    }

    fn delete_group(&mut self, group_id: i64) -> Result<(), CoreError> {
        self.groups.remove(&group_id);
        self.enrolments.retain(|m| m.group_id != group_id);
        Ok(())
    }
}

impl EnrolmentStore for MemoryEngine {
    fn enrolment_exists(&mut self, method: EnrolmentMethod) -> Result<bool, CoreError> {
        Ok(self.enrolments.contains(&method))
    }

    fn add_enrolment(&mut self, method: EnrolmentMethod) -> Result<(), CoreError> {
        if !self.enrolments.insert(method) {
            return Err(CoreError::Engine(String::from("duplicate enrolment method")));
        }
        Ok(())
    }

    fn remove_enrolment(&mut self, method: EnrolmentMethod) -> Result<(), CoreError> {
        self.enrolments.remove(&method);
        Ok(())
    }

    fn enrolments_for_group(&mut self, group_id: i64) -> Result<Vec<EnrolmentMethod>, CoreError> {
        Ok(self
            .enrolments
            .iter()
            .filter(|m| m.group_id == group_id)
            .copied()
            .collect())
    }

    fn enrolments_for_course(
        &mut self,
        course_id: i64,
    ) -> Result<Vec<EnrolmentMethod>, CoreError> {
        Ok(self
            .enrolments
            .iter()
            .filter(|m| m.course_id == course_id)
            .copied()
            .collect())
    }

    fn find_role(&mut self, shortname: &str) -> Result<Option<i64>, CoreError> {
        Ok((shortname == "student").then_some(STUDENT_ROLE_ID))
    }
}

impl RuleStore for MemoryEngine {
    fn find_rules(&mut self, group_id: i64) -> Result<Vec<MembershipRule>, CoreError> {
        Ok(self
            .rules
            .values()
            .filter(|r| r.group_id == group_id)
            .cloned()
            .collect())
    }

    fn create_rule(&mut self, rule: &MembershipRule) -> Result<i64, CoreError> {
        let rule_id: i64 = self.next();
        let mut stored: MembershipRule = rule.clone();
        stored.rule_id = Some(rule_id);
        stored.enabled = false;
        self.rules.insert(rule_id, stored);
        Ok(rule_id)
    }

    fn set_rule_enabled(&mut self, rule_id: i64, enabled: bool) -> Result<(), CoreError> {
        let rule: &mut MembershipRule = self
            .rules
            .get_mut(&rule_id)
            .ok_or_else(|| CoreError::Engine(format!("rule {rule_id} missing")))?;
        rule.enabled = enabled;
        Ok(())
    }

    fn update_rule(&mut self, rule: &MembershipRule) -> Result<(), CoreError> {
        let rule_id: i64 = rule
            .rule_id
            .ok_or_else(|| CoreError::Engine(String::from("rule without id")))?;
        self.rules.insert(rule_id, rule.clone());
        Ok(())
    }

    fn delete_rule(&mut self, rule_id: i64) -> Result<(), CoreError> {
        self.rules.remove(&rule_id);
        Ok(())
    }

    fn list_rules(&mut self) -> Result<Vec<MembershipRule>, CoreError> {
        Ok(self.rules.values().cloned().collect())
    }
}

impl ProfileStore for MemoryEngine {
    fn allowed_values(&mut self, field: ProfileField) -> Result<AllowedValues, CoreError> {
        Ok(self.allowed.get(&field).cloned().unwrap_or_default())
    }

    fn set_allowed_values(
        &mut self,
        field: ProfileField,
        values: &AllowedValues,
    ) -> Result<(), CoreError> {
        self.allowed.insert(field, values.clone());
        Ok(())
    }

    fn selections_containing(
        &mut self,
        field: ProfileField,
        value: &str,
    ) -> Result<Vec<(i64, UserSelection)>, CoreError> {
        let mut found: Vec<(i64, UserSelection)> = self
            .selections
            .iter()
            .filter(|((_, f), s)| *f == field && s.encode().contains(value))
            .map(|((user, _), s)| (*user, s.clone()))
            .collect();
        found.sort_by_key(|(user, _)| *user);
        Ok(found)
    }

    fn set_selection(
        &mut self,
        user_id: i64,
        field: ProfileField,
        selection: &UserSelection,
    ) -> Result<(), CoreError> {
        self.selections.insert((user_id, field), selection.clone());
        Ok(())
    }

    fn set_user_date(
        &mut self,
        user_id: i64,
        field: ProfileField,
        timestamp: Option<i64>,
    ) -> Result<(), CoreError> {
        match timestamp {
            Some(ts) => self.dates.insert((user_id, field), ts),
            None => self.dates.remove(&(user_id, field)),
        };
        Ok(())
    }

    fn user_profile(&mut self, user_id: i64) -> Result<UserProfile, CoreError> {
        let mut profile: UserProfile = UserProfile::new(user_id);
        for ((user, field), selection) in &self.selections {
            if *user == user_id {
                profile.selections.insert(*field, selection.clone());
            }
        }
        for ((user, field), ts) in &self.dates {
            if *user == user_id {
                profile.dates.insert(*field, *ts);
            }
        }
        Ok(profile)
    }
}

impl PresetStore for MemoryEngine {
    fn get_preset(&mut self, preset_id: i64) -> Result<Option<Preset>, CoreError> {
        Ok(self.presets.get(&preset_id).cloned())
    }

    fn list_presets(&mut self) -> Result<Vec<Preset>, CoreError> {
        Ok(self.presets.values().cloned().collect())
    }

    fn presets_referencing(&mut self, item: ItemRef) -> Result<Vec<Preset>, CoreError> {
        Ok(self
            .presets
            .values()
            .filter(|p| p.scope.references(item))
            .cloned()
            .collect())
    }

    fn update_preset_scope(
        &mut self,
        preset_id: i64,
        scope: &PresetScope,
    ) -> Result<(), CoreError> {
        let preset: &mut Preset = self
            .presets
            .get_mut(&preset_id)
            .ok_or(CoreError::PresetNotFound(preset_id))?;
        preset.scope = scope.clone();
        Ok(())
    }
}

pub const fn ctx() -> ReconcileContext {
    ReconcileContext::new(STUDENT_ROLE_ID)
}

pub fn ids(values: &[i64]) -> IdSet {
    values.iter().copied().collect()
}

pub fn courses(values: &[i64]) -> BTreeSet<i64> {
    values.iter().copied().collect()
}

pub fn run_all(engine: &mut MemoryEngine, tasks: &[Task]) {
    for task in tasks {
        execute(engine, &ctx(), task).unwrap();
    }
}
