// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// The four taxonomy kinds that are kept in sync with groups.
///
/// Tags, courses and categories are owned by the content system.
/// Presets are owned by enrolsync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Tag,
    Course,
    Category,
    Preset,
}

impl ItemType {
    /// All item types, in set-up order.
    pub const ALL: [Self; 4] = [Self::Tag, Self::Category, Self::Course, Self::Preset];

    /// Item types a preset may reference.
    pub const PRESET_MEMBERS: [Self; 3] = [Self::Category, Self::Course, Self::Tag];

    /// Converts this item type to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Course => "course",
            Self::Category => "category",
            Self::Preset => "preset",
        }
    }

    /// The multi-value profile field that mirrors the names of items of this type.
    #[must_use]
    pub const fn profile_field(&self) -> ProfileField {
        match self {
            Self::Tag => ProfileField::Tag,
            Self::Course => ProfileField::Course,
            Self::Category => ProfileField::Category,
            Self::Preset => ProfileField::Preset,
        }
    }

    /// Human-readable description stamped on groups created for this type.
    #[must_use]
    pub const fn group_description(&self) -> &'static str {
        match self {
            Self::Tag => "Tag related",
            Self::Course => "Course related",
            Self::Category => "Category related",
            Self::Preset => "Preset related",
        }
    }
}

impl FromStr for ItemType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tag" => Ok(Self::Tag),
            "course" => Ok(Self::Course),
            "category" => Ok(Self::Category),
            "preset" => Ok(Self::Preset),
            _ => Err(DomainError::InvalidItemType(s.to_string())),
        }
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User profile fields managed by enrolsync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileField {
    Tag,
    Course,
    Category,
    Preset,
    /// Date field holding a user's "keep enrolment until" override.
    EnrolledUntil,
}

impl ProfileField {
    /// The field shortname as stored by the profile engine.
    #[must_use]
    pub const fn shortname(&self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Course => "course",
            Self::Category => "category",
            Self::Preset => "preset",
            Self::EnrolledUntil => "enrolleduntil",
        }
    }
}

impl FromStr for ProfileField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tag" => Ok(Self::Tag),
            "course" => Ok(Self::Course),
            "category" => Ok(Self::Category),
            "preset" => Ok(Self::Preset),
            "enrolleduntil" => Ok(Self::EnrolledUntil),
            _ => Err(DomainError::InvalidProfileField(s.to_string())),
        }
    }
}

impl std::fmt::Display for ProfileField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.shortname())
    }
}

/// Stable identity of a tracked item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemRef {
    pub item_type: ItemType,
    pub item_id: i64,
}

impl ItemRef {
    #[must_use]
    pub const fn new(item_type: ItemType, item_id: i64) -> Self {
        Self { item_type, item_id }
    }

    #[must_use]
    pub const fn tag(item_id: i64) -> Self {
        Self::new(ItemType::Tag, item_id)
    }

    #[must_use]
    pub const fn course(item_id: i64) -> Self {
        Self::new(ItemType::Course, item_id)
    }

    #[must_use]
    pub const fn category(item_id: i64) -> Self {
        Self::new(ItemType::Category, item_id)
    }

    #[must_use]
    pub const fn preset(item_id: i64) -> Self {
        Self::new(ItemType::Preset, item_id)
    }
}

impl std::fmt::Display for ItemRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.item_type, self.item_id)
    }
}

/// A tracked item: identity plus its current, mutable name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub item: ItemRef,
    pub name: String,
}

impl Item {
    #[must_use]
    pub fn new(item: ItemRef, name: impl Into<String>) -> Self {
        Self {
            item,
            name: name.into(),
        }
    }
}

/// An ordered, de-duplicated set of item ids.
///
/// Stored as a comma-joined list of integers, or `NULL` when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdSet(BTreeSet<i64>);

impl IdSet {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Parses a stored comma-joined list. `None` and blank strings yield an empty set.
    ///
    /// # Errors
    ///
    /// Returns an error if any token is not an integer.
    pub fn parse(raw: Option<&str>) -> Result<Self, DomainError> {
        let Some(raw) = raw else {
            return Ok(Self::new());
        };

        let mut ids: BTreeSet<i64> = BTreeSet::new();
        for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let id: i64 = token.parse().map_err(|_| DomainError::InvalidIdList {
                raw: raw.to_string(),
                token: token.to_string(),
            })?;
            ids.insert(id);
        }
        Ok(Self(ids))
    }

    /// Encodes the set for storage; `None` when empty.
    #[must_use]
    pub fn to_stored(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }
        Some(
            self.0
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<String>>()
                .join(","),
        )
    }

    #[must_use]
    pub fn contains(&self, id: i64) -> bool {
        self.0.contains(&id)
    }

    pub fn insert(&mut self, id: i64) -> bool {
        self.0.insert(id)
    }

    pub fn remove(&mut self, id: i64) -> bool {
        self.0.remove(&id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<i64> for IdSet {
    fn from_iter<T: IntoIterator<Item = i64>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The category, course and tag ids a preset is made of.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetScope {
    pub categories: IdSet,
    pub courses: IdSet,
    pub tags: IdSet,
}

impl PresetScope {
    #[must_use]
    pub const fn new(categories: IdSet, courses: IdSet, tags: IdSet) -> Self {
        Self {
            categories,
            courses,
            tags,
        }
    }

    /// The id set holding members of the given type. Presets cannot contain presets.
    #[must_use]
    pub const fn ids(&self, item_type: ItemType) -> Option<&IdSet> {
        match item_type {
            ItemType::Category => Some(&self.categories),
            ItemType::Course => Some(&self.courses),
            ItemType::Tag => Some(&self.tags),
            ItemType::Preset => None,
        }
    }

    const fn ids_mut(&mut self, item_type: ItemType) -> Option<&mut IdSet> {
        match item_type {
            ItemType::Category => Some(&mut self.categories),
            ItemType::Course => Some(&mut self.courses),
            ItemType::Tag => Some(&mut self.tags),
            ItemType::Preset => None,
        }
    }

    #[must_use]
    pub fn references(&self, item: ItemRef) -> bool {
        self.ids(item.item_type)
            .is_some_and(|ids| ids.contains(item.item_id))
    }

    /// Removes the item from the matching id set. Returns whether anything changed.
    pub fn strip(&mut self, item: ItemRef) -> bool {
        self.ids_mut(item.item_type)
            .is_some_and(|ids| ids.remove(item.item_id))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.courses.is_empty() && self.tags.is_empty()
    }
}

/// An administrator-defined named union of categories, courses and tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    /// `None` until the preset has been persisted.
    pub preset_id: Option<i64>,
    pub name: String,
    pub scope: PresetScope,
}

impl Preset {
    #[must_use]
    pub fn new(name: impl Into<String>, scope: PresetScope) -> Self {
        Self {
            preset_id: None,
            name: name.into(),
            scope,
        }
    }

    #[must_use]
    pub fn with_id(preset_id: i64, name: impl Into<String>, scope: PresetScope) -> Self {
        Self {
            preset_id: Some(preset_id),
            name: name.into(),
            scope,
        }
    }
}

/// Link between a tracked item and the group that mirrors it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupBinding {
    pub group_id: i64,
    pub item: ItemRef,
    /// Human-readable label, kept equal to the item's current name.
    pub name: String,
}

/// A course-level grant: members of `group_id` get `role_id` in `course_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnrolmentMethod {
    pub group_id: i64,
    pub course_id: i64,
    pub role_id: i64,
}
