// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::str::FromStr;

use crate::{DomainError, IdSet, ItemRef, ItemType, PresetScope, ProfileField};

#[test]
fn test_item_type_round_trips_through_str() {
    for item_type in ItemType::ALL {
        assert_eq!(ItemType::from_str(item_type.as_str()).unwrap(), item_type);
    }
}

#[test]
fn test_item_type_rejects_unknown_value() {
    let result: Result<ItemType, DomainError> = ItemType::from_str("cohort");
    assert_eq!(
        result,
        Err(DomainError::InvalidItemType(String::from("cohort")))
    );
}

#[test]
fn test_item_type_maps_to_profile_field() {
    assert_eq!(ItemType::Tag.profile_field(), ProfileField::Tag);
    assert_eq!(ItemType::Course.profile_field(), ProfileField::Course);
    assert_eq!(ItemType::Category.profile_field(), ProfileField::Category);
    assert_eq!(ItemType::Preset.profile_field(), ProfileField::Preset);
    assert_eq!(ProfileField::EnrolledUntil.shortname(), "enrolleduntil");
}

#[test]
fn test_id_set_parse_sorts_and_deduplicates() {
    let ids: IdSet = IdSet::parse(Some("5,3, 5,1")).unwrap();
    assert_eq!(ids.iter().collect::<Vec<i64>>(), vec![1, 3, 5]);
    assert_eq!(ids.to_stored(), Some(String::from("1,3,5")));
}

#[test]
fn test_id_set_empty_is_stored_as_null() {
    assert!(IdSet::parse(None).unwrap().is_empty());
    assert!(IdSet::parse(Some("")).unwrap().is_empty());
    assert_eq!(IdSet::new().to_stored(), None);
}

#[test]
fn test_id_set_rejects_non_integer_token() {
    let result: Result<IdSet, DomainError> = IdSet::parse(Some("1,two"));
    assert!(matches!(result, Err(DomainError::InvalidIdList { .. })));
}

#[test]
fn test_preset_scope_references_and_strip() {
    let mut scope: PresetScope = PresetScope::new(
        [1, 2].into_iter().collect(),
        [10].into_iter().collect(),
        [7].into_iter().collect(),
    );

    assert!(scope.references(ItemRef::category(2)));
    assert!(scope.references(ItemRef::course(10)));
    assert!(!scope.references(ItemRef::tag(10)));
    assert!(!scope.references(ItemRef::preset(1)));

    assert!(scope.strip(ItemRef::category(2)));
    assert!(!scope.strip(ItemRef::category(2)));
    assert!(!scope.references(ItemRef::category(2)));
    assert_eq!(scope.categories.to_stored(), Some(String::from("1")));
}

#[test]
fn test_preset_scope_is_empty_only_when_all_sets_empty() {
    let mut scope: PresetScope = PresetScope::default();
    assert!(scope.is_empty());
    scope.tags.insert(3);
    assert!(!scope.is_empty());
}
