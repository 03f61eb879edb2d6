// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::DomainError;

#[test]
fn test_domain_error_display() {
    let err: DomainError = DomainError::InvalidItemType(String::from("widget"));
    assert_eq!(
        format!("{err}"),
        "Invalid item type 'widget'. Must be one of tag, course, category, preset"
    );

    let err: DomainError = DomainError::InvalidItemId(0);
    assert_eq!(format!("{err}"), "Invalid item id 0: must be positive");

    let err: DomainError = DomainError::InvalidIdList {
        raw: String::from("1,x"),
        token: String::from("x"),
    };
    assert_eq!(format!("{err}"), "Invalid id list '1,x': 'x' is not an integer");
}

#[test]
fn test_empty_preset_message_names_entities() {
    let err: DomainError = DomainError::EmptyPreset;
    assert!(format!("{err}").contains("category, course, tag"));
}

#[test]
fn test_value_not_allowed_names_field_and_value() {
    let err: DomainError = DomainError::ValueNotAllowed {
        field: String::from("tag"),
        value: String::from("Ghost"),
    };
    assert_eq!(
        format!("{err}"),
        "'Ghost' is not an allowed value of field 'tag'"
    );
}
