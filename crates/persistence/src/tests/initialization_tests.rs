// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::{create_category, create_test_persistence};
use crate::{Persistence, PersistenceError};
use enrolsync_domain::{AllowedValues, ProfileField};

#[test]
fn test_persistence_initialization() {
    let result: Result<Persistence, PersistenceError> = Persistence::new_in_memory();
    assert!(result.is_ok());
}

#[test]
fn test_foreign_key_enforcement_is_enabled() {
    let mut persistence: Persistence = create_test_persistence();
    assert!(persistence.verify_foreign_key_enforcement().is_ok());
}

#[test]
fn test_multiple_in_memory_instances_are_isolated() {
    let mut db1: Persistence = create_test_persistence();
    let mut db2: Persistence = create_test_persistence();

    create_category(&mut db1, "Science");

    assert_eq!(db1.list_categories().unwrap().len(), 1);
    assert!(db2.list_categories().unwrap().is_empty());
}

#[test]
fn test_migrations_seed_managed_profile_fields() {
    let mut persistence: Persistence = create_test_persistence();

    for field in [
        ProfileField::Course,
        ProfileField::Category,
        ProfileField::Tag,
        ProfileField::Preset,
    ] {
        let values: AllowedValues = persistence.allowed_values(field).unwrap();
        assert!(values.values().is_empty(), "{field} starts empty");
    }
    assert!(persistence.allowed_values(ProfileField::EnrolledUntil).is_ok());
}

#[test]
fn test_migrations_seed_student_role() {
    let mut persistence: Persistence = create_test_persistence();

    // Set-up resolves the student role before doing anything else.
    let result = persistence.run_setup();
    assert!(result.is_ok(), "{result:?}");
}

#[test]
fn test_file_backed_database_survives_reopen() {
    let path = std::env::temp_dir().join(format!(
        "enrolsync_init_test_{}.sqlite",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    {
        let mut persistence: Persistence = Persistence::new_with_file(&path).unwrap();
        create_category(&mut persistence, "Persisted");
    }
    {
        let mut persistence: Persistence = Persistence::new_with_file(&path).unwrap();
        let names: Vec<String> = persistence
            .list_categories()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec![String::from("Persisted")]);
    }

    let _ = std::fs::remove_file(&path);
}
