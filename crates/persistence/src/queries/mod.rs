// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! - `catalog`: categories, courses, tags and course tags
//! - `groups`: group bindings by item or id
//! - `enrolments`: enrolment methods and roles
//! - `rules`: membership rules with their conditions
//! - `profile`: profile field values and user data
//! - `presets`: stored presets
//! - `tasks`: the durable task queue

pub mod catalog;
pub mod enrolments;
pub mod groups;
pub mod presets;
pub mod profile;
pub mod rules;
pub mod tasks;
