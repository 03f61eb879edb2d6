// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod error;
mod profile;
mod rules;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use error::DomainError;
pub use profile::{AllowedValues, SELECTION_SEPARATOR, UserProfile, UserSelection};
pub use rules::{Condition, MembershipRule};
pub use types::{
    EnrolmentMethod, GroupBinding, IdSet, Item, ItemRef, ItemType, Preset, PresetScope,
    ProfileField,
};
pub use validation::{
    parse_date, validate_item_id, validate_item_name, validate_preset, validate_preset_scope,
};
