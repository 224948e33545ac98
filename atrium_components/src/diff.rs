//! Structural comparison of schema fragments.
//!
//! Drift detection and migration need to know *what kind* of change hit a
//! property, not just that bytes differ, so these comparators classify
//! entries into added/removed/updated over the concrete declaration shapes.

use atrium_config::{PropertyMap, ResolvedTypes};

/// Difference between two property maps.
#[derive(Debug, Default, PartialEq)]
pub struct PropertyDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub updated: Vec<UpdatedProperty>,
}

/// One changed declaration, with the changed facets called out.
#[derive(Debug, PartialEq)]
pub struct UpdatedProperty {
    pub name: String,
    pub kind_changed: bool,
    pub array_type_changed: bool,
}

impl PropertyDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

pub fn diff_properties(old: &PropertyMap, new: &PropertyMap) -> PropertyDiff {
    let mut diff = PropertyDiff::default();

    for (name, old_decl) in old {
        match new.get(name) {
            None => diff.removed.push(name.clone()),
            Some(new_decl) if new_decl != old_decl => diff.updated.push(UpdatedProperty {
                name: name.clone(),
                kind_changed: new_decl.kind != old_decl.kind,
                array_type_changed: new_decl.array_type != old_decl.array_type,
            }),
            Some(_) => {}
        }
    }
    for name in new.keys() {
        if !old.contains_key(name) {
            diff.added.push(name.clone());
        }
    }

    diff
}

/// Difference between two resolved type closures.
#[derive(Debug, Default, PartialEq)]
pub struct TypeDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub updated: Vec<String>,
}

impl TypeDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

pub fn diff_types(old: &ResolvedTypes, new: &ResolvedTypes) -> TypeDiff {
    let mut diff = TypeDiff::default();

    for (name, old_def) in old {
        match new.get(name) {
            None => diff.removed.push(name.clone()),
            Some(new_def) if !diff_properties(&old_def.properties, &new_def.properties).is_empty() => {
                diff.updated.push(name.clone());
            }
            Some(_) => {}
        }
    }
    for name in new.keys() {
        if !old.contains_key(name) {
            diff.added.push(name.clone());
        }
    }

    diff
}
