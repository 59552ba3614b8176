//! Permission invariant repair
//!
//! Mutates a normalized candidate so that every declared role has a
//! permissions entry with visibility, and at least one role can edit.
//!
//! # Algorithm
//!
//! 1. Collect entity names (non-empty strings, declaration order).
//! 2. For each role, ensure an entry under its canonical key; missing
//!    entries become read-only over every entity, malformed lists are
//!    coerced (`canCreate`/`canEdit` → `[]`, `canView` → all entities).
//! 3. If nobody can edit, promote an admin-like role (or the first role)
//!    to full access.
//!
//! Enforcement is skipped when `roles` or `entities` is not a sequence or
//! `rolePermissions` is not a mapping; the validator rejects those.

use crate::normalize::ROLE_PERMISSIONS;
use reqforge_spec::{canonical_role_key, promotion_target};
use serde_json::{Map, Value};

/// Result of an enforcement pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enforcement {
    /// Candidate shape did not allow repair
    Skipped(&'static str),
    /// Repairs were applied (possibly none)
    Applied {
        /// Keys of entries created for roles that had none
        created: Vec<String>,
        /// Key of the role promoted to full access
        promoted: Option<String>,
    },
}

impl Enforcement {
    /// Whether enforcement ran
    #[inline]
    #[must_use]
    pub fn was_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Repair `spec` in place
pub fn enforce(spec: &mut Value) -> Enforcement {
    let Some(object) = spec.as_object_mut() else {
        return Enforcement::Skipped("specification is not an object");
    };
    let (Some(Value::Array(roles)), Some(Value::Array(entities))) =
        (object.get("roles"), object.get("entities"))
    else {
        return Enforcement::Skipped("roles or entities is not a sequence");
    };

    let roles: Vec<String> = roles
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_owned)
        .collect();
    let entity_names: Vec<Value> = entities
        .iter()
        .filter_map(|entity| entity.get("name").and_then(Value::as_str))
        .filter(|name| !name.is_empty())
        .map(|name| Value::String(name.to_owned()))
        .collect();

    let permissions = object
        .entry(ROLE_PERMISSIONS)
        .or_insert_with(|| Value::Object(Map::new()));
    if permissions.is_null() {
        *permissions = Value::Object(Map::new());
    }
    let Value::Object(permissions) = permissions else {
        return Enforcement::Skipped("rolePermissions is not a mapping");
    };

    let mut created = Vec::new();
    for role in &roles {
        let key = canonical_role_key(role);
        match permissions.get_mut(&key) {
            Some(Value::Object(entry)) => repair_entry(entry, &entity_names),
            Some(other) => {
                tracing::debug!(role = %key, "replacing non-object permissions entry");
                *other = read_only_entry(&entity_names);
                created.push(key);
            }
            None => {
                permissions.insert(key.clone(), read_only_entry(&entity_names));
                created.push(key);
            }
        }
    }

    let declared: Vec<String> = roles.iter().map(|role| canonical_role_key(role)).collect();
    let orphaned: Vec<&String> = permissions
        .keys()
        .filter(|key| !declared.contains(key))
        .collect();
    if !orphaned.is_empty() {
        tracing::debug!(?orphaned, "permission entries match no declared role, left untouched");
    }

    let has_editor = roles.iter().any(|role| {
        permissions
            .get(&canonical_role_key(role))
            .and_then(|entry| entry.get("canEdit"))
            .and_then(Value::as_array)
            .is_some_and(|edit| !edit.is_empty())
    });

    let mut promoted = None;
    if !has_editor {
        if let Some(target) = promotion_target(&roles) {
            let key = canonical_role_key(target);
            let entry = permissions
                .entry(key.clone())
                .or_insert_with(|| read_only_entry(&entity_names));
            if let Value::Object(entry) = entry {
                grant_full_access(entry, &entity_names);
            }
            tracing::info!(role = %key, "no role could edit, promoted to full access");
            promoted = Some(key);
        }
    }

    Enforcement::Applied { created, promoted }
}

/// Entry for a role the generator left out: sees everything, changes nothing
fn read_only_entry(entity_names: &[Value]) -> Value {
    let mut entry = Map::new();
    entry.insert("canCreate".into(), Value::Array(Vec::new()));
    entry.insert("canView".into(), Value::Array(entity_names.to_vec()));
    entry.insert("canEdit".into(), Value::Array(Vec::new()));
    Value::Object(entry)
}

fn repair_entry(entry: &mut Map<String, Value>, entity_names: &[Value]) {
    for list in ["canCreate", "canEdit"] {
        if !entry.get(list).is_some_and(Value::is_array) {
            entry.insert(list.into(), Value::Array(Vec::new()));
        }
    }
    if !has_items(entry.get("canView")) {
        entry.insert("canView".into(), Value::Array(entity_names.to_vec()));
    }
}

fn grant_full_access(entry: &mut Map<String, Value>, entity_names: &[Value]) {
    entry.insert("canCreate".into(), Value::Array(entity_names.to_vec()));
    entry.insert("canEdit".into(), Value::Array(entity_names.to_vec()));
    if !has_items(entry.get("canView")) {
        entry.insert("canView".into(), Value::Array(entity_names.to_vec()));
    }
}

fn has_items(list: Option<&Value>) -> bool {
    list.and_then(Value::as_array).is_some_and(|items| !items.is_empty())
}
