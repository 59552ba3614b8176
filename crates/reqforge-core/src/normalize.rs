//! Role permission normalization
//!
//! Generators return `rolePermissions` either keyed by role or as a list of
//! `{ role, canCreate, canView, canEdit }` records. The list form is folded
//! into the keyed form; every other shape passes through untouched and is
//! left for the validator to judge.

use serde_json::{Map, Value};

/// Top-level key holding role permissions
pub const ROLE_PERMISSIONS: &str = "rolePermissions";

/// Permission list keys in wire order
pub const PERMISSION_LISTS: [&str; 3] = ["canCreate", "canView", "canEdit"];

/// Record field names that mark a mapping as a mis-shaped single record
const RECORD_FIELD_KEYS: [&str; 2] = ["role", "roleName"];

/// Normalize a raw generator response
///
/// Idempotent: `normalize(normalize(x)) == normalize(x)`.
#[must_use]
pub fn normalize(mut raw: Value) -> Value {
    normalize_in_place(&mut raw);
    raw
}

/// Normalize `rolePermissions` of `raw` in place
pub fn normalize_in_place(raw: &mut Value) {
    let Some(permissions) = raw.get_mut(ROLE_PERMISSIONS) else {
        return;
    };

    match permissions {
        Value::Array(records) => {
            let keyed = fold_records(std::mem::take(records));
            *permissions = Value::Object(keyed);
        }
        Value::Object(map) if is_unkeyed_record(map) => {
            // Cannot tell which role this belongs to; validation rejects it.
            tracing::warn!(
                keys = ?map.keys().collect::<Vec<_>>(),
                "rolePermissions looks like a single unkeyed record, leaving as-is"
            );
        }
        _ => {}
    }
}

/// Whether a mapping's only key is a record field name
fn is_unkeyed_record(map: &Map<String, Value>) -> bool {
    map.len() == 1 && map.keys().all(|k| RECORD_FIELD_KEYS.contains(&k.as_str()))
}

/// Fold `{ role, ... }` records into a mapping keyed by role
///
/// Records without a string `role` are dropped. Later records for the same
/// role replace earlier ones.
fn fold_records(records: Vec<Value>) -> Map<String, Value> {
    let mut keyed = Map::new();
    for record in records {
        let Value::Object(mut record) = record else {
            continue;
        };
        let Some(Value::String(role)) = record.remove("role") else {
            tracing::debug!("dropping permission record without a string role");
            continue;
        };

        let mut entry = Map::new();
        for list in PERMISSION_LISTS {
            let items = match record.remove(list) {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            entry.insert(list.to_owned(), Value::Array(items));
        }
        keyed.insert(role, Value::Object(entry));
    }
    keyed
}
