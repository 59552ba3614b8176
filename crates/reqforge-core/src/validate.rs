//! Structural validation of a repaired candidate
//!
//! Pure predicate over the JSON candidate: no mutation, no repair.

use crate::error::ValidationFailure;
use crate::normalize::{PERMISSION_LISTS, ROLE_PERMISSIONS};
use reqforge_spec::canonical_role_key;
use serde_json::Value;

const REQUIRED_FIELDS: [&str; 5] = ["appName", "entities", "roles", "features", ROLE_PERMISSIONS];

/// Check a candidate, reporting the first defect found
///
/// # Errors
/// Returns the [`ValidationFailure`] describing why the candidate is unusable.
pub fn check(spec: &Value) -> Result<(), ValidationFailure> {
    let object = spec.as_object().ok_or(ValidationFailure::NotAnObject)?;

    for field in REQUIRED_FIELDS {
        if object.get(field).map_or(true, Value::is_null) {
            return Err(ValidationFailure::MissingField(field));
        }
    }

    if object
        .get("appName")
        .and_then(Value::as_str)
        .is_some_and(|name| name.trim().is_empty())
    {
        return Err(ValidationFailure::MissingField("appName"));
    }

    match object.get("entities").and_then(Value::as_array) {
        Some(entities) if !entities.is_empty() => {}
        _ => return Err(ValidationFailure::NoEntities),
    }

    let roles = match object.get("roles").and_then(Value::as_array) {
        Some(roles) if !roles.is_empty() => roles,
        _ => return Err(ValidationFailure::NoRoles),
    };

    let permissions = object
        .get(ROLE_PERMISSIONS)
        .and_then(Value::as_object)
        .ok_or(ValidationFailure::PermissionsNotKeyed)?;

    if let Some((key, _)) = permissions.iter().find(|(_, entry)| !entry.is_object()) {
        return Err(ValidationFailure::MalformedEntry(key.clone()));
    }

    let mut has_editor = false;
    for (index, role) in roles.iter().enumerate() {
        let role = role.as_str().ok_or(ValidationFailure::RoleNotString(index))?;
        let key = canonical_role_key(role);
        let entry = permissions
            .get(&key)
            .ok_or_else(|| ValidationFailure::MissingRolePermissions {
                role: role.to_owned(),
                key: key.clone(),
            })?;

        for list in PERMISSION_LISTS {
            if !entry.get(list).is_some_and(Value::is_array) {
                return Err(ValidationFailure::MissingPermissionList {
                    role: role.to_owned(),
                    list,
                });
            }
        }

        let can_view = entry
            .get("canView")
            .and_then(Value::as_array)
            .is_some_and(|view| !view.is_empty());
        if !can_view {
            return Err(ValidationFailure::NoVisibility(role.to_owned()));
        }

        let can_edit = entry
            .get("canEdit")
            .and_then(Value::as_array)
            .is_some_and(|edit| !edit.is_empty());
        if can_edit {
            has_editor = true;
        } else {
            tracing::debug!(role, "role has no edit permissions");
        }
    }

    if has_editor {
        Ok(())
    } else {
        Err(ValidationFailure::NoEditor)
    }
}

/// Whether a candidate passes [`check`]
#[inline]
#[must_use]
pub fn is_valid(spec: &Value) -> bool {
    check(spec).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> Value {
        json!({
            "appName": "Tracker",
            "entities": [{ "name": "Task", "fields": [] }],
            "roles": ["Lead", "member"],
            "features": ["Track tasks"],
            "rolePermissions": {
                "Lead": { "canCreate": ["Task"], "canView": ["Task"], "canEdit": ["Task"] },
                "Member": { "canCreate": [], "canView": ["Task"], "canEdit": [] }
            }
        })
    }

    #[test]
    fn accepts_valid_spec_with_read_only_role() {
        assert_eq!(check(&valid()), Ok(()));
    }

    #[test]
    fn rejects_missing_top_level_fields() {
        for field in REQUIRED_FIELDS {
            let mut spec = valid();
            spec.as_object_mut().unwrap().remove(field);
            assert_eq!(check(&spec), Err(ValidationFailure::MissingField(field)));
        }
        let mut spec = valid();
        spec["features"] = Value::Null;
        assert_eq!(check(&spec), Err(ValidationFailure::MissingField("features")));

        for blank in ["", "   "] {
            let mut spec = valid();
            spec["appName"] = json!(blank);
            assert_eq!(check(&spec), Err(ValidationFailure::MissingField("appName")));
        }
    }

    #[test]
    fn rejects_empty_entities_and_roles() {
        let mut spec = valid();
        spec["entities"] = json!([]);
        assert_eq!(check(&spec), Err(ValidationFailure::NoEntities));

        let mut spec = valid();
        spec["roles"] = json!([]);
        assert_eq!(check(&spec), Err(ValidationFailure::NoRoles));

        let mut spec = valid();
        spec["roles"] = json!(["Lead", 3]);
        assert_eq!(check(&spec), Err(ValidationFailure::RoleNotString(1)));
    }

    #[test]
    fn rejects_unkeyed_or_incomplete_permissions() {
        let mut spec = valid();
        spec["rolePermissions"] = json!([{ "role": "Lead" }]);
        assert_eq!(check(&spec), Err(ValidationFailure::PermissionsNotKeyed));

        let mut spec = valid();
        spec["rolePermissions"].as_object_mut().unwrap().remove("Member");
        assert!(matches!(
            check(&spec),
            Err(ValidationFailure::MissingRolePermissions { key, .. }) if key == "Member"
        ));

        let mut spec = valid();
        spec["rolePermissions"]["Lead"]["canView"] = json!("Task");
        assert!(matches!(
            check(&spec),
            Err(ValidationFailure::MissingPermissionList { list: "canView", .. })
        ));
    }

    #[test]
    fn rejects_non_object_entries() {
        let mut spec = valid();
        spec["rolePermissions"]["roleName"] = json!("Lead");
        assert_eq!(
            check(&spec),
            Err(ValidationFailure::MalformedEntry("roleName".into()))
        );
    }

    #[test]
    fn rejects_role_without_visibility() {
        let mut spec = valid();
        spec["rolePermissions"]["Member"]["canView"] = json!([]);
        assert_eq!(check(&spec), Err(ValidationFailure::NoVisibility("member".into())));
    }

    #[test]
    fn rejects_when_nobody_can_edit() {
        let mut spec = valid();
        spec["rolePermissions"]["Lead"]["canEdit"] = json!([]);
        assert_eq!(check(&spec), Err(ValidationFailure::NoEditor));
    }

    #[test]
    fn does_not_mutate() {
        let spec = valid();
        let before = spec.clone();
        let _ = is_valid(&spec);
        assert_eq!(spec, before);
    }
}
