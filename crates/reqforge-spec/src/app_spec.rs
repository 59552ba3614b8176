//! Application specification and role permissions

use crate::field::Field;
use crate::role::canonical_role_key;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Permissions keyed by canonical role name
pub type RolePermissions = IndexMap<String, Permission>;

/// Data entity of the generated application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity name, referenced by permissions
    pub name: String,
    /// Ordered fields
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Entity {
    /// Create new entity
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }
}

/// What a role may do with each entity
///
/// Each list holds entity names in generator order. Names are not checked
/// against the entity list; see [`AppSpec::dangling_references`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    /// Entities the role may create
    pub can_create: Vec<String>,
    /// Entities the role may see
    pub can_view: Vec<String>,
    /// Entities the role may modify
    pub can_edit: Vec<String>,
}

impl Permission {
    /// Create permission from entity-name lists
    #[must_use]
    pub fn new<S: AsRef<str>>(can_create: &[S], can_view: &[S], can_edit: &[S]) -> Self {
        let owned = |names: &[S]| -> Vec<String> {
            names.iter().map(|n| n.as_ref().to_owned()).collect()
        };
        Self {
            can_create: owned(can_create),
            can_view: owned(can_view),
            can_edit: owned(can_edit),
        }
    }

    /// Entity names for one action
    #[inline]
    #[must_use]
    pub fn entities(&self, action: PermissionAction) -> &[String] {
        match action {
            PermissionAction::Create => &self.can_create,
            PermissionAction::View => &self.can_view,
            PermissionAction::Edit => &self.can_edit,
        }
    }

    /// Whether the role can edit at least one entity
    #[inline]
    #[must_use]
    pub fn is_editor(&self) -> bool {
        !self.can_edit.is_empty()
    }
}

/// Permission action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionAction {
    /// `canCreate`
    Create,
    /// `canView`
    View,
    /// `canEdit`
    Edit,
}

impl PermissionAction {
    /// All actions in wire order
    pub const ALL: [PermissionAction; 3] = [Self::Create, Self::View, Self::Edit];
}

impl Display for PermissionAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "canCreate",
            Self::View => "canView",
            Self::Edit => "canEdit",
        })
    }
}

/// Permission entry naming an undeclared entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    /// Permission-map key
    pub role: String,
    /// List the name appears in
    pub action: PermissionAction,
    /// Undeclared entity name
    pub entity: String,
}

/// Structured application specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSpec {
    /// Application name
    pub app_name: String,
    /// Data entities
    pub entities: Vec<Entity>,
    /// Roles (or feature groups) in presentation order
    pub roles: Vec<String>,
    /// Feature list
    pub features: Vec<String>,
    /// Permissions keyed by [`canonical_role_key`]
    pub role_permissions: RolePermissions,
}

impl AppSpec {
    /// Declared entity names in order
    #[must_use]
    pub fn entity_names(&self) -> Vec<&str> {
        self.entities.iter().map(|e| e.name.as_str()).collect()
    }

    /// Permissions of a role, looked up by its canonical key
    #[inline]
    #[must_use]
    pub fn permissions_for(&self, role: &str) -> Option<&Permission> {
        self.role_permissions.get(&canonical_role_key(role))
    }

    /// Declared roles that can edit at least one entity
    pub fn editors(&self) -> impl Iterator<Item = &str> {
        self.roles
            .iter()
            .filter(|role| self.permissions_for(role).is_some_and(Permission::is_editor))
            .map(String::as_str)
    }

    /// Permission entries referencing entities missing from `entities`
    #[must_use]
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let declared = self.entity_names();
        let mut dangling = Vec::new();
        for (role, permission) in &self.role_permissions {
            for action in PermissionAction::ALL {
                for entity in permission.entities(action) {
                    if !declared.contains(&entity.as_str()) {
                        dangling.push(DanglingReference {
                            role: role.clone(),
                            action,
                            entity: entity.clone(),
                        });
                    }
                }
            }
        }
        dangling
    }
}
