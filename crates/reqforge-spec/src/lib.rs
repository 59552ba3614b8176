//! reqforge application specification model
//!
//! The structured output of requirement extraction:
//!
//! - [`AppSpec`]: application name, entities, roles, features, permissions
//! - [`Entity`] / [`Field`] / [`FieldType`]: the data model of the app
//! - [`Permission`]: per-role create/view/edit lists of entity names
//! - [`canonical_role_key`]: the single role-name → permission-key mapping
//!
//! # Example
//!
//! ```rust
//! use reqforge_spec::{canonical_role_key, FieldType};
//!
//! assert_eq!(canonical_role_key("ADMIN"), "Admin");
//! assert_eq!(FieldType::from("rating").input_kind(), FieldType::Text);
//! ```

#![warn(unreachable_pub)]

mod app_spec;
mod field;
mod role;

pub use app_spec::{
    AppSpec, DanglingReference, Entity, Permission, PermissionAction, RolePermissions,
};
pub use field::{Field, FieldType};
pub use role::{canonical_role_key, promotion_target, ADMIN_ROLE_PREFERENCE};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
