//! Role name canonicalization and promotion preference

/// Role names preferred for promotion to full access, in search order.
pub const ADMIN_ROLE_PREFERENCE: [&str; 5] =
    ["admin", "administrator", "owner", "manager", "supervisor"];

/// Permission-map key for a role name
///
/// First character upper-cased, the remainder lower-cased. Every lookup of a
/// role's permissions goes through this function.
///
/// # Examples
/// - `"teacher"` → `"Teacher"`
/// - `"STORE MANAGER"` → `"Store manager"`
#[must_use]
pub fn canonical_role_key(role: &str) -> String {
    let mut chars = role.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Pick the role to promote when nobody can edit
///
/// The first [`ADMIN_ROLE_PREFERENCE`] entry matching a role by
/// case-insensitive equality wins; otherwise the first declared role.
/// `None` only for an empty role list.
#[must_use]
pub fn promotion_target<S: AsRef<str>>(roles: &[S]) -> Option<&str> {
    ADMIN_ROLE_PREFERENCE
        .iter()
        .find_map(|preferred| {
            roles
                .iter()
                .map(AsRef::as_ref)
                .find(|role| role.to_lowercase() == *preferred)
        })
        .or_else(|| roles.first().map(AsRef::as_ref))
}
