//! Keyword-driven fallback generator
//!
//! Produces one of three hand-authored specifications depending on words in
//! the description. Output depends only on the lower-cased text, so the same
//! description always yields the same specification.
//!
//! Some templates grant permissions on entities they do not declare (for
//! example `Sale` in the inventory template). These are kept as authored and
//! surface through [`AppSpec::dangling_references`].

use reqforge_spec::{AppSpec, Entity, Field, FieldType, Permission, RolePermissions};

/// Template picked for a description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockTemplate {
    /// Courses, students and grades
    Course,
    /// Products and suppliers
    Inventory,
    /// Single user entity
    Generic,
}

impl MockTemplate {
    /// Select the template for a description (first match wins)
    #[must_use]
    pub fn select(description: &str) -> Self {
        let text = description.to_lowercase();
        if text.contains("course") && text.contains("student") {
            Self::Course
        } else if text.contains("inventory") || text.contains("product") {
            Self::Inventory
        } else {
            Self::Generic
        }
    }

    /// Build the template's specification
    #[must_use]
    pub fn build(self) -> AppSpec {
        match self {
            Self::Course => course_manager(),
            Self::Inventory => inventory_manager(),
            Self::Generic => business_app(),
        }
    }
}

/// Deterministic offline generator
#[derive(Debug, Clone, Copy, Default)]
pub struct MockGenerator;

impl MockGenerator {
    /// Create new mock generator
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Generate a specification for a description
    #[must_use]
    pub fn generate(&self, description: &str) -> AppSpec {
        MockTemplate::select(description).build()
    }
}

fn field(name: &str, field_type: FieldType, required: bool) -> Field {
    Field::new(name, field_type, required)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

fn permissions(entries: [(&str, Permission); 3]) -> RolePermissions {
    entries
        .into_iter()
        .map(|(role, permission)| (role.to_owned(), permission))
        .collect()
}

fn course_manager() -> AppSpec {
    use FieldType::{Date, Email, Number, Select, Text, Textarea};

    AppSpec {
        app_name: "Course Manager".into(),
        entities: vec![
            Entity::new(
                "Student",
                vec![
                    field("Name", Text, true),
                    field("Email", Email, true),
                    field("Age", Number, false),
                    field("Student ID", Text, true),
                ],
            ),
            Entity::new(
                "Course",
                vec![
                    field("Title", Text, true),
                    field("Code", Text, true),
                    field("Credits", Number, true),
                    field("Description", Textarea, false),
                ],
            ),
            Entity::new(
                "Grade",
                vec![
                    field("Student", Select, true),
                    field("Course", Select, true),
                    field("Grade", Number, true),
                    field("Date", Date, true),
                ],
            ),
        ],
        roles: strings(&["Teacher", "Student", "Admin"]),
        features: strings(&["Add course", "Enroll students", "View reports", "Manage grades"]),
        role_permissions: permissions([
            (
                "Student",
                Permission::new(&["Student"], &["Student", "Course", "Grade"], &["Student"]),
            ),
            (
                "Teacher",
                Permission::new(
                    &["Course", "Student", "Grade"],
                    &["Course", "Student", "Grade"],
                    &["Course", "Student", "Grade"],
                ),
            ),
            (
                "Admin",
                Permission::new(
                    &["Student", "Course", "Grade", "User"],
                    &["Student", "Course", "Grade", "User"],
                    &["Student", "Course", "Grade", "User"],
                ),
            ),
        ]),
    }
}

fn inventory_manager() -> AppSpec {
    use FieldType::{Email, Number, Text};

    AppSpec {
        app_name: "Inventory Manager".into(),
        entities: vec![
            Entity::new(
                "Product",
                vec![
                    field("Name", Text, true),
                    field("SKU", Text, true),
                    field("Price", Number, true),
                    field("Quantity", Number, true),
                ],
            ),
            Entity::new(
                "Supplier",
                vec![
                    field("Company Name", Text, true),
                    field("Contact Email", Email, true),
                    field("Phone", Text, false),
                ],
            ),
        ],
        roles: strings(&["Manager", "Employee", "Admin"]),
        features: strings(&[
            "Add products",
            "Update inventory",
            "Generate reports",
            "Manage suppliers",
        ]),
        role_permissions: permissions([
            (
                "Manager",
                Permission::new(
                    &["Product", "Supplier"],
                    &["Product", "Supplier", "Sale"],
                    &["Product", "Supplier"],
                ),
            ),
            ("Employee", Permission::new(&["Sale"], &["Product", "Sale"], &[])),
            (
                "Admin",
                Permission::new(
                    &["Product", "Supplier", "Sale", "User"],
                    &["Product", "Supplier", "Sale", "User"],
                    &["Product", "Supplier", "Sale", "User"],
                ),
            ),
        ]),
    }
}

fn business_app() -> AppSpec {
    use FieldType::{Email, Select, Text};

    let mut role_permissions = RolePermissions::new();
    role_permissions.insert("User".into(), Permission::new(&["User"], &["User"], &["User"]));
    role_permissions.insert("Admin".into(), Permission::new(&["User"], &["User"], &["User"]));

    AppSpec {
        app_name: "Business App".into(),
        entities: vec![Entity::new(
            "User",
            vec![
                field("Name", Text, true),
                field("Email", Email, true),
                field("Role", Select, true),
            ],
        )],
        roles: strings(&["User", "Admin"]),
        features: strings(&["Manage data", "View reports", "User management"]),
        role_permissions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enforce::enforce;
    use crate::validate::is_valid;
    use pretty_assertions::assert_eq;

    #[test]
    fn dispatch_order() {
        assert_eq!(MockTemplate::select("Course portal for STUDENTS"), MockTemplate::Course);
        assert_eq!(MockTemplate::select("course catalogue"), MockTemplate::Generic);
        assert_eq!(
            MockTemplate::select("Product inventory with students"),
            MockTemplate::Inventory
        );
        assert_eq!(MockTemplate::select("course products for students"), MockTemplate::Course);
        assert_eq!(MockTemplate::select("a todo list"), MockTemplate::Generic);
    }

    #[test]
    fn course_template_shape() {
        let spec = MockGenerator::new().generate("course management with students and teachers");
        assert_eq!(spec.roles, vec!["Teacher", "Student", "Admin"]);
        let admin = spec.permissions_for("admin").unwrap();
        for entity in spec.entity_names() {
            assert!(admin.can_edit.iter().any(|e| e == entity));
        }
    }

    #[test]
    fn output_is_byte_identical_across_calls() {
        let generator = MockGenerator::new();
        for text in ["Course + student tracker", "inventory", "anything else"] {
            let first = serde_json::to_string(&generator.generate(text)).unwrap();
            let second = serde_json::to_string(&generator.generate(text)).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn every_template_validates_and_is_enforcement_stable() {
        for template in [MockTemplate::Course, MockTemplate::Inventory, MockTemplate::Generic] {
            let value = serde_json::to_value(template.build()).unwrap();
            assert!(is_valid(&value), "{template:?} should validate");

            let mut enforced = value.clone();
            enforce(&mut enforced);
            assert_eq!(enforced, value, "{template:?} should need no repair");
        }
    }

    #[test]
    fn inventory_template_keeps_undeclared_sale_entity() {
        let spec = MockTemplate::Inventory.build();
        assert!(spec
            .dangling_references()
            .iter()
            .any(|d| d.entity == "Sale" && d.role == "Employee"));
    }
}
