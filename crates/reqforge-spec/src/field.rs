//! Entity fields and their input types

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Display, Formatter};

/// Input type of an entity field
///
/// Unknown type names are kept verbatim in [`FieldType::Other`] so the
/// pipeline never rewrites generator output; [`FieldType::input_kind`]
/// resolves them to `text` for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum FieldType {
    /// Single-line text
    #[default]
    Text,
    /// Email address
    Email,
    /// Numeric value
    Number,
    /// Calendar date
    Date,
    /// Choice from a list
    Select,
    /// Multi-line text
    Textarea,
    /// Unrecognized type name
    Other(String),
}

impl FieldType {
    /// Wire name of the type
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Number => "number",
            Self::Date => "date",
            Self::Select => "select",
            Self::Textarea => "textarea",
            Self::Other(name) => name,
        }
    }

    /// Whether the type is one of the six supported kinds
    #[inline]
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Type to render the field with (unknown types render as text)
    #[inline]
    #[must_use]
    pub fn input_kind(&self) -> FieldType {
        match self {
            Self::Other(_) => Self::Text,
            known => known.clone(),
        }
    }
}

impl From<&str> for FieldType {
    fn from(name: &str) -> Self {
        match name {
            "text" => Self::Text,
            "email" => Self::Email,
            "number" => Self::Number,
            "date" => Self::Date,
            "select" => Self::Select,
            "textarea" => Self::Textarea,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = Option::<String>::deserialize(deserializer)?;
        Ok(name.map_or(Self::Text, |name| Self::from(name.as_str())))
    }
}

/// Single field of an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Display name
    pub name: String,
    /// Input type (`text` when absent)
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    /// Whether a value must be supplied
    #[serde(default)]
    pub required: bool,
}

impl Field {
    /// Create new field
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: FieldType, required: bool) -> Self {
        Self {
            name: name.into(),
            field_type,
            required,
        }
    }
}
