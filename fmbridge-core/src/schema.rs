//! Dynamic field schemas and their rendering into prompt text.
//!
//! A dynamic schema is a flat, caller-supplied map of field declarations.
//! The renderer turns it into a JSON template block the model is asked to
//! fill in. The rendered text is advisory prompt material, not a validated
//! contract: malformed declarations degrade to defaults instead of failing.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Type tag of a dynamic-schema field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    String,
    Number,
    Boolean,
    Array,
}

impl FieldKind {
    fn as_str(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Array => "array",
        }
    }
}

// Unrecognized tags must degrade to the string default rather than fail:
// the renderer feeds a best-effort instruction, not a checked contract.
impl<'de> Deserialize<'de> for FieldKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct KindVisitor;

        impl Visitor<'_> for KindVisitor {
            type Value = FieldKind;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a field type tag")
            }

            fn visit_str<E: de::Error>(self, tag: &str) -> Result<FieldKind, E> {
                Ok(match tag {
                    "string" => FieldKind::String,
                    "number" => FieldKind::Number,
                    "boolean" => FieldKind::Boolean,
                    "array" => FieldKind::Array,
                    other => {
                        tracing::debug!(tag = other, "unrecognized field type, defaulting to string");
                        FieldKind::String
                    }
                })
            }
        }

        deserializer.deserialize_str(KindVisitor)
    }
}

/// One dynamic-schema field declaration.
///
/// Everything here is advisory: it steers the model toward a parseable
/// reply but is never enforced against the parsed result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Field type; missing or unrecognized tags default to `string`
    #[serde(rename = "type", default)]
    pub kind: FieldKind,

    /// Element type when `kind` is `array`; defaults to `string`
    #[serde(rename = "itemType", default, skip_serializing_if = "Option::is_none")]
    pub item_kind: Option<FieldKind>,

    /// Free-text guidance shown to the model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Rendered as a `(REQUIRED)` marker; not enforced by validation
    #[serde(default)]
    pub required: bool,

    /// Allowed literal values, rendered as `one of: a, b, c`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl FieldSchema {
    /// Create a field of the given kind
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Set the array element kind
    pub fn with_item_kind(mut self, item_kind: FieldKind) -> Self {
        self.item_kind = Some(item_kind);
        self
    }

    /// Set the description annotation
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Constrain the field to an enumerated set of values
    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = Some(options);
        self
    }

    /// Representative placeholder literal for the field's type
    fn placeholder(&self) -> String {
        match self.kind {
            FieldKind::String => "\"\"".to_string(),
            FieldKind::Number => "0".to_string(),
            FieldKind::Boolean => "true".to_string(),
            FieldKind::Array => {
                let item = self.item_kind.unwrap_or_default();
                format!("[\"{}\", ...]", item.as_str())
            }
        }
    }

    /// Trailing `//` annotation, or `None` when there is nothing to say
    fn annotation(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(description) = &self.description {
            parts.push(description.clone());
        }
        if let Some(options) = &self.options {
            parts.push(format!("one of: {}", options.join(", ")));
        }
        if self.required {
            parts.push("(REQUIRED)".to_string());
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// Render a field map into the JSON template block embedded in prompts.
///
/// Fields are rendered in name-sorted order, so identical schema input
/// always produces byte-identical output regardless of the map's internal
/// iteration order. An empty map renders an empty object template.
pub fn render_schema(fields: &HashMap<String, FieldSchema>) -> String {
    if fields.is_empty() {
        return "{}".to_string();
    }

    let mut names: Vec<&String> = fields.keys().collect();
    names.sort();

    let lines: Vec<String> = names
        .iter()
        .map(|name| {
            let field = &fields[*name];
            let mut line = format!("  \"{}\": {}", name, field.placeholder());
            if let Some(annotation) = field.annotation() {
                line.push_str(" // ");
                line.push_str(&annotation);
            }
            line
        })
        .collect();

    format!("{{\n{}\n}}", lines.join(",\n"))
}
