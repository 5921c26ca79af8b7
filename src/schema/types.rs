//! Field schema types
//!
//! Field sets keep the order they were declared in, so the payload and
//! the effective mapping list fields in definition order.

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Declared type of a payload field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    /// Multi-line string
    Text,
    /// String hidden in UIs
    Password,
    Number,
    Integer,
    Boolean,
    /// Date-like string or unix timestamp
    Datetime,
    Object,
}

impl FieldType {
    /// Name used in validation messages
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String | FieldType::Text | FieldType::Password => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Datetime => "datetime",
            FieldType::Object => "object",
        }
    }
}

/// Schema for a single payload field
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    /// Display label
    #[serde(default)]
    pub label: String,

    /// Display description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Value type
    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    /// Reject the payload when the field is absent
    #[serde(default)]
    pub required: bool,

    /// Accept an explicit `null`
    #[serde(default)]
    pub allow_null: bool,

    /// The field holds an array of `field_type`
    #[serde(default)]
    pub multiple: bool,

    /// Mapping used when no explicit mapping is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Sub-fields of an object field
    #[serde(default, skip_serializing_if = "FieldSet::is_empty")]
    pub properties: FieldSet,

    /// Keep undeclared keys of an object field with `properties`
    #[serde(default)]
    pub additional_properties: bool,
}

impl FieldSchema {
    /// Create a field of the given type
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            ..Default::default()
        }
    }

    /// Create a string field
    pub fn string() -> Self {
        Self::new(FieldType::String)
    }

    /// Set the label
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Mark as required
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Accept explicit nulls
    #[must_use]
    pub fn allow_null(mut self) -> Self {
        self.allow_null = true;
        self
    }

    /// Expect an array of values
    #[must_use]
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Set the default mapping
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Set object sub-fields
    #[must_use]
    pub fn with_properties(mut self, properties: FieldSet) -> Self {
        self.properties = properties;
        self
    }

    /// Keep undeclared keys inside this object field
    #[must_use]
    pub fn with_additional_properties(mut self) -> Self {
        self.additional_properties = true;
        self
    }

    /// The mapping to use for this field: the explicit one, else the default
    pub fn effective_mapping<'a>(&'a self, explicit: Option<&'a Value>) -> Option<&'a Value> {
        explicit.or(self.default.as_ref())
    }
}

/// Ordered set of named fields
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldSet {
    fields: Vec<(String, FieldSchema)>,
}

impl FieldSet {
    /// Create an empty field set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, replacing any field with the same name
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, schema: FieldSchema) -> Self {
        self.insert(name, schema);
        self
    }

    /// Add a field, replacing any field with the same name
    pub fn insert(&mut self, name: impl Into<String>, schema: FieldSchema) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = schema,
            None => self.fields.push((name, schema)),
        }
    }

    /// Look up a field by name
    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    /// Whether a field is declared
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate fields in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldSchema)> {
        self.fields.iter().map(|(n, f)| (n.as_str(), f))
    }

    /// Field names in declaration order
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields are declared
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'de> Deserialize<'de> for FieldSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Map::<String, Value>::deserialize(deserializer)?;
        let mut fields = Vec::with_capacity(raw.len());
        for (name, value) in raw {
            let schema: FieldSchema = serde_json::from_value(value)
                .map_err(|e| D::Error::custom(format!("field '{name}': {e}")))?;
            fields.push((name, schema));
        }
        Ok(Self { fields })
    }
}

impl Serialize for FieldSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, schema) in &self.fields {
            map.serialize_entry(name, schema)?;
        }
        map.end()
    }
}
