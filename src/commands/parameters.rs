use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;

/// Type tag of a command parameter, as written in the JSON schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParameterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterType::String => "string",
            ParameterType::Integer => "integer",
            ParameterType::Number => "number",
            ParameterType::Boolean => "boolean",
            ParameterType::Array => "array",
            ParameterType::Object => "object",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ParameterType::Integer | ParameterType::Number)
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    #[serde(rename = "type")]
    pub param_type: ParameterType,
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(
        default,
        rename = "minLength",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_length: Option<usize>,
}

impl ParameterSpec {
    pub fn new(param_type: ParameterType, description: impl Into<String>) -> Self {
        Self {
            param_type,
            description: description.into(),
            required: false,
            minimum: None,
            maximum: None,
            min_length: None,
        }
    }

    pub fn string(description: impl Into<String>) -> Self {
        Self::new(ParameterType::String, description)
    }

    pub fn integer(description: impl Into<String>) -> Self {
        Self::new(ParameterType::Integer, description)
    }

    pub fn boolean(description: impl Into<String>) -> Self {
        Self::new(ParameterType::Boolean, description)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_minimum(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    pub fn with_maximum(mut self, maximum: f64) -> Self {
        self.maximum = Some(maximum);
        self
    }

    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length);
        self
    }

    fn property_schema(&self) -> Value {
        let mut property = Map::new();
        property.insert("type".to_string(), json!(self.param_type.as_str()));
        property.insert("description".to_string(), json!(self.description));
        if let Some(minimum) = self.minimum {
            property.insert("minimum".to_string(), json!(minimum));
        }
        if let Some(maximum) = self.maximum {
            property.insert("maximum".to_string(), json!(maximum));
        }
        if let Some(min_length) = self.min_length {
            property.insert("minLength".to_string(), json!(min_length));
        }
        Value::Object(property)
    }
}

/// Ordered parameter declarations of one command. Order is declaration order
/// and only affects help output and the exported schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandParameters {
    params: IndexMap<String, ParameterSpec>,
}

impl CommandParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter. A repeated name replaces the earlier declaration in place.
    pub fn with(mut self, name: impl Into<String>, spec: ParameterSpec) -> Self {
        self.params.insert(name.into(), spec);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParameterSpec> {
        self.params.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterSpec)> {
        self.params.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn required_names(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|(_, spec)| spec.required)
            .map(|(name, _)| name)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// JSON schema for the parameters, in the shape LLM function calling expects.
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|(name, spec)| (name.clone(), spec.property_schema()))
            .collect();
        let required: Vec<&str> = self.required_names().collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false
        })
    }

    /// One line per parameter, e.g. `  index (integer, required): The 1-based index`.
    pub fn usage(&self) -> String {
        self.iter()
            .map(|(name, spec)| {
                let requirement = if spec.required { ", required" } else { "" };
                format!(
                    "  {} ({}{}): {}",
                    name, spec.param_type, requirement, spec.description
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
