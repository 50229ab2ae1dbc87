use indexmap::IndexMap;
use serde_json::{Map, Number, Value};

use super::error::{ArgumentIssue, CommandError, CommandResult};
use super::parameters::{CommandParameters, ParameterSpec, ParameterType};

/// Arguments that passed validation, coerced to their declared types.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedArguments {
    values: IndexMap<String, Value>,
}

impl ValidatedArguments {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    pub fn get_integer(&self, name: &str) -> Option<i64> {
        self.values.get(name).and_then(Value::as_i64)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.values.get(name).and_then(Value::as_bool)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Compact `key: value` rendering for call display.
    pub fn summary(&self) -> String {
        self.values
            .iter()
            .map(|(name, value)| match value {
                Value::String(s) => format!("{}: {:?}", name, s),
                other => format!("{}: {}", name, other),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Checks raw arguments against a command's parameter declarations.
///
/// Unknown arguments are rejected. Values are coerced best-effort (numeric
/// strings to numbers, `"true"`/`"false"` to booleans) before range checks.
pub fn validate(
    command: &str,
    parameters: &CommandParameters,
    raw: &Value,
) -> CommandResult<ValidatedArguments> {
    let empty = Map::new();
    let supplied = match raw {
        Value::Object(map) => map,
        Value::Null => &empty,
        other => {
            return Err(CommandError::invalid_argument(
                command,
                "arguments",
                ArgumentIssue::WrongType {
                    expected: ParameterType::Object,
                    found: json_kind(other),
                },
            ));
        }
    };

    if let Some(unknown) = supplied.keys().find(|name| !parameters.contains(name)) {
        return Err(CommandError::invalid_argument(
            command,
            unknown.as_str(),
            ArgumentIssue::Unexpected,
        ));
    }

    let mut values = IndexMap::new();
    for (name, spec) in parameters.iter() {
        match supplied.get(name) {
            None | Some(Value::Null) => {
                if spec.required {
                    return Err(CommandError::invalid_argument(
                        command,
                        name,
                        ArgumentIssue::Missing,
                    ));
                }
            }
            Some(value) => {
                let coerced = coerce(spec, value)
                    .and_then(|coerced| check_bounds(spec, coerced))
                    .map_err(|issue| CommandError::invalid_argument(command, name, issue))?;
                values.insert(name.to_string(), coerced);
            }
        }
    }

    Ok(ValidatedArguments { values })
}

fn coerce(spec: &ParameterSpec, value: &Value) -> Result<Value, ArgumentIssue> {
    let wrong_type = || ArgumentIssue::WrongType {
        expected: spec.param_type,
        found: json_kind(value),
    };

    match (spec.param_type, value) {
        (ParameterType::String, Value::String(_)) => Ok(value.clone()),
        (ParameterType::Integer, Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| Value::from(f as i64))
                    .ok_or_else(wrong_type)
            }
        }
        (ParameterType::Integer, Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| wrong_type()),
        (ParameterType::Number, Value::Number(_)) => Ok(value.clone()),
        (ParameterType::Number, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(wrong_type),
        (ParameterType::Boolean, Value::Bool(_)) => Ok(value.clone()),
        (ParameterType::Boolean, Value::String(s)) => match s.trim() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(wrong_type()),
        },
        (ParameterType::Array, Value::Array(_)) => Ok(value.clone()),
        (ParameterType::Object, Value::Object(_)) => Ok(value.clone()),
        _ => Err(wrong_type()),
    }
}

fn check_bounds(spec: &ParameterSpec, value: Value) -> Result<Value, ArgumentIssue> {
    if spec.param_type.is_numeric() {
        if let Some(n) = value.as_f64() {
            let below = spec.minimum.is_some_and(|min| n < min);
            let above = spec.maximum.is_some_and(|max| n > max);
            if below || above {
                return Err(ArgumentIssue::OutOfRange {
                    value: n,
                    minimum: spec.minimum,
                    maximum: spec.maximum,
                });
            }
        }
    }

    if let (Some(min_length), Some(s)) = (spec.min_length, value.as_str()) {
        if s.trim().chars().count() < min_length {
            return Err(ArgumentIssue::TooShort { min_length });
        }
    }

    Ok(value)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
