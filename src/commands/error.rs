use std::fmt;
use thiserror::Error;

use super::parameters::ParameterType;

/// Why a single argument was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentIssue {
    Missing,
    Unexpected,
    WrongType {
        expected: ParameterType,
        found: &'static str,
    },
    OutOfRange {
        value: f64,
        minimum: Option<f64>,
        maximum: Option<f64>,
    },
    TooShort {
        min_length: usize,
    },
    IndexOutOfRange {
        index: i64,
        len: usize,
    },
    MalformedJson(String),
}

impl fmt::Display for ArgumentIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentIssue::Missing => write!(f, "required argument is missing"),
            ArgumentIssue::Unexpected => write!(f, "unknown argument"),
            ArgumentIssue::WrongType { expected, found } => {
                write!(f, "expected {}, got {}", expected, found)
            }
            ArgumentIssue::OutOfRange {
                value,
                minimum,
                maximum,
            } => match (minimum, maximum) {
                (Some(min), Some(max)) => {
                    write!(f, "{} is outside the range {}..={}", value, min, max)
                }
                (Some(min), None) => write!(f, "{} is less than the minimum {}", value, min),
                (None, Some(max)) => write!(f, "{} is greater than the maximum {}", value, max),
                (None, None) => write!(f, "{} is out of range", value),
            },
            ArgumentIssue::TooShort { min_length } => {
                write!(f, "must be at least {} character(s) long", min_length)
            }
            ArgumentIssue::IndexOutOfRange { index, len } => {
                if *len == 0 {
                    write!(f, "Index {} out of range (no context items are open)", index)
                } else {
                    write!(f, "Index {} out of range (valid: 1..={})", index, len)
                }
            }
            ArgumentIssue::MalformedJson(message) => write!(f, "malformed JSON: {}", message),
        }
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Command '{command}' not found in registry")]
    CommandNotFound { command: String },

    #[error("Command '{command}' is not available: {reason}")]
    CommandUnavailable { command: String, reason: String },

    #[error("Invalid argument '{parameter}' for command '{command}': {issue}")]
    InvalidArgument {
        command: String,
        parameter: String,
        issue: ArgumentIssue,
    },

    #[error("Command with name '{command}' already exists")]
    DuplicateCommand { command: String },

    #[error("Timeout executing command '{command}' after {seconds} seconds")]
    Timeout { command: String, seconds: u64 },

    #[error("Input stream closed while waiting for the user")]
    InputClosed,

    #[error("Command '{command}' failed: {message}")]
    ExecutionFailed { command: String, message: String },
}

impl CommandError {
    pub fn invalid_argument(
        command: impl Into<String>,
        parameter: impl Into<String>,
        issue: ArgumentIssue,
    ) -> Self {
        CommandError::InvalidArgument {
            command: command.into(),
            parameter: parameter.into(),
            issue,
        }
    }

    /// Out-of-range 1-based context index. `len` is the current item count.
    pub fn invalid_index(command: impl Into<String>, index: i64, len: usize) -> Self {
        Self::invalid_argument(command, "index", ArgumentIssue::IndexOutOfRange { index, len })
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, CommandError::InvalidArgument { .. })
    }
}

pub type CommandResult<T> = Result<T, CommandError>;
