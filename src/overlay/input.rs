//! Input definitions and the collector seam.
//!
//! The overlay core only ever reads `name`/`value` pairs back from its inputs.
//! Everything else about an input belongs to the [`InputCollector`] that owns
//! them, which may validate synchronously or reach out to something remote.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::overlay::error::Result;

/// The current value of an input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Value {
    /// Empty strings and `Null` count as "no value" for `required` checks.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => text.is_empty(),
            Self::Bool(_) | Self::Number(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// A `name`/`value` pair read back from an input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputValue {
    pub name: String,
    pub value: Value,
}

impl InputValue {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputKind {
    #[default]
    Text,
    Password,
    Email,
    Url,
    Number,
    Textarea,
    Checkbox,
    Select,
}

impl InputKind {
    /// Kinds edited as free text.
    pub const fn is_textual(self) -> bool {
        !matches!(self, Self::Checkbox | Self::Select)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

/// Description of one form input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Input {
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: InputKind,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub auto_focus: bool,
    #[serde(default)]
    pub options: Vec<SelectOption>,
}

impl Input {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_kind(mut self, kind: InputKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub const fn auto_focus(mut self) -> Self {
        self.auto_focus = true;
        self
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    #[must_use]
    pub const fn with_length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    #[must_use]
    pub const fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }

    /// Label to show next to the input, falling back to its name.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// Custom validator for an input kind registered at runtime.
///
/// Returns `Some(message)` when the value is rejected.
pub type ValidateValue = Arc<dyn Fn(&Input, &Value) -> Option<String> + Send + Sync>;

/// The form collaborator an overlay delegates its inputs to.
///
/// Implementations are shared between the overlay and its view, so every
/// method takes `&self` and state lives behind interior mutability.
#[async_trait]
pub trait InputCollector: Send + Sync {
    /// Current values of every input, in definition order.
    fn values(&self) -> Vec<InputValue>;

    /// Current input definitions, with values reflecting edits.
    fn inputs(&self) -> Vec<Input>;

    /// Replace the input definitions.
    async fn set_inputs(&self, inputs: Vec<Input>) -> Result<()>;

    /// Disable or re-enable every input.
    async fn set_disabled(&self, disabled: bool) -> Result<()>;

    /// Set the value of one input.
    fn set_value(&self, name: &str, value: Value) -> Result<()>;

    /// Check every input. With `report`, failures are recorded for display.
    async fn validate(&self, report: bool) -> bool;

    /// Messages recorded by the last reporting validation, by input name.
    fn errors(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Register a validator used for inputs of the given kind.
    fn add_validation_type(&self, kind: InputKind, validate: ValidateValue) {
        _ = (kind, validate);
    }
}
