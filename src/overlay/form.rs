//! Default in-process [`InputCollector`].

use std::collections::{HashMap, HashSet};
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::overlay::error::{OverlayError, Result};
use crate::overlay::input::{Input, InputCollector, InputKind, InputValue, ValidateValue, Value};

#[derive(Default)]
struct FormState {
    inputs: Vec<Input>,
    patterns: HashMap<String, Regex>,
    errors: Vec<(String, String)>,
    validators: HashMap<InputKind, ValidateValue>,
}

/// In-memory form holding input definitions and their live values.
#[derive(Default)]
pub struct Form {
    state: Mutex<FormState>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn compile_patterns(inputs: &[Input]) -> Result<HashMap<String, Regex>> {
    let mut names = HashSet::with_capacity(inputs.len());
    let mut patterns = HashMap::new();
    for input in inputs {
        if input.name.is_empty() {
            return Err(OverlayError::InvalidInput("input without a name".to_string()));
        }
        if !names.insert(input.name.as_str()) {
            return Err(OverlayError::InvalidInput(format!(
                "duplicate input name `{}`",
                input.name
            )));
        }
        if let Some(pattern) = &input.pattern {
            // Anchored like an HTML `pattern` attribute.
            let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|error| {
                OverlayError::InvalidInput(format!("bad pattern for `{}`: {error}", input.name))
            })?;
            patterns.insert(input.name.clone(), regex);
        }
    }
    Ok(patterns)
}

fn check_input(
    input: &Input,
    pattern: Option<&Regex>,
    custom: Option<&ValidateValue>,
) -> Option<String> {
    if input.disabled {
        return None;
    }
    let value = &input.value;
    if value.is_empty() {
        return input.required.then(|| "This field is required".to_string());
    }
    if input.kind == InputKind::Checkbox && input.required && value.as_bool() != Some(true) {
        return Some("This box must be checked".to_string());
    }

    if let Value::Text(text) = value {
        let length = text.chars().count();
        if let Some(min) = input.min_length.filter(|min| length < *min) {
            return Some(format!("Use at least {min} characters"));
        }
        if let Some(max) = input.max_length.filter(|max| length > *max) {
            return Some(format!("Use at most {max} characters"));
        }
        if pattern.is_some_and(|regex| !regex.is_match(text)) {
            return Some("Value does not match the expected format".to_string());
        }
        match input.kind {
            InputKind::Email if !looks_like_email(text) => {
                return Some("Enter an email address".to_string());
            }
            InputKind::Url if !looks_like_url(text) => {
                return Some("Enter a URL".to_string());
            }
            InputKind::Select if !input.options.iter().any(|option| option.value == *text) => {
                return Some("Select one of the options".to_string());
            }
            _ => {}
        }
    }

    if input.kind == InputKind::Number {
        let number = match value {
            Value::Number(number) => Some(*number),
            Value::Text(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        };
        let Some(number) = number else {
            return Some("Enter a number".to_string());
        };
        if input.min.is_some_and(|min| number < min) {
            return Some(format!("Value must be at least {}", input.min.unwrap_or_default()));
        }
        if input.max.is_some_and(|max| number > max) {
            return Some(format!("Value must be at most {}", input.max.unwrap_or_default()));
        }
    }

    custom.and_then(|validate| validate(input, value))
}

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s.]+(?:\.[^@\s.]+)+$").expect("email regex compiles")
});

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://[^\s/?#]+\S*$").expect("url regex compiles")
});

fn looks_like_email(text: &str) -> bool {
    EMAIL.is_match(text)
}

fn looks_like_url(text: &str) -> bool {
    URL.is_match(text)
}

#[async_trait]
impl InputCollector for Form {
    fn values(&self) -> Vec<InputValue> {
        self.lock()
            .inputs
            .iter()
            .map(|input| InputValue::new(input.name.clone(), input.value.clone()))
            .collect()
    }

    fn inputs(&self) -> Vec<Input> {
        self.lock().inputs.clone()
    }

    async fn set_inputs(&self, inputs: Vec<Input>) -> Result<()> {
        let patterns = compile_patterns(&inputs)?;
        let mut state = self.lock();
        debug!(count = inputs.len(), "Form inputs replaced");
        state.inputs = inputs;
        state.patterns = patterns;
        state.errors.clear();
        Ok(())
    }

    async fn set_disabled(&self, disabled: bool) -> Result<()> {
        for input in &mut self.lock().inputs {
            input.disabled = disabled;
        }
        Ok(())
    }

    fn set_value(&self, name: &str, value: Value) -> Result<()> {
        let mut state = self.lock();
        let input = state
            .inputs
            .iter_mut()
            .find(|input| input.name == name)
            .ok_or_else(|| OverlayError::UnknownInput(name.to_string()))?;
        let value = match (input.kind, value) {
            (InputKind::Number, Value::Text(text)) => text
                .trim()
                .parse::<f64>()
                .map_or(Value::Text(text), Value::Number),
            (_, value) => value,
        };
        input.value = value;
        // A fresh edit clears the stale message for that input.
        state.errors.retain(|(input_name, _)| input_name != name);
        Ok(())
    }

    async fn validate(&self, report: bool) -> bool {
        let mut state = self.lock();
        let errors: Vec<(String, String)> = state
            .inputs
            .iter()
            .filter_map(|input| {
                check_input(
                    input,
                    state.patterns.get(&input.name),
                    state.validators.get(&input.kind),
                )
                .map(|message| (input.name.clone(), message))
            })
            .collect();
        let valid = errors.is_empty();
        if report {
            debug!(valid, failures = errors.len(), "Form validated");
            state.errors = errors;
        }
        valid
    }

    fn errors(&self) -> Vec<(String, String)> {
        self.lock().errors.clone()
    }

    fn add_validation_type(&self, kind: InputKind, validate: ValidateValue) {
        self.lock().validators.insert(kind, validate);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::overlay::input::SelectOption;

    async fn form_with(inputs: Vec<Input>) -> Form {
        let form = Form::new();
        form.set_inputs(inputs).await.unwrap();
        form
    }

    #[tokio::test]
    async fn test_required_input() {
        let form = form_with(vec![Input::new("name").required()]).await;
        assert!(!form.validate(true).await);
        assert_eq!(form.errors()[0].0, "name");

        form.set_value("name", "Alice".into()).unwrap();
        assert!(form.errors().is_empty());
        assert!(form.validate(true).await);
    }

    #[tokio::test]
    async fn test_validate_without_report_keeps_errors() {
        let form = form_with(vec![Input::new("name").required()]).await;
        assert!(!form.validate(false).await);
        assert!(form.errors().is_empty());
    }

    #[tokio::test]
    async fn test_length_and_pattern() {
        let form = form_with(vec![
            Input::new("code").with_pattern("[A-Z]{3}"),
            Input::new("bio").with_length(Some(2), Some(4)),
        ])
        .await;

        form.set_value("code", "ABCD".into()).unwrap();
        form.set_value("bio", "a".into()).unwrap();
        assert!(!form.validate(true).await);
        assert_eq!(form.errors().len(), 2);

        form.set_value("code", "ABC".into()).unwrap();
        form.set_value("bio", "abc".into()).unwrap();
        assert!(form.validate(true).await);
    }

    #[tokio::test]
    async fn test_number_range_and_coercion() {
        let form = form_with(vec![
            Input::new("age")
                .with_kind(InputKind::Number)
                .with_range(Some(0.0), Some(130.0)),
        ])
        .await;

        form.set_value("age", "42".into()).unwrap();
        assert_eq!(form.values()[0].value, Value::Number(42.0));
        assert!(form.validate(false).await);

        form.set_value("age", "200".into()).unwrap();
        assert!(!form.validate(false).await);

        form.set_value("age", "abc".into()).unwrap();
        assert!(!form.validate(false).await);
    }

    #[tokio::test]
    async fn test_kind_checks() {
        let form = form_with(vec![
            Input::new("mail").with_kind(InputKind::Email),
            Input::new("site").with_kind(InputKind::Url),
            Input::new("color")
                .with_kind(InputKind::Select)
                .with_options(vec![SelectOption {
                    label: "Red".into(),
                    value: "red".into(),
                }]),
        ])
        .await;

        form.set_value("mail", "a@b".into()).unwrap();
        form.set_value("site", "http://".into()).unwrap();
        form.set_value("color", "blue".into()).unwrap();
        assert!(!form.validate(true).await);
        assert_eq!(form.errors().len(), 3);

        form.set_value("mail", "a@b.io".into()).unwrap();
        form.set_value("site", "https://example.com".into()).unwrap();
        form.set_value("color", "red".into()).unwrap();
        assert!(form.validate(true).await);
    }

    #[test]
    fn test_email_and_url_shapes() {
        for email in ["a@b.io", "first.last@mail.example.org"] {
            assert!(looks_like_email(email), "{email}");
        }
        for email in ["a@b", "@x.io", "a@.io", "a b@c.io", "a@b@c.io", ""] {
            assert!(!looks_like_email(email), "{email}");
        }

        for url in ["https://example.com", "ftp://files.example.com/a?b=c", "http://localhost:8080"] {
            assert!(looks_like_url(url), "{url}");
        }
        for url in ["http://", "example.com", "://example.com", "https:// example.com"] {
            assert!(!looks_like_url(url), "{url}");
        }
    }

    #[tokio::test]
    async fn test_disabled_inputs_skip_validation() {
        let form = form_with(vec![Input::new("name").required()]).await;
        form.set_disabled(true).await.unwrap();
        assert!(form.validate(false).await);
    }

    #[tokio::test]
    async fn test_custom_validation_type() {
        let form = form_with(vec![Input::new("secret").with_kind(InputKind::Password)]).await;
        form.add_validation_type(
            InputKind::Password,
            Arc::new(|_: &Input, value: &Value| {
                (value.to_string().len() < 8).then(|| "Too short".to_string())
            }),
        );

        form.set_value("secret", "hunter2".into()).unwrap();
        assert!(!form.validate(false).await);
        form.set_value("secret", "correct horse".into()).unwrap();
        assert!(form.validate(false).await);
    }

    #[tokio::test]
    async fn test_rejects_bad_definitions() {
        let form = Form::new();
        assert!(matches!(
            form.set_inputs(vec![Input::new("a"), Input::new("a")]).await,
            Err(OverlayError::InvalidInput(_))
        ));
        assert!(matches!(
            form.set_inputs(vec![Input::new("a").with_pattern("(")]).await,
            Err(OverlayError::InvalidInput(_))
        ));
        assert_eq!(
            form.set_value("missing", Value::Null),
            Err(OverlayError::UnknownInput("missing".to_string()))
        );
    }
}
