use serde_json::Value;
use std::collections::BTreeMap;

use super::schema::{FieldKind, FieldRule, FormSchema};

/// Key used for failures that cannot be attributed to a single field.
pub const GENERAL_ERROR_KEY: &str = "_general";

const GENERAL_ERROR_MESSAGE: &str = "Validation failed";

/// Full result of one validation pass. Recomputed on every call, never
/// partially mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    /// Dotted field path → first message for that path.
    pub errors: BTreeMap<String, String>,
    /// Coerced payload, present only when valid.
    pub data: Option<Value>,
}

impl ValidationOutcome {
    fn general_failure() -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(
            GENERAL_ERROR_KEY.to_string(),
            GENERAL_ERROR_MESSAGE.to_string(),
        );
        Self {
            is_valid: false,
            errors,
            data: None,
        }
    }
}

/// Outcome of checking one rule against one value.
enum Checked {
    Missing,
    Invalid(String),
    /// Passed; `Some` carries a coerced replacement value.
    Valid(Option<Value>),
}

struct PathError;

/// Applies every rule of `schema` to `data` and collects the first
/// violation per field path.
///
/// Unexpected shapes (non-object payload, coercion write into a non-object
/// parent) degrade to a `_general` failure instead of panicking.
pub fn validate(schema: &FormSchema, data: &Value) -> ValidationOutcome {
    run(schema, data).unwrap_or_else(|_| ValidationOutcome::general_failure())
}

/// Validates one named field in isolation, for as-you-type feedback.
///
/// Returns the first error message, or `None` when the value passes or the
/// field is not declared in the schema.
pub fn validate_field(schema: &FormSchema, name: &str, value: &Value) -> Option<String> {
    let rule = schema.rule(name)?;
    match check_rule(rule, Some(value)) {
        Checked::Missing if rule.required => Some(required_message(rule)),
        Checked::Missing => None,
        Checked::Invalid(message) => Some(message),
        Checked::Valid(_) => None,
    }
}

fn run(schema: &FormSchema, data: &Value) -> Result<ValidationOutcome, PathError> {
    if !data.is_object() {
        return Err(PathError);
    }

    let mut errors: BTreeMap<String, String> = BTreeMap::new();
    let mut coerced = data.clone();

    for rule in schema.rules() {
        // First violation per path wins.
        if errors.contains_key(&rule.name) {
            continue;
        }
        match check_rule(rule, get_path(data, &rule.name)) {
            Checked::Missing => {
                if rule.required {
                    errors.insert(rule.name.clone(), required_message(rule));
                }
            }
            Checked::Invalid(message) => {
                errors.insert(rule.name.clone(), message);
            }
            Checked::Valid(Some(replacement)) => {
                set_path(&mut coerced, &rule.name, replacement)?;
            }
            Checked::Valid(None) => {}
        }
    }

    if errors.is_empty() {
        Ok(ValidationOutcome {
            is_valid: true,
            errors,
            data: Some(coerced),
        })
    } else {
        Ok(ValidationOutcome {
            is_valid: false,
            errors,
            data: None,
        })
    }
}

fn required_message(rule: &FieldRule) -> String {
    format!("{} is required", rule.label)
}

fn check_rule(rule: &FieldRule, value: Option<&Value>) -> Checked {
    let value = match value {
        None | Some(Value::Null) => return Checked::Missing,
        Some(Value::String(s)) if s.trim().is_empty() => return Checked::Missing,
        Some(v) => v,
    };

    match &rule.kind {
        FieldKind::Text { min_len, max_len } => {
            let Some(s) = value.as_str() else {
                return Checked::Invalid(format!("{} must be text", rule.label));
            };
            let len = s.chars().count();
            if let Some(min) = min_len {
                if len < *min {
                    return Checked::Invalid(format!(
                        "{} must be at least {} characters",
                        rule.label, min
                    ));
                }
            }
            if let Some(max) = max_len {
                if len > *max {
                    return Checked::Invalid(format!(
                        "{} must be at most {} characters",
                        rule.label, max
                    ));
                }
            }
            Checked::Valid(None)
        }
        FieldKind::Digits { message } => match value.as_str() {
            Some(s) if s.chars().all(|c| c.is_ascii_digit()) => Checked::Valid(None),
            _ => Checked::Invalid(message.clone()),
        },
        FieldKind::Number { min, max, integer } => {
            let (number, replacement) = match value {
                Value::Number(n) => match n.as_f64() {
                    Some(f) => (f, None),
                    None => {
                        return Checked::Invalid(format!("{} must be a number", rule.label))
                    }
                },
                Value::String(s) => match s.trim().parse::<f64>().ok().filter(|f| f.is_finite())
                {
                    // Numeric strings are coerced into real numbers.
                    Some(f) => (f, serde_json::Number::from_f64(f).map(Value::Number)),
                    None => {
                        return Checked::Invalid(format!("{} must be a number", rule.label))
                    }
                },
                _ => return Checked::Invalid(format!("{} must be a number", rule.label)),
            };
            if *integer && number.fract() != 0.0 {
                return Checked::Invalid(format!("{} must be a whole number", rule.label));
            }
            if let Some(min) = min {
                if number < *min {
                    return Checked::Invalid(format!(
                        "{} must be at least {}",
                        rule.label, min
                    ));
                }
            }
            if let Some(max) = max {
                if number > *max {
                    return Checked::Invalid(format!("{} must be at most {}", rule.label, max));
                }
            }
            Checked::Valid(replacement)
        }
        FieldKind::Pattern { regex, message } => match value.as_str() {
            Some(s) if regex.is_match(s) => Checked::Valid(None),
            _ => Checked::Invalid(message.clone()),
        },
        FieldKind::Enum { variants } => match value {
            Value::String(s) => {
                match variants.iter().find(|(label, _)| label.eq_ignore_ascii_case(s)) {
                    Some((_, code)) => Checked::Valid(Some(Value::from(*code))),
                    None => {
                        Checked::Invalid(format!("{} is not a valid choice", rule.label))
                    }
                }
            }
            Value::Number(n) => match n.as_i64() {
                Some(code) if variants.iter().any(|(_, c)| *c == code) => {
                    Checked::Valid(None)
                }
                _ => Checked::Invalid(format!("{} is not a valid choice", rule.label)),
            },
            _ => Checked::Invalid(format!("{} is not a valid choice", rule.label)),
        },
    }
}

fn get_path<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = data;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn set_path(data: &mut Value, path: &str, value: Value) -> Result<(), PathError> {
    let mut current = data;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        let object = current.as_object_mut().ok_or(PathError)?;
        if segments.peek().is_none() {
            object.insert(segment.to_string(), value);
            return Ok(());
        }
        current = object.get_mut(segment).ok_or(PathError)?;
    }
    Err(PathError)
}
