use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// What a single field must look like.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Free text with optional length bounds (in characters).
    Text {
        min_len: Option<usize>,
        max_len: Option<usize>,
    },
    /// ASCII digits only (phone numbers, codes). `message` is shown on
    /// violation.
    Digits { message: String },
    /// Numeric value; numeric strings are coerced. `integer` forbids a
    /// fractional part.
    Number {
        min: Option<f64>,
        max: Option<f64>,
        integer: bool,
    },
    /// Custom regular-expression rule with its own message.
    Pattern { regex: Regex, message: String },
    /// Closed set of labels, each coerced to a numeric code on success.
    Enum { variants: Vec<(String, i64)> },
}

impl FieldKind {
    pub fn text() -> Self {
        FieldKind::Text {
            min_len: None,
            max_len: None,
        }
    }

    pub fn text_len(min_len: Option<usize>, max_len: Option<usize>) -> Self {
        FieldKind::Text { min_len, max_len }
    }

    pub fn digits(message: impl Into<String>) -> Self {
        FieldKind::Digits {
            message: message.into(),
        }
    }

    pub fn number() -> Self {
        FieldKind::Number {
            min: None,
            max: None,
            integer: false,
        }
    }

    pub fn number_range(min: Option<f64>, max: Option<f64>) -> Self {
        FieldKind::Number {
            min,
            max,
            integer: false,
        }
    }

    pub fn integer() -> Self {
        FieldKind::Number {
            min: None,
            max: None,
            integer: true,
        }
    }

    pub fn pattern(
        pattern: &str,
        message: impl Into<String>,
    ) -> Result<Self, SchemaError> {
        Ok(FieldKind::Pattern {
            regex: Regex::new(pattern)?,
            message: message.into(),
        })
    }

    pub fn one_of<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        FieldKind::Enum {
            variants: variants.into_iter().map(|(s, c)| (s.into(), c)).collect(),
        }
    }
}

/// One field descriptor: dotted path into the form data, human label for
/// messages, required flag and the kind to enforce.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub name: String,
    pub label: String,
    pub required: bool,
    pub kind: FieldKind,
}

impl FieldRule {
    pub fn required(
        name: impl Into<String>,
        label: impl Into<String>,
        kind: FieldKind,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            required: true,
            kind,
        }
    }

    pub fn optional(
        name: impl Into<String>,
        label: impl Into<String>,
        kind: FieldKind,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            required: false,
            kind,
        }
    }
}

/// Ordered list of field rules for one form.
#[derive(Debug, Clone, Default)]
pub struct FormSchema {
    rules: Vec<FieldRule>,
}

impl FormSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Looks up a rule by its dotted path name.
    pub fn rule(&self, name: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.name == name)
    }
}
