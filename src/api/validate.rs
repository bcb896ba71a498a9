//! Schema validation for untyped JSON request bodies.
//!
//! A [`Schema`] is an ordered list of string fields with rules. Validation stops at
//! the first violation and reports it as a message naming the field, e.g.
//! `"username" length must be at least 3 characters long`.

use regex::Regex;
use serde_json::{Map, Value};
use once_cell::sync::Lazy;

static EMAIL: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

/// Lightweight email sanity check.
pub fn valid_email(email: &str) -> bool {
    EMAIL.as_ref().is_some_and(|re| re.is_match(email))
}

/// Character classes a value must contain at least once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    /// `[a-z]`
    Lowercase,
    /// `[A-Z]`
    Uppercase,
    /// Anything outside `[A-Za-z0-9_]`.
    NonWord,
}

impl Class {
    fn matches(self, c: char) -> bool {
        match self {
            Self::Lowercase => c.is_ascii_lowercase(),
            Self::Uppercase => c.is_ascii_uppercase(),
            Self::NonWord => !(c.is_ascii_alphanumeric() || c == '_'),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Rule {
    MinLen(usize),
    MaxLen(usize),
    Email,
    OneOf(&'static [&'static str]),
    Contains(&'static [Class]),
}

#[derive(Debug, Clone)]
pub struct Field {
    name: &'static str,
    aliases: &'static [&'static str],
    rules: Vec<Rule>,
}

impl Field {
    #[must_use]
    pub fn string(name: &'static str) -> Self {
        Self {
            name,
            aliases: &[],
            rules: Vec::new(),
        }
    }

    /// Other keys the value may be supplied under when `name` is absent.
    #[must_use]
    pub fn alias(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    #[must_use]
    pub fn min(mut self, len: usize) -> Self {
        self.rules.push(Rule::MinLen(len));
        self
    }

    #[must_use]
    pub fn max(mut self, len: usize) -> Self {
        self.rules.push(Rule::MaxLen(len));
        self
    }

    #[must_use]
    pub fn email(mut self) -> Self {
        self.rules.push(Rule::Email);
        self
    }

    #[must_use]
    pub fn one_of(mut self, values: &'static [&'static str]) -> Self {
        self.rules.push(Rule::OneOf(values));
        self
    }

    #[must_use]
    pub fn contains(mut self, classes: &'static [Class]) -> Self {
        self.rules.push(Rule::Contains(classes));
        self
    }

    fn lookup<'a>(&self, body: &'a Map<String, Value>) -> Option<&'a Value> {
        body.get(self.name)
            .or_else(|| self.aliases.iter().find_map(|alias| body.get(*alias)))
            .filter(|value| !value.is_null())
    }

    fn check<'a>(&self, value: Option<&'a Value>) -> Result<&'a str, String> {
        let name = self.name;

        let Some(value) = value else {
            return Err(format!("\"{name}\" is required"));
        };

        let Some(text) = value.as_str() else {
            return Err(format!("\"{name}\" must be a string"));
        };

        if text.is_empty() {
            return Err(format!("\"{name}\" is not allowed to be empty"));
        }

        let len = text.chars().count();

        for rule in &self.rules {
            match rule {
                Rule::MinLen(min) if len < *min => {
                    return Err(format!(
                        "\"{name}\" length must be at least {min} characters long"
                    ));
                }
                Rule::MaxLen(max) if len > *max => {
                    return Err(format!(
                        "\"{name}\" length must be less than or equal to {max} characters long"
                    ));
                }
                Rule::Email if !valid_email(text) => {
                    return Err(format!("\"{name}\" must be a valid email"));
                }
                Rule::OneOf(values) if !values.contains(&text) => {
                    return Err(format!(
                        "\"{name}\" must be one of [{}]",
                        values.join(", ")
                    ));
                }
                Rule::Contains(classes)
                    if !classes
                        .iter()
                        .all(|class| text.chars().any(|c| class.matches(c))) =>
                {
                    return Err(format!("\"{name}\" fails to match the required pattern"));
                }
                _ => {}
            }
        }

        Ok(text)
    }
}

/// Ordered field rules. Field order is the order violations are reported in.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<Field>,
}

/// Validated string values, in schema order.
#[derive(Debug)]
pub struct Valid<'a> {
    values: Vec<(&'static str, &'a str)>,
}

impl<'a> Valid<'a> {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.values
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| *value)
    }
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Validate `body` and return the field values, or the first violation.
    /// # Errors
    /// Returns the message of the first rule that fails.
    pub fn validate<'a>(&self, body: &'a Map<String, Value>) -> Result<Valid<'a>, String> {
        let mut values = Vec::with_capacity(self.fields.len());

        for field in &self.fields {
            let value = field.check(field.lookup(body))?;
            values.push((field.name, value));
        }

        Ok(Valid { values })
    }
}
