//! Typed argument schemas for device actions
//!
//! An [`ArgMap`] keeps arguments in declaration order. That order breaks ties
//! between equal order hints during positional filling.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::command::numbers;
use crate::{Error, Result};

/// Committed argument values for one action invocation
pub type Args = serde_json::Map<String, Value>;

/// Words accepted as a spoken `true`
const YES_WORDS: &[&str] = &[
    "yes", "yeah", "yep", "true", "on", "sure", "enable", "enabled", "one", "1",
];

/// Words accepted as a spoken `false`
const NO_WORDS: &[&str] = &[
    "no", "nope", "false", "off", "disable", "disabled", "zero", "0",
];

/// Value kind of an action argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgKind {
    String,
    Integer,
    Float,
    Boolean,
    List,
    Object,
}

impl ArgKind {
    /// Wire name used in action descriptions
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::List => "list",
            Self::Object => "object",
        }
    }

    /// Whether values of this kind can be read from spoken words
    #[must_use]
    pub const fn is_spoken(self) -> bool {
        !matches!(self, Self::List | Self::Object)
    }

    /// Convert a phrase into a value of this kind
    ///
    /// Numbers are parsed literally first and fall back to number words
    /// ("three", "twenty one").
    ///
    /// # Errors
    ///
    /// Returns `TypeConversion` if the phrase does not fit the kind, and
    /// `UnsupportedKind` for list and object kinds
    pub fn parse(self, phrase: &str) -> Result<Value> {
        let phrase = phrase.trim();
        let fail = || Error::TypeConversion {
            kind: self,
            phrase: phrase.to_string(),
        };

        match self {
            Self::String => Ok(Value::String(phrase.to_string())),
            Self::Integer => phrase
                .parse::<i64>()
                .ok()
                .or_else(|| numbers::words_to_integer(phrase))
                .map(Value::from)
                .ok_or_else(fail),
            Self::Float => phrase
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .or_else(|| numbers::words_to_number(phrase))
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .ok_or_else(fail),
            Self::Boolean => {
                if YES_WORDS.contains(&phrase) {
                    Ok(Value::Bool(true))
                } else if NO_WORDS.contains(&phrase) {
                    Ok(Value::Bool(false))
                } else {
                    Err(fail())
                }
            }
            Self::List | Self::Object => Err(Error::UnsupportedKind(self)),
        }
    }
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptor of one action argument
#[derive(Debug, Clone, PartialEq)]
pub struct ArgSpec {
    kind: ArgKind,
    required: bool,
    default: Option<Value>,
    order_hint: Option<u32>,
    label: Option<String>,
    description: Option<String>,
    choices: Option<Vec<String>>,
}

impl ArgSpec {
    /// Create an optional argument of the given kind
    #[must_use]
    pub const fn new(kind: ArgKind) -> Self {
        Self {
            kind,
            required: false,
            default: None,
            order_hint: None,
            label: None,
            description: None,
            choices: None,
        }
    }

    #[must_use]
    pub const fn string() -> Self {
        Self::new(ArgKind::String)
    }

    #[must_use]
    pub const fn integer() -> Self {
        Self::new(ArgKind::Integer)
    }

    #[must_use]
    pub const fn float() -> Self {
        Self::new(ArgKind::Float)
    }

    #[must_use]
    pub const fn boolean() -> Self {
        Self::new(ArgKind::Boolean)
    }

    /// Mark the argument as required, dropping any default
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self.default = None;
        self
    }

    /// Give the argument a default, which makes it optional
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self.required = false;
        self
    }

    /// Allow the argument to be filled positionally from a spoken command
    #[must_use]
    pub const fn order(mut self, hint: u32) -> Self {
        self.order_hint = Some(hint);
        self
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Restrict string values to a fixed set
    #[must_use]
    pub fn one_of<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub const fn kind(&self) -> ArgKind {
        self.kind
    }

    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    #[must_use]
    pub const fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    #[must_use]
    pub const fn order_hint(&self) -> Option<u32> {
        self.order_hint
    }

    #[must_use]
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn choices(&self) -> Option<&[String]> {
        self.choices.as_deref()
    }

    /// Display label, title-cased from the argument name when unset
    #[must_use]
    pub fn label_for(&self, name: &str) -> String {
        self.label.clone().unwrap_or_else(|| titleize(name))
    }

    /// Convert a phrase for this argument, enforcing allowed choices
    ///
    /// # Errors
    ///
    /// Returns `TypeConversion` if the phrase does not convert or is not one
    /// of the allowed choices
    pub fn convert(&self, phrase: &str) -> Result<Value> {
        let value = self.kind.parse(phrase)?;

        if let (Some(choices), Value::String(s)) = (&self.choices, &value) {
            if !choices.iter().any(|c| c == s) {
                return Err(Error::TypeConversion {
                    kind: self.kind,
                    phrase: s.clone(),
                });
            }
        }

        Ok(value)
    }
}

/// Ordered map of argument name to descriptor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgMap(IndexMap<String, ArgSpec>);

impl ArgMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an argument, replacing any earlier one with the same name
    #[must_use]
    pub fn arg(mut self, name: impl Into<String>, spec: ArgSpec) -> Self {
        self.0.insert(name.into(), spec);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ArgSpec> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgSpec)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Arguments with an order hint, ascending; ties keep declaration order
    #[must_use]
    pub fn ordered(&self) -> Vec<(&str, &ArgSpec)> {
        let mut ordered: Vec<_> = self
            .iter()
            .filter(|(_, spec)| spec.order_hint.is_some())
            .collect();
        // sort_by_key is stable
        ordered.sort_by_key(|(_, spec)| spec.order_hint);
        ordered
    }

    /// Required arguments in declaration order
    #[must_use]
    pub fn required(&self) -> Vec<(&str, &ArgSpec)> {
        self.iter().filter(|(_, spec)| spec.required).collect()
    }

    /// Arguments with a default in declaration order
    #[must_use]
    pub fn defaulted(&self) -> Vec<(&str, &ArgSpec)> {
        self.iter().filter(|(_, spec)| spec.default.is_some()).collect()
    }
}

impl FromIterator<(String, ArgSpec)> for ArgMap {
    fn from_iter<T: IntoIterator<Item = (String, ArgSpec)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Title-case an identifier: `device_name` becomes `Device Name`
#[must_use]
pub fn titleize(name: &str) -> String {
    name.split(['_', ' '])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
