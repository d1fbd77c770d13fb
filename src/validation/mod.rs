//! Request validation.
//!
//! Validators read a raw JSON body field by field and either produce a typed
//! input or a list of `{field, message}` errors. Checks that need the store
//! (uniqueness, parent existence, free positions) live in [`checks`] and run
//! inside the service transaction.

pub mod account;
pub mod checks;
pub mod curriculum;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type Validated<T> = Result<T, Vec<FieldError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    /// May be left out, but not sent blank
    Optional,
    /// May be left out or cleared with a blank string
    Nullable,
}

/// Reads fields out of a JSON object, collecting every error instead of
/// stopping at the first one.
pub struct Rules<'a> {
    body: Option<&'a Map<String, Value>>,
    errors: Vec<FieldError>,
}

impl<'a> Rules<'a> {
    pub fn new(body: &'a Value) -> Self {
        let mut errors = Vec::new();
        let body = body.as_object();
        if body.is_none() {
            errors.push(FieldError::new("body", "Request body must be a JSON object"));
        }
        Self { body, errors }
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Raw value of a field; JSON `null` counts as absent.
    pub fn value(&self, field: &str) -> Option<&'a Value> {
        self.body.and_then(|b| b.get(field)).filter(|v| !v.is_null())
    }

    fn present(&mut self, field: &str, presence: Presence) -> Option<&'a Value> {
        let value = self.value(field);
        if value.is_none() && presence == Presence::Required {
            self.push(field, format!("{field} is required"));
        }
        value
    }

    /// Trimmed string. Only a `Nullable` string may be blank.
    pub fn string(&mut self, field: &str, presence: Presence) -> Option<String> {
        let value = self.present(field, presence)?;
        match value.as_str().map(str::trim) {
            Some("") if presence == Presence::Required => {
                self.push(field, format!("{field} is required"));
                None
            }
            Some("") if presence == Presence::Optional => {
                self.push(field, format!("{field} cannot be empty"));
                None
            }
            Some(text) => Some(text.to_string()),
            None => {
                self.push(field, format!("{field} must be a string"));
                None
            }
        }
    }

    pub fn strings(&mut self, field: &str, presence: Presence) -> Option<Vec<String>> {
        let value = self.present(field, presence)?;
        let items = value
            .as_array()
            .and_then(|items| items.iter().map(|v| v.as_str().map(str::to_string)).collect::<Option<Vec<_>>>());
        if items.is_none() {
            self.push(field, format!("{field} must be an array of strings"));
        }
        items
    }

    pub fn boolean(&mut self, field: &str, presence: Presence) -> Option<bool> {
        let value = self.present(field, presence)?;
        let flag = value.as_bool();
        if flag.is_none() {
            self.push(field, format!("{field} must be a boolean"));
        }
        flag
    }

    /// Whole number within `min..=max`. Pass `i64::MAX` for no upper bound.
    pub fn integer(&mut self, field: &str, presence: Presence, min: i64, max: i64) -> Option<i64> {
        let value = self.present(field, presence)?;
        let number = value
            .as_i64()
            .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < 9e15).map(|f| f as i64));
        let Some(number) = number else {
            self.push(field, format!("{field} must be an integer"));
            return None;
        };
        if number < min || number > max {
            self.push(field, range_message(field, min, max, i64::MAX));
            return None;
        }
        Some(number)
    }

    /// Number within `min..=max`. Pass `f64::INFINITY` for no upper bound.
    pub fn number(&mut self, field: &str, presence: Presence, min: f64, max: f64) -> Option<f64> {
        let value = self.present(field, presence)?;
        let Some(number) = value.as_f64() else {
            self.push(field, format!("{field} must be a number"));
            return None;
        };
        if number < min || number > max {
            self.push(field, range_message(field, min, max, f64::INFINITY));
            return None;
        }
        Some(number)
    }

    /// One of a fixed set of wire names, decoded into its enum.
    pub fn choice<T: DeserializeOwned>(&mut self, field: &str, presence: Presence, allowed: &[&str]) -> Option<T> {
        let value = self.present(field, presence)?;
        let parsed = value
            .as_str()
            .filter(|name| allowed.contains(name))
            .and_then(|_| serde_json::from_value(value.clone()).ok());
        if parsed.is_none() {
            self.push(field, format!("{field} must be one of: {}", allowed.join(", ")));
        }
        parsed
    }

    pub fn id(&mut self, field: &str, presence: Presence) -> Option<Uuid> {
        let value = self.present(field, presence)?;
        let id = value.as_str().and_then(|s| Uuid::parse_str(s).ok());
        if id.is_none() {
            self.push(field, format!("Invalid {field} format"));
        }
        id
    }

    pub fn ids(&mut self, field: &str, presence: Presence) -> Option<Vec<Uuid>> {
        let value = self.present(field, presence)?;
        let ids = value.as_array().and_then(|items| {
            items
                .iter()
                .map(|v| v.as_str().and_then(|s| Uuid::parse_str(s).ok()))
                .collect::<Option<Vec<_>>>()
        });
        if ids.is_none() {
            self.push(field, format!("{field} must be an array of ids"));
        }
        ids
    }

    /// Lower-cased email address
    pub fn email(&mut self, field: &str, presence: Presence) -> Option<String> {
        let email = self.string(field, presence)?.to_lowercase();
        if !is_email(&email) {
            self.push(field, "Please provide a valid email");
            return None;
        }
        Some(email)
    }

    /// Fail when any rule failed, otherwise assemble the input. `build`
    /// returns `None` only when a required field was missing, which the
    /// rules have already reported.
    pub fn finish<T>(self, build: impl FnOnce() -> Option<T>) -> Validated<T> {
        if !self.errors.is_empty() {
            return Err(self.errors);
        }
        build().ok_or_else(|| vec![FieldError::new("body", "Invalid request body")])
    }
}

fn range_message<N: PartialEq + std::fmt::Display>(field: &str, min: N, max: N, unbounded: N) -> String {
    if max == unbounded {
        format!("{field} must be at least {min}")
    } else {
        format!("{field} must be between {min} and {max}")
    }
}

fn is_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .map_or(false, |(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}
