//! card-schema: `validator`-driven validation reported as `CardError::Unprocessable`.
//!
//! Field failures are collected into an `errors` map keyed by field path:
//!
//! ```json
//! {"email": ["Invalid email address."], "phone": ["This field is required."]}
//! ```

use std::borrow::Cow;

use card_core::errors::CardError;
use serde_json::{Map, Value};
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors, ValidationErrorsKind};

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_EMAIL: &str = "Invalid email address.";

#[derive(Default, Debug)]
pub struct SchemaErrors {
    map: Map<String, Value>,
}

impl SchemaErrors {
    pub fn push_field(&mut self, field: &str, msg: impl Into<String>) {
        let msg = Value::String(msg.into());
        match self.map.get_mut(field) {
            Some(Value::Array(arr)) => arr.push(msg),
            _ => {
                self.map.insert(field.to_string(), Value::Array(vec![msg]));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn into_unprocessable(self, message: &str) -> CardError {
        CardError::unprocessable(message).with_errors(Value::Object(self.map))
    }

    pub fn into_unprocessable_anyhow(self, message: &str) -> anyhow::Error {
        self.into_unprocessable(message).into_anyhow()
    }
}

fn friendly_message(code: &str) -> Option<&'static str> {
    match code {
        "required" => Some(REQUIRED),
        "email" => Some(INVALID_EMAIL),
        _ => None,
    }
}

fn join_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}.{field}")
    }
}

fn collect(out: &mut SchemaErrors, prefix: &str, errs: &ValidationErrors) {
    for (field, kind) in errs.errors() {
        let key = join_path(prefix, field);
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for e in field_errors {
                    let msg = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .or_else(|| friendly_message(&e.code).map(str::to_string))
                        .unwrap_or_else(|| e.code.to_string());
                    out.push_field(&key, msg);
                }
            }
            ValidationErrorsKind::Struct(nested) => collect(out, &key, nested),
            ValidationErrorsKind::List(items) => {
                for (idx, nested) in items {
                    collect(out, &format!("{key}[{idx}]"), nested);
                }
            }
        }
    }
}

pub fn schema_errors(errs: &ValidationErrors) -> SchemaErrors {
    let mut out = SchemaErrors::default();
    collect(&mut out, "", errs);
    out
}

/// Validate an already-typed value.
pub fn validate<T: Validate>(value: &T, error_message: &str) -> anyhow::Result<()> {
    value
        .validate()
        .map_err(|e| schema_errors(&e).into_unprocessable_anyhow(error_message))
}

/// `#[validate(custom(function = "card_schema::required"))]`
pub fn required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message(Cow::Borrowed(REQUIRED)));
    }
    Ok(())
}

/// Required, and shaped like an email address.
pub fn required_email(value: &str) -> Result<(), ValidationError> {
    required(value)?;
    if !value.validate_email() {
        return Err(ValidationError::new("email").with_message(Cow::Borrowed(INVALID_EMAIL)));
    }
    Ok(())
}
