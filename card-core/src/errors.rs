//! # Errors (Feathers-style)
//!
//! Structured errors with a status code and class name that can be
//! carried through `anyhow::Error` (and therefore through the hook
//! pipeline). The transport decides how to render them.

use std::fmt;

use anyhow::Error as AnyError;
use serde_json::{json, Value};

/// Error classes and their HTTP status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,       // 400
    Forbidden,        // 403
    NotFound,         // 404
    MethodNotAllowed, // 405
    Unprocessable,    // 422
    GeneralError,     // 500
    NotImplemented,   // 501
    Unavailable,      // 503
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::MethodNotAllowed => 405,
            ErrorKind::Unprocessable => 422,
            ErrorKind::GeneralError => 500,
            ErrorKind::NotImplemented => 501,
            ErrorKind::Unavailable => 503,
        }
    }

    /// Feathers error `name` (e.g. "NotFound")
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::MethodNotAllowed => "MethodNotAllowed",
            ErrorKind::Unprocessable => "Unprocessable",
            ErrorKind::GeneralError => "GeneralError",
            ErrorKind::NotImplemented => "NotImplemented",
            ErrorKind::Unavailable => "Unavailable",
        }
    }

    /// Feathers error `className` (kebab-cased)
    pub fn class_name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad-request",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not-found",
            ErrorKind::MethodNotAllowed => "method-not-allowed",
            ErrorKind::Unprocessable => "unprocessable",
            ErrorKind::GeneralError => "general-error",
            ErrorKind::NotImplemented => "not-implemented",
            ErrorKind::Unavailable => "unavailable",
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

/// A structured error that can live inside `anyhow::Error`.
///
/// `errors` holds per-field details, e.g. `{"email": ["Invalid email address."]}`.
#[derive(Debug)]
pub struct CardError {
    pub kind: ErrorKind,
    pub message: String,
    pub errors: Option<Value>,
    pub source: Option<AnyError>,
}

impl CardError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            errors: None,
            source: None,
        }
    }

    pub fn with_errors(mut self, errors: Value) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn with_source(mut self, source: AnyError) -> Self {
        self.source = Some(source);
        self
    }

    pub fn code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }

    /// Convert into `anyhow::Error` so it flows through the hook pipeline.
    pub fn into_anyhow(self) -> AnyError {
        AnyError::new(self)
    }

    /// Find a `CardError` anywhere in the chain of an `anyhow::Error`.
    pub fn from_anyhow(err: &AnyError) -> Option<&CardError> {
        err.chain().find_map(|e| e.downcast_ref::<CardError>())
    }

    /// Turn any error into a CardError:
    /// - if it's already a CardError, keep it
    /// - otherwise wrap as GeneralError
    pub fn normalize(err: AnyError) -> CardError {
        match err.downcast::<CardError>() {
            Ok(card) => card,
            Err(other) => match CardError::from_anyhow(&other) {
                Some(inner) => inner.sanitize_for_client(),
                None => CardError::general_error(other.to_string()).with_source(other),
            },
        }
    }

    /// Copy suitable for returning to clients: drops the inner `source`.
    pub fn sanitize_for_client(&self) -> CardError {
        CardError {
            kind: self.kind,
            message: self.message.clone(),
            errors: self.errors.clone(),
            source: None,
        }
    }

    /// Feathers-ish JSON payload.
    pub fn to_json(&self) -> Value {
        let mut base = json!({
            "name": self.name(),
            "message": self.message,
            "code": self.code(),
            "className": self.class_name(),
        });

        if let Some(e) = &self.errors {
            base["errors"] = e.clone();
        }
        base
    }

    /// Flatten the `errors` map into `(field, message)` pairs.
    pub fn field_messages(&self) -> Vec<(String, String)> {
        let Some(Value::Object(map)) = &self.errors else {
            return Vec::new();
        };

        let mut out = Vec::new();
        for (field, messages) in map {
            match messages {
                Value::Array(items) => {
                    for m in items.iter().filter_map(|m| m.as_str()) {
                        out.push((field.clone(), m.to_string()));
                    }
                }
                Value::String(m) => out.push((field.clone(), m.clone())),
                _ => {}
            }
        }
        out
    }

    // ---- Constructors ----

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, msg)
    }
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, msg)
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, msg)
    }
    pub fn method_not_allowed(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::MethodNotAllowed, msg)
    }
    pub fn unprocessable(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unprocessable, msg)
    }
    pub fn general_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::GeneralError, msg)
    }
    pub fn not_implemented(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotImplemented, msg)
    }
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unavailable, msg)
    }
}

impl fmt::Display for CardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.code(), self.message)
    }
}

impl std::error::Error for CardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Return early with a `CardError` converted into `anyhow::Error`.
#[macro_export]
macro_rules! bail_card {
    ($ctor:ident, $msg:expr) => {
        return Err($crate::errors::CardError::$ctor($msg).into_anyhow())
    };
    ($ctor:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::errors::CardError::$ctor(format!($fmt, $($arg)*)).into_anyhow())
    };
}
