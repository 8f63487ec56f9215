use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentError {
    #[error("Identifier must not be empty")]
    Empty,

    #[error("Identifier too long: {0} bytes (max: 63)")]
    TooLong(usize),

    #[error("Identifier contains invalid character {0:?}")]
    InvalidChar(char),
}

/// A PostgreSQL schema name that is safe to splice into SQL.
///
/// Only `[a-z0-9_]` is accepted (leading digit rejected). Table
/// references are quoted on output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaName(String);

impl SchemaName {
    pub fn parse(raw: &str) -> Result<Self, IdentError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(IdentError::Empty);
        }
        if raw.len() > 63 {
            return Err(IdentError::TooLong(raw.len()));
        }
        for (i, c) in raw.chars().enumerate() {
            let ok = c.is_ascii_lowercase() || c == '_' || (i > 0 && c.is_ascii_digit());
            if !ok {
                return Err(IdentError::InvalidChar(c));
            }
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `"schema"."table"`; `table` must itself be a trusted literal.
    pub fn table(&self, table: &str) -> String {
        format!("\"{}\".\"{}\"", self.0, table)
    }
}

impl fmt::Display for SchemaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
