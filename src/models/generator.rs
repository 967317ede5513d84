//! License key generator models
//!
//! A generator is the stored template a license key is synthesized from:
//! `chunks` segments of `chunk_length` characters drawn from `charset`,
//! joined by `separator` and wrapped in `prefix`/`suffix`. It also carries the
//! activation cap and validity period applied to every key issued from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::{
    validation::{absint, numeric, sanitize_text, text_value},
    AppError,
};

/// A stored generator.
///
/// Field order is the key order of the REST representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generator {
    pub id: i64,
    pub name: String,
    pub charset: String,
    pub chunks: u32,
    pub chunk_length: u32,
    pub times_activated_max: Option<u32>,
    pub separator: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    /// Days until an issued key expires; `None` means never
    pub expires_in: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<i64>,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<i64>,
}

impl Generator {
    /// Apply a validated patch, leaving absent fields untouched
    pub fn apply(&mut self, patch: &GeneratorPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(charset) = &patch.charset {
            self.charset = charset.clone();
        }
        if let Some(chunks) = patch.chunks {
            self.chunks = chunks;
        }
        if let Some(chunk_length) = patch.chunk_length {
            self.chunk_length = chunk_length;
        }
        if let Some(times_activated_max) = patch.times_activated_max {
            self.times_activated_max = times_activated_max;
        }
        if let Some(separator) = &patch.separator {
            self.separator = separator.clone();
        }
        if let Some(prefix) = &patch.prefix {
            self.prefix = prefix.clone();
        }
        if let Some(suffix) = &patch.suffix {
            self.suffix = suffix.clone();
        }
        if let Some(expires_in) = patch.expires_in {
            self.expires_in = expires_in;
        }
    }
}

/// Fields submitted to create a generator.
///
/// Required fields stay optional here so a missing one can be reported by
/// name; [`NewGenerator::validate`] enforces them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewGenerator {
    pub name: Option<String>,
    pub charset: Option<String>,
    pub chunks: Option<u32>,
    pub chunk_length: Option<u32>,
    pub times_activated_max: Option<u32>,
    pub separator: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub expires_in: Option<u32>,
}

impl NewGenerator {
    /// Build creation input from flat request parameters.
    ///
    /// `null` counts as absent. Text is sanitized; numbers are coerced with
    /// [`absint`], so non-numeric input becomes zero and fails validation if
    /// the field is required.
    pub fn from_params(params: &Map<String, Value>) -> Self {
        let text = |key: &str| {
            present(params, key)
                .and_then(text_value)
                .map(|s| sanitize_text(&s))
        };
        let number = |key: &str| present(params, key).map(absint);

        Self {
            name: text("name"),
            charset: text("charset"),
            chunks: number("chunks"),
            chunk_length: number("chunk_length"),
            times_activated_max: number("times_activated_max"),
            separator: text("separator"),
            prefix: text("prefix"),
            suffix: text("suffix"),
            expires_in: number("expires_in"),
        }
    }

    /// Check required fields in order: name, charset, chunks, chunk_length
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.as_deref().map_or(true, str::is_empty) {
            return Err(AppError::validation(
                "name",
                "The Generator name is missing from the request.",
            ));
        }
        if self.charset.as_deref().map_or(true, str::is_empty) {
            return Err(AppError::validation(
                "charset",
                "The Generator charset is missing from the request.",
            ));
        }
        if self.chunks.map_or(true, |n| n == 0) {
            return Err(AppError::validation(
                "chunks",
                "The Generator chunks is missing from the request.",
            ));
        }
        if self.chunk_length.map_or(true, |n| n == 0) {
            return Err(AppError::validation(
                "chunk_length",
                "The Generator chunk length is missing from the request.",
            ));
        }
        Ok(())
    }
}

/// A partial update.
///
/// Outer `None` means the field was not supplied. For nullable fields
/// `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorPatch {
    pub name: Option<String>,
    pub charset: Option<String>,
    pub chunks: Option<u32>,
    pub chunk_length: Option<u32>,
    pub times_activated_max: Option<Option<u32>>,
    pub separator: Option<Option<String>>,
    pub prefix: Option<Option<String>>,
    pub suffix: Option<Option<String>>,
    pub expires_in: Option<Option<u32>>,
}

impl GeneratorPatch {
    /// Interpret a JSON update body.
    ///
    /// Fields are checked in order name, charset, chunks, chunk_length,
    /// times_activated_max, expires_in and the first failure is returned.
    /// Numeric fields must be numeric but zero is accepted. Keys that are
    /// not updatable are ignored.
    pub fn from_json(body: &Map<String, Value>) -> Result<Self, AppError> {
        let mut patch = GeneratorPatch::default();

        if let Some(value) = body.get("name") {
            patch.name = Some(required_text(value, "name", "Generator name is invalid.")?);
        }
        if let Some(value) = body.get("charset") {
            patch.charset = Some(required_text(
                value,
                "charset",
                "Generator charset is invalid.",
            )?);
        }
        if let Some(value) = body.get("chunks") {
            patch.chunks = Some(numeric(value).ok_or_else(|| {
                AppError::validation("chunks", "Generator chunks must be an absolute integer.")
            })?);
        }
        if let Some(value) = body.get("chunk_length") {
            patch.chunk_length = Some(numeric(value).ok_or_else(|| {
                AppError::validation(
                    "chunk_length",
                    "Generator chunk_length must be an absolute integer.",
                )
            })?);
        }
        if let Some(value) = body.get("times_activated_max") {
            patch.times_activated_max = Some(nullable_number(
                value,
                "times_activated_max",
                "Generator times_activated_max must be an absolute integer.",
            )?);
        }
        if let Some(value) = body.get("expires_in") {
            patch.expires_in = Some(nullable_number(
                value,
                "expires_in",
                "Generator expires_in must be an absolute integer.",
            )?);
        }
        if let Some(value) = body.get("separator") {
            patch.separator = Some(nullable_text(value, "separator")?);
        }
        if let Some(value) = body.get("prefix") {
            patch.prefix = Some(nullable_text(value, "prefix")?);
        }
        if let Some(value) = body.get("suffix") {
            patch.suffix = Some(nullable_text(value, "suffix")?);
        }

        Ok(patch)
    }

    /// Re-check the invariants a typed patch can still break
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.as_deref().is_some_and(str::is_empty) {
            return Err(AppError::validation("name", "Generator name is invalid."));
        }
        if self.charset.as_deref().is_some_and(str::is_empty) {
            return Err(AppError::validation(
                "charset",
                "Generator charset is invalid.",
            ));
        }
        Ok(())
    }

    /// True when no field is supplied
    pub fn is_empty(&self) -> bool {
        *self == GeneratorPatch::default()
    }
}

fn present<'a>(params: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    params.get(key).filter(|v| !v.is_null())
}

fn required_text(value: &Value, field: &'static str, message: &str) -> Result<String, AppError> {
    text_value(value)
        .map(|s| sanitize_text(&s))
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::validation(field, message))
}

fn nullable_text(value: &Value, field: &'static str) -> Result<Option<String>, AppError> {
    if value.is_null() {
        return Ok(None);
    }
    text_value(value)
        .map(|s| Some(sanitize_text(&s)))
        .ok_or_else(|| AppError::validation(field, format!("Generator {} must be a string.", field)))
}

fn nullable_number(
    value: &Value,
    field: &'static str,
    message: &str,
) -> Result<Option<u32>, AppError> {
    if value.is_null() {
        return Ok(None);
    }
    numeric(value)
        .map(Some)
        .ok_or_else(|| AppError::validation(field, message))
}
