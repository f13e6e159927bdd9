//! Fail-closed decoding of JSON request bodies.
//!
//! Bodies are first parsed into a JSON object, then each recognised field is
//! type-checked. Every offending field is collected so the caller gets a single
//! `AppError::Validation` naming all of them, instead of stopping at the first.

use serde_json::{Map, Value};
use validator::ValidationErrors;

use crate::error::AppError;

pub type JsonObject = Map<String, Value>;

/// Parses a raw request body into a JSON object.
///
/// An empty body, malformed JSON and non-object JSON are all `BadRequest`,
/// checked in that order.
pub fn parse_object(body: &[u8]) -> Result<JsonObject, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::BadRequest("Request body is required".into()));
    }
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Failed to parse JSON: {}", e)))?;
    match value {
        Value::Object(object) => Ok(object),
        _ => Err(AppError::BadRequest("JSON body must be an object".into())),
    }
}

/// Collects type and constraint violations for one request body.
#[derive(Debug, Default)]
pub struct FieldCheck {
    offending: Vec<String>,
}

impl FieldCheck {
    pub fn new() -> Self {
        Self::default()
    }

    /// A string field. Absent or `null` yields `None`; any other type is recorded.
    pub fn string(&mut self, object: &JsonObject, key: &str) -> Option<String> {
        match object.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(value)) => Some(value.clone()),
            Some(_) => {
                self.offending.push(format!("{}: expected a string", key));
                None
            }
        }
    }

    pub fn required_string(&mut self, object: &JsonObject, key: &str) -> String {
        let present = matches!(object.get(key), Some(value) if !value.is_null());
        if !present {
            self.offending.push(format!("{}: is required", key));
            return String::new();
        }
        self.string(object, key).unwrap_or_default()
    }

    pub fn boolean(&mut self, object: &JsonObject, key: &str) -> Option<bool> {
        match object.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::Bool(value)) => Some(*value),
            Some(_) => {
                self.offending.push(format!("{}: expected a boolean", key));
                None
            }
        }
    }

    /// Folds `validator` results into the same report, skipping fields that
    /// already failed their type check.
    pub fn absorb(&mut self, result: Result<(), ValidationErrors>) {
        let Err(errors) = result else {
            return;
        };
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by_key(|(field, _)| *field);
        for (field, field_errors) in fields {
            let prefix = format!("{}:", field);
            if self.offending.iter().any(|entry| entry.starts_with(&prefix)) {
                continue;
            }
            for error in field_errors {
                let reason = error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                self.offending.push(format!("{} {}", prefix, reason));
            }
        }
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.offending.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "invalid fields: {}",
                self.offending.join("; ")
            )))
        }
    }
}
