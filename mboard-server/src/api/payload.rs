//! Request body field extraction
//!
//! Bodies are read as a JSON object so that "absent" and "null" stay
//! distinguishable for PATCH requests, and so malformed dates can be
//! normalized to "no date" instead of failing the request.

use crate::error::{ApiError, ApiResult};
use chrono::NaiveDate;
use mboard_common::time::date_from_json;
use serde_json::{Map, Value};

#[derive(Debug, Default)]
pub struct Payload(Map<String, Value>);

impl Payload {
    /// Parse a request body; an empty body is an empty object
    pub fn parse(body: &[u8]) -> ApiResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            Ok(_) => Err(ApiError::BadRequest("Request body must be a JSON object".to_string())),
            Err(e) => Err(ApiError::BadRequest(format!("Invalid JSON: {}", e))),
        }
    }

    fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Raw string field, no trimming; absent or null is `None`
    pub fn string(&self, field: &str) -> ApiResult<Option<&str>> {
        match self.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(ApiError::BadRequest(format!("{} must be a string", field))),
        }
    }

    /// Name for a create: required, trimmed, non-empty
    pub fn required_name(&self) -> ApiResult<String> {
        self.name()?
            .ok_or_else(|| ApiError::BadRequest("Name is required".to_string()))
    }

    /// Name for an update: absent means unchanged, but present must be non-empty
    pub fn name(&self) -> ApiResult<Option<String>> {
        match self.string("name")? {
            None if self.get("name").is_none() => Ok(None),
            Some(name) if !name.trim().is_empty() => Ok(Some(name.trim().to_string())),
            _ => Err(ApiError::BadRequest("Name cannot be empty".to_string())),
        }
    }

    /// Summary: absent is `None`, null or blank clears (`Some(None)`)
    pub fn summary(&self) -> ApiResult<Option<Option<String>>> {
        if self.get("summary").is_none() {
            return Ok(None);
        }
        let summary = self
            .string("summary")?
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Ok(Some(summary))
    }

    /// Due date: absent is `None`; null, malformed or impossible dates clear (`Some(None)`)
    pub fn due_date(&self) -> Option<Option<NaiveDate>> {
        self.get("due_date").map(date_from_json)
    }

    /// Done flag: must be a JSON boolean when present
    pub fn done(&self) -> ApiResult<Option<bool>> {
        match self.get("done") {
            None => Ok(None),
            Some(Value::Bool(done)) => Ok(Some(*done)),
            Some(_) => Err(ApiError::BadRequest("done must be a boolean".to_string())),
        }
    }
}
