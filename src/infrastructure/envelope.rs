// Response envelope unwrapping for the REST backend
//
// The backend is not consistent about how it wraps payloads. A collection
// can arrive as a bare array, as `{results: [...]}` or as
// `{data: {results: [...]}}`, and any of these can sit inside a
// `{success, data, message}` envelope.
use crate::error::ApiError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// How deep `data` wrappers are followed before giving up.
const MAX_NESTING: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    pub items: Vec<T>,
    /// Backend's total across pages if reported, otherwise `items.len()`.
    pub count: usize,
}

/// Strip a `{success, data, message}` envelope if present. A body without a
/// `success` key is returned unchanged.
pub fn unwrap_envelope(body: Value) -> Result<Value, ApiError> {
    let Value::Object(mut map) = body else {
        return Ok(body);
    };

    let Some(success) = map.get("success") else {
        return Ok(Value::Object(map));
    };

    if !success.as_bool().unwrap_or(false) {
        let message = map
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("request failed")
            .to_string();
        return Err(ApiError::Rejected { message });
    }

    match map.remove("data") {
        Some(data) => Ok(data),
        None => Err(ApiError::unexpected("successful envelope without data")),
    }
}

pub fn parse_collection<T: DeserializeOwned>(body: Value) -> Result<Collection<T>, ApiError> {
    let payload = unwrap_envelope(body)?;
    let (raw_items, count) = locate_items(payload, 0)?;

    let total = raw_items.len();
    let items: Vec<T> = raw_items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<T>(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping malformed collection item");
                None
            }
        })
        .collect();

    if total > 0 && items.is_empty() {
        return Err(ApiError::unexpected(format!(
            "none of the {} collection items could be decoded",
            total
        )));
    }

    Ok(Collection {
        count: count.unwrap_or(items.len()).max(items.len()),
        items,
    })
}

fn locate_items(payload: Value, depth: usize) -> Result<(Vec<Value>, Option<usize>), ApiError> {
    if depth > MAX_NESTING {
        return Err(ApiError::unexpected("collection nested too deeply"));
    }

    match payload {
        Value::Array(items) => Ok((items, None)),
        Value::Object(mut map) => {
            if let Some(results) = map.remove("results") {
                let count = map.get("count").and_then(Value::as_u64).map(|c| c as usize);
                return match results {
                    Value::Array(items) => Ok((items, count)),
                    other => Err(ApiError::unexpected(format!(
                        "`results` is {}, expected an array",
                        kind(&other)
                    ))),
                };
            }
            match map.remove("data") {
                Some(inner) => locate_items(unwrap_envelope(inner)?, depth + 1),
                None => Err(ApiError::unexpected("object has neither `results` nor `data`")),
            }
        }
        other => Err(ApiError::unexpected(format!(
            "expected a collection, got {}",
            kind(&other)
        ))),
    }
}

/// Parse a single-resource body, following one bare `{data: {...}}` wrapper.
pub fn parse_single<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    let mut payload = unwrap_envelope(body)?;

    if let Value::Object(map) = &payload {
        if map.len() == 1 && map.get("data").is_some_and(Value::is_object) {
            if let Some(inner) = map.get("data") {
                payload = inner.clone();
            }
        }
    }

    if !payload.is_object() {
        return Err(ApiError::unexpected(format!(
            "expected an object, got {}",
            kind(&payload)
        )));
    }

    serde_json::from_value(payload).map_err(|e| ApiError::unexpected(e.to_string()))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
