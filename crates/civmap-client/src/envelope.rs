//! The relay's response envelope and the rules that coerce an arbitrary
//! upstream JSON body into it.
//!
//! Whatever the upstream sends, callers always receive a well-formed
//! [`RelayEnvelope`]: pagination fields are numbers, `data` is an array, and
//! a missing or zero value falls back rather than erroring.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::query::{LocationQuery, DEFAULT_LIMIT};

/// Message used when the upstream answered 2xx with a non-JSON body.
pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON from API";
/// Message used when every endpoint failed.
pub const UNREACHABLE_MESSAGE: &str = "Unable to reach the location API right now, please try again";
const DEFAULT_MESSAGE: &str = "Request completed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl Pagination {
    /// The zeroed block reported when nothing could be fetched.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
            total: 0,
            total_pages: 0,
        }
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayEnvelope {
    pub success: bool,
    pub message: String,
    /// Raw location records, not yet normalized.
    #[serde(default)]
    pub data: Vec<Value>,
    pub pagination: Pagination,
    #[serde(default)]
    pub search_fallback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RelayEnvelope {
    /// Normalizes a 2xx upstream body fetched from `endpoint` for `query`.
    #[must_use]
    pub fn from_body(body: &Value, query: &LocationQuery, endpoint: &str) -> Self {
        let pagination = body.get("pagination");
        let field = |name: &str| pagination.and_then(|p| p.get(name));

        let page = positive(field("page"))
            .or_else(|| (query.page > 0).then_some(u64::from(query.page)))
            .unwrap_or(1);
        let limit = positive(field("limit"))
            .or_else(|| (query.limit > 0).then_some(u64::from(query.limit)))
            .unwrap_or(u64::from(DEFAULT_LIMIT));
        let total = positive(field("total"))
            .or_else(|| positive(body.get("total")))
            .unwrap_or(0);
        let total_pages = positive(field("totalPages")).unwrap_or(1);

        Self {
            success: body.get("success").is_some_and(truthy),
            message: non_empty_str(body.get("message"))
                .unwrap_or(DEFAULT_MESSAGE)
                .to_owned(),
            data: body
                .get("data")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            pagination: Pagination {
                page: saturate_u32(page),
                limit: saturate_u32(limit),
                total,
                total_pages: saturate_u32(total_pages),
            },
            search_fallback: body.get("searchFallback").is_some_and(truthy),
            search_error: non_empty_str(body.get("searchError")).map(str::to_owned),
            used_endpoint: Some(endpoint.to_owned()),
            error: None,
        }
    }

    /// Body substituted for a 2xx response whose text is not JSON.
    #[must_use]
    pub fn invalid_json_body(raw: &str) -> Value {
        serde_json::json!({
            "success": false,
            "message": INVALID_JSON_MESSAGE,
            "rawText": raw,
        })
    }

    /// Envelope returned when no endpoint produced a 2xx response.
    #[must_use]
    pub fn unreachable(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: UNREACHABLE_MESSAGE.to_owned(),
            data: Vec::new(),
            pagination: Pagination::empty(),
            search_fallback: false,
            search_error: None,
            used_endpoint: None,
            error: Some(error.into()),
        }
    }
}

/// JavaScript-style truthiness, which is what upstream producers assume.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A strictly positive count from a number or a numeric string. Zero,
/// negatives, fractions, and anything non-numeric count as absent.
fn positive(value: Option<&Value>) -> Option<u64> {
    let n = match value? {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(whole))?,
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole))?
        }
        _ => return None,
    };
    (n > 0).then_some(n)
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn whole(f: f64) -> Option<u64> {
    (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64).then_some(f as u64)
}

fn saturate_u32(n: u64) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}
