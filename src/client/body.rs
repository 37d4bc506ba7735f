//! Request-body adaptation: deciding how a caller-supplied payload goes on
//! the wire for the negotiated content type.
//!
//! Payloads are viewed through their `serde_json::Value` shape, so any
//! serializable type participates: a mapping and a record with the same
//! fields produce the same form field set. Only the urlencoded-form content
//! type triggers conversion; everything else passes through as JSON text.

use crate::client::headers::{form_headers, html_headers, json_headers};
use crate::error::RestClientError;
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// The negotiated request content type. Passed explicitly to every operation
/// rather than inferred from header state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Json,
    Form,
    Html,
}

impl ContentType {
    /// The header set this content type implies.
    pub fn headers(self) -> HeaderMap {
        match self {
            ContentType::Json => json_headers(),
            ContentType::Form => form_headers(),
            ContentType::Html => html_headers(),
        }
    }
}

/// Policy for form fields whose value cannot be string-converted (nested
/// structures). Strict fails the call; Lenient logs and skips the field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormMode {
    #[default]
    Strict,
    Lenient,
}

/// A wire-ready payload, derived from one caller value and one content type;
/// lives only for the duration of a single call.
#[derive(Debug, Clone, PartialEq)]
pub enum AdaptedBody {
    /// No request body.
    None,
    /// JSON text, sent as-is.
    Json(String),
    /// Urlencoded form fields, one entry per field.
    Form(Vec<(String, String)>),
    /// Pre-formatted text supplied by the caller, sent untouched.
    Raw(String),
}

/// Adapts `body` for the wire.
///
/// For non-form content types the payload is serialized once as JSON and
/// passed through. For the form content type:
/// - a missing or null payload produces no body,
/// - a string or sequence passes through untouched (the caller is assumed to
///   have pre-formatted it),
/// - a mapping or record becomes one form field per entry, values
///   string-converted (strings verbatim, numbers and bools stringified,
///   scalar arrays comma-joined, null fields omitted),
/// - a bare scalar is stringified.
///
/// A field value that cannot be string-converted is handled per `mode`.
pub fn adapt_body<B>(
    body: Option<&B>,
    content_type: ContentType,
    mode: FormMode,
) -> Result<AdaptedBody, RestClientError>
where
    B: Serialize + ?Sized,
{
    let Some(body) = body else {
        return Ok(AdaptedBody::None);
    };

    if content_type != ContentType::Form {
        return Ok(AdaptedBody::Json(serde_json::to_string(body)?));
    }

    Ok(match serde_json::to_value(body)? {
        Value::Null => AdaptedBody::None,
        Value::String(s) => AdaptedBody::Raw(s),
        value @ Value::Array(_) => AdaptedBody::Raw(value.to_string()),
        Value::Object(map) => AdaptedBody::Form(flatten_fields(map, mode)?),
        scalar => AdaptedBody::Raw(scalar.to_string()),
    })
}

fn flatten_fields(
    map: serde_json::Map<String, Value>,
    mode: FormMode,
) -> Result<Vec<(String, String)>, RestClientError> {
    let mut fields = Vec::with_capacity(map.len());
    for (name, value) in map {
        if value.is_null() {
            continue;
        }
        match value_to_string(&value) {
            Some(text) => fields.push((name, text)),
            None => match mode {
                FormMode::Strict => {
                    return Err(RestClientError::body_adaptation(
                        name,
                        "nested values cannot be form-encoded",
                    ));
                }
                FormMode::Lenient => {
                    warn!("Skipping form field '{name}': value is not string-convertible");
                }
            },
        }
    }
    Ok(fields)
}

/// String form of a scalar or scalar-array value; `None` for nested
/// structures (and for null, which callers handle first).
pub(crate) fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(_) | Value::Bool(_) => Some(value.to_string()),
        Value::Array(items) => join_scalars(items),
        _ => None,
    }
}

/// Comma-joins the non-null scalar elements of a sequence; `None` when any
/// element is itself a nested structure.
fn join_scalars(items: &[Value]) -> Option<String> {
    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Null => continue,
            Value::String(s) => parts.push(s.clone()),
            Value::Number(_) | Value::Bool(_) => parts.push(item.to_string()),
            _ => return None,
        }
    }
    Some(parts.join(","))
}
