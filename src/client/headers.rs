//! Header-set builders for the content types and auth schemes this layer
//! speaks.

use crate::error::RestClientError;
use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue};

/// Marker header attached alongside cookies so downstream identity filters
/// skip the request.
pub const IGNORE_IDENTITY_HEADER: &str = "ignore-identity";

/// Header carrying the caller-supplied access token.
pub const ACCESS_TOKEN_HEADER: &str = "accesstoken";

/// `Content-Type: application/json; charset=utf-8`
pub fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    headers
}

/// `Content-Type: application/x-www-form-urlencoded`
pub fn form_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded"),
    );
    headers
}

/// `Content-Type: text/html`
pub fn html_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));
    headers
}

/// Joins the given cookie strings into a `Cookie` header and adds the fixed
/// `ignore-identity: true` marker.
pub fn cookie_headers(cookies: &[String]) -> Result<HeaderMap, RestClientError> {
    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, HeaderValue::from_str(&cookies.join("; "))?);
    headers.insert(IGNORE_IDENTITY_HEADER, HeaderValue::from_static("true"));
    Ok(headers)
}

/// Attaches the access token under the `accesstoken` header.
pub fn token_headers(token: &str) -> Result<HeaderMap, RestClientError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCESS_TOKEN_HEADER, HeaderValue::from_str(token)?);
    Ok(headers)
}
