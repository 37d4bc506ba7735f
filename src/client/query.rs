//! URL query-string construction from mapping-shaped payloads.

use crate::client::body::value_to_string;
use crate::error::RestClientError;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// Serializes `params` into a `?key=value&key2=value2` query string when it
/// has a mapping shape; returns `None` for any other shape so the caller can
/// fall back to sending the payload as a body.
pub fn to_query_string<B>(params: &B) -> Result<Option<String>, RestClientError>
where
    B: Serialize + ?Sized,
{
    match serde_json::to_value(params)? {
        Value::Object(map) => Ok(Some(object_to_query_string(&map))),
        _ => Ok(None),
    }
}

/// Builds the query string from an object's entries in iteration order.
///
/// The output always starts with `?`, even for an empty mapping. Entries with
/// a null value are omitted entirely (no `key=`); strings, numbers and bools
/// are stringified directly; sequences comma-join their non-null elements; an
/// entry whose value is a nested mapping is skipped with a warning. No
/// percent-encoding is applied - callers own the encoding of their values.
pub fn object_to_query_string(map: &serde_json::Map<String, Value>) -> String {
    let mut query = String::from("?");
    let mut first = true;
    for (key, value) in map {
        if value.is_null() {
            continue;
        }
        let Some(text) = value_to_string(value) else {
            warn!("Skipping query parameter '{key}': value is not string-convertible");
            continue;
        };
        if !first {
            query.push('&');
        }
        query.push_str(key);
        query.push('=');
        query.push_str(&text);
        first = false;
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn query_of(value: Value) -> String {
        match value {
            Value::Object(map) => object_to_query_string(&map),
            _ => panic!("test value must be an object"),
        }
    }

    #[test]
    fn test_pairs_in_iteration_order_with_prefix() {
        let query = query_of(json!({"a": "x", "b": 5}));
        assert_eq!(query, "?a=x&b=5");
    }

    #[test]
    fn test_empty_mapping_is_bare_prefix() {
        let query = query_of(json!({}));
        assert_eq!(query, "?");
    }

    #[test]
    fn test_null_values_are_omitted() {
        let query = query_of(json!({"a": "x", "b": null, "c": 7}));
        assert_eq!(query, "?a=x&c=7");
    }

    #[test]
    fn test_sequence_values_comma_join() {
        let query = query_of(json!({"ids": [1, null, 2, 3], "name": "z"}));
        assert_eq!(query, "?ids=1,2,3&name=z");
    }

    #[test]
    fn test_nested_mapping_value_is_skipped() {
        let query = query_of(json!({"a": "x", "nested": {"deep": 1}}));
        assert_eq!(query, "?a=x");
    }

    #[test]
    fn test_non_mapping_payload_yields_none() {
        assert_eq!(to_query_string(&vec![1, 2]).unwrap(), None);
        assert_eq!(to_query_string("plain").unwrap(), None);
    }

    #[test]
    fn test_mapping_payload_yields_query_string() {
        let mut map = BTreeMap::new();
        map.insert("q", "search");
        assert_eq!(
            to_query_string(&map).unwrap(),
            Some("?q=search".to_string())
        );
    }

    // Splitting the output on '&' and '=' reconstructs the non-null entries
    #[test]
    fn test_round_trips_under_reparse() {
        let mut expected = BTreeMap::new();
        expected.insert("alpha", "1");
        expected.insert("beta", "two");
        expected.insert("gamma", "3.5");

        let query = query_of(json!({"alpha": 1, "beta": "two", "gamma": 3.5, "skip": null}));

        let mut parsed = BTreeMap::new();
        for pair in query.trim_start_matches('?').split('&') {
            let (key, value) = pair.split_once('=').expect("pair must contain '='");
            parsed.insert(key, value);
        }
        assert_eq!(parsed, expected);
    }
}
