use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::percent_decode_str;
use serde_json::Value;

use crate::errors::UnfurlError;

pub fn v_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = root;
    for key in path {
        cur = cur.get(*key)?;
    }
    Some(cur)
}

pub fn v_str<'a>(root: &'a Value, path: &[&str]) -> Option<&'a str> {
    v_path(root, path).and_then(|v| v.as_str())
}

/// Case-insensitive header lookup; API Gateway lowercases names, Slack docs don't.
pub fn get_header_value<'a>(headers: &'a Value, name: &str) -> Option<&'a str> {
    if let Some(v) = headers.get(name).and_then(|s| s.as_str()) {
        return Some(v);
    }
    headers.as_object().and_then(|map| {
        map.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                v.as_str()
            } else {
                None
            }
        })
    })
}

/// Request path from either a v2 (`rawPath`) or v1 (`path`) gateway event.
pub fn request_path(payload: &Value) -> Option<&str> {
    v_str(payload, &["rawPath"]).or_else(|| v_str(payload, &["path"]))
}

/// Raw request body, decoded when the gateway marked it base64.
///
/// # Errors
///
/// Returns `UnfurlError::ParseError` if the body is missing, not a string, or
/// not valid base64/UTF-8 when flagged as encoded.
pub fn request_body(payload: &Value) -> Result<String, UnfurlError> {
    let body = payload
        .get("body")
        .ok_or_else(|| UnfurlError::ParseError("Missing body".to_string()))?
        .as_str()
        .ok_or_else(|| UnfurlError::ParseError("Invalid body format".to_string()))?;

    let encoded = payload
        .get("isBase64Encoded")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if !encoded {
        return Ok(body.to_string());
    }

    let bytes = STANDARD
        .decode(body)
        .map_err(|e| UnfurlError::ParseError(format!("Invalid base64 body: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| UnfurlError::ParseError(format!("Body is not UTF-8: {e}")))
}

/// Query parameter from `rawQueryString`, falling back to `queryStringParameters`.
pub fn query_param(payload: &Value, name: &str) -> Option<String> {
    let from_raw = v_str(payload, &["rawQueryString"]).and_then(|q| {
        q.split('&').find_map(|kv| {
            let (key, value) = kv.split_once('=').unwrap_or((kv, ""));
            (key == name).then(|| decode_url_component(value))
        })
    });

    from_raw.or_else(|| {
        v_str(payload, &["queryStringParameters", name]).map(std::string::ToString::to_string)
    })
}

/// Decodes a form/query component, treating `+` as a space.
#[must_use]
pub fn decode_url_component(value: &str) -> String {
    let spaced = value.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}
