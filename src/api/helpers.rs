//! Response builders for the API Gateway proxy integration.

use serde_json::{Value, json};

/// Returns a 204 No Content response, the normal Events API acknowledgement.
#[must_use]
pub fn no_content() -> Value {
    json!({ "statusCode": 204, "body": "" })
}

/// Returns a 200 OK response with a plain-text body.
#[must_use]
pub fn ok_text(text: &str) -> Value {
    json!({
        "statusCode": 200,
        "body": text,
        "headers": { "content-type": "text/plain" }
    })
}

/// Returns a 200 OK response with an HTML body.
#[must_use]
pub fn ok_html(html: &str) -> Value {
    html_response(200, html)
}

#[must_use]
pub fn html_response(status_code: u16, html: &str) -> Value {
    json!({
        "statusCode": status_code,
        "body": html,
        "headers": { "content-type": "text/html; charset=utf-8" }
    })
}

/// Returns an error response with the given status code and message.
#[must_use]
pub fn err_response(status_code: u16, message: &str) -> Value {
    json!({
        "statusCode": status_code,
        "body": json!({ "error": message }).to_string()
    })
}
