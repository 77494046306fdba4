//! Structural validation of telemetry request bodies.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. the body is present and non-empty ([`Rejection::MissingBody`])
//! 2. `id` is present ([`Rejection::MissingIdentifier`])
//! 3. `content_type` and `args` are present ([`Rejection::MissingContent`])
//! 4. `content_type` names a declared type ([`Rejection::InvalidContentType`])
//! 5. `args` decodes into that type's payload ([`Rejection::MalformedArgs`])
//!
//! A field counts as absent when it is missing, `null`, `false`, `0` or `""`.
//! Only the top-level shape and the payload's field types are checked here;
//! what the payload means is up to the handler.

use crate::Rejection;
use serde_json::{Map, Value};
use telemetry_types::{ContentType, InboundRequest, RequestArgs};

/// Validates raw body bytes.
pub fn validate(body: &[u8]) -> Result<InboundRequest, Rejection> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(Rejection::MissingBody);
    }
    let value: Value = serde_json::from_slice(body).map_err(|_| Rejection::MalformedBody)?;
    validate_value(value)
}

/// Validates an already-parsed body.
pub fn validate_value(body: Value) -> Result<InboundRequest, Rejection> {
    if !is_present(&body) {
        return Err(Rejection::MissingBody);
    }
    let raw = body.clone();
    let mut fields = match body {
        Value::Object(fields) if fields.is_empty() => return Err(Rejection::MissingBody),
        Value::Object(fields) => fields,
        _ => return Err(Rejection::MissingIdentifier),
    };

    let id = take_present(&mut fields, "id")
        .and_then(identifier)
        .ok_or(Rejection::MissingIdentifier)?;

    let content_type = take_present(&mut fields, "content_type");
    let args = take_present(&mut fields, "args");
    let (content_type, args) = match (content_type, args) {
        (Some(content_type), Some(args)) => (content_type, args),
        _ => return Err(Rejection::MissingContent),
    };

    let content_type: ContentType = content_type
        .as_str()
        .and_then(|name| name.parse().ok())
        .ok_or(Rejection::InvalidContentType)?;

    let args = RequestArgs::from_value(content_type, args).map_err(|_| Rejection::MalformedArgs)?;

    let content = take_present(&mut fields, "content").map(|content| match content {
        Value::String(text) => text,
        other => other.to_string(),
    });

    Ok(InboundRequest {
        id,
        content_type,
        args,
        content,
        raw: Some(raw),
    })
}

fn take_present(fields: &mut Map<String, Value>, key: &str) -> Option<Value> {
    fields.remove(key).filter(is_present)
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map(|n| n != 0.0).unwrap_or(true),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn identifier(value: Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn auth_args() -> Value {
        json!({ "player": { "uuid": "u1", "ip": "1.2.3.4" } })
    }

    fn check(body: Value) -> Result<InboundRequest, Rejection> {
        validate(body.to_string().as_bytes())
    }

    #[test]
    fn test_empty_bodies_are_missing() {
        assert_eq!(validate(b"").unwrap_err(), Rejection::MissingBody);
        assert_eq!(validate(b"  \n").unwrap_err(), Rejection::MissingBody);
        assert_eq!(validate(b"null").unwrap_err(), Rejection::MissingBody);
        assert_eq!(validate(b"{}").unwrap_err(), Rejection::MissingBody);
        assert_eq!(validate(b"false").unwrap_err(), Rejection::MissingBody);
    }

    #[test]
    fn test_unparseable_body() {
        assert_eq!(validate(b"{\"id\":").unwrap_err(), Rejection::MalformedBody);
    }

    #[test]
    fn test_missing_identifier_wins_over_other_failures() {
        let bodies = [
            json!({ "content_type": "Auth", "args": auth_args() }),
            json!({ "content_type": "Bogus" }),
            json!({ "id": "", "content_type": "Auth", "args": auth_args() }),
            json!({ "id": null, "args": auth_args() }),
            json!({ "id": { "nested": true }, "content_type": "Auth", "args": auth_args() }),
            json!([1, 2, 3]),
        ];
        for body in bodies {
            assert_eq!(check(body.clone()).unwrap_err(), Rejection::MissingIdentifier, "{}", body);
        }
    }

    #[test]
    fn test_missing_content() {
        assert_eq!(
            check(json!({ "id": "a", "args": auth_args() })).unwrap_err(),
            Rejection::MissingContent
        );
        assert_eq!(
            check(json!({ "id": "a", "content_type": "Auth" })).unwrap_err(),
            Rejection::MissingContent
        );
        assert_eq!(
            check(json!({ "id": "a", "content_type": "Bogus", "args": 0 })).unwrap_err(),
            Rejection::MissingContent
        );
    }

    #[test]
    fn test_invalid_content_type() {
        for content_type in [json!("Bogus"), json!("auth"), json!(7), json!(["Auth"])] {
            let body = json!({
                "id": "a",
                "content_type": content_type,
                "args": auth_args(),
                "content": "well formed"
            });
            assert_eq!(check(body).unwrap_err(), Rejection::InvalidContentType);
        }
    }

    #[test]
    fn test_malformed_args_checked_last() {
        let body = json!({ "id": "a", "content_type": "Chat", "args": auth_args() });
        assert_eq!(check(body).unwrap_err(), Rejection::MalformedArgs);
    }

    #[test]
    fn test_valid_request() {
        let request = check(json!({
            "id": "abc",
            "content_type": "Auth",
            "args": auth_args(),
            "content": "login"
        }))
        .unwrap();

        assert_eq!(request.id, "abc");
        assert_eq!(request.content_type, ContentType::Auth);
        assert_eq!(request.content.as_deref(), Some("login"));
        assert_eq!(request.args.player().map(|p| p.uuid.as_str()), Some("u1"));
    }

    #[test]
    fn test_numeric_identifier_and_missing_content_field() {
        let request = check(json!({ "id": 42, "content_type": "Auth", "args": auth_args() })).unwrap();
        assert_eq!(request.id, "42");
        assert!(request.content.is_none());
        assert_eq!(request.raw.as_ref().map(|raw| raw["id"].clone()), Some(json!(42)));
    }

    #[test]
    fn test_received_body_is_kept_whole() {
        let body = json!({
            "id": "abc",
            "content_type": "Auth",
            "args": { "player": { "uuid": "u1", "ip": "1.2.3.4" }, "session": 3 },
            "content": ["not", "text"],
            "extra": true
        });
        let request = check(body.clone()).unwrap();

        assert_eq!(request.content.as_deref(), Some(r#"["not","text"]"#));
        assert_eq!(request.raw, Some(body));
    }
}
