//! Request body as a field map, from JSON or form-encoded input.

use crate::error::AppError;
use crate::model::LIST_FIELDS;
use crate::service::Body;
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header::CONTENT_TYPE, StatusCode},
};
use serde_json::Value;

const FORM: &str = "application/x-www-form-urlencoded";
const JSON: &str = "application/json";

/// Body fields keyed by wire name. An empty body yields an empty map.
#[derive(Clone, Debug, Default)]
pub struct Payload(pub Body);

#[async_trait]
impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.split(';').next().unwrap_or("").trim().to_ascii_lowercase());
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                AppError::PayloadTooLarge(e.body_text())
            } else {
                AppError::BadRequest(e.body_text())
            }
        })?;
        parse_body(content_type.as_deref(), &bytes).map(Payload)
    }
}

/// Parse by media type; without one, the body is tried as JSON.
pub fn parse_body(content_type: Option<&str>, bytes: &[u8]) -> Result<Body, AppError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Body::new());
    }
    match content_type {
        Some(FORM) => parse_form(bytes),
        None | Some(JSON) => parse_json(bytes),
        Some(ct) if ct.ends_with("+json") => parse_json(bytes),
        Some(ct) => Err(AppError::BadRequest(format!("unsupported media type \"{}\"", ct))),
    }
}

fn parse_json(bytes: &[u8]) -> Result<Body, AppError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| AppError::BadRequest(format!("JSON parse error: {}", e)))?;
    match value {
        Value::Object(m) => Ok(m.into_iter().collect()),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

/// Association fields collect every occurrence into a list (empty values skipped);
/// other fields keep the last occurrence.
fn parse_form(bytes: &[u8]) -> Result<Body, AppError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(bytes)
        .map_err(|e| AppError::BadRequest(format!("form parse error: {}", e)))?;
    let mut body = Body::new();
    for (k, v) in pairs {
        if LIST_FIELDS.contains(&k.as_str()) {
            let entry = body.entry(k).or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(items) = entry {
                if !v.is_empty() {
                    items.push(Value::String(v));
                }
            }
        } else {
            body.insert(k, Value::String(v));
        }
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn form_collects_association_fields() {
        let body = parse_body(
            Some(FORM),
            b"nome=Pizza+Margherita&ingredienti=Pomodoro&ingredienti=Mozzarella",
        )
        .unwrap();
        assert_eq!(body["nome"], json!("Pizza Margherita"));
        assert_eq!(body["ingredienti"], json!(["Pomodoro", "Mozzarella"]));
    }

    #[test]
    fn single_form_association_is_still_a_list() {
        let body = parse_body(Some(FORM), b"nome=Da+Mario&indirizzo=Via+Roma+1&ricette=Pesto").unwrap();
        assert_eq!(body["ricette"], json!(["Pesto"]));
        assert_eq!(body["indirizzo"], json!("Via Roma 1"));
    }

    #[test]
    fn empty_form_association_clears() {
        let body = parse_body(Some(FORM), b"ingredienti=").unwrap();
        assert_eq!(body["ingredienti"], json!([]));
    }

    #[test]
    fn json_must_be_an_object() {
        assert!(matches!(parse_body(Some(JSON), b"[1, 2]"), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_body(Some(JSON), b"{nope"), Err(AppError::BadRequest(_))));
        let body = parse_body(None, br#"{"produttore": "Esselunga"}"#).unwrap();
        assert_eq!(body["produttore"], json!("Esselunga"));
    }

    #[test]
    fn empty_body_is_empty_map() {
        assert!(parse_body(Some(JSON), b"").unwrap().is_empty());
        assert!(parse_body(Some("text/plain"), b"  \n").unwrap().is_empty());
    }

    #[test]
    fn other_media_types_are_rejected() {
        assert!(matches!(
            parse_body(Some("text/plain"), b"nome=x"),
            Err(AppError::BadRequest(_))
        ));
    }
}
