//! Tushare response envelope validation.
//!
//! Every Tushare response carries `{code, msg, data: {items}}`. The envelope
//! is checked exactly once here; callers only see a [`Payload`] or an error.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, Result};

/// One raw tabular row: position-significant, untyped cells.
pub type RawRow = Vec<Value>;

/// Decoded payload of a successful call.
#[derive(Debug, PartialEq)]
pub enum Payload {
    /// `data` absent or null, or `items` null or empty. A normal "nothing to
    /// sync" outcome, not an error.
    Empty,
    /// Ordered rows, exactly as the API returned them.
    Rows(Vec<RawRow>),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    code: Option<i64>,
    msg: Option<String>,
    data: Option<Data>,
}

#[derive(Debug, Deserialize)]
struct Data {
    items: Option<Vec<RawRow>>,
}

/// Parse and validate a raw response body.
///
/// A present non-zero `code` is a remote rejection and carries the response's
/// `msg`; an absent `code` counts as success.
pub fn decode(raw: &[u8]) -> Result<Payload> {
    let envelope: Envelope =
        serde_json::from_slice(raw).map_err(|e| AppError::MalformedResponse(e.to_string()))?;

    if let Some(code) = envelope.code {
        if code != 0 {
            return Err(AppError::Api {
                code,
                message: envelope.msg.unwrap_or_default(),
            });
        }
    }

    match envelope.data.and_then(|data| data.items) {
        Some(rows) if !rows.is_empty() => Ok(Payload::Rows(rows)),
        _ => Ok(Payload::Empty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_body() {
        let err = decode(b"<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
    }

    #[test]
    fn test_empty_body_is_malformed() {
        // Transport failures are surfaced by the client, so empty bytes can
        // only mean a served-but-empty body.
        let err = decode(b"").unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
    }

    #[test]
    fn test_api_error_carries_code_and_message() {
        let raw = br#"{"code": 30001, "msg": "token invalid"}"#;
        match decode(raw).unwrap_err() {
            AppError::Api { code, message } => {
                assert_eq!(code, 30001);
                assert_eq!(message, "token invalid");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_data_is_empty() {
        assert_eq!(decode(br#"{"code": 0, "msg": ""}"#).unwrap(), Payload::Empty);
    }

    #[test]
    fn test_null_data_is_empty() {
        assert_eq!(
            decode(br#"{"code": 0, "msg": "", "data": null}"#).unwrap(),
            Payload::Empty
        );
    }

    #[test]
    fn test_null_items_is_empty() {
        assert_eq!(
            decode(br#"{"code": 0, "data": {"items": null}}"#).unwrap(),
            Payload::Empty
        );
    }

    #[test]
    fn test_empty_items_is_empty() {
        assert_eq!(
            decode(br#"{"code": 0, "data": {"items": []}}"#).unwrap(),
            Payload::Empty
        );
    }

    #[test]
    fn test_rows_preserve_order() {
        let raw = br#"{"code": 0, "data": {"items": [["a", 1], ["b", 2], ["c", 3]]}}"#;
        match decode(raw).unwrap() {
            Payload::Rows(rows) => {
                assert_eq!(rows.len(), 3);
                assert_eq!(rows[0][0], "a");
                assert_eq!(rows[1][0], "b");
                assert_eq!(rows[2][0], "c");
            }
            Payload::Empty => panic!("expected rows"),
        }
    }

    #[test]
    fn test_absent_code_is_implicit_success() {
        let raw = br#"{"data": {"items": [["000001.SZ", "20240102"]]}}"#;
        assert!(matches!(decode(raw).unwrap(), Payload::Rows(_)));
    }
}
