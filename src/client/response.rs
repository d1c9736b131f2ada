//! Decoding of response bodies.
//!
//! The broker reports business errors inside otherwise successful bodies,
//! as `{"errorCode": "..."}`. [`decode`] in [`DecodeMode::Strict`] turns
//! those into [`Error::Broker`]; [`DecodeMode::Lenient`] hands the parsed
//! body back untouched.

use serde_json::Value;

use crate::{Error, Result};

/// Field carrying a broker error code.
pub const ERROR_CODE_FIELD: &str = "errorCode";

/// How to treat an `errorCode` in a parsed body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    /// Fail with [`Error::Broker`] when the body carries an error code.
    #[default]
    Strict,
    /// Return the parsed body as-is.
    Lenient,
}

/// Parse a response body.
///
/// # Errors
///
/// - [`Error::Decode`] if the body is not JSON
/// - [`Error::Broker`] in strict mode if the body has an `errorCode`
///
/// # Example
///
/// ```
/// use ig_dealing_rs::client::{decode, DecodeMode};
///
/// let body = r#"{"errorCode":"error.security.invalid-client-token"}"#;
///
/// let err = decode(body, DecodeMode::Strict).unwrap_err();
/// assert_eq!(err.broker_code(), Some("error.security.invalid-client-token"));
///
/// let value = decode(body, DecodeMode::Lenient).unwrap();
/// assert_eq!(value["errorCode"], "error.security.invalid-client-token");
/// ```
pub fn decode(body: &str, mode: DecodeMode) -> Result<Value> {
    let value: Value = serde_json::from_str(body)?;
    if mode == DecodeMode::Strict {
        if let Some(code) = error_code(&value) {
            return Err(Error::Broker { code });
        }
    }
    Ok(value)
}

/// The `errorCode` of a parsed body, if the key is present.
///
/// A non-string code (`null`, a number, an object) is returned as its JSON
/// text.
pub fn error_code(value: &Value) -> Option<String> {
    value.get(ERROR_CODE_FIELD).map(|code| match code {
        Value::String(code) => code.clone(),
        other => other.to_string(),
    })
}
