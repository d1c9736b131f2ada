//! Request headers for each class of API call.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};

use super::session::Session;
use crate::{Error, Result};

/// Application key header.
pub const API_KEY_HEADER: &str = "X-IG-API-KEY";
/// Client (session-lifetime) token header.
pub const CLIENT_TOKEN_HEADER: &str = "CST";
/// Account security token header.
pub const SECURITY_TOKEN_HEADER: &str = "X-SECURITY-TOKEN";
/// Verb override header; the broker treats a POST carrying it as a DELETE.
pub const METHOD_OVERRIDE_HEADER: &str = "_method";

const JSON_ACCEPT: &str = "application/json; charset=UTF-8";

/// Which headers a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestClass {
    /// API key only; used to log in.
    Unauthenticated,
    /// API key plus session tokens.
    Authenticated,
    /// Authenticated, sent as POST with DELETE semantics.
    AuthenticatedDelete,
}

impl RequestClass {
    /// Returns `true` if the class needs a logged-in session.
    pub fn requires_session(&self) -> bool {
        !matches!(self, RequestClass::Unauthenticated)
    }
}

/// Build the headers for a request of the given class.
///
/// This is a local check: authenticated classes fail with
/// [`Error::Config`] when the session holds no client token, without
/// touching the network.
///
/// # Example
///
/// ```
/// use ig_dealing_rs::auth::{build_headers, RequestClass, Session};
///
/// let session = Session::new("my-api-key");
/// let headers = build_headers(&session, RequestClass::Unauthenticated).unwrap();
/// assert_eq!(headers["X-IG-API-KEY"], "my-api-key");
///
/// assert!(build_headers(&session, RequestClass::Authenticated).is_err());
/// ```
pub fn build_headers(session: &Session, class: RequestClass) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("x-ig-api-key"),
        secret_value(session.api_key(), API_KEY_HEADER)?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static(JSON_ACCEPT));

    if !class.requires_session() {
        return Ok(headers);
    }

    let client_token = session.client_token().ok_or_else(|| {
        Error::Config("Authenticated request attempted before login".to_string())
    })?;
    headers.insert(
        HeaderName::from_static("cst"),
        secret_value(client_token, CLIENT_TOKEN_HEADER)?,
    );
    if let Some(security_token) = session.security_token() {
        headers.insert(
            HeaderName::from_static("x-security-token"),
            secret_value(security_token, SECURITY_TOKEN_HEADER)?,
        );
    }

    if class == RequestClass::AuthenticatedDelete {
        headers.insert(
            HeaderName::from_static(METHOD_OVERRIDE_HEADER),
            HeaderValue::from_static("DELETE"),
        );
    }

    Ok(headers)
}

fn secret_value(secret: &SecretString, name: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(secret.expose_secret())
        .map_err(|_| Error::InvalidInput(format!("Invalid {} header value", name)))?;
    value.set_sensitive(true);
    Ok(value)
}
