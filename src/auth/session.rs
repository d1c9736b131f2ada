//! Session credentials and their transitions.

use reqwest::header::HeaderMap;
use secrecy::SecretString;

use super::headers::{CLIENT_TOKEN_HEADER, SECURITY_TOKEN_HEADER};
use crate::models::AccountId;
use crate::{Error, Result};

/// The credential set of one dealing session.
///
/// The API key is fixed at construction. The client token and security
/// token are absent until a successful login; switching accounts refreshes
/// only the security token; logout clears both.
///
/// Tokens are only ever written by [`IgClient`](crate::IgClient) login and
/// account switch:
///
/// ```compile_fail
/// use ig_dealing_rs::auth::Session;
/// use reqwest::header::HeaderMap;
///
/// let mut session = Session::new("key");
/// session.establish(&HeaderMap::new(), None).unwrap();
/// ```
///
/// # Thread Safety
///
/// `Session` has no internal locking. Use one client (and so one session)
/// per logical session, or serialize access externally.
pub struct Session {
    api_key: SecretString,
    client_token: Option<SecretString>,
    security_token: Option<SecretString>,
    active_account: Option<AccountId>,
}

impl Session {
    /// A logged-out session for the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            client_token: None,
            security_token: None,
            active_account: None,
        }
    }

    /// Returns `true` once a login has stored a client token.
    pub fn is_authenticated(&self) -> bool {
        self.client_token.is_some()
    }

    pub(crate) fn api_key(&self) -> &SecretString {
        &self.api_key
    }

    pub(crate) fn client_token(&self) -> Option<&SecretString> {
        self.client_token.as_ref()
    }

    pub(crate) fn security_token(&self) -> Option<&SecretString> {
        self.security_token.as_ref()
    }

    /// The account the session currently deals on, if known.
    pub fn active_account(&self) -> Option<&AccountId> {
        self.active_account.as_ref()
    }

    /// Store the tokens issued by a successful login.
    ///
    /// Re-authenticating overwrites whatever the session held.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the response carries no `CST` header;
    /// the session is left untouched in that case.
    pub(crate) fn establish(&mut self, headers: &HeaderMap, account: Option<AccountId>) -> Result<()> {
        let client_token = header_secret(headers, CLIENT_TOKEN_HEADER)?.ok_or_else(|| {
            Error::Protocol(format!("Login response is missing the {} header", CLIENT_TOKEN_HEADER))
        })?;
        let security_token = header_secret(headers, SECURITY_TOKEN_HEADER)?;

        self.client_token = Some(client_token);
        self.security_token = security_token;
        self.active_account = account;
        Ok(())
    }

    /// Apply an account switch: a new security token, same client token.
    ///
    /// If the broker sends no new security token the previous one is kept.
    pub(crate) fn switch_to(&mut self, headers: &HeaderMap, account: AccountId) -> Result<()> {
        if let Some(token) = header_secret(headers, SECURITY_TOKEN_HEADER)? {
            self.security_token = Some(token);
        } else {
            tracing::warn!("Account switch response carried no {} header", SECURITY_TOKEN_HEADER);
        }
        self.active_account = Some(account);
        Ok(())
    }

    /// Forget the session tokens. The API key is kept.
    pub fn clear(&mut self) {
        self.client_token = None;
        self.security_token = None;
        self.active_account = None;
    }
}

fn header_secret(headers: &HeaderMap, name: &str) -> Result<Option<SecretString>> {
    headers
        .get(name)
        .map(|value| {
            value
                .to_str()
                .map(|s| SecretString::from(s.to_string()))
                .map_err(|_| Error::Protocol(format!("Non-ASCII {} header", name)))
        })
        .transpose()
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("api_key", &"[REDACTED]")
            .field("client_token", &self.client_token.as_ref().map(|_| "[REDACTED]"))
            .field("security_token", &self.security_token.as_ref().map(|_| "[REDACTED]"))
            .field("active_account", &self.active_account)
            .finish()
    }
}
