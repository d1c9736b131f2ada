//! HTTP client implementation for the IG dealing API.

use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use url::Url;

use crate::api::{AccountsService, DealingService, GeneralService, MarketsService, WatchlistsService};
use crate::auth::{build_headers, RequestClass, Session};
use crate::models::{AccountId, AccountType, DealOutcome, DealReference};
use crate::table::{FlattenSpec, Table};
use crate::{Error, Result};

use super::config::ClientConfig;
use super::response::{decode, DecodeMode};
use super::retry::Retryer;
use super::transport::{ApiRequest, ApiResponse, HttpTransport, Transport};

/// Session endpoint: login (POST), account switch (PUT), logout (DELETE).
const SESSION_PATH: &str = "/session";

/// The main client for the IG dealing API.
///
/// One client holds one session. All calls block the current thread;
/// login, account switch and logout take `&mut self` since they rewrite
/// the session credentials, everything else borrows the client shared.
///
/// # Example
///
/// ```no_run
/// use ig_dealing_rs::{AccountType, IgClient};
///
/// # fn example() -> ig_dealing_rs::Result<()> {
/// let mut client = IgClient::new("your-api-key", AccountType::Demo)?;
/// client.login("your-identifier", "your-password")?;
///
/// let accounts = client.accounts().list()?;
/// println!("{} account(s)", accounts.len());
///
/// let positions = client.dealing().positions()?;
/// for epic in positions.column("epic").unwrap_or_default() {
///     println!("open on {}", epic);
/// }
///
/// client.logout();
/// # Ok(())
/// # }
/// ```
pub struct IgClient {
    pub(crate) inner: ClientInner,
}

pub(crate) struct ClientInner {
    transport: Box<dyn Transport>,
    retryer: Option<Retryer>,
    session: Session,
    base_url: String,
    config: ClientConfig,
}

impl IgClient {
    /// Create a logged-out client for the given platform.
    pub fn new(api_key: impl Into<String>, account_type: AccountType) -> Result<Self> {
        Self::with_config(api_key, account_type, ClientConfig::default())
    }

    /// Create a logged-out client with custom configuration.
    pub fn with_config(
        api_key: impl Into<String>,
        account_type: AccountType,
        config: ClientConfig,
    ) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| account_type.api_base_url().to_string());
        Self::with_transport(api_key, base_url, transport, config)
    }

    /// Create a logged-out client over a custom transport.
    ///
    /// `config.base_url`, when set, takes precedence over `base_url`.
    pub fn with_transport(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        transport: impl Transport + 'static,
        config: ClientConfig,
    ) -> Result<Self> {
        let base_url = config.base_url.clone().unwrap_or_else(|| base_url.into());
        Url::parse(&base_url)?;

        Ok(Self {
            inner: ClientInner {
                transport: Box::new(transport),
                retryer: config.retry.clone().map(Retryer::new),
                session: Session::new(api_key),
                base_url: base_url.trim_end_matches('/').to_string(),
                config,
            },
        })
    }

    /// Create a client and log in.
    ///
    /// `account_type` is `"live"` or `"demo"` in any case.
    pub fn connect(
        identifier: &str,
        password: &str,
        api_key: impl Into<String>,
        account_type: &str,
    ) -> Result<Self> {
        let mut client = Self::new(api_key, account_type.parse()?)?;
        client.login(identifier, password)?;
        Ok(client)
    }

    /// Open a session.
    ///
    /// Stores the `CST` and `X-SECURITY-TOKEN` response headers and returns
    /// the session body (account id, currency, lightstreamer endpoint, ...)
    /// unchanged. If the configuration names an account other than the
    /// one the broker made current, the client switches into it.
    ///
    /// # Errors
    ///
    /// - [`Error::Protocol`] if the response carries no `CST` header
    /// - [`Error::Broker`] / [`Error::Decode`] for an unusable body
    /// - the switch error if the configured account cannot be made
    ///   current; the new session is closed first, so the client is
    ///   logged out
    pub fn login(&mut self, identifier: &str, password: &str) -> Result<Value> {
        let body = json!({
            "identifier": identifier,
            "password": password,
        });
        let response = self.inner.send(
            Method::POST,
            self.inner.url(SESSION_PATH)?,
            RequestClass::Unauthenticated,
            Some(body),
        )?;
        let info = decode(&response.body, DecodeMode::Strict)?;

        let current = info
            .get("currentAccountId")
            .and_then(Value::as_str)
            .map(AccountId::from);
        self.inner.session.establish(&response.headers, current.clone())?;
        info!(account = ?current, "Session created");

        if let Some(wanted) = self.inner.config.account_id.clone() {
            if current.as_ref() != Some(&wanted) {
                if let Err(err) = self.switch_account(wanted.clone()) {
                    warn!(account = %wanted, error = %err, "Switch to configured account failed; closing session");
                    self.logout();
                    return Err(err);
                }
            }
        }
        Ok(info)
    }

    /// Make another account of the same client the active one.
    ///
    /// The broker issues a fresh security token; the client token is kept.
    pub fn switch_account(&mut self, account_id: impl Into<AccountId>) -> Result<Value> {
        let account_id = account_id.into();
        let body = json!({ "accountId": account_id });
        let response = self.inner.send(
            Method::PUT,
            self.inner.url(SESSION_PATH)?,
            RequestClass::Authenticated,
            Some(body),
        )?;
        let info = decode(&response.body, DecodeMode::Strict)?;

        self.inner.session.switch_to(&response.headers, account_id.clone())?;
        info!(account = %account_id, "Switched account");
        Ok(info)
    }

    /// Close the session.
    ///
    /// Best effort: the local credentials are cleared whatever happens to
    /// the request, and a failed request is only logged.
    pub fn logout(&mut self) {
        let result = self.inner.url(SESSION_PATH).and_then(|url| {
            self.inner.send(
                Method::POST,
                url,
                RequestClass::AuthenticatedDelete,
                Some(json!({})),
            )
        });
        if let Err(err) = result {
            warn!(error = %err, "Logout request failed; clearing session anyway");
        }
        self.inner.session.clear();
        info!("Session closed");
    }

    /// The session credentials.
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// Returns `true` after a successful login and before logout.
    pub fn is_logged_in(&self) -> bool {
        self.inner.session.is_authenticated()
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// GET any endpoint and decode the body with the given mode.
    ///
    /// [`DecodeMode::Lenient`] returns broker error bodies instead of
    /// failing on them.
    pub fn get_json(&self, path: &str, mode: DecodeMode) -> Result<Value> {
        self.inner.get_json(self.inner.url(path)?, mode)
    }

    /// Get the accounts and history service.
    pub fn accounts(&self) -> AccountsService<'_> {
        AccountsService::new(&self.inner)
    }

    /// Get the dealing service (positions, working orders, confirms).
    pub fn dealing(&self) -> DealingService<'_> {
        DealingService::new(&self.inner)
    }

    /// Get the markets service.
    pub fn markets(&self) -> MarketsService<'_> {
        MarketsService::new(&self.inner)
    }

    /// Get the watchlists service.
    pub fn watchlists(&self) -> WatchlistsService<'_> {
        WatchlistsService::new(&self.inner)
    }

    /// Get the client applications service.
    pub fn general(&self) -> GeneralService<'_> {
        GeneralService::new(&self.inner)
    }
}

impl ClientInner {
    /// Build an absolute URL for a fixed API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&format!("{}{}", self.base_url, path))?)
    }

    /// Build an absolute URL for `path` followed by caller-supplied ids.
    ///
    /// Each id becomes exactly one path segment: `/`, `?`, `#` and `%` are
    /// percent-encoded, and ids that would be empty or resolve as `.` or
    /// `..` are refused.
    pub(crate) fn endpoint(&self, path: &str, ids: &[&str]) -> Result<Url> {
        if let Some(id) = ids.iter().find(|id| matches!(**id, "" | "." | "..")) {
            return Err(Error::InvalidInput(format!(
                "'{}' cannot be used as a path segment under {}",
                id, path
            )));
        }

        let mut url = self.url(path)?;
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("Base URL cannot carry a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(ids);
        Ok(url)
    }

    /// Send one request through the retry policy and transport.
    pub(crate) fn send(
        &self,
        method: Method,
        url: Url,
        class: RequestClass,
        body: Option<Value>,
    ) -> Result<ApiResponse> {
        let headers = build_headers(&self.session, class)?;
        let request = ApiRequest {
            method,
            url,
            headers,
            body,
        };
        debug!(method = %request.method, path = request.url.path(), ?class, "Sending request");

        let response = match &self.retryer {
            Some(retryer) => retryer.execute(|| self.transport.send(&request))?,
            None => self.transport.send(&request)?,
        };
        debug!(status = response.status.as_u16(), "Received response");
        Ok(response)
    }

    /// Authenticated GET, decoded with the given mode.
    pub(crate) fn get_json(&self, url: Url, mode: DecodeMode) -> Result<Value> {
        let response = self.send(Method::GET, url, RequestClass::Authenticated, None)?;
        decode(&response.body, mode)
    }

    /// Authenticated GET of the array under `key`, as a table.
    pub(crate) fn get_table(&self, url: Url, key: &str) -> Result<Table> {
        let body = self.get_json(url, DecodeMode::Strict)?;
        Table::from_field(&body, key)
    }

    /// Like [`get_table`](Self::get_table), flattened with `spec`.
    pub(crate) fn get_flat_table(&self, url: Url, key: &str, spec: &FlattenSpec) -> Result<Table> {
        spec.flatten(self.get_table(url, key)?)
    }

    /// Authenticated request with a JSON body, decoded strictly.
    pub(crate) fn send_json<B: Serialize>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> Result<Value> {
        let body = serde_json::to_value(body)?;
        let response = self.send(method, url, RequestClass::Authenticated, Some(body))?;
        decode(&response.body, DecodeMode::Strict)
    }

    /// Send a mutating deal request and exchange its deal reference for
    /// the confirmation.
    ///
    /// Non-200 responses come back as [`DealOutcome::Rejected`] with the
    /// body untouched.
    pub(crate) fn deal<B: Serialize>(
        &self,
        method: Method,
        url: Url,
        class: RequestClass,
        body: &B,
    ) -> Result<DealOutcome> {
        let path = url.path().to_string();
        let body = serde_json::to_value(body)?;
        let response = self.send(method, url, class, Some(body))?;
        if !response.is_ok() {
            return Ok(DealOutcome::Rejected {
                status: response.status,
                body: response.body,
            });
        }

        let acknowledgement = decode(&response.body, DecodeMode::Strict)?;
        let reference = acknowledgement
            .get("dealReference")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::Protocol(format!("No dealReference in response to {}", path))
            })?;
        debug!(deal_reference = reference, "Deal accepted, fetching confirmation");

        self.confirm(&DealReference::new(reference))
            .map(DealOutcome::Confirmed)
    }

    /// `GET /confirms/{dealReference}`.
    pub(crate) fn confirm(&self, reference: &DealReference) -> Result<Value> {
        let url = self.endpoint("/confirms", &[reference.as_str()])?;
        self.get_json(url, DecodeMode::Strict)
    }

    /// Authenticated DELETE-semantics request whose body is returned raw.
    pub(crate) fn delete_raw(&self, url: Url) -> Result<String> {
        let response = self.send(
            Method::POST,
            url,
            RequestClass::AuthenticatedDelete,
            Some(json!({})),
        )?;
        Ok(response.body)
    }
}

impl std::fmt::Debug for IgClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IgClient")
            .field("base_url", &self.inner.base_url)
            .field("session", &self.inner.session)
            .field("config", &self.inner.config)
            .finish()
    }
}
