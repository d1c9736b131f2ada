//! Client applications (API keys) service.

use reqwest::Method;
use serde_json::{json, Value};

use crate::client::{ClientInner, DecodeMode};
use crate::models::UpdateApplicationRequest;
use crate::Result;

/// Service for the applications registered to the client.
pub struct GeneralService<'a> {
    inner: &'a ClientInner,
}

impl<'a> GeneralService<'a> {
    pub(crate) fn new(inner: &'a ClientInner) -> Self {
        Self { inner }
    }

    /// Applications (API keys) of the client and their allowances.
    pub fn applications(&self) -> Result<Value> {
        let url = self.inner.url("/operations/application")?;
        self.inner.get_json(url, DecodeMode::Strict)
    }

    /// Change an application's allowances or status.
    pub fn update_application(&self, request: &UpdateApplicationRequest) -> Result<Value> {
        let url = self.inner.url("/operations/application")?;
        self.inner.send_json(Method::PUT, url, request)
    }

    /// Disable the API key the client is using.
    ///
    /// Further requests with this key fail until it is re-enabled.
    pub fn disable_api_key(&self) -> Result<Value> {
        let url = self.inner.url("/operations/application/disable")?;
        self.inner.send_json(Method::PUT, url, &json!({}))
    }
}
