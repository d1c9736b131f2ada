//! Dealing service: positions, working orders and deal confirmations.

use reqwest::Method;
use serde_json::{json, Value};

use crate::auth::RequestClass;
use crate::client::ClientInner;
use crate::models::{
    ClosePositionRequest, CreatePositionRequest, CreateWorkingOrderRequest, DealId, DealOutcome,
    DealReference, UpdatePositionRequest, UpdateWorkingOrderRequest,
};
use crate::table::{schemas, Table};
use crate::Result;

/// Service for dealing operations.
///
/// Every mutating call sends the request, takes the deal reference from
/// the acknowledgement and returns the confirmation looked up by that
/// reference. A request refused at HTTP level is returned as
/// [`DealOutcome::Rejected`] with the broker's body untouched.
///
/// # Example
///
/// ```no_run
/// use ig_dealing_rs::models::{CreatePositionRequest, DealOutcome, Direction};
/// use rust_decimal::Decimal;
///
/// # fn example(client: ig_dealing_rs::IgClient) -> ig_dealing_rs::Result<()> {
/// let request = CreatePositionRequest::market(
///     "CS.D.GBPUSD.TODAY.IP",
///     Direction::Buy,
///     Decimal::ONE,
///     "GBP",
/// );
///
/// match client.dealing().create_position(&request)? {
///     DealOutcome::Confirmed(confirm) => println!("{}", confirm["dealStatus"]),
///     DealOutcome::Rejected { status, body } => println!("{}: {}", status, body),
/// }
/// # Ok(())
/// # }
/// ```
pub struct DealingService<'a> {
    inner: &'a ClientInner,
}

impl<'a> DealingService<'a> {
    pub(crate) fn new(inner: &'a ClientInner) -> Self {
        Self { inner }
    }

    /// Look up the confirmation of a deal.
    pub fn confirm(&self, reference: &DealReference) -> Result<Value> {
        self.inner.confirm(reference)
    }

    /// Open positions, one row each, position and market fields promoted.
    ///
    /// With no open positions the table is empty but still carries the
    /// full column set.
    pub fn positions(&self) -> Result<Table> {
        let url = self.inner.url("/positions")?;
        self.inner
            .get_flat_table(url, "positions", &schemas::open_positions())
    }

    /// Open a position.
    pub fn create_position(&self, request: &CreatePositionRequest) -> Result<DealOutcome> {
        request.validate()?;
        self.inner.deal(
            Method::POST,
            self.inner.url("/positions/otc")?,
            RequestClass::Authenticated,
            request,
        )
    }

    /// Close (part of) a position.
    pub fn close_position(&self, request: &ClosePositionRequest) -> Result<DealOutcome> {
        request.validate()?;
        self.inner.deal(
            Method::POST,
            self.inner.url("/positions/otc")?,
            RequestClass::AuthenticatedDelete,
            request,
        )
    }

    /// Move the stop and limit levels of a position.
    pub fn update_position(
        &self,
        deal_id: &DealId,
        request: &UpdatePositionRequest,
    ) -> Result<DealOutcome> {
        self.inner.deal(
            Method::PUT,
            self.inner.endpoint("/positions/otc", &[deal_id.as_str()])?,
            RequestClass::Authenticated,
            request,
        )
    }

    /// Working orders, one row each, order and market fields promoted.
    pub fn working_orders(&self) -> Result<Table> {
        let url = self.inner.url("/workingorders")?;
        self.inner
            .get_flat_table(url, "workingOrders", &schemas::working_orders())
    }

    /// Place a working order.
    pub fn create_working_order(&self, request: &CreateWorkingOrderRequest) -> Result<DealOutcome> {
        request.validate()?;
        self.inner.deal(
            Method::POST,
            self.inner.url("/workingorders/otc")?,
            RequestClass::Authenticated,
            request,
        )
    }

    /// Amend a working order.
    pub fn update_working_order(
        &self,
        deal_id: &DealId,
        request: &UpdateWorkingOrderRequest,
    ) -> Result<DealOutcome> {
        self.inner.deal(
            Method::PUT,
            self.inner.endpoint("/workingorders/otc", &[deal_id.as_str()])?,
            RequestClass::Authenticated,
            request,
        )
    }

    /// Cancel a working order.
    pub fn delete_working_order(&self, deal_id: &DealId) -> Result<DealOutcome> {
        self.inner.deal(
            Method::POST,
            self.inner.endpoint("/workingorders/otc", &[deal_id.as_str()])?,
            RequestClass::AuthenticatedDelete,
            &json!({}),
        )
    }
}
