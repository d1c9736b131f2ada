//! Request bodies for dealing and the outcome of a mutating deal request.

use chrono::NaiveDateTime;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::enums::*;
use super::primitives::{DealId, DealReference, Epic};

/// `goodTillDate` wire format.
const GOOD_TILL_DATE_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

fn serialize_good_till<S: Serializer>(
    date: &Option<NaiveDateTime>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match date {
        Some(d) => serializer.serialize_str(&d.format(GOOD_TILL_DATE_FORMAT).to_string()),
        None => serializer.serialize_none(),
    }
}

/// Result of a create/update/close/delete deal request.
///
/// A mutating request only yields a deal reference; the client always
/// exchanges it for the deal confirmation. When the broker refuses the
/// request at HTTP level, the original body is preserved untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum DealOutcome {
    /// The deal confirmation looked up by the returned deal reference.
    Confirmed(Value),
    /// Non-200 response to the mutating request.
    Rejected {
        /// HTTP status returned by the broker
        status: StatusCode,
        /// Raw response body, unmodified
        body: String,
    },
}

impl DealOutcome {
    /// Returns `true` if a confirmation was obtained.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, DealOutcome::Confirmed(_))
    }

    /// The confirmation, if any.
    pub fn confirmation(&self) -> Option<&Value> {
        match self {
            DealOutcome::Confirmed(value) => Some(value),
            DealOutcome::Rejected { .. } => None,
        }
    }

    /// `dealStatus` of the confirmation (`ACCEPTED` / `REJECTED`).
    ///
    /// Note that a confirmed request can still carry a rejected deal status.
    pub fn deal_status(&self) -> Option<&str> {
        self.confirmation()
            .and_then(|c| c.get("dealStatus"))
            .and_then(Value::as_str)
    }

    /// Deal reference echoed by the confirmation.
    pub fn deal_reference(&self) -> Option<DealReference> {
        self.confirmation()
            .and_then(|c| c.get("dealReference"))
            .and_then(Value::as_str)
            .map(DealReference::from)
    }
}

/// Body of `POST /positions/otc`.
///
/// # Example
///
/// ```
/// use ig_dealing_rs::models::{CreatePositionRequest, Direction};
/// use rust_decimal_macros::dec;
///
/// let request = CreatePositionRequest::market("CS.D.GBPUSD.TODAY.IP", Direction::Buy, dec!(1), "GBP")
///     .with_stop_distance(dec!(20))
///     .with_limit_distance(dec!(40));
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePositionRequest {
    /// Currency of the deal
    pub currency_code: String,
    /// Deal direction
    pub direction: Direction,
    /// Instrument
    pub epic: Epic,
    /// Expiry (`"-"` for rolling markets, `"DFB"` for daily funded bets)
    pub expiry: String,
    /// Open a new position rather than netting against an existing one
    pub force_open: bool,
    /// Attach a guaranteed stop
    pub guaranteed_stop: bool,
    /// Deal level, for LIMIT/QUOTE orders
    #[serde(with = "rust_decimal::serde::float_option")]
    pub level: Option<Decimal>,
    /// Limit distance
    #[serde(with = "rust_decimal::serde::float_option")]
    pub limit_distance: Option<Decimal>,
    /// Limit level
    #[serde(with = "rust_decimal::serde::float_option")]
    pub limit_level: Option<Decimal>,
    /// Execution type
    pub order_type: OrderType,
    /// Quote id, for QUOTE orders
    pub quote_id: Option<String>,
    /// Deal size
    #[serde(with = "rust_decimal::serde::float")]
    pub size: Decimal,
    /// Stop distance
    #[serde(with = "rust_decimal::serde::float_option")]
    pub stop_distance: Option<Decimal>,
    /// Stop level
    #[serde(with = "rust_decimal::serde::float_option")]
    pub stop_level: Option<Decimal>,
}

impl CreatePositionRequest {
    /// A market order on a rolling (`"-"` expiry) instrument.
    pub fn market(
        epic: impl Into<Epic>,
        direction: Direction,
        size: Decimal,
        currency_code: impl Into<String>,
    ) -> Self {
        Self {
            currency_code: currency_code.into(),
            direction,
            epic: epic.into(),
            expiry: "-".to_string(),
            force_open: true,
            guaranteed_stop: false,
            level: None,
            limit_distance: None,
            limit_level: None,
            order_type: OrderType::Market,
            quote_id: None,
            size,
            stop_distance: None,
            stop_level: None,
        }
    }

    /// Set the expiry.
    pub fn with_expiry(mut self, expiry: impl Into<String>) -> Self {
        self.expiry = expiry.into();
        self
    }

    /// Turn this into a LIMIT order at the given level.
    pub fn with_level(mut self, level: Decimal) -> Self {
        self.order_type = OrderType::Limit;
        self.level = Some(level);
        self
    }

    /// Set the stop distance.
    pub fn with_stop_distance(mut self, distance: Decimal) -> Self {
        self.stop_distance = Some(distance);
        self
    }

    /// Set the stop level.
    pub fn with_stop_level(mut self, level: Decimal) -> Self {
        self.stop_level = Some(level);
        self
    }

    /// Set the limit distance.
    pub fn with_limit_distance(mut self, distance: Decimal) -> Self {
        self.limit_distance = Some(distance);
        self
    }

    /// Set the limit level.
    pub fn with_limit_level(mut self, level: Decimal) -> Self {
        self.limit_level = Some(level);
        self
    }

    /// Request a guaranteed stop.
    pub fn with_guaranteed_stop(mut self, guaranteed: bool) -> Self {
        self.guaranteed_stop = guaranteed;
        self
    }

    /// Check field combinations the broker would reject anyway.
    pub fn validate(&self) -> crate::Result<()> {
        if self.size <= Decimal::ZERO {
            return Err(crate::Error::InvalidInput(
                "Deal size must be positive".to_string(),
            ));
        }
        if self.order_type == OrderType::Limit && self.level.is_none() {
            return Err(crate::Error::InvalidInput(
                "LIMIT orders require a level".to_string(),
            ));
        }
        if self.order_type == OrderType::Quote && (self.level.is_none() || self.quote_id.is_none()) {
            return Err(crate::Error::InvalidInput(
                "QUOTE orders require a level and a quote id".to_string(),
            ));
        }
        if self.stop_distance.is_some() && self.stop_level.is_some() {
            return Err(crate::Error::InvalidInput(
                "Set either a stop distance or a stop level, not both".to_string(),
            ));
        }
        if self.limit_distance.is_some() && self.limit_level.is_some() {
            return Err(crate::Error::InvalidInput(
                "Set either a limit distance or a limit level, not both".to_string(),
            ));
        }
        Ok(())
    }
}

/// Body of the DELETE-semantics `POST /positions/otc`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosePositionRequest {
    /// Position to close
    pub deal_id: Option<DealId>,
    /// Closing direction (opposite of the position's)
    pub direction: Direction,
    /// Instrument, when closing by epic instead of deal id
    pub epic: Option<Epic>,
    /// Expiry, when closing by epic
    pub expiry: Option<String>,
    /// Closing level, for LIMIT/QUOTE orders
    #[serde(with = "rust_decimal::serde::float_option")]
    pub level: Option<Decimal>,
    /// Execution type
    pub order_type: OrderType,
    /// Quote id, for QUOTE orders
    pub quote_id: Option<String>,
    /// Size to close
    #[serde(with = "rust_decimal::serde::float")]
    pub size: Decimal,
}

impl ClosePositionRequest {
    /// Close (part of) a position at market.
    pub fn market(deal_id: impl Into<DealId>, direction: Direction, size: Decimal) -> Self {
        Self {
            deal_id: Some(deal_id.into()),
            direction,
            epic: None,
            expiry: None,
            level: None,
            order_type: OrderType::Market,
            quote_id: None,
            size,
        }
    }

    /// Check the request before it is sent.
    pub fn validate(&self) -> crate::Result<()> {
        if self.size <= Decimal::ZERO {
            return Err(crate::Error::InvalidInput(
                "Close size must be positive".to_string(),
            ));
        }
        if self.deal_id.is_none() && self.epic.is_none() {
            return Err(crate::Error::InvalidInput(
                "Name the position by deal id or by epic".to_string(),
            ));
        }
        if self.order_type == OrderType::Limit && self.level.is_none() {
            return Err(crate::Error::InvalidInput(
                "LIMIT closes require a level".to_string(),
            ));
        }
        if self.order_type == OrderType::Quote && (self.level.is_none() || self.quote_id.is_none()) {
            return Err(crate::Error::InvalidInput(
                "QUOTE closes require a level and a quote id".to_string(),
            ));
        }
        Ok(())
    }
}

/// Body of `PUT /positions/otc/{dealId}`. `None` removes the level.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePositionRequest {
    /// New limit level
    #[serde(with = "rust_decimal::serde::float_option")]
    pub limit_level: Option<Decimal>,
    /// New stop level
    #[serde(with = "rust_decimal::serde::float_option")]
    pub stop_level: Option<Decimal>,
}

/// Body of `POST /workingorders/otc`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkingOrderRequest {
    /// Currency of the deal
    pub currency_code: String,
    /// Deal direction
    pub direction: Direction,
    /// Instrument
    pub epic: Epic,
    /// Expiry
    pub expiry: String,
    /// Expiry date, for GOOD_TILL_DATE orders
    #[serde(serialize_with = "serialize_good_till")]
    pub good_till_date: Option<NaiveDateTime>,
    /// Attach a guaranteed stop
    pub guaranteed_stop: bool,
    /// Trigger level
    #[serde(with = "rust_decimal::serde::float")]
    pub level: Decimal,
    /// Limit distance
    #[serde(with = "rust_decimal::serde::float_option")]
    pub limit_distance: Option<Decimal>,
    /// Limit level
    #[serde(with = "rust_decimal::serde::float_option")]
    pub limit_level: Option<Decimal>,
    /// Order size
    #[serde(with = "rust_decimal::serde::float")]
    pub size: Decimal,
    /// Stop distance
    #[serde(with = "rust_decimal::serde::float_option")]
    pub stop_distance: Option<Decimal>,
    /// Stop level
    #[serde(with = "rust_decimal::serde::float_option")]
    pub stop_level: Option<Decimal>,
    /// Lifetime
    pub time_in_force: TimeInForce,
    /// LIMIT or STOP
    #[serde(rename = "type")]
    pub order_type: WorkingOrderType,
}

impl CreateWorkingOrderRequest {
    /// A good-till-cancelled order on a rolling instrument.
    pub fn new(
        epic: impl Into<Epic>,
        direction: Direction,
        order_type: WorkingOrderType,
        size: Decimal,
        level: Decimal,
        currency_code: impl Into<String>,
    ) -> Self {
        Self {
            currency_code: currency_code.into(),
            direction,
            epic: epic.into(),
            expiry: "-".to_string(),
            good_till_date: None,
            guaranteed_stop: false,
            level,
            limit_distance: None,
            limit_level: None,
            size,
            stop_distance: None,
            stop_level: None,
            time_in_force: TimeInForce::GoodTillCancelled,
            order_type,
        }
    }

    /// Expire the order at the given time.
    pub fn good_till(mut self, date: NaiveDateTime) -> Self {
        self.time_in_force = TimeInForce::GoodTillDate;
        self.good_till_date = Some(date);
        self
    }

    /// Set the stop distance.
    pub fn with_stop_distance(mut self, distance: Decimal) -> Self {
        self.stop_distance = Some(distance);
        self
    }

    /// Set the limit distance.
    pub fn with_limit_distance(mut self, distance: Decimal) -> Self {
        self.limit_distance = Some(distance);
        self
    }

    /// Check the request before it is sent.
    pub fn validate(&self) -> crate::Result<()> {
        if self.size <= Decimal::ZERO {
            return Err(crate::Error::InvalidInput(
                "Order size must be positive".to_string(),
            ));
        }
        if self.time_in_force == TimeInForce::GoodTillDate && self.good_till_date.is_none() {
            return Err(crate::Error::InvalidInput(
                "GOOD_TILL_DATE orders require a date".to_string(),
            ));
        }
        if self.stop_distance.is_some() && self.stop_level.is_some() {
            return Err(crate::Error::InvalidInput(
                "Set either a stop distance or a stop level, not both".to_string(),
            ));
        }
        if self.limit_distance.is_some() && self.limit_level.is_some() {
            return Err(crate::Error::InvalidInput(
                "Set either a limit distance or a limit level, not both".to_string(),
            ));
        }
        Ok(())
    }
}

/// Body of `PUT /workingorders/otc/{dealId}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkingOrderRequest {
    /// Expiry date, for GOOD_TILL_DATE orders
    #[serde(serialize_with = "serialize_good_till")]
    pub good_till_date: Option<NaiveDateTime>,
    /// Trigger level
    #[serde(with = "rust_decimal::serde::float")]
    pub level: Decimal,
    /// Limit distance
    #[serde(with = "rust_decimal::serde::float_option")]
    pub limit_distance: Option<Decimal>,
    /// Limit level
    #[serde(with = "rust_decimal::serde::float_option")]
    pub limit_level: Option<Decimal>,
    /// Stop distance
    #[serde(with = "rust_decimal::serde::float_option")]
    pub stop_distance: Option<Decimal>,
    /// Stop level
    #[serde(with = "rust_decimal::serde::float_option")]
    pub stop_level: Option<Decimal>,
    /// Lifetime
    pub time_in_force: TimeInForce,
    /// LIMIT or STOP
    #[serde(rename = "type")]
    pub order_type: WorkingOrderType,
}

/// Body of `PUT /operations/application`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateApplicationRequest {
    /// Overall requests per minute for the account
    pub allowance_account_overall: u32,
    /// Trading requests per minute for the account
    pub allowance_account_trading: u32,
    /// Application key to update
    pub api_key: String,
    /// New status
    pub status: ApplicationStatus,
}
