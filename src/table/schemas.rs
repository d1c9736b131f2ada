//! Flatten specs for the endpoints whose rows carry nested records.

use super::flatten::FlattenSpec;

/// `GET /positions` (v1): one `position` and one `market` record per row.
pub fn open_positions() -> FlattenSpec {
    FlattenSpec::new()
        .nest(
            "position",
            [
                "contractSize",
                "createdDate",
                "dealId",
                "dealSize",
                "direction",
                "limitLevel",
                "openLevel",
                "currency",
                "controlledRisk",
                "stopLevel",
                "trailingStep",
                "trailingStopDistance",
                "limitedRiskPremium",
            ],
        )
        .nest(
            "market",
            [
                "instrumentName",
                "expiry",
                "epic",
                "instrumentType",
                "lotSize",
                "high",
                "low",
                "percentageChange",
                "netChange",
                "bid",
                "offer",
                "updateTime",
                "delayTime",
                "streamingPricesAvailable",
                "marketStatus",
                "scalingFactor",
            ],
        )
        .with_schema_version("positions/v1")
}

/// `GET /workingorders` (v1): `workingOrderData` and `marketData` per row.
///
/// Both records carry the epic; the market's copy is kept.
pub fn working_orders() -> FlattenSpec {
    FlattenSpec::new()
        .nest(
            "workingOrderData",
            [
                "dealId",
                "direction",
                "epic",
                "orderSize",
                "orderLevel",
                "timeInForce",
                "goodTill",
                "createdDate",
                "guaranteedStop",
                "orderType",
                "stopDistance",
                "limitDistance",
                "currencyCode",
                "dma",
            ],
        )
        .nest(
            "marketData",
            [
                "instrumentName",
                "exchangeId",
                "expiry",
                "marketStatus",
                "epic",
                "instrumentType",
                "lotSize",
                "high",
                "low",
                "percentageChange",
                "netChange",
                "bid",
                "offer",
                "updateTime",
                "delayTime",
                "streamingPricesAvailable",
            ],
        )
        .allow_overlap("epic")
        .with_schema_version("workingorders/v1")
}

/// `GET /accounts`: the `balance` record of each account.
pub fn accounts() -> FlattenSpec {
    FlattenSpec::new()
        .nest("balance", ["balance", "deposit", "profitLoss", "available"])
        .with_schema_version("accounts/v1")
}

/// `GET /prices/...`: bid/ask/last-traded triples, prefixed by price kind
/// (`openPrice_bid`, `closePrice_ask`, ...).
pub fn prices() -> FlattenSpec {
    const SIDES: [&str; 3] = ["bid", "ask", "lastTraded"];
    FlattenSpec::new()
        .nest("openPrice", SIDES)
        .nest("closePrice", SIDES)
        .nest("highPrice", SIDES)
        .nest("lowPrice", SIDES)
        .with_prefix(true)
        .with_schema_version("prices/v1")
}
