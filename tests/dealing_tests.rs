//! Dealing tests: positions, working orders and the confirmation protocol.
//!
//! Run with: cargo test --test dealing_tests

mod common;

use chrono::NaiveDate;
use reqwest::{Method, StatusCode};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use common::*;
use ig_dealing_rs::client::ApiResponse;
use ig_dealing_rs::prelude::*;

fn accepted(reference: &str) -> Value {
    json!({"dealReference": reference})
}

fn confirmation(reference: &str, deal_id: &str) -> Value {
    json!({
        "date": "2026-10-19T09:14:03.442",
        "dealId": deal_id,
        "dealReference": reference,
        "dealStatus": "ACCEPTED",
        "direction": "BUY",
        "epic": "CS.D.GBPUSD.TODAY.IP",
        "level": 12712.4,
        "reason": "SUCCESS",
        "size": 2.5,
        "status": "OPEN"
    })
}

// =============================================================================
// Confirmation protocol
// =============================================================================

mod confirmation_tests {
    use super::*;

    #[test]
    fn test_create_position_returns_confirmation() {
        let transport = ScriptedTransport::new();
        let client = logged_in_client(&transport);

        transport
            .push_json(accepted("REF-1"))
            .push_json(confirmation("REF-1", "DIAAAA1"));

        let request =
            CreatePositionRequest::market("CS.D.GBPUSD.TODAY.IP", Direction::Buy, dec!(2.5), "GBP");
        let outcome = client.dealing().create_position(&request).unwrap();

        assert!(outcome.is_confirmed());
        assert_eq!(outcome.deal_status(), Some("ACCEPTED"));
        assert_eq!(outcome.deal_reference(), Some(DealReference::new("REF-1")));
        assert_eq!(outcome.confirmation(), Some(&confirmation("REF-1", "DIAAAA1")));

        let requests = transport.requests();
        assert_eq!(requests.len(), 3);

        let create = &requests[1];
        assert_eq!(create.method, Method::POST);
        assert_eq!(create.url.path(), "/gateway/deal/positions/otc");
        let body = create.body.as_ref().unwrap();
        assert_eq!(body["epic"], "CS.D.GBPUSD.TODAY.IP");
        assert_eq!(body["direction"], "BUY");
        assert_eq!(body["orderType"], "MARKET");
        assert_eq!(body["size"], 2.5);

        let confirm = &requests[2];
        assert_eq!(confirm.method, Method::GET);
        assert_eq!(confirm.url.path(), "/gateway/deal/confirms/REF-1");
        assert!(confirm.body.is_none());
    }

    #[test]
    fn test_rejected_deal_returns_raw_body() {
        let transport = ScriptedTransport::new();
        let client = logged_in_client(&transport);

        let raw = r#"{"errorCode":"error.security.client-token-invalid"}"#;
        transport.push(ApiResponse::new(StatusCode::FORBIDDEN, raw));

        let request =
            CreatePositionRequest::market("CS.D.GBPUSD.TODAY.IP", Direction::Sell, dec!(1), "GBP");
        let outcome = client.dealing().create_position(&request).unwrap();

        assert_eq!(
            outcome,
            DealOutcome::Rejected {
                status: StatusCode::FORBIDDEN,
                body: raw.to_string(),
            }
        );
        assert!(outcome.confirmation().is_none());
        // No confirmation lookup after a rejection
        assert_eq!(transport.request_count(), 2);
    }

    #[test]
    fn test_rejected_deal_keeps_non_json_body() {
        let transport = ScriptedTransport::new();
        let client = logged_in_client(&transport);

        transport.push(ApiResponse::new(StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>"));

        let outcome = client
            .dealing()
            .delete_working_order(&DealId::new("DIAAAA2"))
            .unwrap();

        match outcome {
            DealOutcome::Rejected { status, body } => {
                assert_eq!(status, StatusCode::BAD_GATEWAY);
                assert_eq!(body, "<html>Bad Gateway</html>");
            }
            other => panic!("Expected Rejected, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_deal_reference_is_protocol_error() {
        let transport = ScriptedTransport::new();
        let client = logged_in_client(&transport);

        transport.push_json(json!({"status": "ok"}));

        let request = UpdatePositionRequest {
            limit_level: Some(dec!(1.3)),
            stop_level: None,
        };
        let err = client
            .dealing()
            .update_position(&DealId::new("DIAAAA1"), &request)
            .unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn test_confirmation_broker_error() {
        let transport = ScriptedTransport::new();
        let client = logged_in_client(&transport);

        transport
            .push_json(accepted("REF-9"))
            .push_json(json!({"errorCode": "error.confirms.deal-not-found"}));

        let request = ClosePositionRequest::market("DIAAAA1", Direction::Sell, dec!(1));
        let err = client.dealing().close_position(&request).unwrap_err();
        assert_eq!(err.broker_code(), Some("error.confirms.deal-not-found"));
    }

    #[test]
    fn test_invalid_request_is_not_sent() {
        let transport = ScriptedTransport::new();
        let client = logged_in_client(&transport);

        let request =
            CreatePositionRequest::market("CS.D.GBPUSD.TODAY.IP", Direction::Buy, dec!(0), "GBP");
        let err = client.dealing().create_position(&request).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let close = ClosePositionRequest::market("DIAAAA1", Direction::Sell, dec!(-1));
        let err = client.dealing().close_position(&close).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let order = CreateWorkingOrderRequest::new(
            "CS.D.GBPUSD.TODAY.IP",
            Direction::Buy,
            WorkingOrderType::Stop,
            dec!(0),
            dec!(12500),
            "GBP",
        );
        let err = client.dealing().create_working_order(&order).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        assert_eq!(transport.request_count(), 1);
    }

    #[test]
    fn test_confirm_by_reference() {
        let transport = ScriptedTransport::new();
        let client = logged_in_client(&transport);

        transport.push_json(confirmation("REF-2", "DIAAAA3"));
        let confirm = client.dealing().confirm(&DealReference::new("REF-2")).unwrap();

        assert_eq!(confirm["dealId"], "DIAAAA3");
        assert_eq!(transport.last_request().url.path(), "/gateway/deal/confirms/REF-2");
    }
}

// =============================================================================
// Positions
// =============================================================================

mod position_tests {
    use super::*;

    fn position_row(deal_id: &str, size: f64, epic: &str) -> Value {
        json!({
            "position": {
                "contractSize": 1.0,
                "createdDate": "2026/10/19 09:14:03:000",
                "dealId": deal_id,
                "dealSize": size,
                "direction": "BUY",
                "limitLevel": null,
                "openLevel": 12712.4,
                "currency": "GBP",
                "controlledRisk": false,
                "stopLevel": null,
                "trailingStep": null,
                "trailingStopDistance": null,
                "limitedRiskPremium": null
            },
            "market": {
                "instrumentName": "GBP/USD",
                "expiry": "DFB",
                "epic": epic,
                "instrumentType": "CURRENCIES",
                "lotSize": 1.0,
                "high": 12750.1,
                "low": 12680.3,
                "percentageChange": 0.12,
                "netChange": 15.2,
                "bid": 12715.0,
                "offer": 12715.9,
                "updateTime": "09:30:00",
                "delayTime": 0,
                "streamingPricesAvailable": true,
                "marketStatus": "TRADEABLE",
                "scalingFactor": 1
            }
        })
    }

    #[test]
    fn test_positions_are_flattened() {
        let transport = ScriptedTransport::new();
        let client = logged_in_client(&transport);

        transport.push_json(json!({
            "positions": [
                position_row("DIAAAA1", 2.5, "CS.D.GBPUSD.TODAY.IP"),
                position_row("DIAAAA2", 1.0, "IX.D.FTSE.DAILY.IP")
            ]
        }));

        let positions = client.dealing().positions().unwrap();

        assert_eq!(positions.len(), 2);
        assert_eq!(positions.columns().len(), 13 + 16);
        assert!(!positions.has_column("position"));
        assert!(!positions.has_column("market"));
        assert_eq!(positions.get(0, "dealId"), Some(&json!("DIAAAA1")));
        assert_eq!(positions.get(0, "dealSize"), Some(&json!(2.5)));
        assert_eq!(positions.get(1, "epic"), Some(&json!("IX.D.FTSE.DAILY.IP")));
        assert_eq!(positions.get(1, "marketStatus"), Some(&json!("TRADEABLE")));
        assert_eq!(transport.last_request().url.path(), "/gateway/deal/positions");
    }

    #[test]
    fn test_no_positions_keeps_schema() {
        let transport = ScriptedTransport::new();
        let client = logged_in_client(&transport);

        transport.push_json(json!({"positions": []}));
        let positions = client.dealing().positions().unwrap();

        assert!(positions.is_empty());
        let expected = ig_dealing_rs::table::schemas::open_positions()
            .final_columns(&["position", "market"])
            .unwrap();
        assert_eq!(positions.columns(), expected.as_slice());
    }

    #[test]
    fn test_positions_schema_drift_is_collision() {
        let transport = ScriptedTransport::new();
        let client = logged_in_client(&transport);

        let mut row = position_row("DIAAAA1", 2.5, "CS.D.GBPUSD.TODAY.IP");
        row["dealId"] = json!("top-level-copy");
        transport.push_json(json!({"positions": [row]}));

        match client.dealing().positions().unwrap_err() {
            Error::SchemaCollision {
                field,
                parent,
                schema_version,
            } => {
                assert_eq!(field, "dealId");
                assert_eq!(parent, "position");
                assert_eq!(schema_version.as_deref(), Some("positions/v1"));
            }
            other => panic!("Expected SchemaCollision, got {:?}", other),
        }
    }

    #[test]
    fn test_close_position_uses_delete_override() {
        let transport = ScriptedTransport::new();
        let client = logged_in_client(&transport);

        transport
            .push_json(accepted("REF-3"))
            .push_json(confirmation("REF-3", "DIAAAA1"));

        let request = ClosePositionRequest::market("DIAAAA1", Direction::Sell, dec!(2.5));
        client.dealing().close_position(&request).unwrap();

        let close = &transport.requests()[1];
        assert_eq!(close.method, Method::POST);
        assert_eq!(close.url.path(), "/gateway/deal/positions/otc");
        assert_eq!(header(close, "_method"), Some("DELETE"));
        assert_eq!(close.body.as_ref().unwrap()["dealId"], "DIAAAA1");
    }

    #[test]
    fn test_update_position() {
        let transport = ScriptedTransport::new();
        let client = logged_in_client(&transport);

        transport
            .push_json(accepted("REF-4"))
            .push_json(confirmation("REF-4", "DIAAAA1"));

        let request = UpdatePositionRequest {
            limit_level: Some(dec!(12800)),
            stop_level: None,
        };
        client
            .dealing()
            .update_position(&DealId::new("DIAAAA1"), &request)
            .unwrap();

        let update = &transport.requests()[1];
        assert_eq!(update.method, Method::PUT);
        assert_eq!(update.url.path(), "/gateway/deal/positions/otc/DIAAAA1");
        assert_eq!(
            update.body,
            Some(json!({"limitLevel": 12800.0, "stopLevel": null}))
        );
        assert!(update.headers.get("_method").is_none());
    }
}

// =============================================================================
// Working orders
// =============================================================================

mod working_order_tests {
    use super::*;

    #[test]
    fn test_working_orders_keep_market_epic() {
        let transport = ScriptedTransport::new();
        let client = logged_in_client(&transport);

        transport.push_json(json!({
            "workingOrders": [{
                "workingOrderData": {
                    "dealId": "DIAAAA5",
                    "direction": "BUY",
                    "epic": "CS.D.GBPUSD.TODAY.IP",
                    "orderSize": 1.0,
                    "orderLevel": 12500.0,
                    "timeInForce": "GOOD_TILL_CANCELLED",
                    "orderType": "LIMIT"
                },
                "marketData": {
                    "instrumentName": "GBP/USD",
                    "epic": "CS.D.GBPUSD.TODAY.IP",
                    "bid": 12715.0,
                    "offer": 12715.9
                }
            }]
        }));

        let orders = client.dealing().working_orders().unwrap();

        assert_eq!(orders.len(), 1);
        assert_eq!(orders.get(0, "dealId"), Some(&json!("DIAAAA5")));
        assert_eq!(orders.get(0, "epic"), Some(&json!("CS.D.GBPUSD.TODAY.IP")));
        assert_eq!(orders.get(0, "dma"), Some(&Value::Null));
        assert_eq!(
            orders.columns().iter().filter(|c| c.as_str() == "epic").count(),
            1
        );
    }

    #[test]
    fn test_create_working_order_body() {
        let transport = ScriptedTransport::new();
        let client = logged_in_client(&transport);

        transport
            .push_json(accepted("REF-6"))
            .push_json(confirmation("REF-6", "DIAAAA6"));

        let expiry = NaiveDate::from_ymd_opt(2026, 12, 31)
            .unwrap()
            .and_hms_opt(17, 0, 0)
            .unwrap();
        let request = CreateWorkingOrderRequest::new(
            "CS.D.GBPUSD.TODAY.IP",
            Direction::Buy,
            WorkingOrderType::Limit,
            dec!(1),
            dec!(12500),
            "GBP",
        )
        .good_till(expiry)
        .with_stop_distance(dec!(20));

        let outcome = client.dealing().create_working_order(&request).unwrap();
        assert!(outcome.is_confirmed());

        let create = &transport.requests()[1];
        assert_eq!(create.url.path(), "/gateway/deal/workingorders/otc");
        let body = create.body.as_ref().unwrap();
        assert_eq!(body["type"], "LIMIT");
        assert_eq!(body["timeInForce"], "GOOD_TILL_DATE");
        assert_eq!(body["goodTillDate"], "2026/12/31 17:00:00");
        assert_eq!(body["stopDistance"], 20.0);
    }

    #[test]
    fn test_delete_working_order() {
        let transport = ScriptedTransport::new();
        let client = logged_in_client(&transport);

        transport
            .push_json(accepted("REF-7"))
            .push_json(confirmation("REF-7", "DIAAAA5"));

        let outcome = client
            .dealing()
            .delete_working_order(&DealId::new("DIAAAA5"))
            .unwrap();
        assert_eq!(outcome.deal_reference(), Some(DealReference::new("REF-7")));

        let delete = &transport.requests()[1];
        assert_eq!(delete.method, Method::POST);
        assert_eq!(delete.url.path(), "/gateway/deal/workingorders/otc/DIAAAA5");
        assert_eq!(header(delete, "_method"), Some("DELETE"));
        assert_eq!(delete.body, Some(json!({})));
    }

    #[test]
    fn test_update_working_order() {
        let transport = ScriptedTransport::new();
        let client = logged_in_client(&transport);

        transport
            .push_json(accepted("REF-8"))
            .push_json(confirmation("REF-8", "DIAAAA5"));

        let request = UpdateWorkingOrderRequest {
            good_till_date: None,
            level: dec!(12450),
            limit_distance: None,
            limit_level: None,
            stop_distance: Some(dec!(25)),
            stop_level: None,
            time_in_force: TimeInForce::GoodTillCancelled,
            order_type: WorkingOrderType::Limit,
        };
        client
            .dealing()
            .update_working_order(&DealId::new("DIAAAA5"), &request)
            .unwrap();

        let update = &transport.requests()[1];
        assert_eq!(update.method, Method::PUT);
        assert_eq!(update.url.path(), "/gateway/deal/workingorders/otc/DIAAAA5");
        assert_eq!(update.body.as_ref().unwrap()["level"], 12450.0);
    }
    #[test]
    fn test_deal_id_stays_in_one_segment() {
        let transport = ScriptedTransport::new();
        let client = logged_in_client(&transport);

        transport
            .push_json(accepted("REF/10"))
            .push_json(confirmation("REF/10", "DIAAAA5"));

        client
            .dealing()
            .delete_working_order(&DealId::new("DIAAAA5/../../positions?x=1"))
            .unwrap();

        let requests = transport.requests();
        assert_eq!(
            requests[1].url.path(),
            "/gateway/deal/workingorders/otc/DIAAAA5%2F..%2F..%2Fpositions%3Fx=1"
        );
        assert_eq!(requests[1].url.query(), None);
        assert_eq!(requests[2].url.path(), "/gateway/deal/confirms/REF%2F10");
    }
}
