//! Property-Based Tests for Asset Creation and Link Validation
//!
//! Generated inputs go through the router over an in-memory store.

use assetgraph_api::{create_router, AssetService};
use assetgraph_storage::InMemoryGraph;
use assetgraph_test_utils::generators::*;
use assetgraph_test_utils::Decimal;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceExt;

// ============================================================================
// TEST CONFIGURATION
// ============================================================================

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build runtime")
}

async fn post(app: &Router, uri: &str, body: Value) -> Result<(StatusCode, Value), TestCaseError> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .map_err(|e| TestCaseError::fail(e.to_string()))?;
    let response = app
        .clone()
        .oneshot(request)
        .await
        .map_err(|e| TestCaseError::fail(format!("{:?}", e)))?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .map_err(|e| TestCaseError::fail(e.to_string()))?;
    let json = serde_json::from_slice(&bytes).map_err(|e| TestCaseError::fail(e.to_string()))?;
    Ok((status, json))
}

// ============================================================================
// PROPERTY TESTS
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Created assets carry the exact price and date, and ids never repeat.
    #[test]
    fn prop_created_assets_are_exact_and_unique(
        requests in proptest::collection::vec(arb_create_request(), 1..8)
    ) {
        let rt = runtime();
        rt.block_on(async {
            let graph = InMemoryGraph::new();
            let app = create_router(AssetService::new(Arc::new(graph.clone())));
            let mut ids = HashSet::new();

            for (req, price, date) in &requests {
                let body = serde_json::to_value(req).map_err(|e| TestCaseError::fail(e.to_string()))?;
                let (status, created) = post(&app, "/api/v1/assets", body).await?;
                prop_assert_eq!(status, StatusCode::CREATED);

                let returned = created["price"].as_str().and_then(|p| Decimal::from_str(p).ok());
                prop_assert_eq!(returned, Some(*price));
                let expected_date = date.format("%Y-%m-%dT%H:%M:%S").to_string();
                prop_assert_eq!(created["purchaseDate"].as_str(), Some(expected_date.as_str()));
                prop_assert!(ids.insert(created["id"].to_string()));
            }

            prop_assert_eq!(graph.asset_count(), requests.len());
            Ok(())
        })?;
    }

    /// Bad link types never reach the store.
    #[test]
    fn prop_illegal_link_types_rejected(rel_type in arb_illegal_token()) {
        let rt = runtime();
        rt.block_on(async {
            let graph = InMemoryGraph::new();
            let app = create_router(AssetService::new(Arc::new(graph.clone())));

            let (status, body) = post(
                &app,
                "/api/v1/links",
                json!({ "idFrom": "a", "idTo": "b", "type": rel_type }),
            )
            .await?;
            prop_assert_eq!(status, StatusCode::BAD_REQUEST);
            prop_assert_eq!(body["code"].as_str(), Some("ILLEGAL_CHARACTERS"));
            prop_assert_eq!(graph.session_stats().opened, 0);
            Ok(())
        })?;
    }

    #[test]
    fn prop_overlong_link_types_rejected(rel_type in arb_overlong_token()) {
        let rt = runtime();
        rt.block_on(async {
            let graph = InMemoryGraph::new();
            let app = create_router(AssetService::new(Arc::new(graph.clone())));

            let (status, body) = post(
                &app,
                "/api/v1/links",
                json!({ "idFrom": "a", "idTo": "b", "type": rel_type }),
            )
            .await?;
            prop_assert_eq!(status, StatusCode::BAD_REQUEST);
            prop_assert_eq!(body["code"].as_str(), Some("TOO_LONG"));
            Ok(())
        })?;
    }

    /// Valid types against missing endpoints are accepted no-ops.
    #[test]
    fn prop_valid_type_without_endpoints_is_noop(rel_type in arb_valid_token()) {
        let rt = runtime();
        rt.block_on(async {
            let graph = InMemoryGraph::new();
            let app = create_router(AssetService::new(Arc::new(graph.clone())));

            let (status, body) = post(
                &app,
                "/api/v1/links",
                json!({ "idFrom": "a", "idTo": "b", "type": rel_type }),
            )
            .await?;
            prop_assert_eq!(status, StatusCode::ACCEPTED);
            prop_assert!(body["message"].is_string());
            prop_assert_eq!(graph.link_count(), 0);
            Ok(())
        })?;
    }
}
