//! End-to-end searches against mock fullnode and name-resolver servers.


use axum::http::StatusCode;
use serde_json::json;

use harness::{airdrop_object, config, owned_page, spawn_name_api, spawn_rpc, DEAD_URL};
use wal_airdrop_explorer::{
    Explorer, ExplorerError, QueryError, RequestTracker, ResolutionError,
};

const RESOLVED: &str = "0xabc0000000000000000000000000000000000000000000000000000000000123";

#[tokio::test]
async fn domain_resolves_via_primary_and_lists_airdrops() {
    let chain = spawn_rpc(|method, _params| match method {
        "suix_resolveNameServiceAddress" => json!({ "result": RESOLVED }),
        "suix_getOwnedObjects" => owned_page(vec![airdrop_object(
            "0x0b1ec7",
            Some("Test"),
            Some("1000000000000"),
        )]),
        other => panic!("unexpected method {other}"),
    })
    .await;
    let names = spawn_name_api(|_| (StatusCode::OK, json!({ "data": "0xwrong" }))).await;

    let explorer = Explorer::from_config(&config(&chain.base, &names.base)).unwrap();
    let report = explorer.search_once("example.sui").await.unwrap();

    assert_eq!(report.address.as_str(), RESOLVED);
    assert!(report.via_domain);
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].name, "Test");
    assert_eq!(report.records[0].amount, 1000);
    assert_eq!(report.records[0].display_amount, "1,000");

    assert_eq!(
        chain.methods(),
        vec!["suix_resolveNameServiceAddress", "suix_getOwnedObjects"]
    );
    assert_eq!(names.call_count(), 0);

    let owned = &chain.requests()[1];
    assert_eq!(owned["jsonrpc"], "2.0");
    assert_eq!(owned["params"][0], RESOLVED);
    assert_eq!(
        owned["params"][1]["filter"]["MatchAll"][0]["StructType"],
        harness::AIRDROP_TYPE
    );
}

#[tokio::test]
async fn address_literal_skips_resolution() {
    let chain = spawn_rpc(|method, _params| match method {
        "suix_getOwnedObjects" => owned_page(vec![]),
        other => panic!("unexpected method {other}"),
    })
    .await;
    let names = spawn_name_api(|_| panic!("name service must not be called")).await;

    let explorer = Explorer::from_config(&config(&chain.base, &names.base)).unwrap();
    let report = explorer.search_once(RESOLVED).await.unwrap();

    assert_eq!(chain.methods(), vec!["suix_getOwnedObjects"]);
    assert_eq!(chain.requests()[0]["params"][0], RESOLVED);
    assert_eq!(names.call_count(), 0);
    assert!(!report.via_domain);
    assert!(report.is_empty());
    assert!(report.summary().starts_with("No WAL Airdrops were found for address:"));
}

#[tokio::test]
async fn unregistered_domain_fails_after_both_tiers() {
    let chain = spawn_rpc(|method, _params| match method {
        "suix_resolveNameServiceAddress" => json!({ "result": null }),
        other => panic!("unexpected method {other}"),
    })
    .await;
    let names = spawn_name_api(|_| (StatusCode::NOT_FOUND, json!({ "error": "Domain not found" }))).await;

    let explorer = Explorer::from_config(&config(&chain.base, &names.base)).unwrap();
    let err = explorer.search_once("missing.sui").await.unwrap_err();

    match &err {
        ExplorerError::Resolution(ResolutionError::DomainNotRegistered { domain }) => {
            assert_eq!(domain, "missing.sui")
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.user_message().contains("\"missing.sui\""));
    assert_eq!(chain.methods(), vec!["suix_resolveNameServiceAddress"]);
    assert_eq!(names.call_count(), 1);
}

#[tokio::test]
async fn domain_is_lowercased_for_both_services() {
    let chain = spawn_rpc(|method, _params| match method {
        "suix_resolveNameServiceAddress" => {
            json!({ "error": { "code": -32000, "message": "resolver offline" } })
        }
        "suix_getOwnedObjects" => owned_page(vec![]),
        other => panic!("unexpected method {other}"),
    })
    .await;
    let names = spawn_name_api(|_| (StatusCode::OK, json!({ "data": RESOLVED }))).await;

    let explorer = Explorer::from_config(&config(&chain.base, &names.base)).unwrap();
    let report = explorer.search_once("  Example.SUI ").await.unwrap();

    assert_eq!(report.address.as_str(), RESOLVED);
    assert_eq!(report.query, "Example.SUI");
    assert_eq!(chain.requests()[0]["params"], json!(["example.sui"]));
    assert_eq!(names.requests(), vec![json!({ "name": "example.sui" })]);
    assert!(report.summary().contains("Example.SUI"));
}

#[tokio::test]
async fn original_spelling_kept_in_error() {
    let names = spawn_name_api(|_| (StatusCode::OK, json!({ "data": null }))).await;

    let explorer = Explorer::from_config(&config(DEAD_URL, &names.base)).unwrap();
    let err = explorer.search_once("MiSsInG.sui").await.unwrap_err();

    assert!(matches!(
        err,
        ExplorerError::Resolution(ResolutionError::DomainNotRegistered { .. })
    ));
    assert!(err.user_message().contains("\"MiSsInG.sui\""));
    assert_eq!(names.requests(), vec![json!({ "name": "missing.sui" })]);
}

#[tokio::test]
async fn unreachable_services_are_reported_separately() {
    let explorer = Explorer::from_config(&config(DEAD_URL, DEAD_URL)).unwrap();
    let err = explorer.search_once("example.sui").await.unwrap_err();
    assert!(matches!(
        err,
        ExplorerError::Resolution(ResolutionError::ServiceUnavailable { .. })
    ));
}

#[tokio::test]
async fn ledger_rpc_error_is_surfaced_verbatim() {
    let chain = spawn_rpc(|_, _| {
        json!({ "error": { "code": -32602, "message": "Invalid params: bad address" } })
    })
    .await;

    let explorer = Explorer::from_config(&config(&chain.base, DEAD_URL)).unwrap();
    let err = explorer.search_once("0xnotanaddress").await.unwrap_err();

    match &err {
        ExplorerError::Query(QueryError::RpcError { code, message }) => {
            assert_eq!(*code, -32602);
            assert_eq!(message, "Invalid params: bad address");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.user_message(), "Invalid params: bad address");
}

#[tokio::test]
async fn unreachable_ledger_is_transport_error() {
    let explorer = Explorer::from_config(&config(DEAD_URL, DEAD_URL)).unwrap();
    let err = explorer.search_once(RESOLVED).await.unwrap_err();
    assert!(matches!(err, ExplorerError::Query(QueryError::Transport(_))));
}

#[tokio::test]
async fn malformed_result_is_protocol_error() {
    let chain = spawn_rpc(|_, _| json!({ "result": { "items": [] } })).await;

    let explorer = Explorer::from_config(&config(&chain.base, DEAD_URL)).unwrap();
    let err = explorer.search_once(RESOLVED).await.unwrap_err();
    assert!(matches!(err, ExplorerError::Query(QueryError::Protocol(_))));
}

#[tokio::test]
async fn records_keep_ledger_order_and_defaults() {
    let chain = spawn_rpc(|_, _| {
        owned_page(vec![
            airdrop_object("0x03", Some("Third"), Some("4216595000000000")),
            airdrop_object("0x01", None, None),
            json!({ "error": { "code": "notExists", "object_id": "0x02" } }),
        ])
    })
    .await;

    let explorer = Explorer::from_config(&config(&chain.base, DEAD_URL)).unwrap();
    let report = explorer.search_once(RESOLVED).await.unwrap();

    let ids: Vec<&str> = report.records.iter().map(|r| r.object_id.as_str()).collect();
    assert_eq!(ids, vec!["0x03", "0x01"]);
    assert_eq!(report.records[0].amount, 4_216_595);
    assert_eq!(report.records[1].name, "WAL Airdrop");
    assert_eq!(report.records[1].amount, 0);
    assert_eq!(report.summary(), "Found 2 airdrops");
}

#[tokio::test]
async fn superseded_request_does_not_query_ledger() {
    let chain = spawn_rpc(|_, _| owned_page(vec![])).await;
    let explorer = Explorer::from_config(&config(&chain.base, DEAD_URL)).unwrap();

    let tracker = RequestTracker::new();
    let stale = tracker.begin(RESOLVED);
    let fresh = tracker.begin(RESOLVED);

    let err = explorer.search(&stale).await.unwrap_err();
    assert!(matches!(err, ExplorerError::Superseded { .. }));
    assert_eq!(chain.call_count(), 0);

    explorer.search(&fresh).await.unwrap();
    assert_eq!(chain.call_count(), 1);
}

#[tokio::test]
async fn blank_input_makes_no_calls() {
    let chain = spawn_rpc(|_, _| owned_page(vec![])).await;
    let explorer = Explorer::from_config(&config(&chain.base, DEAD_URL)).unwrap();

    let err = explorer.search_once("   ").await.unwrap_err();
    assert!(matches!(err, ExplorerError::Input(_)));
    assert_eq!(chain.call_count(), 0);
}

#[tokio::test]
async fn superseded_domain_request_makes_no_calls() {
    let chain = spawn_rpc(|_, _| json!({ "result": null })).await;
    let names = spawn_name_api(|_| (StatusCode::OK, json!({ "data": null }))).await;
    let explorer = Explorer::from_config(&config(&chain.base, &names.base)).unwrap();

    let tracker = RequestTracker::new();
    let stale = tracker.begin("stale.sui");
    let _fresh = tracker.begin("fresh.sui");

    let err = explorer.search(&stale).await.unwrap_err();
    assert!(matches!(err, ExplorerError::Superseded { .. }));
    assert_eq!(chain.call_count(), 0);
    assert_eq!(names.call_count(), 0);
}

#[tokio::test]
async fn resolution_failure_of_superseded_request_is_dropped() {
    let tracker = RequestTracker::new();
    let newer = tracker.clone();
    let chain = spawn_rpc(move |_, _| {
        newer.begin("fresh.sui");
        json!({ "result": null })
    })
    .await;
    let explorer = Explorer::from_config(&config(&chain.base, DEAD_URL)).unwrap();

    let stale = tracker.begin("stale.sui");
    let err = explorer.search(&stale).await.unwrap_err();
    assert!(matches!(err, ExplorerError::Superseded { .. }));
    assert_eq!(chain.methods(), vec!["suix_resolveNameServiceAddress"]);
}

#[tokio::test]
async fn query_failure_of_superseded_request_is_dropped() {
    let tracker = RequestTracker::new();
    let newer = tracker.clone();
    let chain = spawn_rpc(move |_, _| {
        newer.begin("0xfresh");
        json!({ "error": { "code": -32602, "message": "Invalid params" } })
    })
    .await;
    let explorer = Explorer::from_config(&config(&chain.base, DEAD_URL)).unwrap();

    let stale = tracker.begin(RESOLVED);
    let err = explorer.search(&stale).await.unwrap_err();
    assert!(matches!(err, ExplorerError::Superseded { .. }));
    assert_eq!(chain.methods(), vec!["suix_getOwnedObjects"]);
}
