//! Read-surface routing and response shapes.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use config_console::config::ConsoleConfig;
use config_console::store::MemoryStore;
use config_console::ConsoleService;

mod common;

use common::{device_group, slice};

async fn seeded_router() -> axum::Router {
    let store = Arc::new(MemoryStore::new());
    let (service, scheduler) = ConsoleService::new(store, &ConsoleConfig::default());

    let mut s = slice("alpha", "1", "010203", "001", "01", &[1, 2]);
    s.site_device_group = vec!["cams".into()];
    service.upsert_slice(s).await.unwrap();
    service
        .upsert_device_group(device_group("cams", "internet", vec!["001010000000001".into()]))
        .await
        .unwrap();
    scheduler.sync_once().await.unwrap();

    config_console::api::build_router(service, Duration::from_secs(5))
}

async fn get_json(router: &axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_view_queries_return_json_arrays() {
    let router = seeded_router().await;

    for uri in [
        "/nfconfig/plmn",
        "/nfconfig/plmn-snssai",
        "/nfconfig/access-mobility",
        "/nfconfig/session-management",
        "/nfconfig/policy-control",
    ] {
        let (status, json) = get_json(&router, uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert!(json.is_array(), "{uri} should return an array");
        assert_eq!(json.as_array().unwrap().len(), 1, "{uri}");
    }

    let (_, plmn) = get_json(&router, "/nfconfig/plmn").await;
    assert_eq!(plmn[0]["mcc"], "001");
    assert_eq!(plmn[0]["mnc"], "01");
}

#[tokio::test]
async fn test_qos_lookup_hits_and_misses() {
    let router = seeded_router().await;

    let (status, json) =
        get_json(&router, "/nfconfig/qos/internet/001010000000001").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["dnn"], "internet");
    assert_eq!(json["uplink"], "20 Mbps");

    let (status, _) = get_json(&router, "/nfconfig/qos/internet/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get_json(&router, "/nfconfig/qos/other/001010000000001").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sync_trigger_accepted() {
    let router = seeded_router().await;

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/config/sync")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
}
