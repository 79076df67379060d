//! Integration tests for `BrokerClient` using wiremock HTTP mocks.

use rentscope_broker::{BrokerClient, BrokerError, BrokerSettings, SearchRequest};
use rentscope_core::Branch;
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> BrokerClient {
    BrokerClient::new(&BrokerSettings {
        base_url: base_url.to_string(),
        tenant_id: "tenant-abc".to_string(),
        user_agent: "rentscope-test/0.1".to_string(),
        connect_timeout_secs: 2,
        request_timeout_secs: 5,
    })
    .expect("client construction should not fail")
}

#[tokio::test]
async fn get_sends_tenant_and_device_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/GetBranchesData"))
        .and(header("x-tenant-id", "tenant-abc"))
        .and(header("accept-language", "tr"))
        .and(header("user-agent", "rentscope-test/0.1"))
        .and(header_exists("x-web-device-info"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data": []}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let body = client
        .get("/GetBranchesData")
        .await
        .expect("request should succeed");

    assert_eq!(body, r#"{"data": []}"#);
}

#[tokio::test]
async fn post_sends_search_payload_as_json() {
    let server = MockServer::start().await;
    let branch = Branch {
        branch_id: "REF-1".to_string(),
        location_id: "LOC-1".to_string(),
        name: "Kadikoy".to_string(),
        city_slug: "istanbul".to_string(),
    };

    Mock::given(method("POST"))
        .and(path("/Search"))
        .and(header("content-type", "application/json"))
        .and(body_json(serde_json::json!({
            "branchId": "REF-1",
            "locationId": "LOC-1",
            "arrivalBranchId": "REF-1",
            "arrivalLocationId": "LOC-1",
            "month": null,
            "rentId": null,
            "couponCode": null,
            "collaborationId": null,
            "collaborationReferenceId": null,
            "pickupDate": "01.07.2025 10:00",
            "dropoffDate": "04.07.2025 10:00"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"data": {"vehicles": []}}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let request = SearchRequest::round_trip(&branch, "01.07.2025 10:00", "04.07.2025 10:00");
    client
        .post("/Search", &request)
        .await
        .expect("request should succeed");
}

#[tokio::test]
async fn base_url_path_prefix_is_preserved() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gateway/GetBranchesData"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data": []}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&format!("{}/gateway", server.uri()));
    client
        .get("GetBranchesData")
        .await
        .expect("request should succeed");
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.get("/GetBranchesData").await.unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert!(err.is_transport());
    assert!(matches!(err, BrokerError::UnexpectedStatus { status: 503, .. }));
}

#[tokio::test]
async fn empty_body_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("  "))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.get("/GetBranchesData").await.unwrap_err();

    assert!(matches!(err, BrokerError::EmptyBody { .. }));
}

#[tokio::test]
async fn connection_failure_is_http_error() {
    // Nothing listens on port 1.
    let client = test_client("http://127.0.0.1:1");
    let err = client.get("/GetBranchesData").await.unwrap_err();

    assert!(matches!(err, BrokerError::Http(_)), "got {err:?}");
    assert!(err.is_transport());
}
