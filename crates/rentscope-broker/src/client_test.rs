use super::*;

fn settings(base_url: &str) -> BrokerSettings {
    BrokerSettings {
        base_url: base_url.to_string(),
        tenant_id: "tenant-123".to_string(),
        user_agent: "rentscope-test/0.1".to_string(),
        connect_timeout_secs: 1,
        request_timeout_secs: 5,
    }
}

#[test]
fn endpoint_url_appends_to_base_path() {
    let client = BrokerClient::new(&settings("https://broker.test/api")).unwrap();
    assert_eq!(
        client.endpoint_url("/GetBranchesData").unwrap().as_str(),
        "https://broker.test/api/GetBranchesData"
    );
}

#[test]
fn endpoint_url_tolerates_trailing_slash_on_base() {
    let client = BrokerClient::new(&settings("https://broker.test/")).unwrap();
    assert_eq!(
        client.endpoint_url("Search").unwrap().as_str(),
        "https://broker.test/Search"
    );
}

#[test]
fn rejects_unparseable_base_url() {
    let result = BrokerClient::new(&settings("not a url"));
    assert!(
        matches!(result, Err(BrokerError::InvalidBaseUrl { .. })),
        "expected InvalidBaseUrl"
    );
}

#[test]
fn rejects_tenant_id_with_control_characters() {
    let mut s = settings("https://broker.test");
    s.tenant_id = "bad\ntenant".to_string();
    let result = BrokerClient::new(&s);
    assert!(
        matches!(result, Err(BrokerError::InvalidHeader { name: "x-tenant-id", .. })),
        "expected InvalidHeader"
    );
}

#[test]
fn static_headers_include_tenant_and_browser_hints() {
    let headers = static_headers("tenant-123").unwrap();
    assert_eq!(headers.get("x-tenant-id").unwrap(), "tenant-123");
    assert_eq!(headers.get(header::ACCEPT_LANGUAGE).unwrap(), "tr");
    assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-cache");
    assert_eq!(headers.get("sec-fetch-mode").unwrap(), "cors");
}

#[test]
fn device_info_embeds_session_id() {
    let parsed: serde_json::Value = serde_json::from_str(&device_info(1_720_000_000)).unwrap();
    assert_eq!(parsed["sessionId"], 1_720_000_000);
    assert_eq!(parsed["browser"], "Chrome");
    assert_eq!(parsed["webDeviceType"], "desktop");
    assert_eq!(parsed["os"], "Windows");
}
