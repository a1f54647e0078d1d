#![allow(clippy::unwrap_used)]
// Integration tests for `NetboxClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use netsync_api::models::{
    AddressQuery, Device, DeviceQuery, InterfaceDraft, Interface, IpAddress, IpAssignment, Vlan,
    VidQuery,
};
use netsync_api::{Error, NetboxClient, RecordId, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, NetboxClient) {
    let server = MockServer::start().await;
    let client = NetboxClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

fn page(results: serde_json::Value, next: Option<String>) -> serde_json::Value {
    let count = results.as_array().map_or(0, Vec::len);
    json!({ "count": count, "next": next, "previous": null, "results": results })
}

// ── Lookup tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_find_device_by_name() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/dcim/devices/"))
        .and(query_param("name", "core-sw1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([{
                "id": 12,
                "name": "core-sw1",
                "site": { "id": 5, "name": "HQ" },
                "serial": "FOC1234",
                "custom_fields": {}
            }]),
            None,
        )))
        .mount(&server)
        .await;

    let device: Device = client
        .find(&DeviceQuery::Name("core-sw1".into()))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(device.id, RecordId(12));
    assert_eq!(device.site, Some(RecordId(5)));
    assert_eq!(device.serial, "FOC1234");
}

#[tokio::test]
async fn test_find_returns_none_on_empty_page() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/ipam/vlans/"))
        .and(query_param("vid", "30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(json!([]), None)))
        .mount(&server)
        .await;

    let vlan: Option<Vlan> = client.find(&VidQuery(30)).await.unwrap();
    assert!(vlan.is_none());
}

#[tokio::test]
async fn test_find_rejects_ambiguous_match() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/ipam/vlans/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([
                { "id": 1, "vid": 30, "name": "iot" },
                { "id": 2, "vid": 30, "name": "iot-b" }
            ]),
            None,
        )))
        .mount(&server)
        .await;

    let result = client.find::<Vlan>(&VidQuery(30)).await;
    assert!(
        matches!(result, Err(Error::Ambiguous { count: 2, .. })),
        "expected Ambiguous error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_list_follows_next_links() {
    let (server, client) = setup().await;
    let next = format!("{}/api/ipam/vlans/?limit=250&offset=250", server.uri());

    Mock::given(method("GET"))
        .and(path("/api/ipam/vlans/"))
        .and(query_param("offset", "250"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([{ "id": 2, "vid": 20, "name": "voice" }]),
            None,
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/ipam/vlans/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([{ "id": 1, "vid": 10, "name": "users" }]),
            Some(next),
        )))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let vlans: Vec<Vlan> = client.list(&[]).await.unwrap();
    let vids: Vec<u16> = vlans.iter().map(|v| v.vid).collect();
    assert_eq!(vids, vec![10, 20]);
}

#[tokio::test]
async fn test_fetch_missing_record_is_none() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/dcim/interfaces/99/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "Not found." })))
        .mount(&server)
        .await;

    let iface: Option<Interface> = client.fetch(RecordId(99)).await.unwrap();
    assert!(iface.is_none());
}

// ── Mutation tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_create_interface() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/dcim/interfaces/"))
        .and(body_json(json!({
            "device": 12,
            "name": "Vlan1",
            "type": "virtual",
            "enabled": true,
            "label": "",
            "description": ""
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 40,
            "device": { "id": 12, "name": "core-sw1" },
            "name": "Vlan1",
            "type": { "value": "virtual", "label": "Virtual" },
            "enabled": true,
            "label": "",
            "description": ""
        })))
        .mount(&server)
        .await;

    let draft = InterfaceDraft {
        device: RecordId(12),
        name: "Vlan1".into(),
        kind: "virtual".into(),
        enabled: true,
        label: String::new(),
        description: String::new(),
    };
    let iface: Interface = client.create(&draft).await.unwrap();

    assert_eq!(iface.id, RecordId(40));
    assert_eq!(iface.device, Some(RecordId(12)));
    assert_eq!(iface.kind.as_deref(), Some("virtual"));
}

#[tokio::test]
async fn test_update_assigns_address() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/api/ipam/ip-addresses/7/"))
        .and(body_json(json!({
            "assigned_object_type": "dcim.interface",
            "assigned_object_id": 40
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "address": "10.0.0.6/24",
            "assigned_object_type": "dcim.interface",
            "assigned_object_id": 40
        })))
        .mount(&server)
        .await;

    let patch = IpAssignment {
        assigned_object_type: "dcim.interface".into(),
        assigned_object_id: RecordId(40),
    };
    let ip: IpAddress = client.update(RecordId(7), &patch).await.unwrap();
    assert_eq!(ip.assigned_object_id, Some(RecordId(40)));
}

#[tokio::test]
async fn test_delete_returns_unit_on_204() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/dcim/cables/3/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client
        .delete::<netsync_api::models::Cable>(RecordId(3))
        .await
        .unwrap();
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_validation_error_carries_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/ipam/ip-addresses/"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "address": ["Duplicate IP address found"] })),
        )
        .mount(&server)
        .await;

    let draft = netsync_api::models::IpAddressDraft {
        address: "10.0.0.6/24".into(),
        status: "active".into(),
    };
    let result = client.create::<IpAddress>(&draft).await;

    match result {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 400);
            assert!(message.contains("Duplicate IP address"), "{message}");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_rejected_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/ipam/ip-addresses/"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({ "detail": "Invalid token" })),
        )
        .mount(&server)
        .await;

    let result = client
        .find::<IpAddress>(&AddressQuery("10.0.0.6/24".into()))
        .await;
    assert!(
        matches!(result, Err(Error::InvalidToken { ref message }) if message == "Invalid token"),
        "expected InvalidToken error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_malformed_body_with_multibyte_text_is_deserialization_error() {
    let (server, client) = setup().await;

    // A two-byte character straddles the 200-byte mark of the preview.
    let body = format!("{}\u{fc} not json", "x".repeat(199));
    Mock::given(method("GET"))
        .and(path("/api/dcim/devices/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.clone()))
        .mount(&server)
        .await;

    let result = client
        .find::<Device>(&DeviceQuery::Name("core-sw1".into()))
        .await;

    match result {
        Err(Error::Deserialization { message, body: raw }) => {
            assert_eq!(raw, body);
            assert!(message.contains("body preview"), "{message}");
        }
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_token_header_is_sent() {
    let server = MockServer::start().await;
    let token: secrecy::SecretString = "0123456789abcdef".to_string().into();
    let client = NetboxClient::new(&server.uri(), &token, &TransportConfig::default()).unwrap();

    Mock::given(method("GET"))
        .and(path("/api/ipam/vlans/"))
        .and(header("authorization", "Token 0123456789abcdef"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(json!([]), None)))
        .expect(1)
        .mount(&server)
        .await;

    let vlans: Vec<Vlan> = client.list(&[]).await.unwrap();
    assert!(vlans.is_empty());
}
