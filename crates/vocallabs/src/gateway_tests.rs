//! Gateway behaviour against a mock VocalLabs server.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::GatewayConfig;
use crate::credentials::VocallabsCredentials;
use crate::error::ErrorKind;
use crate::gateway::{Gateway, TOKEN_PATH};
use crate::request::RequestDescriptor;
use crate::token_cache::{CachedToken, TokenCache};

const CAMPAIGNS: &str = "/b2b/vocallabs/getCampaigns";

fn credentials() -> VocallabsCredentials {
    VocallabsCredentials::new("id-1", "secret-1")
}

fn gateway(server: &MockServer) -> Gateway {
    let config = GatewayConfig::default().with_base_url(server.uri());
    Gateway::new(config, Arc::new(TokenCache::new())).unwrap()
}

async fn mount_token(server: &MockServer, body: serde_json::Value, times: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_json(json!({ "clientId": "id-1", "clientSecret": "secret-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(times)
        .mount(server)
        .await;
}

// ── Token lifecycle ────────────────────────────────────────────────────

#[tokio::test]
async fn token_is_exchanged_once_and_reused() {
    let server = MockServer::start().await;
    mount_token(&server, json!({ "auth_token": "tok-1" }), 1).await;

    Mock::given(method("GET"))
        .and(path(CAMPAIGNS))
        .and(header("Authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "campaigns": [] })))
        .expect(2)
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    let request = RequestDescriptor::get(CAMPAIGNS);
    for _ in 0..2 {
        let body = gateway.send(&credentials(), &request).await.unwrap();
        assert_eq!(body, json!({ "campaigns": [] }));
    }
    assert_eq!(gateway.cache().len(), 1);
}

#[tokio::test]
async fn unauthorized_response_evicts_the_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "auth_token": "tok-1" })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "auth_token": "tok-2" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(CAMPAIGNS))
        .and(header("Authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Token expired" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(CAMPAIGNS))
        .and(header("Authorization", "Bearer tok-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    let request = RequestDescriptor::get(CAMPAIGNS);

    let err = gateway.send(&credentials(), &request).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
    assert_eq!(err.http_code, "401");
    assert_eq!(err.message, "Token expired");
    assert!(gateway.cache().get("id-1").is_none());

    let body = gateway.send(&credentials(), &request).await.unwrap();
    assert_eq!(body, json!({ "ok": true }));
    assert_eq!(gateway.cache().get("id-1").map(|t| t.value), Some("tok-2".to_string()));
}

#[tokio::test]
async fn expired_token_triggers_one_new_exchange() {
    let server = MockServer::start().await;
    mount_token(&server, json!({ "auth_token": "tok-new" }), 1).await;

    Mock::given(method("GET"))
        .and(path(CAMPAIGNS))
        .and(header("Authorization", "Bearer tok-new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    gateway.cache().insert(
        "id-1",
        CachedToken {
            value: "tok-old".into(),
            expires_at: Utc::now() - chrono::Duration::minutes(1),
        },
    );

    gateway
        .send(&credentials(), &RequestDescriptor::get(CAMPAIGNS))
        .await
        .unwrap();

    let cached = gateway.cache().get("id-1").unwrap();
    assert_eq!(cached.value, "tok-new");
    assert!(cached.expires_at > Utc::now() + chrono::Duration::hours(22));
}

#[tokio::test]
async fn alternate_token_field_is_accepted() {
    let server = MockServer::start().await;
    mount_token(&server, json!({ "access_token": "tok-a", "userId": 77 }), 1).await;

    let grant = gateway(&server).exchange(&credentials()).await.unwrap();
    assert_eq!(grant.token, "tok-a");
    assert_eq!(grant.user_id.as_deref(), Some("77"));
}

#[tokio::test]
async fn exchange_without_token_is_an_authentication_error() {
    let server = MockServer::start().await;
    mount_token(&server, json!({ "status": "ok" }), 1).await;

    Mock::given(method("GET"))
        .and(path(CAMPAIGNS))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    let err = gateway
        .send(&credentials(), &RequestDescriptor::get(CAMPAIGNS))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
    assert!(err.message.contains("could not retrieve an authentication token"));
    assert!(gateway.cache().is_empty());
}

#[tokio::test]
async fn ip_whitelist_rejection_explains_the_fix() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({ "message": "IP address not whitelisted" })),
        )
        .mount(&server)
        .await;

    let err = gateway(&server).exchange(&credentials()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
    assert_eq!(err.http_code, "403");
    assert!(err.message.starts_with("IP Not Whitelisted: IP address not whitelisted"));
}

// ── Request building ───────────────────────────────────────────────────

#[tokio::test]
async fn caller_authorization_header_is_replaced() {
    let server = MockServer::start().await;
    mount_token(&server, json!({ "token": "tok-1" }), 1).await;

    Mock::given(method("POST"))
        .and(path("/b2b/vocallabs/deleteCampaign"))
        .and(header("X-Trace", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "deleted": true })))
        .expect(1)
        .mount(&server)
        .await;

    let request = RequestDescriptor::post("/b2b/vocallabs/deleteCampaign")
        .header("Authorization", "Bearer forged")
        .header("X-Trace", "abc")
        .json(json!({ "id": "c-1" }));
    gateway(&server).send(&credentials(), &request).await.unwrap();

    let received = server.received_requests().await.unwrap();
    let call = received
        .iter()
        .find(|r| r.url.path() == "/b2b/vocallabs/deleteCampaign")
        .unwrap();
    let auth: Vec<&str> = call
        .headers
        .get_all("authorization")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    assert_eq!(auth, vec!["Bearer tok-1"]);
}

#[tokio::test]
async fn query_parameters_are_encoded() {
    let server = MockServer::start().await;
    mount_token(&server, json!({ "auth_token": "tok-1" }), 1).await;

    Mock::given(method("GET"))
        .and(path("/b2b/vocallabs/getCallTimeline"))
        .and(query_param("phone_to", "+919876543210"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "calls": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let request = RequestDescriptor::get("/b2b/vocallabs/getCallTimeline")
        .query("phone_to", "+919876543210")
        .query("limit", 10);
    gateway(&server).send(&credentials(), &request).await.unwrap();
}

#[tokio::test]
async fn empty_and_plain_text_success_bodies() {
    let server = MockServer::start().await;
    mount_token(&server, json!({ "auth_token": "tok-1" }), 1).await;

    Mock::given(method("DELETE"))
        .and(path("/b2b/vocallabs/deleteContact"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b2b/vocallabs/getVoices"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    let deleted = gateway
        .send(&credentials(), &RequestDescriptor::delete("/b2b/vocallabs/deleteContact"))
        .await
        .unwrap();
    assert!(deleted.is_null());

    let voices = gateway
        .send(&credentials(), &RequestDescriptor::get("/b2b/vocallabs/getVoices"))
        .await
        .unwrap();
    assert_eq!(voices, json!("ok"));
}

// ── Error normalization ────────────────────────────────────────────────

#[tokio::test]
async fn object_and_string_encoded_error_bodies_agree() {
    let server = MockServer::start().await;
    mount_token(&server, json!({ "auth_token": "tok-1" }), 1).await;

    Mock::given(method("GET"))
        .and(path("/b2b/vocallabs/object"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "message": "X" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b2b/vocallabs/encoded"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!("{\"message\":\"X\"}")))
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    let object = gateway
        .send(&credentials(), &RequestDescriptor::get("/b2b/vocallabs/object"))
        .await
        .unwrap_err();
    let encoded = gateway
        .send(&credentials(), &RequestDescriptor::get("/b2b/vocallabs/encoded"))
        .await
        .unwrap_err();

    assert_eq!(object.message, "X");
    assert_eq!(encoded.message, "X");
    assert_eq!(object.http_code, "400");
    assert_eq!(encoded.http_code, "400");
}

#[tokio::test]
async fn rate_limit_carries_retry_after() {
    let server = MockServer::start().await;
    mount_token(&server, json!({ "auth_token": "tok-1" }), 1).await;

    Mock::given(method("GET"))
        .and(path(CAMPAIGNS))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "7")
                .set_body_json(json!({ "error": "Too many requests" })),
        )
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    let err = gateway
        .send(&credentials(), &RequestDescriptor::get(CAMPAIGNS))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::RateLimited);
    assert_eq!(err.retry_after, Some(Duration::from_secs(7)));
    assert!(err.is_retryable());
    // Only a 401 evicts.
    assert!(gateway.cache().get("id-1").is_some());
}

#[tokio::test]
async fn oversized_retry_after_header_is_ignored() {
    let server = MockServer::start().await;
    mount_token(&server, json!({ "auth_token": "tok-1" }), 1).await;

    Mock::given(method("GET"))
        .and(path(CAMPAIGNS))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "1e30")
                .set_body_json(json!({ "message": "Too many requests" })),
        )
        .mount(&server)
        .await;

    let err = gateway(&server)
        .send(&credentials(), &RequestDescriptor::get(CAMPAIGNS))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::RateLimited);
    assert_eq!(err.http_code, "429");
    assert_eq!(err.retry_after, None);
}

#[tokio::test]
async fn unreachable_host_is_a_network_error() {
    let config = GatewayConfig::default()
        .with_base_url("http://127.0.0.1:1")
        .with_timeout(Some(Duration::from_secs(2)));
    let gateway = Gateway::new(config, Arc::new(TokenCache::new())).unwrap();

    let err = gateway.exchange(&credentials()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Network);
    assert_eq!(err.http_code, "500");
    assert!(err.message.starts_with("Failed to authenticate with VocalLabs:"));
}
