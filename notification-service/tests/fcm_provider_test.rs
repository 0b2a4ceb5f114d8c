mod common;

use common::{service_account_json, TEST_CLIENT_EMAIL};
use notification_service::config::FcmConfig;
use notification_service::models::{NotificationRequest, PushMessage};
use notification_service::services::{FcmProvider, ProviderError, PushProvider};
use secrecy::Secret;
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fcm_config(server: &MockServer) -> FcmConfig {
    FcmConfig {
        project_id: String::new(), // taken from the key
        service_account_key: Secret::new(service_account_json(&format!(
            "{}/token",
            server.uri()
        ))),
        api_base_url: format!("{}/v1/projects", server.uri()),
        enabled: true,
    }
}

fn message() -> PushMessage {
    PushMessage::from(NotificationRequest {
        token: "device-token-1".to_string(),
        title: "Hello".to_string(),
        body: "World".to_string(),
    })
}

async fn mount_token_endpoint(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains(
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
        ))
        .and(body_string_contains("assertion="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.test-token",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn sends_envelope_and_returns_message_name() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/v1/projects/test-project/messages:send"))
        .and(header("authorization", "Bearer ya29.test-token"))
        .and(body_partial_json(json!({
            "message": {
                "token": "device-token-1",
                "notification": { "title": "Hello", "body": "World" },
                "android": { "priority": "high" },
                "apns": { "payload": { "aps": { "sound": "default" } } }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/test-project/messages/0:1500415314455276%31bd1c9631bd1c96"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = FcmProvider::new(&fcm_config(&server)).expect("provider should build");
    assert_eq!(provider.project_id(), "test-project");

    let message_id = provider.send(&message()).await.expect("send should succeed");
    assert_eq!(
        message_id,
        "projects/test-project/messages/0:1500415314455276%31bd1c9631bd1c96"
    );
}

#[tokio::test]
async fn access_token_is_reused_between_sends() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/v1/projects/test-project/messages:send"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/test-project/messages/1"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let provider = FcmProvider::new(&fcm_config(&server)).unwrap();
    provider.send(&message()).await.unwrap();
    provider.send(&message()).await.unwrap();
}

#[tokio::test]
async fn provider_error_message_is_passed_through() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/v1/projects/test-project/messages:send"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "The registration token is not a valid FCM registration token",
                "status": "INVALID_ARGUMENT"
            }
        })))
        .mount(&server)
        .await;

    let provider = FcmProvider::new(&fcm_config(&server)).unwrap();
    let err = provider.send(&message()).await.unwrap_err();

    assert!(matches!(err, ProviderError::SendFailed(_)));
    assert_eq!(
        err.to_string(),
        "The registration token is not a valid FCM registration token"
    );
}

#[tokio::test]
async fn rejected_credentials_surface_as_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid JWT Signature."
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/projects/test-project/messages:send"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let provider = FcmProvider::new(&fcm_config(&server)).unwrap();
    let err = provider.send(&message()).await.unwrap_err();

    match err {
        ProviderError::Authentication(reason) => assert_eq!(reason, "Invalid JWT Signature."),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn explicit_project_id_overrides_key() {
    let server = MockServer::start().await;
    let mut config = fcm_config(&server);
    config.project_id = "other-project".to_string();

    let provider = FcmProvider::new(&config).unwrap();
    assert_eq!(provider.project_id(), "other-project");
}

#[test]
fn missing_key_fails_construction() {
    let config = FcmConfig {
        project_id: "test-project".to_string(),
        service_account_key: Secret::new(String::new()),
        api_base_url: "http://localhost".to_string(),
        enabled: true,
    };

    assert!(matches!(
        FcmProvider::new(&config),
        Err(ProviderError::Configuration(_))
    ));
}

#[test]
fn test_key_fixture_is_a_service_account() {
    let json: serde_json::Value =
        serde_json::from_str(&service_account_json("http://localhost/token")).unwrap();
    assert_eq!(json["client_email"], TEST_CLIENT_EMAIL);
}
