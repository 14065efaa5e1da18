//! Integration tests for the HTTP registration backend.

#![allow(clippy::unwrap_used)]

use portal_auth::stores::MemoryStorage;
use portal_auth::{AuthConfig, CredentialStore, SessionDecoder};
use portal_push::mocks::MockPushProvider;
use portal_push::{
    HttpRegistrationBackend, PushBinding, PushConfig, PushError, RegistrationBackend,
    RegistrationEvent, RegistrationPipeline, RegistrationStage,
};
use portal_testing::fixtures::{encrypt_token, unsigned_jwt};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET: &str = "push-registration-secret";

fn member_jwt() -> String {
    unsigned_jwt(&json!({ "oid": "user-1", "extension_TenantId": "tenant-1" }))
}

async fn signed_in_session(storage: &MemoryStorage) -> SessionDecoder<MemoryStorage> {
    let credentials = CredentialStore::new(storage.clone());
    credentials
        .save(&encrypt_token(&member_jwt(), SECRET), &json!({}))
        .await
        .unwrap();
    SessionDecoder::new(credentials, AuthConfig::new(SECRET.to_string()))
}

fn binding() -> PushBinding {
    PushBinding {
        fcm_token: "fcm-1".into(),
        user_id: "user-1".into(),
        tenant_id: "tenant-1".into(),
        device_id: "device-1".into(),
        platform: "web".into(),
    }
}

#[tokio::test]
async fn test_posts_binding_with_bearer_token() {
    let server = MockServer::start().await;
    let bearer = format!("Bearer {}", member_jwt());

    Mock::given(method("POST"))
        .and(path("/notifications/register"))
        .and(header("authorization", bearer.as_str()))
        .and(body_json(json!({
            "fcmToken": "fcm-1",
            "userId": "user-1",
            "tenantId": "tenant-1",
            "deviceId": "device-1",
            "platform": "web"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let storage = MemoryStorage::new();
    let backend = HttpRegistrationBackend::new(
        format!("{}/notifications/register", server.uri()),
        signed_in_session(&storage).await,
    );

    backend.register(&binding()).await.unwrap();
}

#[tokio::test]
async fn test_is_success_flag_is_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "isSuccess": true })))
        .mount(&server)
        .await;

    let storage = MemoryStorage::new();
    let backend = HttpRegistrationBackend::new(server.uri(), signed_in_session(&storage).await);

    assert!(backend.register(&binding()).await.is_ok());
}

#[tokio::test]
async fn test_unconfirmed_body_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
        .mount(&server)
        .await;

    let storage = MemoryStorage::new();
    let backend = HttpRegistrationBackend::new(server.uri(), signed_in_session(&storage).await);

    assert!(matches!(
        backend.register(&binding()).await,
        Err(PushError::RegistrationFailed(_))
    ));
}

#[tokio::test]
async fn test_non_200_status_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    let storage = MemoryStorage::new();
    let backend = HttpRegistrationBackend::new(server.uri(), signed_in_session(&storage).await);

    assert!(matches!(
        backend.register(&binding()).await,
        Err(PushError::RegistrationFailed(_))
    ));
}

#[tokio::test]
async fn test_without_session_nothing_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(0)
        .mount(&server)
        .await;

    let decoder = SessionDecoder::new(
        CredentialStore::new(MemoryStorage::new()),
        AuthConfig::new(SECRET.to_string()),
    );
    let backend = HttpRegistrationBackend::new(server.uri(), decoder);

    assert!(matches!(
        backend.register(&binding()).await,
        Err(PushError::RegistrationFailed(_))
    ));
}

#[tokio::test]
async fn test_pipeline_over_http_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notifications/register"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let storage = MemoryStorage::new();
    let config = PushConfig::new("vapid", format!("{}/notifications/register", server.uri()));
    let backend = HttpRegistrationBackend::from_config(&config, signed_in_session(&storage).await);
    let pipeline = RegistrationPipeline::new(MockPushProvider::new(), backend, storage, config);

    let event = pipeline
        .register_device("user-1", "tenant-1")
        .await
        .unwrap()
        .outcome_with_timeout(Duration::from_secs(5))
        .await
        .unwrap();

    assert!(matches!(event, RegistrationEvent::Registered { .. }));
    assert_eq!(pipeline.stage().await, RegistrationStage::Bound);
}
