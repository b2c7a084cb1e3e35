//! End-to-end authentication flow tests
//!
//! Builds browser profile trees in a temporary home directory and checks
//! discovery, validation and recovery against a mock MUBI API.

mod common;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use common::helpers::{FakeHome, create_test_settings, session_cookie};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mubi_session::environment::{Detection, EnvironmentDetector, HostSignals};
use mubi_session::session::{
    AuthManagerGeneric, FallbackState, FallbackTrigger, Heartbeat, HeartbeatEvent,
    HttpStatusValidator, TerminalOperator,
};
use mubi_session::types::Browser;
use mubi_session::{AuthFailureKind, AuthManager, Error};

const STATUS_PATH: &str = "/v3/current_user";

fn detect(home: &FakeHome, browsers: &[Browser]) -> Detection {
    let signals = HostSignals {
        os_family: "linux".to_string(),
        kernel_version: None,
        vars: HashMap::new(),
        home: Some(home.path().to_path_buf()),
        compat_mount_root: home.path().join("mnt"),
    };
    EnvironmentDetector::new(signals).detect(browsers)
}

fn status_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), STATUS_PATH)
}

#[tokio::test]
async fn test_discovers_chrome_session_and_builds_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STATUS_PATH))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 42})))
        .expect(1)
        .mount(&server)
        .await;

    let home = FakeHome::new();
    home.chrome_profile(
        "Default",
        &[
            (".mubi.com", "_session", &session_cookie("tok-123", "42", "s-9")),
            (".mubi.com", "remember_token", "r"),
            (".example.com", "_session", "unrelated"),
        ],
    );
    let detection = detect(&home, &[Browser::Chrome]);
    assert_eq!(detection.candidates.len(), 1);

    let manager = AuthManager::new(create_test_settings(&status_url(&server)), &detection).unwrap();
    let headers = manager.ensure_authenticated().await.unwrap();

    assert_eq!(headers.authorization, "Bearer tok-123");
    let custom = STANDARD.decode(&headers.custom_data).unwrap();
    assert_eq!(
        String::from_utf8(custom).unwrap(),
        r#"{"userId":"42","sessionId":"s-9","merchant":"mubi"}"#
    );
    assert_eq!(
        manager.fallback().history(),
        vec![
            FallbackState::Idle,
            FallbackState::Discovering,
            FallbackState::Resolved
        ]
    );
    assert_eq!(manager.fallback().state(), FallbackState::Idle);
}

#[tokio::test]
async fn test_incomplete_store_skipped_without_merging() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STATUS_PATH))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let home = FakeHome::new();
    home.chrome_profile(
        "Default",
        &[(".mubi.com", "_session", &session_cookie("chrome", "1", "a"))],
    );
    home.firefox_profile(
        "abcd.default-release",
        &[
            (".mubi.com", "_session", &session_cookie("firefox", "2", "b")),
            ("mubi.com", "remember_token", "r"),
        ],
    );
    let detection = detect(&home, &[Browser::Chrome, Browser::Firefox]);

    let manager = AuthManager::new(create_test_settings(&status_url(&server)), &detection).unwrap();
    let headers = manager.ensure_authenticated().await.unwrap();

    assert_eq!(headers.authorization, "Bearer firefox");
    let session = manager.cache().current().await.unwrap();
    assert_eq!(session.user_id(), "2");
}

#[tokio::test]
async fn test_rejected_discovery_without_prompts_is_exhausted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STATUS_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let home = FakeHome::new();
    home.chrome_profile(
        "Default",
        &[
            (".mubi.com", "_session", &session_cookie("stale", "1", "a")),
            (".mubi.com", "remember_token", "r"),
        ],
    );
    let detection = detect(&home, &[Browser::Chrome]);

    let manager = AuthManager::new(create_test_settings(&status_url(&server)), &detection).unwrap();
    let err = manager.ensure_authenticated().await.unwrap_err();

    assert!(matches!(
        err,
        Error::AuthExhausted {
            kind: AuthFailureKind::SessionRejected,
            ..
        }
    ));
    assert!(err.to_string().contains("log out and back in"));
    assert!(manager.cache().is_empty().await);
}

#[tokio::test]
async fn test_headless_without_candidates_asks_for_manual_input() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STATUS_PATH))
        .and(header("authorization", "Bearer typed-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let home = FakeHome::new();
    let detection = detect(&home, &Browser::ALL);
    assert!(detection.candidates.is_empty());

    let mut settings = create_test_settings(&status_url(&server));
    settings.interactive.prompts_enabled = true;
    let validator = HttpStatusValidator::from_settings(&settings).unwrap();
    let operator = TerminalOperator::with_input(
        Cursor::new(b"2\ntyped-token\n\nu-7\ns-7\n".to_vec()),
        false,
    );
    let manager =
        AuthManagerGeneric::with_components(settings, detection.candidates, validator, operator);

    let headers = manager.ensure_authenticated().await.unwrap();
    assert_eq!(headers.authorization, "Bearer typed-token");
    assert_eq!(
        manager.fallback().history(),
        vec![
            FallbackState::Idle,
            FallbackState::Discovering,
            FallbackState::NeedsManualInput,
            FallbackState::Resolved
        ]
    );
}

#[tokio::test]
async fn test_concurrent_callers_share_one_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STATUS_PATH))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&server)
        .await;

    let home = FakeHome::new();
    home.chrome_profile(
        "Default",
        &[
            (".mubi.com", "_session", &session_cookie("shared", "1", "a")),
            (".mubi.com", "remember_token", "r"),
        ],
    );
    let detection = detect(&home, &[Browser::Chrome]);
    let manager = Arc::new(
        AuthManager::new(create_test_settings(&status_url(&server)), &detection).unwrap(),
    );

    let (first, second) = tokio::join!(
        manager.ensure_authenticated(),
        manager.ensure_authenticated()
    );

    assert_eq!(first.unwrap(), second.unwrap());
    assert_eq!(manager.fallback().completed_attempts(), 1);
}

#[tokio::test]
async fn test_heartbeat_rejection_clears_cache_and_runs_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STATUS_PATH))
        .respond_with(ResponseTemplate::new(200))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(STATUS_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let home = FakeHome::new();
    home.chrome_profile(
        "Default",
        &[
            (".mubi.com", "_session", &session_cookie("revoked", "1", "a")),
            (".mubi.com", "remember_token", "r"),
        ],
    );
    let detection = detect(&home, &[Browser::Chrome]);
    let manager = Arc::new(
        AuthManager::new(create_test_settings(&status_url(&server)), &detection).unwrap(),
    );
    manager.ensure_authenticated().await.unwrap();

    let mut heartbeat = Heartbeat::new(Arc::clone(&manager));
    let event = heartbeat.tick(&CancellationToken::new()).await;

    assert_eq!(
        event,
        HeartbeatEvent::Exhausted {
            trigger: FallbackTrigger::Rejected
        }
    );
    assert!(manager.cache().is_empty().await);
    assert_eq!(manager.fallback().completed_attempts(), 2);
}

#[tokio::test]
async fn test_spawned_heartbeat_escalates_within_interval_and_stops() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STATUS_PATH))
        .respond_with(ResponseTemplate::new(200))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(STATUS_PATH))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let home = FakeHome::new();
    home.chrome_profile(
        "Default",
        &[
            (".mubi.com", "_session", &session_cookie("revoked", "1", "a")),
            (".mubi.com", "remember_token", "r"),
        ],
    );
    let detection = detect(&home, &[Browser::Chrome]);
    let mut settings = create_test_settings(&status_url(&server));
    settings.validation.heartbeat_interval_secs = 1;
    let manager = Arc::new(AuthManager::new(settings, &detection).unwrap());
    manager.ensure_authenticated().await.unwrap();

    let shutdown = CancellationToken::new();
    let handle = manager.spawn_heartbeat(shutdown.clone());

    let escalated = tokio::time::timeout(Duration::from_secs(5), async {
        while manager.fallback().completed_attempts() < 2 {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await;
    assert!(escalated.is_ok(), "heartbeat did not run the fallback chain");
    assert!(manager.cache().is_empty().await);

    shutdown.cancel();
    let stopped = tokio::time::timeout(Duration::from_secs(2), handle).await;
    assert!(matches!(stopped, Ok(Ok(()))));
}
