use httpmock::prelude::*;
use michi::api::{ApiClient, ApiResponse, Auth, ClientConfig, EmptyResponse};
use michi::credentials::{CredentialStore, MemoryCredentialStore, ACCESS_TOKEN_KEY};
use michi::error::ApiError;
use michi::models::{Account, ChatTone, ToneUpdate};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const TOKEN: &str = "test-token";

fn client_for(server: &MockServer) -> ApiClient {
    let store = Arc::new(MemoryCredentialStore::with_access_token(TOKEN));
    ApiClient::new(ClientConfig::new(server.base_url()), store).unwrap()
}

fn anonymous_client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(
        ClientConfig::new(server.base_url()),
        Arc::new(MemoryCredentialStore::new()),
    )
    .unwrap()
}

#[test]
fn test_resolve_relative_endpoint_appends_to_base() {
    let client = ApiClient::new(
        ClientConfig::new("http://localhost:8000"),
        Arc::new(MemoryCredentialStore::new()),
    )
    .unwrap();

    for path in ["/accounts", "/transactions/recent", "/analytics/spending?period=week"] {
        let url = client.resolve(path).unwrap();
        assert_eq!(url.as_str(), format!("http://localhost:8000{}", path));
    }
}

#[test]
fn test_resolve_absolute_endpoint_is_unchanged() {
    let client = ApiClient::new(ClientConfig::default(), Arc::new(MemoryCredentialStore::new()))
        .unwrap();

    let url = client.resolve("https://api.michi.app/accounts?limit=5").unwrap();
    assert_eq!(url.as_str(), "https://api.michi.app/accounts?limit=5");
}

#[test]
fn test_resolve_writes_shared_slash_once() {
    let client = ApiClient::new(
        ClientConfig::new("http://localhost:8000/"),
        Arc::new(MemoryCredentialStore::new()),
    )
    .unwrap();
    assert_eq!(client.base_origin(), "http://localhost:8000/");
    assert_eq!(
        client.resolve("/budgets").unwrap().as_str(),
        "http://localhost:8000/budgets"
    );
}

#[test]
fn test_resolve_keeps_base_path() {
    let client = ApiClient::new(
        ClientConfig::new("http://h.example/api/"),
        Arc::new(MemoryCredentialStore::new()),
    )
    .unwrap();

    assert_eq!(
        client.resolve("accounts").unwrap().as_str(),
        "http://h.example/api/accounts"
    );
    assert_eq!(
        client.resolve("/accounts").unwrap().as_str(),
        "http://h.example/api/accounts"
    );

    let no_slash = ApiClient::new(
        ClientConfig::new("http://h.example/api"),
        Arc::new(MemoryCredentialStore::new()),
    )
    .unwrap();
    assert_eq!(
        no_slash.resolve("/accounts").unwrap().as_str(),
        "http://h.example/api/accounts"
    );
}

#[test]
fn test_resolve_absolute_endpoint_is_normalized_not_rewritten() {
    let client = ApiClient::new(ClientConfig::default(), Arc::new(MemoryCredentialStore::new()))
        .unwrap();

    let url = client.resolve("HTTP://Api.Michi.App").unwrap();
    assert_eq!(url, url::Url::parse("http://api.michi.app/").unwrap());
    assert_eq!(url.host_str(), Some("api.michi.app"));
}

#[test]
fn test_resolve_malformed_endpoint_fails() {
    let client = ApiClient::new(ClientConfig::default(), Arc::new(MemoryCredentialStore::new()))
        .unwrap();

    assert!(matches!(
        client.resolve("http://[::1"),
        Err(ApiError::InvalidEndpoint(_))
    ));
    assert!(matches!(
        client.resolve("ftp://files.example.com/statement.csv"),
        Err(ApiError::InvalidEndpoint(_))
    ));
    // No leading slash: glued onto the port, which is not a number.
    assert!(matches!(
        client.resolve("accounts"),
        Err(ApiError::InvalidEndpoint(_))
    ));
}

#[tokio::test]
async fn test_get_accounts_decodes_envelope() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/accounts")
                .header("Authorization", "Bearer test-token");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "data": [{"current_balance": 100.5}],
                    "message": null,
                    "success": true
                }));
        })
        .await;

    let response: ApiResponse<Vec<Account>> =
        client_for(&server).get("/accounts", Auth::Required).await.unwrap();

    assert!(response.success);
    assert_eq!(response.message, None);
    assert_eq!(response.data.len(), 1);
    assert_eq!(response.data[0].current_balance, Some(100.5));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_missing_credential_fails_before_any_request() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.any_request();
            then.status(200).json_body(json!({"data": [], "success": true}));
        })
        .await;
    let client = anonymous_client_for(&server);

    let get: Result<ApiResponse<Vec<Account>>, _> = client.get("/accounts", Auth::Required).await;
    assert!(matches!(get, Err(ApiError::Unauthorized)));

    let put: Result<EmptyResponse, _> = client
        .put(
            "/user/preferences",
            &ToneUpdate {
                chat_tone: ChatTone::Direct,
            },
            Auth::Required,
        )
        .await;
    assert!(matches!(put, Err(ApiError::Unauthorized)));

    let delete = client.delete("/chat/history", Auth::Required).await;
    assert!(matches!(delete, Err(ApiError::Unauthorized)));

    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn test_empty_token_counts_as_missing() {
    let server = MockServer::start_async().await;
    let store = Arc::new(MemoryCredentialStore::new());
    store.set(ACCESS_TOKEN_KEY, "").unwrap();
    let client = ApiClient::new(ClientConfig::new(server.base_url()), store).unwrap();

    let result: Result<serde_json::Value, _> = client.get("/accounts", Auth::Required).await;
    assert!(matches!(result, Err(ApiError::Unauthorized)));
}

#[tokio::test]
async fn test_token_is_read_at_call_time() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/budgets")
                .header("Authorization", "Bearer rotated-token");
            then.status(200).json_body(json!({"data": [], "success": true}));
        })
        .await;

    let store = Arc::new(MemoryCredentialStore::with_access_token("old-token"));
    let client = ApiClient::new(ClientConfig::new(server.base_url()), store.clone()).unwrap();
    store.set(ACCESS_TOKEN_KEY, "rotated-token").unwrap();

    let response: ApiResponse<Vec<serde_json::Value>> =
        client.get("/budgets", Auth::Required).await.unwrap();
    assert!(response.data.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_anonymous_call_sends_no_authorization_header() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/health").header_missing("Authorization");
            then.status(200).json_body(json!({"status": "ok"}));
        })
        .await;

    let value: serde_json::Value = client_for(&server)
        .get("/health", Auth::Anonymous)
        .await
        .unwrap();
    assert_eq!(value["status"], "ok");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_401_is_unauthorized_even_without_auth() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/accounts");
            then.status(401).json_body(json!({"message": "token expired"}));
        })
        .await;

    let required: Result<serde_json::Value, _> =
        client_for(&server).get("/accounts", Auth::Required).await;
    assert!(matches!(required, Err(ApiError::Unauthorized)));

    let anonymous: Result<serde_json::Value, _> =
        client_for(&server).get("/accounts", Auth::Anonymous).await;
    assert!(matches!(anonymous, Err(ApiError::Unauthorized)));
}

#[tokio::test]
async fn test_server_error_carries_status_and_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/insights");
            then.status(503).json_body(json!({"message": "insights are recomputing"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/transactions");
            then.status(400)
                .json_body(json!({"error": "No access token. Link an account first."}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/budgets");
            then.status(502).body("<html>Bad Gateway</html>");
        })
        .await;
    let client = client_for(&server);

    match client.get::<serde_json::Value>("/insights", Auth::Required).await {
        Err(ApiError::ServerError { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message.as_deref(), Some("insights are recomputing"));
        }
        other => panic!("expected server error, got {:?}", other),
    }

    match client.get::<serde_json::Value>("/transactions", Auth::Required).await {
        Err(ApiError::ServerError { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(
                message.as_deref(),
                Some("No access token. Link an account first.")
            );
        }
        other => panic!("expected server error, got {:?}", other),
    }

    match client.get::<serde_json::Value>("/budgets", Auth::Required).await {
        Err(ApiError::ServerError { status, message }) => {
            assert_eq!(status, 502);
            assert_eq!(message, None);
        }
        other => panic!("expected server error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_status_classification() {
    let server = MockServer::start_async().await;
    for status in [200u16, 201, 204, 299, 400, 401, 403, 404, 418, 500, 599] {
        let path = format!("/status/{}", status);
        server
            .mock_async(|when, then| {
                when.method(DELETE).path(path.as_str());
                then.status(status);
            })
            .await;
    }
    let client = client_for(&server);

    for status in [200u16, 201, 204, 299, 400, 401, 403, 404, 418, 500, 599] {
        let result = client
            .delete(&format!("/status/{}", status), Auth::Required)
            .await;
        match status {
            200..=299 => assert!(result.is_ok(), "status {} should succeed", status),
            401 => assert!(matches!(result, Err(ApiError::Unauthorized))),
            _ => assert!(
                matches!(result, Err(ApiError::ServerError { status: s, .. }) if s == status),
                "status {} should be a server error",
                status
            ),
        }
    }
}

#[tokio::test]
async fn test_missing_data_key_is_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/accounts");
            then.status(200)
                .json_body(json!({"message": "ok", "success": true}));
        })
        .await;

    let result: Result<ApiResponse<Vec<Account>>, _> =
        client_for(&server).get("/accounts", Auth::Required).await;
    assert!(matches!(result, Err(ApiError::Decode(_))));
}

#[tokio::test]
async fn test_non_json_body_is_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/accounts");
            then.status(200).body("not json");
        })
        .await;

    let result: Result<serde_json::Value, _> =
        client_for(&server).get("/accounts", Auth::Required).await;
    assert!(matches!(result, Err(ApiError::Decode(_))));
}

#[tokio::test]
async fn test_empty_success_body_is_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/accounts");
            then.status(200);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(PUT).path("/user/preferences");
            then.status(200).body("");
        })
        .await;
    let client = client_for(&server);

    let result: Result<ApiResponse<Vec<Account>>, _> = client.get("/accounts", Auth::Required).await;
    assert!(matches!(result, Err(ApiError::Decode(_))));

    let result: Result<EmptyResponse, _> = client
        .put(
            "/user/preferences",
            &ToneUpdate {
                chat_tone: ChatTone::Direct,
            },
            Auth::Required,
        )
        .await;
    assert!(matches!(result, Err(ApiError::Decode(_))));
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PreferencesPatch {
    chat_tone: ChatTone,
    notifications_enabled: bool,
}

#[tokio::test]
async fn test_put_sends_snake_case_json_body() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/user/preferences")
                .header("Content-Type", "application/json")
                .header("Authorization", "Bearer test-token")
                .json_body(json!({"chat_tone": "direct", "notifications_enabled": false}));
            then.status(200).json_body(json!({}));
        })
        .await;

    let body = PreferencesPatch {
        chat_tone: ChatTone::Direct,
        notifications_enabled: false,
    };
    let _: EmptyResponse = client_for(&server)
        .put("/user/preferences", &body, Auth::Required)
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_post_round_trips_field_names() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/user/preferences")
                .json_body(json!({"chat_tone": "neutral", "notifications_enabled": true}));
            then.status(201).json_body(json!({
                "data": {"chat_tone": "neutral", "currency": "USD", "notifications_enabled": true},
                "message": "saved",
                "success": true
            }));
        })
        .await;

    let body = PreferencesPatch {
        chat_tone: ChatTone::Neutral,
        notifications_enabled: true,
    };
    let response: ApiResponse<michi::models::UserPreferences> = client_for(&server)
        .post("/user/preferences", &body, Auth::Required)
        .await
        .unwrap();

    assert_eq!(response.data.chat_tone, ChatTone::Neutral);
    assert!(response.data.notifications_enabled);
    assert_eq!(response.data.currency, "USD");
    assert_eq!(response.message.as_deref(), Some("saved"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_absolute_endpoint_bypasses_base_origin() {
    let other = MockServer::start_async().await;
    let mock = other
        .mock_async(|when, then| {
            when.method(GET).path("/status");
            then.status(200).json_body(json!({"ok": true}));
        })
        .await;

    let client = ApiClient::new(
        ClientConfig::new("http://127.0.0.1:9"),
        Arc::new(MemoryCredentialStore::with_access_token(TOKEN)),
    )
    .unwrap();
    let value: serde_json::Value = client
        .get(&other.url("/status"), Auth::Required)
        .await
        .unwrap();
    assert_eq!(value["ok"], true);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_request_timeout_is_transport_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/accounts");
            then.status(200)
                .delay(Duration::from_millis(500))
                .json_body(json!({"data": [], "success": true}));
        })
        .await;

    let client = ApiClient::new(
        ClientConfig::new(server.base_url()).with_request_timeout(Duration::from_millis(50)),
        Arc::new(MemoryCredentialStore::with_access_token(TOKEN)),
    )
    .unwrap();

    let err = client
        .get::<ApiResponse<Vec<Account>>>("/accounts", Auth::Required)
        .await
        .unwrap_err();
    assert!(err.is_transport());
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Port 9 (discard) is not served in the test environment.
    let client = ApiClient::new(
        ClientConfig::new("http://127.0.0.1:9").with_request_timeout(Duration::from_secs(2)),
        Arc::new(MemoryCredentialStore::with_access_token(TOKEN)),
    )
    .unwrap();

    let err = client.delete("/chat/history", Auth::Required).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}
