use anyhow::Result;
use httpmock::prelude::*;
use httpmock::Mock;
use sxm_rs::{SxmClient, SxmError};
use tempfile::TempDir;

const USERNAME: &str = "someone@example.com";
const PASSWORD: &str = "hunter2";

const PLAYER_HTML: &str = r#"<html><head>
<script id="hydrated_data" type="application/json">{"config":{"env":"test","regions":["US"]},"user":{}}</script>
</head><body></body></html>"#;

fn test_client(server: &MockServer) -> SxmClient {
    SxmClient::with_base_urls(USERNAME, PASSWORD, server.base_url(), server.url("/player"))
}

fn mock_player_page(server: &MockServer) -> Mock<'_> {
    server.mock(|when, then| {
        when.method(GET).path("/player");
        then.status(200)
            .header("Content-Type", "text/html")
            .body(PLAYER_HTML);
    })
}

/// Mocks for the five-step authentication chain, in chain order.
fn mock_auth_chain<'a>(server: &'a MockServer, expires_at: &str) -> Vec<Mock<'a>> {
    vec![
        server.mock(|when, then| {
            when.method(POST).path("/device/v1/devices");
            then.status(200)
                .json_body(serde_json::json!({ "grant": "device-grant-1" }));
        }),
        server.mock(|when, then| {
            when.method(POST)
                .path("/session/v1/sessions/anonymous")
                .header("authorization", "Bearer device-grant-1")
                .body("true");
            then.status(200)
                .json_body(serde_json::json!({ "accessToken": "anon-token-1" }));
        }),
        server.mock(|when, then| {
            when.method(GET)
                .path("/identity/v1/identities/status")
                .query_param("handle", USERNAME)
                .header("authorization", "Bearer anon-token-1");
            then.status(200)
                .json_body(serde_json::json!({ "hasPassword": true }));
        }),
        server.mock(|when, then| {
            when.method(POST)
                .path("/identity/v1/identities/authenticate/password")
                .header("authorization", "Bearer anon-token-1")
                .json_body(serde_json::json!({
                    "handle": USERNAME,
                    "password": PASSWORD,
                }));
            then.status(200)
                .json_body(serde_json::json!({ "grant": "auth-grant-1" }));
        }),
        server.mock(|when, then| {
            when.method(POST)
                .path("/session/v1/sessions/authenticated")
                .header("authorization", "Bearer auth-grant-1")
                .body("true");
            then.status(200).json_body(serde_json::json!({
                "accessToken": "access-token-1",
                "accessTokenExpiresAt": expires_at,
            }));
        }),
    ]
}

#[tokio::test]
async fn test_connect_runs_full_chain() -> Result<()> {
    let server = MockServer::start();
    let chain = mock_auth_chain(&server, "2099-01-01T00:00:00Z");
    let player = mock_player_page(&server);

    let client = test_client(&server);
    client.connect().await?;

    for mock in &chain {
        mock.assert();
    }
    player.assert();

    let config = client.web_config().await.expect("config loaded");
    assert_eq!(config["env"], "test");
    Ok(())
}

#[tokio::test]
async fn test_authenticated_requests_carry_bearer_token() -> Result<()> {
    let server = MockServer::start();
    mock_auth_chain(&server, "2099-01-01T00:00:00Z");
    mock_player_page(&server);

    let library_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/ondemand/v1/library/all")
            .header("authorization", "Bearer access-token-1");
        then.status(200)
            .json_body(serde_json::json!({ "allDataMap": { "e1": { "id": "e1" } } }));
    });

    let client = test_client(&server);
    client.connect().await?;

    let library = client.get_library().await?;
    library_mock.assert();
    assert_eq!(library.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_expired_token_triggers_reauthentication() -> Result<()> {
    let server = MockServer::start();

    // First authentication hands out a token that is already expired.
    let chain = mock_auth_chain(&server, "2000-01-01T00:00:00Z");
    mock_player_page(&server);

    let client = test_client(&server);
    client.connect().await?;

    // Replace the session mock so the re-run yields a fresh token.
    let mut chain = chain;
    let mut session_mock = chain.pop().expect("session mock");
    session_mock.delete();
    server.mock(|when, then| {
        when.method(POST)
            .path("/session/v1/sessions/authenticated")
            .header("authorization", "Bearer auth-grant-1");
        then.status(200).json_body(serde_json::json!({
            "accessToken": "access-token-2",
            "accessTokenExpiresAt": "2099-01-01T00:00:00Z",
        }));
    });

    let library_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/ondemand/v1/library/all")
            .header("authorization", "Bearer access-token-2");
        then.status(200)
            .json_body(serde_json::json!({ "allDataMap": {} }));
    });

    let library = client.get_library().await?;
    assert!(library.is_empty());
    library_mock.assert();

    // The device session is created once and re-used by every re-run.
    assert_eq!(chain[0].hits(), 1);
    assert!(chain[1].hits() > 1);
    Ok(())
}

#[tokio::test]
async fn test_connect_rejects_passwordless_user() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/device/v1/devices");
        then.status(200)
            .json_body(serde_json::json!({ "grant": "device-grant-1" }));
    });
    server.mock(|when, then| {
        when.method(POST).path("/session/v1/sessions/anonymous");
        then.status(200)
            .json_body(serde_json::json!({ "accessToken": "anon-token-1" }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/identity/v1/identities/status");
        then.status(200)
            .json_body(serde_json::json!({ "hasPassword": false }));
    });

    let client = test_client(&server);
    let err = client.connect().await.unwrap_err();

    match err {
        SxmError::AuthenticationError { handle, message } => {
            assert_eq!(handle, USERNAME);
            assert!(message.contains("password"));
        }
        other => panic!("expected AuthenticationError, got {:?}", other.to_string()),
    }
}

#[tokio::test]
async fn test_device_registration_failure_is_a_request_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/device/v1/devices");
        then.status(500);
    });

    let client = test_client(&server);
    let err = client.connect().await.unwrap_err();
    assert!(matches!(err, SxmError::RequestError { .. }));
}

#[tokio::test]
async fn test_chain_failure_is_wrapped_as_authentication_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/device/v1/devices");
        then.status(200)
            .json_body(serde_json::json!({ "grant": "device-grant-1" }));
    });
    server.mock(|when, then| {
        when.method(POST).path("/session/v1/sessions/anonymous");
        then.status(503);
    });

    let client = test_client(&server);
    let err = client.connect().await.unwrap_err();

    match err {
        SxmError::AuthenticationError { handle, .. } => assert_eq!(handle, USERNAME),
        other => panic!("expected AuthenticationError, got {:?}", other.to_string()),
    }
}

#[tokio::test]
async fn test_refresh_config_dumps_hydrated_data() -> Result<()> {
    let server = MockServer::start();
    mock_auth_chain(&server, "2099-01-01T00:00:00Z");
    mock_player_page(&server);

    let client = test_client(&server);
    client.connect().await?;

    let temp_dir = TempDir::new()?;
    let dump_path = temp_dir.path().join("hydrated.json");
    client.refresh_config(Some(&dump_path)).await?;

    let dumped: serde_json::Value = serde_json::from_slice(&std::fs::read(&dump_path)?)?;
    assert_eq!(dumped["config"]["env"], "test");
    assert!(dumped.get("user").is_some());
    Ok(())
}

#[tokio::test]
async fn test_player_page_without_hydrated_data_yields_empty_config() -> Result<()> {
    let server = MockServer::start();
    mock_auth_chain(&server, "2099-01-01T00:00:00Z");
    server.mock(|when, then| {
        when.method(GET).path("/player");
        then.status(200)
            .header("Content-Type", "text/html")
            .body("<html><body>maintenance</body></html>");
    });

    let client = test_client(&server);
    client.connect().await?;

    let config = client.web_config().await.expect("config stored");
    assert_eq!(config, serde_json::json!({}));
    Ok(())
}
