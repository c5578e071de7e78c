// client_test.rs

#[cfg(test)]
mod tests {
    use eero::{EeroClient, EeroError};
    use mockito::{Matcher, Server, ServerGuard};
    use reqwest::Method;
    use serde_json::json;
    use std::sync::Arc;

    fn create_test_client(server: &ServerGuard) -> EeroClient {
        EeroClient::builder().base_url(server.url()).build().unwrap()
    }

    fn envelope(data: serde_json::Value) -> String {
        json!({
            "meta": {"code": 200, "server_time": "2024-06-01T12:00:00Z"},
            "data": data
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_login_stores_user_token() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/login")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({"login": "test@example.com"})))
            .with_status(200)
            .with_body(envelope(json!({"user_token": "mock_token_abc123"})))
            .create_async()
            .await;

        let client = create_test_client(&server);
        let resp = client.login("test@example.com").await.unwrap();
        assert_eq!(resp.user_token, "mock_token_abc123");
    }

    #[tokio::test]
    async fn test_verify_sends_code() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/login/verify")
            .match_body(Matcher::Json(json!({"code": "123456"})))
            .with_status(200)
            .with_body(envelope(json!({})))
            .create_async()
            .await;

        let client = create_test_client(&server);
        client.verify("123456").await.unwrap();
    }

    #[tokio::test]
    async fn test_get_account() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/account")
            .match_header("user-agent", eero::DEFAULT_USER_AGENT)
            .with_status(200)
            .with_body(envelope(json!({
                "name": "Jo Example",
                "networks": {
                    "count": 1,
                    "data": [{"url": "/2.2/networks/12345", "name": "Home"}]
                }
            })))
            .create_async()
            .await;

        let client = create_test_client(&server);
        let account = client.get_account().await.unwrap();
        assert_eq!(account.name, "Jo Example");
        assert_eq!(account.networks.data[0].url, "/2.2/networks/12345");
    }

    #[tokio::test]
    async fn test_get_network_via_relative_url() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/2.2/networks/12345")
            .with_status(200)
            .with_body(envelope(json!({
                "name": "Home Mesh",
                "status": "online",
                "speed": {
                    "down": {"value": 850.5, "units": "Mbps"},
                    "up": {"value": 940.2, "units": "Mbps"}
                }
            })))
            .create_async()
            .await;

        // The relative URL carries its own version prefix, so the client must
        // resolve it against the origin, not the base URL.
        let client = EeroClient::builder().base_url(format!("{}/2.2", server.url())).build().unwrap();
        let network = client.get_network("/2.2/networks/12345").await.unwrap();

        assert_eq!(network.name, "Home Mesh");
        assert_eq!(network.status, "online");
        assert_eq!(network.speed.down.value, 850.5);
    }

    #[tokio::test]
    async fn test_pause_profile() {
        let mut server = Server::new_async().await;
        server
            .mock("PUT", "/2.2/networks/12345/profiles/678")
            .match_body(Matcher::Json(json!({"paused": true})))
            .with_status(200)
            .with_body(envelope(json!({"paused": true})))
            .create_async()
            .await;

        let client = EeroClient::builder().base_url(format!("{}/2.2", server.url())).build().unwrap();
        client.pause_profile("/2.2/networks/12345/profiles/678").await.unwrap();
    }

    #[tokio::test]
    async fn test_list_devices_empty_data() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/2.2/networks/12345/devices")
            .with_status(200)
            .with_body(envelope(json!([])))
            .create_async()
            .await;

        let client = EeroClient::builder().base_url(format!("{}/2.2", server.url())).build().unwrap();
        let devices = client.list_devices("/2.2/networks/12345").await.unwrap();
        assert!(devices.is_empty());
    }

    #[tokio::test]
    async fn test_http_error_classification() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/account")
            .with_status(500)
            .with_body(json!({"meta": {"code": 500, "error": "Internal Server Error"}, "data": {}}).to_string())
            .create_async()
            .await;

        let client = create_test_client(&server);
        let err = client.get_account().await.unwrap_err();

        let api_err = err.as_api_error().expect("expected an API error");
        assert_eq!(api_err.http_status, 500);
        assert_eq!(api_err.code, 500);
        assert_eq!(api_err.message, "Internal Server Error");
        assert!(!err.is_auth_error());
    }

    #[tokio::test]
    async fn test_auth_error_from_http_status() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/account")
            .with_status(401)
            .with_body(json!({"meta": {"code": 401, "error": "unauthorized"}}).to_string())
            .create_async()
            .await;

        let client = create_test_client(&server);
        let err = client.get_account().await.unwrap_err();
        assert!(err.is_auth_error());
    }

    #[tokio::test]
    async fn test_auth_error_from_meta_code_only() {
        // HTTP 200 but the application-level code reports an expired session.
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/account")
            .with_status(200)
            .with_body(json!({"meta": {"code": 401, "error": "session expired"}}).to_string())
            .create_async()
            .await;

        let client = create_test_client(&server);
        let err = client.get_account().await.unwrap_err();

        let api_err = err.as_api_error().unwrap();
        assert_eq!(api_err.http_status, 200);
        assert_eq!(api_err.code, 401);
        assert!(err.is_auth_error());
    }

    #[tokio::test]
    async fn test_unparseable_body_is_redacted() {
        let body = "Invalid JSON body with SENSITIVE_API_KEY_12345";
        let mut server = Server::new_async().await;
        server.mock("GET", "/account").with_status(200).with_body(body).create_async().await;

        let client = create_test_client(&server);
        let err = client.get_account().await.unwrap_err();

        let api_err = err.as_api_error().expect("expected an API error");
        assert_eq!(api_err.http_status, 200);
        assert_eq!(api_err.code, 200);
        assert_eq!(api_err.message, format!("unparseable response body ({} bytes)", body.len()));
        assert!(!err.to_string().contains("SENSITIVE_API_KEY_12345"));
    }

    #[tokio::test]
    async fn test_data_null_and_absent_are_tolerated() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/null-data")
            .with_status(200)
            .with_body(json!({"meta": {"code": 200}, "data": null}).to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/no-data")
            .with_status(200)
            .with_body(json!({"meta": {"code": 200}}).to_string())
            .create_async()
            .await;

        let client = create_test_client(&server);

        let req = client.new_request(Method::GET, "/null-data", None::<&()>).unwrap();
        let decoded: Option<eero::Account> = client.execute_data(req).await.unwrap();
        assert!(decoded.is_none());

        let req = client.new_request(Method::GET, "/no-data", None::<&()>).unwrap();
        let decoded: Option<eero::Account> = client.execute_data(req).await.unwrap();
        assert!(decoded.is_none());
    }

    #[tokio::test]
    async fn test_data_empty_object_is_not_a_decode_error() {
        #[derive(Debug, serde::Deserialize)]
        struct Strict {
            #[allow(dead_code)]
            required: String,
        }

        let mut server = Server::new_async().await;
        server
            .mock("GET", "/empty-data")
            .with_status(200)
            .with_body(envelope(json!({})))
            .create_async()
            .await;

        let client = create_test_client(&server);
        let req = client.new_request(Method::GET, "/empty-data", None::<&()>).unwrap();
        let decoded: Option<Strict> = client.execute_data(req).await.unwrap();
        assert!(decoded.is_none());
    }

    #[tokio::test]
    async fn test_data_shape_mismatch_is_a_decode_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/bad-shape")
            .with_status(200)
            .with_body(envelope(json!({"user_token": 42})))
            .create_async()
            .await;

        let client = create_test_client(&server);
        let req = client.new_request(Method::GET, "/bad-shape", None::<&()>).unwrap();
        let err = client.execute_data::<eero::LoginResponse>(req).await.unwrap_err();
        assert!(matches!(err, EeroError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_cross_host_relative_url_is_refused() {
        let client = EeroClient::builder().base_url("https://api.example.com/2.2").build().unwrap();

        let err = client
            .new_request_from_url(Method::GET, "https://attacker.example.com/x", None::<&()>)
            .unwrap_err();

        match err {
            EeroError::CrossHostTarget { expected, actual } => {
                assert_eq!(expected, "api.example.com");
                assert_eq!(actual, "attacker.example.com");
            }
            other => panic!("expected CrossHostTarget, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_same_host_absolute_reference_is_allowed() {
        let client = EeroClient::builder().base_url("https://api.example.com/2.2").build().unwrap();
        let req = client
            .new_request_from_url(Method::GET, "https://api.example.com/2.2/networks/1", None::<&()>)
            .unwrap();
        assert_eq!(req.url().as_str(), "https://api.example.com/2.2/networks/1");
    }

    #[tokio::test]
    async fn test_prefix_mode_preserves_query_strings() {
        let client = EeroClient::builder().base_url("https://api.example.com/2.2").build().unwrap();
        let req = client.new_request(Method::GET, "/networks?limit=10", None::<&()>).unwrap();
        assert_eq!(req.url().as_str(), "https://api.example.com/2.2/networks?limit=10");
    }

    #[tokio::test]
    async fn test_same_host_redirect_is_followed() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/start")
            .with_status(302)
            .with_header("Location", "/final")
            .create_async()
            .await;
        server
            .mock("GET", "/final")
            .with_status(200)
            .with_body(envelope(json!({})))
            .create_async()
            .await;

        let client = create_test_client(&server);
        let req = client.new_request(Method::GET, "/start", None::<&()>).unwrap();
        client.execute(req).await.unwrap();
    }

    #[tokio::test]
    async fn test_cross_host_redirect_is_refused() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/offsite")
            .with_status(302)
            .with_header("Location", "http://evil.invalid/x")
            .create_async()
            .await;

        let client = create_test_client(&server);
        let req = client.new_request(Method::GET, "/offsite", None::<&()>).unwrap();
        let err = client.execute(req).await.unwrap_err();
        assert!(matches!(err, EeroError::Transport(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_redirect_loop_is_capped() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/loop")
            .with_status(302)
            .with_header("Location", "/loop")
            .create_async()
            .await;

        let client = create_test_client(&server);
        let req = client.new_request(Method::GET, "/loop", None::<&()>).unwrap();
        let err = client.execute(req).await.unwrap_err();
        assert!(matches!(err, EeroError::Transport(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_oversized_body_is_capped() {
        let cap = 5 * 1024 * 1024;
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/account")
            .with_status(200)
            .with_body("x".repeat(6 * 1024 * 1024))
            .create_async()
            .await;

        let client = create_test_client(&server);
        let err = client.get_account().await.unwrap_err();

        // Reading stops at the cap; the truncated body then fails envelope
        // parsing with a byte count no larger than the cap.
        let api_err = err.as_api_error().expect("expected an API error");
        assert_eq!(api_err.message, format!("unparseable response body ({} bytes)", cap));
    }

    #[tokio::test]
    async fn test_transport_error_is_not_an_api_error() {
        // Nothing listens on port 1.
        let client = EeroClient::builder().base_url("http://127.0.0.1:1").timeout_secs(5).build().unwrap();
        let err = client.get_account().await.unwrap_err();
        assert!(matches!(err, EeroError::Transport(_)), "got {err:?}");
        assert!(err.as_api_error().is_none());
    }

    #[tokio::test]
    async fn test_set_base_url_repoints_requests() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/account")
            .with_status(200)
            .with_body(envelope(json!({"name": "after"})))
            .create_async()
            .await;

        let client = EeroClient::new().unwrap();
        client.set_base_url(server.url());

        let account = client.get_account().await.unwrap();
        assert_eq!(account.name, "after");

        // The derived origin follows the new base URL.
        let req = client.new_request_from_url(Method::GET, "/2.2/networks/1", None::<&()>).unwrap();
        assert_eq!(req.url().host_str(), Some("127.0.0.1"));
    }

    #[tokio::test]
    async fn test_session_token_round_trip() {
        let client = EeroClient::builder().base_url("https://api-user.e2ro.com/2.2").build().unwrap();
        client.set_session_token("abc123").unwrap();
        assert_eq!(client.session_token().as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_set_session_token_invalid_base_url() {
        let client = EeroClient::new().unwrap();
        client.set_base_url("not a url");
        let err = client.set_session_token("token").unwrap_err();
        assert!(matches!(err, EeroError::InvalidUrl(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_calls_share_one_client() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/account")
            .with_status(200)
            .with_body(envelope(json!({"name": "shared"})))
            .create_async()
            .await;

        let client = Arc::new(create_test_client(&server));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let client = Arc::clone(&client);
            handles.push(tokio::spawn(async move { client.get_account().await }));
        }

        for handle in handles {
            let account = handle.await.unwrap().unwrap();
            assert_eq!(account.name, "shared");
        }
    }
}
