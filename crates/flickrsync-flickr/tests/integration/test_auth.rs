//! Integration tests for the OAuth authorization flow and token check

use flickrsync_flickr::auth::{check_login, AuthorizationFlow};
use flickrsync_flickr::ConsumerCredentials;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common;

fn flow_for(server: &MockServer) -> AuthorizationFlow {
    AuthorizationFlow::with_base_url(
        ConsumerCredentials::new("test-key", "test-secret"),
        format!("{}/services/oauth", server.uri()),
    )
}

async fn mount_request_token(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/services/oauth/request_token"))
        .and(query_param("oauth_callback", "oob"))
        .and(query_param("oauth_consumer_key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "oauth_callback_confirmed=true&oauth_token=req-tok&oauth_token_secret=req-sec",
        ))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_authorization_flow() {
    let server = MockServer::start().await;
    mount_request_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/services/oauth/access_token"))
        .and(query_param("oauth_token", "req-tok"))
        .and(query_param("oauth_verifier", "123-456-789"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "fullname=Jane%20Doe&oauth_token=acc-tok&oauth_token_secret=acc-sec&user_nsid=12345%40N01&username=jane",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let flow = flow_for(&server);
    let pending = flow.start().await.unwrap();
    assert_eq!(pending.request_token.token, "req-tok");
    assert_eq!(pending.request_token.token_secret, "req-sec");
    assert!(pending
        .authorize_url
        .starts_with(&format!("{}/services/oauth/authorize?", server.uri())));
    assert!(pending.authorize_url.contains("oauth_token=req-tok"));
    assert!(pending.authorize_url.contains("perms=delete"));

    let account = flow.complete(&pending, " 123-456-789\n").await.unwrap();
    assert_eq!(account.token.token, "acc-tok");
    assert_eq!(account.token.token_secret, "acc-sec");
    assert_eq!(account.user_nsid.as_deref(), Some("12345@N01"));
    assert_eq!(account.username.as_deref(), Some("jane"));
}

#[tokio::test]
async fn test_rejected_verifier_fails() {
    let server = MockServer::start().await;
    mount_request_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/services/oauth/access_token"))
        .respond_with(
            ResponseTemplate::new(401).set_body_string("oauth_problem=token_rejected"),
        )
        .mount(&server)
        .await;

    let flow = flow_for(&server);
    let pending = flow.start().await.unwrap();
    let err = flow.complete(&pending, "000-000-000").await.unwrap_err();
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn test_empty_verifier_makes_no_request() {
    let server = MockServer::start().await;
    mount_request_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/services/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let flow = flow_for(&server);
    let pending = flow.start().await.unwrap();
    assert!(flow.complete(&pending, "   ").await.is_err());
}

#[tokio::test]
async fn test_check_login_reports_user() {
    let server = MockServer::start().await;
    common::mount_rest(
        &server,
        "flickr.test.login",
        serde_json::json!({
            "user": {"id": "12345@N01", "username": {"_content": "jane"}},
            "stat": "ok"
        }),
    )
    .await;

    let user = check_login(&common::client_for(&server)).await.unwrap();
    assert_eq!(user.id, "12345@N01");
    assert_eq!(user.username, "jane");
}

#[tokio::test]
async fn test_check_login_with_revoked_token_fails() {
    let server = MockServer::start().await;
    common::mount_rest(
        &server,
        "flickr.test.login",
        serde_json::json!({"stat": "fail", "code": 98, "message": "Invalid auth token"}),
    )
    .await;

    assert!(check_login(&common::client_for(&server)).await.is_err());
}
