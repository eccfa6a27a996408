//! Shared test helpers for Flickr API integration tests
//!
//! Provides wiremock-based mock server setup. Each helper returns a client
//! or gateway pointing at the mock server with pacing disabled.

use std::path::PathBuf;
use std::time::Duration;

use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use flickrsync_flickr::rate_limit::RequestPacer;
use flickrsync_flickr::{ConsumerCredentials, FlickrClient, FlickrGateway, OAuthToken};

pub const REST_PATH: &str = "/services/rest/";
pub const UPLOAD_PATH: &str = "/services/upload/";

/// Builds a client against the mock server with no pacing
pub fn client_for(server: &MockServer) -> FlickrClient {
    let token = OAuthToken {
        token: "test-token".into(),
        token_secret: "test-token-secret".into(),
    };
    FlickrClient::new(ConsumerCredentials::new("test-key", "test-secret"), token)
        .with_endpoints(
            format!("{}{}", server.uri(), REST_PATH),
            format!("{}{}", server.uri(), UPLOAD_PATH),
        )
        .with_pacer(RequestPacer::disabled())
}

/// Starts a mock server and returns it with a gateway whose upload retry
/// back-off is short enough for tests
pub async fn setup_gateway() -> (MockServer, FlickrGateway) {
    let server = MockServer::start().await;
    let gateway = FlickrGateway::new(client_for(&server))
        .with_upload_tags(vec!["flickrsync".to_string()])
        .with_upload_retry_delay(Duration::from_millis(10));
    (server, gateway)
}

/// Mounts a REST method reply
pub async fn mount_rest(server: &MockServer, flickr_method: &str, reply: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path(REST_PATH))
        .and(body_string_contains(format!("method={flickr_method}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply))
        .mount(server)
        .await;
}

/// XML reply of a successful upload
pub fn upload_ok(photo_id: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n<rsp stat=\"ok\">\n<photoid>{photo_id}</photoid>\n</rsp>\n"
    ))
}

/// Writes a small fake JPEG into `dir` and returns its path
pub fn write_photo(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    let file = dir.path().join(name);
    std::fs::write(&file, b"fake-jpeg-bytes").unwrap();
    file
}
