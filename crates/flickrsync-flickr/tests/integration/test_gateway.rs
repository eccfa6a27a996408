//! Integration tests for FlickrGateway
//!
//! Verifies the IRemoteGateway contract against a wiremock Flickr:
//! upload with its single retry, photo deletion, album creation and the
//! "already in album" outcome.

use flickrsync_core::domain::{AlbumId, AlbumMembership, PhotoId, PhotoPath};
use flickrsync_core::ports::IRemoteGateway;
use flickrsync_flickr::FlickrError;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

// ============================================================================
// Upload tests
// ============================================================================

#[tokio::test]
async fn test_upload_returns_photo_id() {
    let (server, gateway) = common::setup_gateway().await;
    let dir = tempfile::tempdir().unwrap();
    let file = common::write_photo(&dir, "a.jpg");

    Mock::given(method("POST"))
        .and(path(common::UPLOAD_PATH))
        .and(body_string_contains("oauth_signature"))
        .and(body_string_contains("flickrsync"))
        .and(body_string_contains("fake-jpeg"))
        .respond_with(common::upload_ok("52900000001"))
        .expect(1)
        .mount(&server)
        .await;

    let photo_path = PhotoPath::new(file.to_string_lossy()).unwrap();
    let photo_id = gateway.upload_photo(&photo_path).await.unwrap();
    assert_eq!(photo_id.as_str(), "52900000001");
}

#[tokio::test]
async fn test_upload_retries_once_after_server_error() {
    let (server, gateway) = common::setup_gateway().await;
    let dir = tempfile::tempdir().unwrap();
    let file = common::write_photo(&dir, "a.jpg");

    Mock::given(method("POST"))
        .and(path(common::UPLOAD_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(common::UPLOAD_PATH))
        .respond_with(common::upload_ok("52900000002"))
        .expect(1)
        .mount(&server)
        .await;

    let photo_path = PhotoPath::new(file.to_string_lossy()).unwrap();
    let photo_id = gateway.upload_photo(&photo_path).await.unwrap();
    assert_eq!(photo_id.as_str(), "52900000002");
}

#[tokio::test]
async fn test_upload_gives_up_after_second_server_error() {
    let (server, gateway) = common::setup_gateway().await;
    let dir = tempfile::tempdir().unwrap();
    let file = common::write_photo(&dir, "a.jpg");

    Mock::given(method("POST"))
        .and(path(common::UPLOAD_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let photo_path = PhotoPath::new(file.to_string_lossy()).unwrap();
    let err = gateway.upload_photo(&photo_path).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FlickrError>(),
        Some(FlickrError::Http { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_upload_does_not_retry_api_error() {
    let (server, gateway) = common::setup_gateway().await;
    let dir = tempfile::tempdir().unwrap();
    let file = common::write_photo(&dir, "a.jpg");

    Mock::given(method("POST"))
        .and(path(common::UPLOAD_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<rsp stat=\"fail\">\n\t<err code=\"5\" msg=\"Filetype was not recognised\" />\n</rsp>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let photo_path = PhotoPath::new(file.to_string_lossy()).unwrap();
    let err = gateway.upload_photo(&photo_path).await.unwrap_err();
    let flickr_err = err.downcast_ref::<FlickrError>().unwrap();
    assert_eq!(flickr_err.code(), 5);
    assert!(err.to_string().contains("a.jpg"));
}

#[tokio::test]
async fn test_upload_missing_file_makes_no_request() {
    let (server, gateway) = common::setup_gateway().await;

    Mock::given(method("POST"))
        .and(path(common::UPLOAD_PATH))
        .respond_with(common::upload_ok("1"))
        .expect(0)
        .mount(&server)
        .await;

    let photo_path = PhotoPath::new("/nonexistent/flickrsync/a.jpg").unwrap();
    let err = gateway.upload_photo(&photo_path).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FlickrError>(),
        Some(FlickrError::Io { .. })
    ));
}

// ============================================================================
// Delete tests
// ============================================================================

#[tokio::test]
async fn test_delete_photo() {
    let (server, gateway) = common::setup_gateway().await;

    Mock::given(method("POST"))
        .and(path(common::REST_PATH))
        .and(body_string_contains("method=flickr.photos.delete"))
        .and(body_string_contains("photo_id=100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"stat": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    gateway
        .delete_photo(&PhotoId::new("100").unwrap())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_missing_photo_surfaces_code() {
    let (server, gateway) = common::setup_gateway().await;
    common::mount_rest(
        &server,
        "flickr.photos.delete",
        serde_json::json!({"stat": "fail", "code": 1, "message": "Photo \"100\" not found"}),
    )
    .await;

    let err = gateway
        .delete_photo(&PhotoId::new("100").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.downcast_ref::<FlickrError>().unwrap().code(), 1);
    assert!(err.to_string().contains("100"));
}

// ============================================================================
// Album tests
// ============================================================================

#[tokio::test]
async fn test_create_album_seeds_primary_photo() {
    let (server, gateway) = common::setup_gateway().await;

    Mock::given(method("POST"))
        .and(path(common::REST_PATH))
        .and(body_string_contains("method=flickr.photosets.create"))
        .and(body_string_contains("title=vacation"))
        .and(body_string_contains("primary_photo_id=200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "photoset": {"id": "72157000001", "url": "https://www.flickr.com/photos/me/sets/72157000001/"},
            "stat": "ok"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let album_id = gateway
        .create_album("vacation", &PhotoId::new("200").unwrap())
        .await
        .unwrap();
    assert_eq!(album_id.as_str(), "72157000001");
}

#[tokio::test]
async fn test_create_album_with_malformed_reply_fails() {
    let (server, gateway) = common::setup_gateway().await;
    common::mount_rest(
        &server,
        "flickr.photosets.create",
        serde_json::json!({"stat": "ok"}),
    )
    .await;

    let result = gateway
        .create_album("vacation", &PhotoId::new("200").unwrap())
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_add_to_album() {
    let (server, gateway) = common::setup_gateway().await;

    Mock::given(method("POST"))
        .and(path(common::REST_PATH))
        .and(body_string_contains("method=flickr.photosets.addPhoto"))
        .and(body_string_contains("photoset_id=g1"))
        .and(body_string_contains("photo_id=201"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"stat": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = gateway
        .add_to_album(&PhotoId::new("201").unwrap(), &AlbumId::new("g1").unwrap())
        .await
        .unwrap();
    assert_eq!(outcome, AlbumMembership::Added);
}

#[tokio::test]
async fn test_add_to_album_already_member_is_success() {
    let (server, gateway) = common::setup_gateway().await;
    common::mount_rest(
        &server,
        "flickr.photosets.addPhoto",
        serde_json::json!({"stat": "fail", "code": 3, "message": "Photo already in set"}),
    )
    .await;

    let photo = PhotoId::new("201").unwrap();
    let album = AlbumId::new("g1").unwrap();
    for _ in 0..2 {
        let outcome = gateway.add_to_album(&photo, &album).await.unwrap();
        assert_eq!(outcome, AlbumMembership::AlreadyMember);
    }
}

#[tokio::test]
async fn test_add_to_album_other_error_fails() {
    let (server, gateway) = common::setup_gateway().await;
    common::mount_rest(
        &server,
        "flickr.photosets.addPhoto",
        serde_json::json!({"stat": "fail", "code": 1, "message": "Photoset not found"}),
    )
    .await;

    let err = gateway
        .add_to_album(&PhotoId::new("201").unwrap(), &AlbumId::new("g1").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.downcast_ref::<FlickrError>().unwrap().code(), 1);
}

#[tokio::test]
async fn test_server_error_on_rest_call_is_http_error() {
    let (server, gateway) = common::setup_gateway().await;

    Mock::given(method("POST"))
        .and(path(common::REST_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let err = gateway
        .delete_photo(&PhotoId::new("100").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FlickrError>(),
        Some(FlickrError::Http { status: 503, .. })
    ));
}
