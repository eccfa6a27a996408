//! Flickr API client
//!
//! Provides a typed HTTP client for the two Flickr endpoints flickrsync uses:
//! the REST endpoint (JSON replies) and the upload endpoint (XML replies).
//! Every call is OAuth-signed and paced by a [`RequestPacer`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use flickrsync_flickr::{client::FlickrClient, ConsumerCredentials, OAuthToken};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let token = OAuthToken { token: "t".into(), token_secret: "s".into() };
//! let client = FlickrClient::new(ConsumerCredentials::new("key", "secret"), token);
//! let reply = client.call("flickr.test.login", &[]).await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::oauth::{ConsumerCredentials, OAuthSigner, OAuthToken};
use crate::rate_limit::RequestPacer;
use crate::{FlickrError, GENERIC_ERROR_CODE};

/// Flickr REST endpoint
const REST_URL: &str = "https://api.flickr.com/services/rest/";

/// Flickr upload endpoint
const UPLOAD_URL: &str = "https://up.flickr.com/services/upload/";

/// Longest response body kept in an [`FlickrError::Http`] error
const MAX_ERROR_BODY: usize = 512;

// ============================================================================
// Flickr response types
// ============================================================================

/// Status envelope shared by every JSON reply
#[derive(Debug, Deserialize)]
struct RestStatus {
    stat: String,
    code: Option<i32>,
    message: Option<String>,
}

// ============================================================================
// FlickrClient
// ============================================================================

/// HTTP client for Flickr API calls
///
/// Holds the consumer credentials and the user's access token; requests are
/// signed individually with a fresh nonce.
pub struct FlickrClient {
    /// The underlying HTTP client
    http: Client,
    rest_url: String,
    upload_url: String,
    signer: OAuthSigner,
    token: OAuthToken,
    pacer: RequestPacer,
}

impl FlickrClient {
    /// Creates a new FlickrClient against the production endpoints
    ///
    /// # Arguments
    /// * `consumer` - The application's API key and secret
    /// * `token` - The user's OAuth access token
    pub fn new(consumer: ConsumerCredentials, token: OAuthToken) -> Self {
        Self {
            http: Client::new(),
            rest_url: REST_URL.to_string(),
            upload_url: UPLOAD_URL.to_string(),
            signer: OAuthSigner::new(consumer),
            token,
            pacer: RequestPacer::default(),
        }
    }

    /// Points the client at custom endpoints (useful for testing)
    ///
    /// # Arguments
    /// * `rest_url` - Replacement for the REST endpoint
    /// * `upload_url` - Replacement for the upload endpoint
    pub fn with_endpoints(mut self, rest_url: impl Into<String>, upload_url: impl Into<String>) -> Self {
        self.rest_url = rest_url.into();
        self.upload_url = upload_url.into();
        self
    }

    /// Sets the pacer applied before every call
    pub fn with_pacer(mut self, pacer: RequestPacer) -> Self {
        self.pacer = pacer;
        self
    }

    /// The pacer applied before every call
    pub fn pacer(&self) -> &RequestPacer {
        &self.pacer
    }

    /// Calls a REST API method and returns the parsed JSON reply
    ///
    /// # Arguments
    /// * `method` - Flickr method name, e.g. `flickr.photos.delete`
    /// * `args` - Method arguments
    ///
    /// # Errors
    /// `FlickrError::Api` when Flickr answers `stat="fail"`, `FlickrError::Http`
    /// on a non-success status, `FlickrError::InvalidResponse` when the body
    /// is not a Flickr JSON reply.
    pub async fn call(&self, method: &str, args: &[(&str, &str)]) -> Result<Value, FlickrError> {
        self.pacer.wait(method).await;

        let mut params: Vec<(String, String)> = args
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        params.push(("method".into(), method.into()));
        params.push(("format".into(), "json".into()));
        params.push(("nojsoncallback".into(), "1".into()));

        let signed = self
            .signer
            .signed_params("POST", &self.rest_url, &params, Some(&self.token))?;

        debug!(method, "Calling Flickr REST method");
        let response = self.http.post(&self.rest_url).form(&signed).send().await?;
        let body = success_body(response).await?;

        let value: Value = serde_json::from_str(&body).map_err(|e| {
            FlickrError::InvalidResponse(format!("{method}: not a JSON reply: {e}"))
        })?;
        let status: RestStatus = serde_json::from_value(value.clone()).map_err(|e| {
            FlickrError::InvalidResponse(format!("{method}: missing status: {e}"))
        })?;

        match status.stat.as_str() {
            "ok" => Ok(value),
            "fail" => Err(FlickrError::Api {
                code: status.code.unwrap_or(GENERIC_ERROR_CODE),
                message: status.message.unwrap_or_default(),
            }),
            other => Err(FlickrError::InvalidResponse(format!(
                "{method}: unexpected stat '{other}'"
            ))),
        }
    }

    /// Uploads a photo file and returns the new photo id
    ///
    /// # Arguments
    /// * `file` - Path of the photo on disk
    /// * `tags` - Tags attached to the photo
    pub async fn upload(&self, file: &Path, tags: &[String]) -> Result<String, FlickrError> {
        self.pacer.wait("upload").await;

        let bytes = tokio::fs::read(file).await.map_err(|source| FlickrError::Io {
            path: file.display().to_string(),
            source,
        })?;
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo.jpg".to_string());

        let mut params: Vec<(String, String)> = Vec::new();
        if !tags.is_empty() {
            params.push(("tags".into(), tags.join(" ")));
        }

        // The photo part is excluded from the signature
        let signed = self
            .signer
            .signed_params("POST", &self.upload_url, &params, Some(&self.token))?;

        let mut form = Form::new();
        for (key, value) in signed {
            form = form.text(key, value);
        }
        form = form.part("photo", Part::bytes(bytes).file_name(file_name));

        debug!(file = %file.display(), "Uploading photo");
        let response = self.http.post(&self.upload_url).multipart(form).send().await?;
        let body = success_body(response).await?;

        parse_upload_response(&body)
    }
}

/// Returns the body of a successful response, or `FlickrError::Http`
async fn success_body(response: Response) -> Result<String, FlickrError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        let mut body = body;
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        return Err(FlickrError::Http {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

static PHOTO_ID_RE: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"<photoid[^>]*>\s*([^<\s]+)\s*</photoid>"));

static UPLOAD_ERR_RE: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r#"<err\s+code="(-?\d+)"\s+msg="([^"]*)""#));

fn compiled(re: &'static Lazy<Result<Regex, regex::Error>>) -> Result<&'static Regex, FlickrError> {
    Lazy::force(re)
        .as_ref()
        .map_err(|e| FlickrError::InvalidResponse(e.to_string()))
}

/// Extracts the photo id from an upload endpoint reply
///
/// The upload endpoint answers in XML:
/// `<rsp stat="ok"><photoid>123</photoid></rsp>` on success,
/// `<rsp stat="fail"><err code="5" msg="Filetype was not recognised" /></rsp>` on failure.
pub fn parse_upload_response(body: &str) -> Result<String, FlickrError> {
    if let Some(caps) = compiled(&PHOTO_ID_RE)?.captures(body) {
        return Ok(caps[1].to_string());
    }

    if let Some(caps) = compiled(&UPLOAD_ERR_RE)?.captures(body) {
        let code = caps[1].parse().unwrap_or(GENERIC_ERROR_CODE);
        return Err(FlickrError::Api {
            code,
            message: caps[2].to_string(),
        });
    }

    Err(FlickrError::InvalidResponse(format!(
        "upload reply has neither photoid nor err: {}",
        body.trim()
    )))
}
