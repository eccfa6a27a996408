//! OAuth 1.0a request signing (HMAC-SHA1)
//!
//! Flickr authenticates every API call with OAuth 1.0a. Each request carries
//! the `oauth_*` protocol parameters plus an `oauth_signature` computed over a
//! normalized "signature base string":
//!
//! ```text
//! METHOD & encode(url) & encode(sorted, encoded key=value pairs joined by &)
//! ```
//!
//! signed with HMAC-SHA1 keyed by `encode(consumer_secret) & encode(token_secret)`.
//! Encoding is RFC 3986 percent-encoding: everything except `A-Z a-z 0-9 - . _ ~`.

use base64::Engine;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use sha1::Sha1;

use crate::FlickrError;

type HmacSha1 = Hmac<Sha1>;

/// Characters left unencoded by OAuth: the RFC 3986 unreserved set
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Application credentials issued by Flickr (API key and secret)
#[derive(Debug, Clone)]
pub struct ConsumerCredentials {
    pub key: String,
    pub secret: String,
}

impl ConsumerCredentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }
}

/// An OAuth token and its secret
///
/// Used both for the short-lived request token of the authorization flow and
/// for the long-lived access token persisted in the token file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthToken {
    pub token: String,
    pub token_secret: String,
}

/// Percent-encodes a string per RFC 3986 as OAuth requires
pub fn encode(value: &str) -> String {
    utf8_percent_encode(value, UNRESERVED).to_string()
}

/// Builds the OAuth signature base string
///
/// `url` must not carry a query string; query parameters belong in `params`.
pub fn signature_base_string(method: &str, url: &str, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    encoded.sort();

    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(url),
        encode(&normalized)
    )
}

/// Computes the base64 HMAC-SHA1 signature of a base string
pub fn sign(
    base_string: &str,
    consumer_secret: &str,
    token_secret: &str,
) -> Result<String, FlickrError> {
    let key = format!("{}&{}", encode(consumer_secret), encode(token_secret));
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| FlickrError::Signing(e.to_string()))?;
    mac.update(base_string.as_bytes());
    let digest = mac.finalize().into_bytes();
    Ok(base64::engine::general_purpose::STANDARD.encode(digest))
}

/// Signs request parameters on behalf of one consumer
#[derive(Debug, Clone)]
pub struct OAuthSigner {
    consumer: ConsumerCredentials,
}

impl OAuthSigner {
    pub fn new(consumer: ConsumerCredentials) -> Self {
        Self { consumer }
    }

    /// The consumer this signer signs for
    pub fn consumer(&self) -> &ConsumerCredentials {
        &self.consumer
    }

    /// Returns `params` extended with the OAuth protocol parameters and signature
    ///
    /// A fresh nonce and the current timestamp are used.
    pub fn signed_params(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
        token: Option<&OAuthToken>,
    ) -> Result<Vec<(String, String)>, FlickrError> {
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        let timestamp = chrono::Utc::now().timestamp();
        self.signed_params_with(method, url, params, token, &nonce, timestamp)
    }

    /// Like [`signed_params`](Self::signed_params) with an explicit nonce and timestamp
    pub fn signed_params_with(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
        token: Option<&OAuthToken>,
        nonce: &str,
        timestamp: i64,
    ) -> Result<Vec<(String, String)>, FlickrError> {
        let mut all = params.to_vec();
        all.push(("oauth_consumer_key".into(), self.consumer.key.clone()));
        all.push(("oauth_nonce".into(), nonce.to_string()));
        all.push(("oauth_signature_method".into(), "HMAC-SHA1".into()));
        all.push(("oauth_timestamp".into(), timestamp.to_string()));
        all.push(("oauth_version".into(), "1.0".into()));
        if let Some(token) = token {
            all.push(("oauth_token".into(), token.token.clone()));
        }

        let base = signature_base_string(method, url, &all);
        let token_secret = token.map(|t| t.token_secret.as_str()).unwrap_or("");
        let signature = sign(&base, &self.consumer.secret, token_secret)?;

        all.push(("oauth_signature".into(), signature));
        Ok(all)
    }
}
