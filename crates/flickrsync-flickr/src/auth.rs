//! OAuth 1.0a authorization flow and token persistence for Flickr
//!
//! Flickr desktop apps use the out-of-band ("oob") variant of OAuth 1.0a:
//!
//! 1. Obtain a request token from `request_token`.
//! 2. Send the user to `authorize`; Flickr shows them a verifier code.
//! 3. Exchange request token + verifier for an access token.
//!
//! The access token never expires and is stored as JSON in the token file.
//!
//! ## Components
//!
//! - [`TokenFileStorage`] - Token file load/store/clear
//! - [`AuthorizationFlow`] - Request-token, authorize-URL and access-token steps
//! - [`check_login`] - Verifies a stored token against `flickr.test.login`

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::client::FlickrClient;
use crate::oauth::{ConsumerCredentials, OAuthSigner, OAuthToken};

/// Base URL of the Flickr OAuth endpoints
const OAUTH_BASE_URL: &str = "https://www.flickr.com/services/oauth";

/// Permission requested for the access token; deleting photos needs `delete`
const REQUESTED_PERMS: &str = "delete";

// ============================================================================
// TokenFileStorage
// ============================================================================

/// Stores and retrieves the OAuth access token in a JSON file
///
/// The file holds `{"token": "...", "token_secret": "..."}`. On Unix it is
/// written with mode 0600.
#[derive(Debug, Clone)]
pub struct TokenFileStorage {
    path: PathBuf,
}

impl TokenFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the token file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the token
    ///
    /// # Returns
    /// `Some(OAuthToken)` if the file exists, `None` if it does not
    pub fn load(&self) -> Result<Option<OAuthToken>> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No token file");
                return Ok(None);
            }
            Err(e) => {
                return Err(anyhow::Error::new(e).context(format!(
                    "Failed to read token file {}",
                    self.path.display()
                )))
            }
        };

        let token: OAuthToken = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse token file {}", self.path.display()))?;
        debug!(path = %self.path.display(), "Loaded token file");
        Ok(Some(token))
    }

    /// Writes the token, creating parent directories as needed
    pub fn store(&self, token: &OAuthToken) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create token directory {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(token).context("Failed to serialize token")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write token file {}", self.path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| {
                    format!("Failed to restrict token file {}", self.path.display())
                })?;
        }

        info!(path = %self.path.display(), "Stored access token");
        Ok(())
    }

    /// Removes the token file
    ///
    /// # Returns
    /// `true` if a file was removed, `false` if there was none
    pub fn clear(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "Removed token file");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("Failed to remove token file {}", self.path.display()))),
        }
    }
}

// ============================================================================
// AuthorizationFlow
// ============================================================================

/// A request token waiting for the user's approval
#[derive(Debug, Clone)]
pub struct PendingAuthorization {
    pub request_token: OAuthToken,
    /// URL the user must open to approve access
    pub authorize_url: String,
}

/// The result of a completed authorization
#[derive(Debug, Clone)]
pub struct AuthorizedAccount {
    pub token: OAuthToken,
    pub user_nsid: Option<String>,
    pub username: Option<String>,
}

/// Drives the three-legged out-of-band OAuth flow
pub struct AuthorizationFlow {
    http: Client,
    signer: OAuthSigner,
    base_url: String,
}

impl AuthorizationFlow {
    /// Creates a flow against the production OAuth endpoints
    pub fn new(consumer: ConsumerCredentials) -> Self {
        Self::with_base_url(consumer, OAUTH_BASE_URL)
    }

    /// Creates a flow against a custom OAuth base URL (useful for testing)
    pub fn with_base_url(consumer: ConsumerCredentials, base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            signer: OAuthSigner::new(consumer),
            base_url: base_url.into(),
        }
    }

    /// Step 1 and 2: obtains a request token and builds the authorize URL
    pub async fn start(&self) -> Result<PendingAuthorization> {
        let url = format!("{}/request_token", self.base_url);
        let params = vec![("oauth_callback".to_string(), "oob".to_string())];
        let reply = self.signed_get(&url, &params, None).await?;

        let request_token = OAuthToken {
            token: field(&reply, "oauth_token")?,
            token_secret: field(&reply, "oauth_token_secret")?,
        };

        let authorize_url = url::Url::parse_with_params(
            &format!("{}/authorize", self.base_url),
            &[
                ("oauth_token", request_token.token.as_str()),
                ("perms", REQUESTED_PERMS),
            ],
        )
        .context("Failed to build authorize URL")?
        .to_string();

        debug!("Obtained request token");
        Ok(PendingAuthorization {
            request_token,
            authorize_url,
        })
    }

    /// Step 3: exchanges the verifier code shown to the user for an access token
    pub async fn complete(
        &self,
        pending: &PendingAuthorization,
        verifier: &str,
    ) -> Result<AuthorizedAccount> {
        let verifier = verifier.trim();
        if verifier.is_empty() {
            bail!("Verifier code is empty");
        }

        let url = format!("{}/access_token", self.base_url);
        let params = vec![("oauth_verifier".to_string(), verifier.to_string())];
        let reply = self
            .signed_get(&url, &params, Some(&pending.request_token))
            .await?;

        let account = AuthorizedAccount {
            token: OAuthToken {
                token: field(&reply, "oauth_token")?,
                token_secret: field(&reply, "oauth_token_secret")?,
            },
            user_nsid: optional_field(&reply, "user_nsid"),
            username: optional_field(&reply, "username"),
        };

        info!(username = ?account.username, "Obtained access token");
        Ok(account)
    }

    async fn signed_get(
        &self,
        url: &str,
        params: &[(String, String)],
        token: Option<&OAuthToken>,
    ) -> Result<Vec<(String, String)>> {
        let signed = self.signer.signed_params("GET", url, params, token)?;
        let response = self
            .http
            .get(url)
            .query(&signed)
            .send()
            .await
            .with_context(|| format!("Failed to reach {url}"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read reply from {url}"))?;
        if !status.is_success() {
            bail!("{url} returned HTTP {}: {}", status.as_u16(), body.trim());
        }

        Ok(url::form_urlencoded::parse(body.trim().as_bytes())
            .into_owned()
            .collect())
    }
}

fn optional_field(reply: &[(String, String)], key: &str) -> Option<String> {
    reply
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
}

fn field(reply: &[(String, String)], key: &str) -> Result<String> {
    optional_field(reply, key).with_context(|| format!("OAuth reply is missing '{key}'"))
}

// ============================================================================
// Token check
// ============================================================================

/// The account an access token belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlickrUser {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Deserialize)]
struct TestLoginResponse {
    user: TestLoginUser,
}

#[derive(Debug, Deserialize)]
struct TestLoginUser {
    id: String,
    username: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(rename = "_content")]
    content: String,
}

/// Verifies the client's token with `flickr.test.login`
pub async fn check_login(client: &FlickrClient) -> Result<FlickrUser> {
    let reply = client
        .call("flickr.test.login", &[])
        .await
        .context("Token check failed")?;
    let parsed: TestLoginResponse =
        serde_json::from_value(reply).context("Unexpected flickr.test.login reply")?;

    Ok(FlickrUser {
        id: parsed.user.id,
        username: parsed.user.username.content,
    })
}
