//! Auth commands - Login, Logout, and Status for Flickr authorization
//!
//! Provides the `flickrsync auth` CLI subcommands which:
//! 1. `login`  - Runs the out-of-band OAuth 1.0a flow: opens the authorize
//!    page, reads the verifier code from stdin and stores the access token
//!    in the token file.
//! 2. `logout` - Removes the token file.
//! 3. `status` - Shows whether a token is stored and whether Flickr accepts it.

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use flickrsync_core::config::Config;
use flickrsync_flickr::auth::{check_login, AuthorizationFlow, TokenFileStorage};
use flickrsync_flickr::rate_limit::RequestPacer;
use flickrsync_flickr::{ConsumerCredentials, FlickrClient};

use super::CliContext;
use crate::output::OutputFormatter;

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Authorize flickrsync to manage your Flickr photos
    Login {
        /// Print the authorization URL instead of opening a browser
        #[arg(long)]
        no_browser: bool,
    },
    /// Remove the stored access token
    Logout,
    /// Check authorization status
    Status,
}

impl AuthCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let fmt = ctx.formatter();
        match self {
            AuthCommand::Login { no_browser } => self.execute_login(ctx, *no_browser, &*fmt).await,
            AuthCommand::Logout => self.execute_logout(ctx, &*fmt).await,
            AuthCommand::Status => self.execute_status(ctx, &*fmt).await,
        }
    }

    /// Execute the login flow:
    /// 1. Load config to get the API key and secret
    /// 2. Obtain a request token and open the authorize page
    /// 3. Read the verifier code shown by Flickr
    /// 4. Exchange it for an access token and store it
    async fn execute_login(
        &self,
        ctx: &CliContext,
        no_browser: bool,
        fmt: &dyn OutputFormatter,
    ) -> Result<()> {
        // Step 1: Load config
        let config = ctx.load_config()?;
        let consumer = consumer_credentials(&config)?;

        // Step 2: Request token and authorize URL
        let flow = AuthorizationFlow::new(consumer);
        let pending = flow
            .start()
            .await
            .context("Failed to start Flickr authorization")?;
        info!("Obtained request token");

        eprintln!("Open this URL to authorize flickrsync:");
        eprintln!();
        eprintln!("    {}", pending.authorize_url);
        eprintln!();
        if !no_browser {
            if let Err(e) = webbrowser::open(&pending.authorize_url) {
                warn!(error = %e, "Could not open a browser");
            }
        }

        // Step 3: Verifier code
        eprint!("Enter the code Flickr shows you: ");
        let mut verifier = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut verifier)
            .await
            .context("Failed to read verifier code")?;

        // Step 4: Access token
        let account = flow
            .complete(&pending, &verifier)
            .await
            .context("Flickr rejected the verifier code")?;

        let storage = TokenFileStorage::new(&config.auth.token_file);
        storage
            .store(&account.token)
            .context("Failed to store access token")?;

        let username = account.username.as_deref().unwrap_or("unknown user");
        if ctx.is_json() {
            fmt.print_json(&serde_json::json!({
                "authorized": true,
                "username": account.username,
                "user_nsid": account.user_nsid,
                "token_file": storage.path().display().to_string(),
            }));
        } else {
            fmt.success(&format!("Authorized as {username}"));
            fmt.info(&format!("Token stored in {}", storage.path().display()));
        }

        Ok(())
    }

    /// Execute logout: delete the token file
    async fn execute_logout(&self, ctx: &CliContext, fmt: &dyn OutputFormatter) -> Result<()> {
        let config = ctx.load_config()?;
        let storage = TokenFileStorage::new(&config.auth.token_file);

        if storage.clear()? {
            info!(path = %storage.path().display(), "Logged out");
            fmt.success("Logged out successfully");
            fmt.info(&format!("Removed {}", storage.path().display()));
        } else {
            fmt.info("No stored token. Nothing to log out.");
        }

        Ok(())
    }

    /// Execute status check:
    /// 1. Load the token file
    /// 2. Ask Flickr who the token belongs to
    async fn execute_status(&self, ctx: &CliContext, fmt: &dyn OutputFormatter) -> Result<()> {
        let config = ctx.load_config()?;
        let storage = TokenFileStorage::new(&config.auth.token_file);

        let Some(token) = storage.load()? else {
            if ctx.is_json() {
                fmt.print_json(&serde_json::json!({
                    "authorized": false,
                    "token_file": storage.path().display().to_string(),
                }));
            } else {
                fmt.info("Authorization status: Not configured");
                fmt.info("Run 'flickrsync auth login' to authorize");
            }
            return Ok(());
        };

        let consumer = consumer_credentials(&config)?;
        let client = FlickrClient::new(consumer, token)
            .with_pacer(RequestPacer::from_millis(config.flickr.request_delay_ms));

        let (valid, user, problem) = match check_login(&client).await {
            Ok(user) => (true, Some(user), None),
            Err(e) => (false, None, Some(format!("{e:#}"))),
        };

        if ctx.is_json() {
            fmt.print_json(&serde_json::json!({
                "authorized": valid,
                "user_id": user.as_ref().map(|u| u.id.clone()),
                "username": user.as_ref().map(|u| u.username.clone()),
                "token_file": storage.path().display().to_string(),
                "error": problem,
            }));
        } else if let Some(user) = user {
            fmt.success(&format!("Authorized as {} ({})", user.username, user.id));
            fmt.info(&format!("Token file: {}", storage.path().display()));
        } else {
            fmt.error(&format!(
                "Stored token was not accepted: {}",
                problem.unwrap_or_default()
            ));
            fmt.info("Run 'flickrsync auth login' to authorize again");
        }

        Ok(())
    }
}

fn consumer_credentials(config: &Config) -> Result<ConsumerCredentials> {
    if config.flickr.api_key.trim().is_empty() || config.flickr.api_secret.trim().is_empty() {
        bail!("flickr.api_key and flickr.api_secret must be set in the config file");
    }
    Ok(ConsumerCredentials::new(
        &config.flickr.api_key,
        &config.flickr.api_secret,
    ))
}
