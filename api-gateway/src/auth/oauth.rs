//! Third-party identity providers
//!
//! Login is an OAuth2 authorization-code flow. The provider turns the code
//! into an [`IdentityProfile`]; account creation happens in the ledger store.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use agora_common::{AuthError, IdentityProfile};

use crate::config::DiscordSettings;

const DISCORD_API: &str = "https://discord.com/api";
const DISCORD_SCOPES: &str = "identify email";

/// OAuth2 identity provider
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider name used in routes and logs
    fn name(&self) -> &'static str;

    /// URL the browser is sent to for consent
    fn authorize_url(&self, state: &str) -> String;

    /// Exchange an authorization code for the user's profile
    async fn exchange_code(&self, code: &str) -> Result<IdentityProfile, AuthError>;
}

/// Discord OAuth2 client
pub struct DiscordProvider {
    settings: DiscordSettings,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct DiscordUser {
    id: String,
    username: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    avatar: Option<String>,
}

impl From<DiscordUser> for IdentityProfile {
    fn from(user: DiscordUser) -> Self {
        Self {
            subject: user.id,
            username: user.username,
            email: user.email.unwrap_or_default(),
            avatar: user.avatar,
        }
    }
}

impl DiscordProvider {
    pub fn new(settings: DiscordSettings) -> Self {
        Self {
            settings,
            http: reqwest::Client::new(),
        }
    }

    async fn fetch_access_token(&self, code: &str) -> Result<String, AuthError> {
        let params = [
            ("client_id", self.settings.client_id.as_str()),
            ("client_secret", self.settings.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.settings.callback_url.as_str()),
        ];

        let response = self
            .http
            .post(format!("{}/oauth2/token", DISCORD_API))
            .form(&params)
            .send()
            .await
            .map_err(provider_error)?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "Discord rejected authorization code");
            return Err(AuthError::Provider(format!(
                "token exchange failed with status {}",
                response.status()
            )));
        }

        let token: TokenResponse = response.json().await.map_err(provider_error)?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl IdentityProvider for DiscordProvider {
    fn name(&self) -> &'static str {
        "discord"
    }

    fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}/oauth2/authorize?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            DISCORD_API,
            urlencoding::encode(&self.settings.client_id),
            urlencoding::encode(&self.settings.callback_url),
            urlencoding::encode(DISCORD_SCOPES),
            urlencoding::encode(state),
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<IdentityProfile, AuthError> {
        let access_token = self.fetch_access_token(code).await?;

        let user: DiscordUser = self
            .http
            .get(format!("{}/users/@me", DISCORD_API))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(provider_error)?
            .error_for_status()
            .map_err(provider_error)?
            .json()
            .await
            .map_err(provider_error)?;

        debug!(subject = %user.id, username = %user.username, "Fetched Discord profile");
        Ok(user.into())
    }
}

fn provider_error(err: reqwest::Error) -> AuthError {
    AuthError::Provider(err.to_string())
}
