//! Gateway configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};

use agora_ledger::{LedgerSettings, StorageSettings};

/// Signing secret used when `JWT_SECRET` is unset
const DEV_JWT_SECRET: &str = "agora-dev-secret-not-for-production-use";

/// API gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Service host
    pub host: String,
    /// Service port
    pub port: u16,
    /// Vote ledger configuration
    pub ledger: LedgerSettings,
    /// Storage backend configuration
    pub storage: StorageSettings,
    /// Bearer token configuration
    pub auth: AuthSettings,
    /// Discord OAuth client, if configured
    pub discord: Option<DiscordSettings>,
    /// Where users land after login and logout
    pub frontend_url: String,
    /// CORS origins; empty means the frontend URL only
    pub allowed_origins: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            ledger: LedgerSettings::default(),
            storage: StorageSettings::default(),
            auth: AuthSettings::default(),
            discord: None,
            frontend_url: "http://localhost:5173".to_string(),
            allowed_origins: Vec::new(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let mut cfg = Self::default();

        // Hosting platforms inject PORT; AGORA_PORT still wins when both are set
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(p) = port.parse::<u16>() {
                cfg.port = p;
            }
        }
        if let Ok(host) = std::env::var("AGORA_HOST") {
            cfg.host = host;
        }
        if let Ok(port) = std::env::var("AGORA_PORT") {
            if let Ok(p) = port.parse::<u16>() {
                cfg.port = p;
            }
        }

        cfg.ledger.apply_env();
        cfg.storage.apply_env()?;

        // Auth settings
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            cfg.auth.jwt_secret = secret;
        }
        if let Ok(val) = std::env::var("AGORA_TOKEN_EXPIRY_SECS") {
            if let Ok(v) = val.parse() {
                cfg.auth.token_expiry_secs = v;
            }
        }

        cfg.discord = DiscordSettings::from_env();

        if let Ok(url) = std::env::var("AGORA_FRONTEND_URL") {
            cfg.frontend_url = url;
        }
        if let Ok(origins) = std::env::var("AGORA_ALLOWED_ORIGINS") {
            cfg.allowed_origins = parse_origins(&origins);
        }

        Ok(cfg)
    }

    /// Socket address to bind
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Origins permitted by CORS
    pub fn cors_origins(&self) -> Vec<String> {
        if self.allowed_origins.is_empty() {
            vec![self.frontend_url.clone()]
        } else {
            self.allowed_origins.clone()
        }
    }
}

/// Bearer token settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// HS256 signing secret
    pub jwt_secret: String,
    /// Lifetime of issued tokens
    pub token_expiry_secs: u64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_expiry_secs: 86_400,
        }
    }
}

impl AuthSettings {
    pub fn is_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

/// Discord OAuth client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordSettings {
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret: String,
    pub callback_url: String,
}

impl DiscordSettings {
    /// All three variables must be present
    fn from_env() -> Option<Self> {
        Some(Self {
            client_id: std::env::var("DISCORD_CLIENT_ID").ok()?,
            client_secret: std::env::var("DISCORD_CLIENT_SECRET").ok()?,
            callback_url: std::env::var("DISCORD_CALLBACK_URL").ok()?,
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}
