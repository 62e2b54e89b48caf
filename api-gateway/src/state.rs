//! Shared handler state

use std::sync::Arc;

use agora_ledger::VoteLedger;

use crate::auth::{IdentityProvider, JwtService};

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<VoteLedger>,
    pub jwt: Arc<JwtService>,
    /// Login provider; `None` disables the OAuth routes
    pub provider: Option<Arc<dyn IdentityProvider>>,
    /// Post-login and post-logout landing page
    pub frontend_url: Arc<str>,
    /// Origins a login may return to (also the CORS list)
    pub allowed_origins: Arc<[String]>,
}

impl AppState {
    pub fn new(
        ledger: Arc<VoteLedger>,
        jwt: JwtService,
        provider: Option<Arc<dyn IdentityProvider>>,
        frontend_url: impl Into<String>,
        allowed_origins: Vec<String>,
    ) -> Self {
        Self {
            ledger,
            jwt: Arc::new(jwt),
            provider,
            frontend_url: Arc::from(frontend_url.into()),
            allowed_origins: Arc::from(allowed_origins),
        }
    }
}
