use std::sync::Arc;

use folio_core::{Collection, ContentStore, Document};

use crate::auth::jwt::TokenService;
use crate::config::ServerConfig;
use crate::limiter::RateLimiter;
use crate::services::mailer::Mailer;
use crate::services::media::MediaHost;

/// Everything handlers share. Built once in `main` and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub tokens: Arc<TokenService>,
    pub limiter: Arc<RateLimiter>,
    pub store: Arc<dyn ContentStore>,
    pub mailer: Arc<dyn Mailer>,
    pub media: Arc<dyn MediaHost>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn ContentStore>,
        mailer: Arc<dyn Mailer>,
        media: Arc<dyn MediaHost>,
    ) -> Self {
        let tokens = TokenService::new(&config.auth.jwt_secret);
        let limiter = RateLimiter::new(config.rate_limit.clone());
        Self {
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            limiter: Arc::new(limiter),
            store,
            mailer,
            media,
        }
    }

    pub fn collection<T: Document>(&self) -> Collection<T> {
        Collection::new(self.store.clone())
    }
}
