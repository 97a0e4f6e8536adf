use std::sync::Arc;

use shortie_shortener::Shortener;

use crate::auth::AuthKeys;

#[derive(Clone)]
pub struct AppState {
    shortener: Arc<dyn Shortener>,
    auth: Arc<AuthKeys>,
}

impl AppState {
    pub fn new(shortener: Arc<dyn Shortener>, auth: AuthKeys) -> Self {
        Self {
            shortener,
            auth: Arc::new(auth),
        }
    }

    pub fn shortener(&self) -> &dyn Shortener {
        self.shortener.as_ref()
    }

    pub fn auth(&self) -> &AuthKeys {
        &self.auth
    }
}
