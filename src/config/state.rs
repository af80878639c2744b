// Application state module
// Shared state handed to every connection task

use tokio::sync::RwLock;

use super::types::Config;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Rendered annotation page, cached after the first successful read
    pub page_cache: RwLock<Option<String>>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            page_cache: RwLock::new(None),
        }
    }
}
