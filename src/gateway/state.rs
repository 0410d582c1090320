use std::sync::Arc;

use crate::{Config, Format, store::Store};

/// Shared application state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn Store>,
    pub format: Format,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            config: Arc::new(Config::default()),
            store,
            format: Format::default(),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Arc::new(config);
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }
}
