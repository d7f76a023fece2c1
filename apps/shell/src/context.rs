//! Application context passed explicitly through the shell.
//!
//! Everything a component needs (config, HTTP client, event sink) comes from
//! here; there is no process-wide mutable state.

use std::sync::Arc;

use storefront_events::EventBusRef;

use crate::config::ShellConfig;
use crate::error::Result;

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ShellConfig>,
    pub http: reqwest::Client,
    pub events: EventBusRef,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    pub fn new(config: ShellConfig, events: EventBusRef) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("storefront-shell/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            config: Arc::new(config),
            http,
            events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_events::NullEventBus;

    #[test]
    fn test_context_rejects_invalid_config() {
        let config = ShellConfig {
            api_base_url: String::new(),
            ..Default::default()
        };
        assert!(AppContext::new(config, Arc::new(NullEventBus)).is_err());
    }

    #[test]
    fn test_context_builds_with_defaults() {
        let ctx = AppContext::new(ShellConfig::default(), Arc::new(NullEventBus)).unwrap();
        assert_eq!(ctx.config.status_path, "/store/status");
    }
}
