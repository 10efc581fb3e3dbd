//! Application state for the overtime ledger API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::PipelineConfig;

/// Shared application state.
///
/// Holds the engine configuration, which is immutable once the server
/// starts and shared by every request.
#[derive(Clone)]
pub struct AppState {
    /// The loaded engine configuration.
    config: Arc<PipelineConfig>,
}

impl AppState {
    /// Creates a new application state with the given configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        // Verify AppState can be cloned (required for axum state)
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_clones_share_configuration() {
        let state = AppState::new(PipelineConfig::default());
        let clone = state.clone();
        assert!(std::ptr::eq(state.config(), clone.config()));
    }
}
