//! Full configuration validation.
//!
//! Each section has its own submodule; this orchestrator calls them all
//! and collects errors into a single `ConfigError`.

mod endpoints;
mod helpers;
mod timing;


use crate::schema::HuddleConfig;
use huddle_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &HuddleConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    endpoints::validate_service(&mut errors, config);
    endpoints::validate_presence(&mut errors, config);
    endpoints::validate_peer(&mut errors, config);
    timing::validate_timing(&mut errors, config);
    timing::validate_limits(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
