// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths and remote API page-size caps.

use crate::diagnostic::ConfigError;
use crate::model::FedibotConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &FedibotConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let domain = config.mastodon.domain.trim();
    if !domain.is_empty() {
        // A scheme or path here means someone pasted a URL; the client
        // builds `https://{domain}` itself.
        if domain.contains('/') || domain.contains(':') {
            errors.push(ConfigError::Validation {
                message: format!(
                    "mastodon.domain `{domain}` must be a bare hostname, not a URL"
                ),
            });
        }
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.agent.name.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "agent.name must not be empty".to_string(),
        });
    }

    // Remote API caps: 80 notifications, 40 timeline statuses per page.
    if config.batch.notification_page_size == 0 || config.batch.notification_page_size > 80 {
        errors.push(ConfigError::Validation {
            message: format!(
                "batch.notification_page_size must be in 1..=80, got {}",
                config.batch.notification_page_size
            ),
        });
    }

    if config.batch.timeline_page_size == 0 || config.batch.timeline_page_size > 40 {
        errors.push(ConfigError::Validation {
            message: format!(
                "batch.timeline_page_size must be in 1..=40, got {}",
                config.batch.timeline_page_size
            ),
        });
    }

    if !(0.0..=2.0).contains(&config.gemini.temperature) {
        errors.push(ConfigError::Validation {
            message: format!(
                "gemini.temperature must be in 0.0..=2.0, got {}",
                config.gemini.temperature
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = FedibotConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn url_shaped_domain_fails_validation() {
        let mut config = FedibotConfig::default();
        config.mastodon.domain = "https://mastodon.example".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("bare hostname"))
        ));
    }

    #[test]
    fn oversized_notification_page_fails_validation() {
        let mut config = FedibotConfig::default();
        config.batch.notification_page_size = 81;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("notification_page_size"))
        ));
    }

    #[test]
    fn zero_timeline_page_fails_validation() {
        let mut config = FedibotConfig::default();
        config.batch.timeline_page_size = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = FedibotConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("database_path"))
        ));
    }

    #[test]
    fn out_of_range_temperature_fails_validation() {
        let mut config = FedibotConfig::default();
        config.gemini.temperature = 3.5;
        assert!(validate_config(&config).is_err());
    }
}
