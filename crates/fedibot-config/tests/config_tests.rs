// SPDX-FileCopyrightText: 2026 Fedibot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the fedibot configuration system.

use fedibot_config::{load_and_validate_str, ConfigError};

#[test]
fn full_config_parses_and_validates() {
    let config = load_and_validate_str(
        r#"
[agent]
name = "luna"
log_level = "debug"

[mastodon]
domain = "mastodon.example"

[gemini]
api_key = "test-key"
model = "gemini-1.5-flash-001"
temperature = 0.9

[storage]
database_path = "/tmp/fedibot-test.db"
wal_mode = true

[server]
host = "0.0.0.0"
port = 8080
public_url = "https://bot.example.com"

[batch]
notification_page_size = 50
timeline_page_size = 30
"#,
    )
    .unwrap();

    assert_eq!(config.agent.name, "luna");
    assert_eq!(config.mastodon.domain, "mastodon.example");
    assert_eq!(config.gemini.api_key.as_deref(), Some("test-key"));
    assert_eq!(config.server.public_url.as_deref(), Some("https://bot.example.com"));
    assert_eq!(config.batch.notification_page_size, 50);
}

#[test]
fn empty_config_uses_defaults() {
    let config = load_and_validate_str("").unwrap();
    assert_eq!(config.agent.name, "fedibot");
    assert_eq!(config.server.port, 3000);
    assert!(config.gemini.api_key.is_none());
}

#[test]
fn typo_in_key_yields_suggestion() {
    let errors = load_and_validate_str(
        r#"
[mastodon]
domian = "mastodon.example"
"#,
    )
    .unwrap_err();

    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::UnknownKey { key, suggestion: Some(s), .. }
            if key == "domian" && s == "domain"
    )));
}

#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str(
        r#"
[telemetry]
enabled = true
"#,
    )
    .unwrap_err();
    assert!(!errors.is_empty());
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str(
        r#"
[server]
port = "not-a-number"
"#,
    )
    .unwrap_err();
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::InvalidType { .. } | ConfigError::Other(_))));
}

#[test]
fn validation_errors_accumulate() {
    let errors = load_and_validate_str(
        r#"
[storage]
database_path = ""

[batch]
notification_page_size = 100
timeline_page_size = 0
"#,
    )
    .unwrap_err();
    // All three violations reported in one pass, not fail-fast.
    let validation_count = errors
        .iter()
        .filter(|e| matches!(e, ConfigError::Validation { .. }))
        .count();
    assert_eq!(validation_count, 3);
}
