use dpack_domain::config::{BatchConfig, ChannelConfig, EngineSettings, ServicesConfig};
use serde_json::json;
use std::time::Duration;

#[test]
fn settings_defaults_are_sane() {
    let channel = ChannelConfig::default();
    assert_eq!(channel.app_root, "eternal-sledgehammer");
    assert_eq!(channel.remote_env_path("deploy"), "/home/deploy/eternal-sledgehammer/shared/.env");
    assert!(channel.timeout().is_none());

    let services = ServicesConfig::default();
    assert_eq!(services.redis_host, "localhost");
    assert_eq!(services.redis_port, 6379);
    assert_eq!(services.development_revision_key, "__development__");

    let batch = BatchConfig::default();
    assert_eq!(batch.settings_object, "app-settings.json");
    assert!(batch.allowed_keys.is_empty());
}

#[test]
fn engine_settings_deserialize_partially() {
    let raw = json!({
        "channel": { "app_root": "blog", "timeout_seconds": 15 },
        "batch": { "allowed_keys": ["API_URL", "FEATURE_FLAGS"] },
        "sections": { "exclude": ["sentry"] }
    });

    let settings: EngineSettings = serde_json::from_value(raw).expect("settings deserialize");
    assert_eq!(settings.channel.app_root, "blog");
    assert_eq!(settings.channel.timeout(), Some(Duration::from_secs(15)));
    assert_eq!(settings.channel.scp_program, "scp");
    assert_eq!(settings.batch.allowed_keys, ["API_URL", "FEATURE_FLAGS"]);
    assert_eq!(settings.sections.exclude, ["sentry"]);
    assert_eq!(settings.services.sentry_url, "https://sentry.io");
}

#[test]
fn engine_settings_clone_on_write() {
    let shared = EngineSettings::default();
    let mut local = shared.clone();
    local.services.redis_port = 6380;

    assert_eq!(shared.services.redis_port, 6379);
    assert_eq!(local.services.redis_port, 6380);
}
