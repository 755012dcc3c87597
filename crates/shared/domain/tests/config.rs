use mkp_domain::config::{
    AttachmentConfig, CompressionKind, GatewayConfig, RegistrationConfig, WizardConfig,
};
use mkp_domain::locale::Locale;
use serde_json::json;
use std::time::Duration;

#[test]
fn config_defaults_are_sane() {
    let registration = RegistrationConfig::default();
    assert_eq!(registration.bridge_timeout(), Duration::from_secs(5));
    assert_eq!(registration.locale, Locale::Ar);
    assert_eq!(registration.login_url(Locale::En), "/en/login");

    let attachments = AttachmentConfig::default();
    assert_eq!(attachments.max_bytes, 5 * 1024 * 1024);
    assert!(attachments.allowed_types.iter().any(|t| t == "image/png"));

    let gateway = GatewayConfig::default();
    assert_eq!(gateway.endpoint, "register");
    assert_eq!(gateway.rate_limit.window(), Duration::from_secs(3_600));
    assert_eq!(gateway.rate_limit.max_attempts, 3);
    assert_eq!(gateway.rate_limit.namespace, "market_place_admin_panel");
}

#[test]
fn wizard_config_deserializes_partial_input() {
    let raw = json!({
        "storage": { "data_dir": "/tmp/wizard", "compression": "none" },
        "registration": { "locale": "en", "bridge_timeout_ms": 250 },
        "gateway": { "base_url": "https://api.example.test", "rate_limit": { "max_attempts": 5 } }
    });

    let cfg: WizardConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.storage.data_dir, std::path::PathBuf::from("/tmp/wizard"));
    assert_eq!(cfg.storage.compression, CompressionKind::None);
    assert_eq!(cfg.registration.locale, Locale::En);
    assert_eq!(cfg.registration.bridge_timeout(), Duration::from_millis(250));
    assert_eq!(cfg.registration.login_path, "/{locale}/login");
    assert_eq!(cfg.gateway.base_url, "https://api.example.test");
    assert_eq!(cfg.gateway.rate_limit.max_attempts, 5);
    assert_eq!(cfg.gateway.rate_limit.window_secs, 3_600);
    assert_eq!(cfg.attachments.max_bytes, 5 * 1024 * 1024);
}

#[test]
fn deref_mut_clones_on_write() {
    let original = WizardConfig::default();
    let mut tuned = original.clone();
    tuned.registration.bridge_timeout_ms = 10;

    assert_eq!(original.registration.bridge_timeout_ms, 5_000);
    assert_eq!(tuned.registration.bridge_timeout_ms, 10);
}
