use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_match_documented_values() {
    let cfg = SyncConfig::default();
    assert_eq!(cfg.stale_threshold_ms, 3000);
    assert_eq!(cfg.heartbeat_interval_ms, cfg.stale_threshold_ms);
    assert_eq!(cfg.channel_prefix, DEFAULT_CHANNEL_PREFIX);
    assert_eq!(cfg.geometry_poll_ms, DEFAULT_GEOMETRY_POLL_MS);
    assert!(cfg.validate().is_ok());
}

#[test]
fn empty_lookup_yields_defaults() {
    let cfg = SyncConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(cfg, SyncConfig::default());
}

#[test]
fn heartbeat_defaults_to_configured_stale_threshold() {
    let cfg = SyncConfig::from_lookup(lookup_from(&[(ENV_STALE_THRESHOLD_MS, "5000")])).unwrap();
    assert_eq!(cfg.stale_threshold_ms, 5000);
    assert_eq!(cfg.heartbeat_interval_ms, 5000);
}

#[test]
fn overrides_are_applied() {
    let cfg = SyncConfig::from_lookup(lookup_from(&[
        (ENV_STALE_THRESHOLD_MS, "4000"),
        (ENV_HEARTBEAT_INTERVAL_MS, " 1000 "),
        (ENV_CHANNEL_PREFIX, "tabs-test"),
        (ENV_GEOMETRY_POLL_MS, "33"),
    ]))
    .unwrap();
    assert_eq!(
        cfg,
        SyncConfig {
            stale_threshold_ms: 4000,
            heartbeat_interval_ms: 1000,
            channel_prefix: "tabs-test".to_owned(),
            geometry_poll_ms: 33,
        }
    );
    assert_eq!(cfg.heartbeat_interval(), Duration::from_secs(1));
    assert_eq!(cfg.geometry_poll_interval(), Duration::from_millis(33));
}

#[test]
fn unparsable_values_fall_back_to_defaults() {
    let cfg = SyncConfig::from_lookup(lookup_from(&[
        (ENV_STALE_THRESHOLD_MS, "soon"),
        (ENV_GEOMETRY_POLL_MS, "-1"),
    ]))
    .unwrap();
    assert_eq!(cfg.stale_threshold_ms, DEFAULT_STALE_THRESHOLD_MS);
    assert_eq!(cfg.geometry_poll_ms, DEFAULT_GEOMETRY_POLL_MS);
}

#[test]
fn heartbeat_longer_than_threshold_is_rejected() {
    let err = SyncConfig::from_lookup(lookup_from(&[
        (ENV_STALE_THRESHOLD_MS, "1000"),
        (ENV_HEARTBEAT_INTERVAL_MS, "1500"),
    ]))
    .unwrap_err();
    assert_eq!(err, ConfigError::HeartbeatExceedsThreshold { heartbeat_ms: 1500, stale_threshold_ms: 1000 });
    assert_eq!(err.error_code(), "E_CONFIG_HEARTBEAT");
}

#[test]
fn zero_intervals_are_rejected() {
    let zero_stale = SyncConfig { stale_threshold_ms: 0, ..SyncConfig::default() };
    assert_eq!(zero_stale.validate(), Err(ConfigError::ZeroStaleThreshold));

    let zero_heartbeat = SyncConfig { heartbeat_interval_ms: 0, ..SyncConfig::default() };
    assert_eq!(zero_heartbeat.validate(), Err(ConfigError::ZeroHeartbeatInterval));

    let zero_poll = SyncConfig { geometry_poll_ms: 0, ..SyncConfig::default() };
    assert_eq!(zero_poll.validate(), Err(ConfigError::ZeroPollInterval));
}

#[test]
fn prefix_must_be_non_empty_without_separator() {
    for prefix in ["", "a:b"] {
        let cfg = SyncConfig { channel_prefix: prefix.to_owned(), ..SyncConfig::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidPrefix(prefix.to_owned())));
    }
}
