use dohproxy_domain::config::{ListenKind, LogFormat, UpstreamKind};
use dohproxy_domain::{Config, ConfigError, RuleTarget};
use std::net::Ipv4Addr;

const FULL_CONFIG: &str = r#"
rules = [
    "suffix:example.com doh1",
    "fqdn:static.example.com 203.0.113.5",
    "keyword:ads blackhole",
    "wildcard:* local",
]

[logging]
level = "warning"
format = "json"
output = "stderr"

[cache]
enabled = false
compaction_interval = 60

[[listen]]
type = "udp"
address = "127.0.0.1:5353"

[[listen]]
type = "tcp"
address = "127.0.0.1:5353"

[upstreams.doh1]
type = "doh-get"
address = "https://resolver.example/dns-query"
proxy = "http://127.0.0.1:8080"

[upstreams.doh2]
type = "doh"
address = "https://resolver.example/dns-query"

[upstreams.local]
type = "dns"
address = "192.168.1.1:53"
timeout_ms = 1500
"#;

#[test]
fn test_config_default_values() {
    let config = Config::default();

    assert_eq!(config.listen.len(), 2);
    assert_eq!(config.listen[0].kind, ListenKind::Udp);
    assert_eq!(config.listen[1].kind, ListenKind::Tcp);
    assert!(config.cache.enabled);
    assert_eq!(config.cache.compaction_interval, 600);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_deserialization_with_all_fields() {
    let config = Config::from_toml_str(FULL_CONFIG).unwrap();

    assert_eq!(config.rules.len(), 4);
    assert_eq!(config.logging.level_directive().unwrap(), "warn");
    assert_eq!(config.logging.format, LogFormat::Json);
    assert!(!config.cache.enabled);
    assert_eq!(config.cache.compaction_interval, 60);
    assert_eq!(config.listen.len(), 2);

    let doh1 = &config.upstreams["doh1"];
    assert_eq!(doh1.kind, UpstreamKind::DohGet);
    assert_eq!(doh1.proxy.as_deref(), Some("http://127.0.0.1:8080"));

    // "doh" is an alias of "doh-get"
    assert_eq!(config.upstreams["doh2"].kind, UpstreamKind::DohGet);
    assert_eq!(config.upstreams["local"].timeout_ms, Some(1500));

    assert!(config.validate().is_ok());
}

#[test]
fn test_build_rules_preserves_order_and_targets() {
    let config = Config::from_toml_str(FULL_CONFIG).unwrap();
    let rules = config.build_rules().unwrap();

    assert_eq!(rules.len(), 4);
    assert_eq!(rules[0].upstream_name(), Some("doh1"));
    assert_eq!(
        rules[1].target(),
        &RuleTarget::Static(Ipv4Addr::new(203, 0, 113, 5))
    );
    assert_eq!(rules[2].upstream_name(), Some("blackhole"));
    assert_eq!(rules[3].upstream_name(), Some("local"));
}

#[test]
fn test_unknown_upstream_type_is_parse_error() {
    let toml_str = r#"
        [upstreams.bad]
        type = "dot"
        address = "1.1.1.1:853"
    "#;
    assert!(matches!(
        Config::from_toml_str(toml_str),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_unknown_listen_type_is_parse_error() {
    let toml_str = r#"
        [[listen]]
        type = "sctp"
        address = "127.0.0.1:53"
    "#;
    assert!(matches!(
        Config::from_toml_str(toml_str),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_missing_upstream_address_is_parse_error() {
    let toml_str = r#"
        [upstreams.bad]
        type = "dns"
    "#;
    assert!(matches!(
        Config::from_toml_str(toml_str),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_validate_rejects_unresolvable_rule_target() {
    let mut config = Config::default();
    config.rules.push("suffix:example.com nowhere".to_string());
    assert!(matches!(
        config.validate(),
        Err(ConfigError::UnknownUpstream(name)) if name == "nowhere"
    ));
}

#[test]
fn test_validate_rejects_invalid_regex() {
    let mut config = Config::default();
    config.rules.insert(0, "regex:(ads default".to_string());
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidRegex { .. })
    ));
}

#[test]
fn test_validate_rejects_reserved_upstream_name() {
    let toml_str = r#"
        [[listen]]
        type = "udp"
        address = "127.0.0.1:5353"

        [upstreams.reject]
        type = "dns"
        address = "1.1.1.1:53"
    "#;
    let config = Config::from_toml_str(toml_str).unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ReservedUpstreamName(name)) if name == "reject"
    ));
}

#[test]
fn test_validate_rejects_bad_addresses() {
    let mut config = Config::default();
    config.listen[0].address = "localhost".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidListenAddress { .. })
    ));

    let mut config = Config::default();
    config.upstreams.get_mut("default").unwrap().address = "8.8.8.8".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidUpstreamAddress { .. })
    ));
}

#[test]
fn test_validate_rejects_doh_without_url() {
    let toml_str = r#"
        [[listen]]
        type = "udp"
        address = "127.0.0.1:5353"

        [upstreams.doh]
        type = "doh-post"
        address = "resolver.example:443"
    "#;
    let config = Config::from_toml_str(toml_str).unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidUpstreamAddress { .. })
    ));
}

#[test]
fn test_validate_requires_listener() {
    let mut config = Config::default();
    config.listen.clear();
    assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
}

#[test]
fn test_validate_rejects_unknown_log_level() {
    let mut config = Config::default();
    config.logging.level = "dpanic".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidLogLevel(level)) if level == "dpanic"
    ));
}

#[test]
fn test_filter_directive_includes_module_overrides() {
    let mut config = Config::default();
    config.logging.level = "debug".to_string();
    config
        .logging
        .filters
        .insert("hyper".to_string(), "warning".to_string());
    assert_eq!(config.logging.filter_directive().unwrap(), "debug,hyper=warn");
}

#[test]
fn test_cli_override_log_level() {
    let path = std::env::temp_dir().join(format!("dohproxy-config-{}.toml", std::process::id()));
    std::fs::write(&path, FULL_CONFIG).unwrap();

    let config = Config::load(
        path.to_str(),
        dohproxy_domain::CliOverrides {
            log_level: Some("error".to_string()),
        },
    )
    .unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.logging.level, "error");
}

#[test]
fn test_load_missing_file_is_error() {
    let result = Config::load(
        Some("/nonexistent/dohproxy.toml"),
        dohproxy_domain::CliOverrides::default(),
    );
    assert!(matches!(result, Err(ConfigError::FileRead(_, _))));
}
