use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_apply_when_only_database_url_set() {
    let config = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/spend")])).unwrap();
    assert_eq!(config.database_url, "postgres://localhost/spend");
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.db_max_connections, DEFAULT_DB_MAX_CONNECTIONS);
    assert_eq!(config.session_ttl_secs, DEFAULT_SESSION_TTL_SECS);
    assert!(config.cors_origins.is_empty());
    assert_eq!(config.currency_symbol, DEFAULT_CURRENCY_SYMBOL);
}

#[test]
fn missing_database_url_is_an_error() {
    let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
    assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
}

#[test]
fn blank_database_url_is_an_error() {
    let err = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "   ")])).unwrap_err();
    assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
}

#[test]
fn overrides_are_parsed() {
    let config = AppConfig::from_lookup(lookup_from(&[
        ("DATABASE_URL", "postgres://db"),
        ("PORT", "8080"),
        ("DB_MAX_CONNECTIONS", "12"),
        ("SESSION_TTL_SECS", "60"),
        ("CURRENCY_SYMBOL", "$"),
    ]))
    .unwrap();
    assert_eq!(config.port, 8080);
    assert_eq!(config.db_max_connections, 12);
    assert_eq!(config.session_ttl_secs, 60);
    assert_eq!(config.currency_symbol, "$");
}

#[test]
fn invalid_port_reports_key_and_value() {
    let err = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://db"), ("PORT", "eighty")])).unwrap_err();
    assert_eq!(err, ConfigError::Invalid { key: "PORT", value: "eighty".into() });
}

#[test]
fn empty_numeric_value_falls_back_to_default() {
    let config = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://db"), ("PORT", "")])).unwrap();
    assert_eq!(config.port, DEFAULT_PORT);
}

#[test]
fn origins_are_trimmed_and_blank_entries_dropped() {
    let origins = parse_origins(Some(" http://localhost:5173 , ,https://app.example.com,"));
    assert_eq!(origins, vec!["http://localhost:5173", "https://app.example.com"]);
}

#[test]
fn origins_unset_is_empty() {
    assert!(parse_origins(None).is_empty());
}
