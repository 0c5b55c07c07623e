#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use tiergate_gateway::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
gateway:
  listen: "0.0.0.0:8080"
callers:
  - token: "t1"
    superusr: true # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.gateway.listen, "0.0.0.0:8080");
    assert_eq!(cfg.gateway.max_body_bytes, 2 * 1024 * 1024);
    assert!(cfg.gateway.rate_limiting);
    assert!(cfg.callers.is_empty());
    assert!(cfg.access.is_none());
}

#[test]
fn unsupported_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn body_limit_out_of_range() {
    let bad = "version: 1\ngateway:\n  max_body_bytes: 10\n";
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn duplicate_caller_tokens() {
    let bad = r#"
version: 1
callers:
  - { token: "same", user_id: 1 }
  - { token: "same", user_id: 2, premium: true }
"#;
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn access_override_is_validated() {
    // exposure for only one tier
    let bad = r#"
version: 1
access:
  exposure:
    admin: { show_hotel_ids: true, show_exact_prices: true, show_availability_details: true,
             show_optimization_insights: true, show_promotional_messages: false }
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let cfg = config::load_or_default("definitely/not/here/tiergate.yaml").expect("defaults");
    assert_eq!(cfg.version, 1);
    assert!(cfg.access.is_none());
}
