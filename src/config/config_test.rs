use serial_test::serial;
use temp_env::with_vars;

use super::*;

fn cleanup_all_chat_env_vars() {
    for (key, _) in std::env::vars() {
        if key.starts_with("CHAT__") || key == "CONFIG_PATH" {
            std::env::remove_var(&key);
        }
    }
}

#[test]
#[serial]
fn default_config_should_initialize_with_hardcoded_values() {
    let config = ChatConfig::default();

    assert_eq!(config.server.listen_address.port(), 8080);
    assert_eq!(config.server.sink_buffer_size, 128);
    assert_eq!(config.client.name, "Alice");
    assert_eq!(config.client.server_address, "http://127.0.0.1:8080");
    assert!(!config.monitoring.prometheus_enabled);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn new_should_merge_environment_overrides() {
    cleanup_all_chat_env_vars();
    with_vars(
        vec![
            ("CHAT__CLIENT__NAME", Some("Bob")),
            ("CHAT__SERVER__SINK_BUFFER_SIZE", Some("16")),
        ],
        || {
            let config = ChatConfig::new().unwrap();

            assert_eq!(config.client.name, "Bob");
            assert_eq!(config.server.sink_buffer_size, 16);
        },
    );
}

#[test]
#[serial]
fn new_should_read_listen_address_from_environment() {
    cleanup_all_chat_env_vars();
    with_vars(vec![("CHAT__SERVER__LISTEN_ADDRESS", Some("0.0.0.0:5400"))], || {
        let config = ChatConfig::new().unwrap();

        assert_eq!(config.server.listen_address.port(), 5400);
        assert!(config.server.listen_address.ip().is_unspecified());
    });
}

#[test]
#[serial]
fn with_override_config_should_merge_file_settings() {
    cleanup_all_chat_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("override.toml");

    std::fs::write(
        &config_path,
        r#"
        [server]
        listen_address = "127.0.0.1:9999"
        log_file = "chat.log"

        [monitoring]
        prometheus_enabled = true
        prometheus_port = 9200
        "#,
    )
    .unwrap();

    let empty_vars: Vec<(&str, Option<&str>)> = vec![];
    with_vars(empty_vars, || {
        let base_config = ChatConfig::new().expect("success");
        let config = base_config
            .with_override_config(config_path.to_str().unwrap())
            .expect("override should load");

        assert_eq!(config.server.listen_address.port(), 9999);
        assert_eq!(config.server.log_file, "chat.log");
        assert!(config.monitoring.prometheus_enabled);
        assert_eq!(config.monitoring.prometheus_port, 9200);
        // untouched sections keep their defaults
        assert_eq!(config.client.name, "Alice");
    });
}

#[test]
#[serial]
fn environment_variables_should_have_highest_priority() {
    cleanup_all_chat_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("client.toml");
    std::fs::write(
        &config_path,
        r#"
        [client]
        name = "FromFile"
        server_address = "http://10.0.0.1:8080"
        "#,
    )
    .unwrap();

    with_vars(
        vec![
            ("CONFIG_PATH", Some(config_path.to_str().unwrap())),
            ("CHAT__CLIENT__NAME", Some("FromEnv")),
        ],
        || {
            let config = ChatConfig::new().unwrap();

            assert_eq!(config.client.name, "FromEnv");
            assert_eq!(config.client.server_address, "http://10.0.0.1:8080");
        },
    );
}

#[test]
fn validation_should_reject_zero_sink_buffer() {
    let mut config = ChatConfig::default();
    config.server.sink_buffer_size = 0;

    assert!(config.validate().is_err());
}

#[test]
fn validation_should_reject_empty_client_name() {
    let mut config = ChatConfig::default();
    config.client.name = "   ".into();

    assert!(config.validate().is_err());
}

#[test]
fn validation_should_reject_server_address_without_scheme() {
    let mut config = ChatConfig::default();
    config.client.server_address = "127.0.0.1:8080".into();

    assert!(config.validate().is_err());
}

#[test]
fn validation_should_reject_request_timeout_below_connect_timeout() {
    let mut config = ChatConfig::default();
    config.network.connect_timeout_in_ms = 500;
    config.network.request_timeout_in_ms = 400;

    assert!(config.validate().is_err());
}

#[test]
fn validation_should_reject_privileged_prometheus_port() {
    let mut config = ChatConfig::default();
    config.monitoring.prometheus_enabled = true;
    config.monitoring.prometheus_port = 80;

    assert!(config.validate().is_err());
}

#[test]
fn server_log_path_joins_dir_and_file() {
    let config = ServerConfig::default();

    assert_eq!(config.log_path(), std::path::PathBuf::from("./logs/server.log"));
}
