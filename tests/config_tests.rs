use fhir_capability_viewer::core::DEFAULT_RELAY_ENDPOINT;
use fhir_capability_viewer::{CapabilityError, CapabilityLoader, LoaderConfig, TransportStrategy};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio_test::{assert_err, assert_ok};
use url::Url;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_config_from_file() {
    let file = write_config(
        r#"{
            "strategies": [
                {"type": "direct"},
                {"type": "relay", "endpoint": "https://relay.example/get", "param": "target"}
            ],
            "user_agent": "capview-tests",
            "timeout_secs": 5,
            "discard_stale": false
        }"#,
    );

    let config = assert_ok!(LoaderConfig::from_file(file.path()));
    assert_eq!(
        config.strategies[1],
        TransportStrategy::Relay {
            endpoint: Url::parse("https://relay.example/get").unwrap(),
            param: "target".to_string(),
        }
    );
    assert_eq!(config.user_agent, "capview-tests");
    assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
    assert!(!config.discard_stale);
}

#[test]
fn test_explicit_path_is_required_to_exist() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    let err = assert_err!(LoaderConfig::load(Some(missing.as_path())));
    assert!(matches!(err, CapabilityError::Io(_)));
}

#[test]
fn test_invalid_files_are_rejected() {
    let malformed = write_config("{ not json");
    assert!(matches!(
        LoaderConfig::from_file(malformed.path()),
        Err(CapabilityError::Serialization(_))
    ));

    let no_strategies = write_config(r#"{"strategies": []}"#);
    assert!(matches!(
        LoaderConfig::from_file(no_strategies.path()),
        Err(CapabilityError::Config { .. })
    ));
}

#[test]
fn test_default_relay_endpoint() {
    let config = LoaderConfig::default();
    assert_eq!(
        config.strategies[1],
        TransportStrategy::relay(Url::parse(DEFAULT_RELAY_ENDPOINT).unwrap())
    );
}

#[test]
fn test_loader_from_config() {
    let config = LoaderConfig::default()
        .without_relay()
        .with_timeout(Duration::from_secs(3))
        .with_user_agent("capview-tests");

    let loader = assert_ok!(CapabilityLoader::new(&config));
    assert_eq!(loader.strategies(), &[TransportStrategy::Direct]);

    let invalid = LoaderConfig::default().with_strategies(Vec::new());
    assert_err!(CapabilityLoader::new(&invalid));
}
