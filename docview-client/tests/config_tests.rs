use docview_client::config::{AuthConfig, ClientConfig, ConfigError, LogConfig, ModuleOverride};
use docview_core::{EndpointIds, Operation, PropertyScope};
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::io::Write;

fn base_config() -> ClientConfig {
    ClientConfig {
        api_base_url: "http://localhost:8080".to_string(),
        auth: AuthConfig {
            api_key: Some("test-key".to_string()),
            jwt: None,
        },
        request_timeout_ms: 5_000,
        log: LogConfig::default(),
        modules: BTreeMap::new(),
    }
}

#[test]
fn config_requires_auth() {
    let mut config = base_config();
    config.auth = AuthConfig {
        api_key: None,
        jwt: None,
    };
    assert!(config.validate().is_err());
}

#[test]
fn config_requires_http_base_url() {
    let mut config = base_config();
    config.api_base_url = "localhost:8080".to_string();
    match config.validate() {
        Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "api_base_url"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn config_requires_timeout() {
    let mut config = base_config();
    config.request_timeout_ms = 0;
    assert!(config.validate().is_err());
}

#[test]
fn module_override_templates_are_checked() {
    let mut config = base_config();
    config.modules.insert(
        "goals".to_string(),
        ModuleOverride {
            base: Some("goals/document-view".to_string()),
            ..Default::default()
        },
    );
    match config.validate() {
        Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "modules.goals.base"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
api_base_url = "https://api.example.test"
request_timeout_ms = 2500

[auth]
api_key = "k-123"
jwt = "eyJ"

[log]
filter = "docview_client=debug"
json = true

[modules.goals]
base = "/v2/goals/document-view"
records = "{{base}}/items"
property_view = "all-goals"
"#
    )
    .unwrap();

    let config = ClientConfig::from_path(file.path()).unwrap();
    config.validate().unwrap();
    assert_eq!(config.request_timeout_ms, 2500);
    assert!(config.log.json);

    let routes = config.route_table();
    let goals = routes.route("goals").unwrap();
    assert_eq!(
        goals.property_scope,
        PropertyScope::View {
            default_view_id: "all-goals".to_string()
        }
    );
    let records = routes
        .resolve("goals", Operation::ListRecords, &EndpointIds::none(), None)
        .unwrap();
    assert_eq!(records.path, "/v2/goals/document-view/items");
    let add = routes
        .resolve("goals", Operation::AddProperty, &EndpointIds::none(), None)
        .unwrap();
    assert_eq!(add.path, "/v2/goals/document-view/views/all-goals/properties");
}

#[test]
fn override_keeps_builtin_fields_it_does_not_set() {
    let mut config = base_config();
    config.modules.insert(
        "people".to_string(),
        ModuleOverride {
            base: Some("/crm/people".to_string()),
            ..Default::default()
        },
    );
    let routes = config.route_table();
    let people = routes.route("people").unwrap();
    assert_eq!(people.records, "{base}/records");
    let path = routes
        .resolve("people", Operation::DeleteProperty, &EndpointIds::property("email"), None)
        .unwrap()
        .path;
    assert_eq!(path, "/crm/people/views/all-people/properties/email");
}

#[test]
fn unknown_fields_are_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
api_base_url = "https://api.example.test"
request_timeout_ms = 2500
retries = 3

[auth]
api_key = "k"
"#
    )
    .unwrap();
    assert!(matches!(
        ClientConfig::from_path(file.path()),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = ClientConfig::from_path(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

proptest! {
    #[test]
    fn positive_timeouts_validate(timeout in 1u64..600_000) {
        let mut config = base_config();
        config.request_timeout_ms = timeout;
        prop_assert!(config.validate().is_ok());
    }

    #[test]
    fn module_ids_with_separators_are_rejected(id in "[a-z]{1,6}/[a-z]{1,6}") {
        let mut config = base_config();
        config.modules.insert(id, ModuleOverride::default());
        prop_assert!(config.validate().is_err());
    }
}
