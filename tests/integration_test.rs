use openrouter_cli::config::Config;

#[test]
fn test_config_validation_requires_api_key_for_remote_api() {
    let config = Config {
        api_key: None,
        api_url: "https://openrouter.ai/api/v1".to_string(),
    };

    let error = config.validate().unwrap_err();
    assert!(error.to_string().contains("API key"));
}

#[test]
fn test_config_validation_allows_local_endpoint_without_api_key() {
    let config = Config {
        api_key: None,
        api_url: "http://localhost:8000/v1".to_string(),
    };

    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation_rejects_non_http_url() {
    let config = Config {
        api_key: Some("sk-or-test".to_string()),
        api_url: "openrouter.ai/api/v1".to_string(),
    };

    assert!(config.validate().is_err());
}
