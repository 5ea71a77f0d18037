//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, overlay the environment onto, and validate a TOML configuration file.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: RelayConfig = toml::from_str(&content)?;
    finish(config)
}

/// Build a configuration from defaults plus the process environment.
pub fn load_from_env() -> Result<RelayConfig, ConfigError> {
    finish(RelayConfig::default())
}

fn finish(mut config: RelayConfig) -> Result<RelayConfig, ConfigError> {
    apply_env(&mut config, |name| std::env::var(name).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay the upstream endpoint from the variable named by
/// `upstream.endpoint_env`. Empty values count as unset.
pub fn apply_env<F>(config: &mut RelayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(&config.upstream.endpoint_env) {
        let value = value.trim();
        if !value.is_empty() {
            config.upstream.endpoint = Some(value.to_string());
        }
    }

    // An empty endpoint in the file is the same as none at all.
    if config
        .upstream
        .endpoint
        .as_deref()
        .is_some_and(|e| e.trim().is_empty())
    {
        config.upstream.endpoint = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ClientKind, MissingEndpointPolicy};
    use std::io::Write;

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [upstream]
            endpoint = "https://fn.example.net/api/ai_agent?code=abc"
            endpoint_env = "AGENT_RELAY_TEST_UNSET_VARIABLE"
            client = "fetch"
            "#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.upstream.client, ClientKind::Fetch);
        assert_eq!(
            config.upstream.endpoint.as_deref(),
            Some("https://fn.example.net/api/ai_agent?code=abc")
        );
    }

    #[test]
    fn test_load_config_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [listener]
            route = "no-slash"
            [upstream]
            endpoint_env = "AGENT_RELAY_TEST_UNSET_VARIABLE"
            "#
        )
        .unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("no-slash"));
    }

    #[test]
    fn test_load_config_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listener\nbind_address = 1").unwrap();
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_env_overrides_file_endpoint() {
        let mut config = RelayConfig::default();
        config.upstream.endpoint = Some("http://from-file/api".into());

        apply_env(&mut config, |name| {
            (name == "API_ENDPOINT").then(|| "https://from-env/api?code=1".to_string())
        });
        assert_eq!(config.upstream.endpoint.as_deref(), Some("https://from-env/api?code=1"));
    }

    #[test]
    fn test_custom_env_name() {
        let mut config = RelayConfig::default();
        config.upstream.endpoint_env = "VITE_API_ENDPOINT".into();
        config.upstream.missing_endpoint = MissingEndpointPolicy::Fallback;

        apply_env(&mut config, |name| {
            (name == "VITE_API_ENDPOINT").then(|| "http://vite/api".to_string())
        });
        assert_eq!(config.upstream.endpoint.as_deref(), Some("http://vite/api"));
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let mut config = RelayConfig::default();
        apply_env(&mut config, |_| Some("   ".to_string()));
        assert_eq!(config.upstream.endpoint, None);

        config.upstream.endpoint = Some(String::new());
        apply_env(&mut config, |_| None);
        assert_eq!(config.upstream.endpoint, None);
    }
}
