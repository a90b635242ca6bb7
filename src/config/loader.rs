//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Deserialize a TOML document. Missing sections take their defaults.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Environment variable that overrides the listener port.
pub const PORT_VAR: &str = "PORT";

/// Environment variable overriding the target of service `name`,
/// e.g. `AUTH_SERVICE_URL` or `VIDEO_SERVICE_URL`.
pub fn service_url_var(name: &str) -> String {
    format!("{}_SERVICE_URL", name.to_ascii_uppercase().replace('-', "_"))
}

/// Apply container-style overrides on top of the loaded configuration.
///
/// Empty values are ignored. Overridden values are not checked here; startup
/// validation rejects a bad port or target. Returns the variables applied.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
    let mut applied = Vec::new();

    if let Some(port) = lookup(PORT_VAR) {
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map_or("0.0.0.0", |(host, _)| host);
        config.listener.bind_address = format!("{host}:{}", port.trim());
        applied.push(PORT_VAR.to_string());
    }

    for service in &mut config.services {
        let var = service_url_var(&service.name);
        if let Some(target) = lookup(&var) {
            service.target = target.trim().to_string();
            applied.push(var);
        }
    }

    applied
}

/// Read and deserialize a TOML file. Semantic validation happens at startup.
pub fn read_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogFormat;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn parses_full_document() {
        let config = parse_config(
            r#"
            name = "PulseOne Gateway"

            [listener]
            bind_address = "127.0.0.1:9000"

            [[services]]
            name = "auth"
            path_prefix = "/auth"
            target = "http://auth-service:8080"

            [[services]]
            name = "video"
            path_prefix = "/video"
            target = "video-service:8086"
            response_timeout_secs = 120

            [timeouts]
            connect_secs = 2

            [cors]
            allowed_origins = ["https://app.example.com"]
            allow_credentials = false

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.name, "PulseOne Gateway");
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.services.len(), 2);
        assert_eq!(config.services[1].response_timeout_secs, Some(120));
        assert_eq!(config.timeouts.connect_secs, 2);
        assert_eq!(config.timeouts.response_secs, 30);
        assert_eq!(config.cors.allowed_origins, ["https://app.example.com"]);
        assert!(!config.cors.allow_credentials);
        assert!(config.cors.enabled);
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.services.len(), 6);
        assert_eq!(config.endpoints.health_path, "/health");
    }

    #[test]
    fn syntax_errors_are_reported() {
        assert!(matches!(parse_config("[[services]\nname ="), Err(ConfigError::Parse(_))));
        assert!(matches!(
            parse_config("[[services]]\nname = \"auth\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_config(Path::new("/nonexistent/gateway.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/gateway.toml"));
    }

    #[test]
    fn service_url_var_names() {
        assert_eq!(service_url_var("auth"), "AUTH_SERVICE_URL");
        assert_eq!(service_url_var("video-consult"), "VIDEO_CONSULT_SERVICE_URL");
    }

    #[test]
    fn env_overrides_targets_and_port() {
        let mut config = GatewayConfig::default();
        let applied = apply_env_overrides(
            &mut config,
            env(&[
                ("AUTH_SERVICE_URL", "http://auth-service:8080"),
                ("PROFILE_SERVICE_URL", ""),
                ("PORT", "9000"),
            ]),
        );

        assert_eq!(applied, ["PORT", "AUTH_SERVICE_URL"]);
        assert_eq!(config.listener.bind_address, "0.0.0.0:9000");
        assert_eq!(config.services[0].target, "http://auth-service:8080");
        assert_eq!(config.services[1].target, "http://localhost:8082");
    }

    #[test]
    fn env_overrides_absent_leave_config_alone() {
        let mut config = GatewayConfig::default();
        assert!(apply_env_overrides(&mut config, env(&[])).is_empty());
        assert_eq!(config.listener.bind_address, "0.0.0.0:8000");
    }

    #[test]
    fn bad_port_override_fails_validation() {
        let mut config = GatewayConfig::default();
        apply_env_overrides(&mut config, env(&[("PORT", "eighty")]));
        let errors = crate::config::validation::validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            [crate::config::validation::ValidationError::BindAddress(
                "0.0.0.0:eighty".into()
            )]
        );
    }
}
