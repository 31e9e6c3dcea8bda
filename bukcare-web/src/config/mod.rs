use serde::Deserialize;
use std::path::PathBuf;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    pub telemetry: TelemetrySettings,
    #[serde(default)]
    pub search: SearchSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Mark the session cookie `Secure`. Enable behind HTTPS.
    #[serde(default)]
    pub secure_cookies: bool,
    #[serde(default = "default_session_inactivity_minutes")]
    pub session_inactivity_minutes: i64,
}

fn default_session_inactivity_minutes() -> i64 {
    24 * 60
}

#[derive(Deserialize, Clone, Debug)]
pub struct BackendSettings {
    /// Base URL of the REST API, e.g. `http://localhost:8000/api/v1`.
    pub url: String,
    /// Prefix of the admin management endpoints, relative to `url`.
    #[serde(default = "default_admin_path")]
    pub admin_path: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_admin_path() -> String {
    "/admin".to_string()
}

fn default_timeout_seconds() -> u64 {
    15
}

#[derive(Deserialize, Clone, Debug)]
pub struct TelemetrySettings {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

fn default_service_name() -> String {
    "bukcare-web".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Clone, Debug)]
pub struct SearchSettings {
    /// Client-side debounce applied to the admin search box.
    pub debounce_ms: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("Failed to determine the current directory: {}", e))
    })?;

    let configuration_directory = configuration_directory(base_path);

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

/// Works both from the workspace root and from inside `bukcare-web/`.
fn configuration_directory(base_path: PathBuf) -> PathBuf {
    if base_path.ends_with("bukcare-web") {
        base_path.join("config")
    } else {
        base_path.join("bukcare-web").join("config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_config_dir_from_workspace_root() {
        let dir = configuration_directory(PathBuf::from("/srv/app"));
        assert_eq!(dir, PathBuf::from("/srv/app/bukcare-web/config"));
    }

    #[test]
    fn resolves_config_dir_inside_crate() {
        let dir = configuration_directory(PathBuf::from("/srv/app/bukcare-web"));
        assert_eq!(dir, PathBuf::from("/srv/app/bukcare-web/config"));
    }

    #[test]
    fn base_yaml_deserializes() {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../../config/base.yaml"),
                config::FileFormat::Yaml,
            ))
            .build()
            .unwrap()
            .try_deserialize::<Settings>()
            .unwrap();

        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.backend.admin_path, "/admin");
        assert_eq!(settings.search.debounce_ms, 300);
        assert!(settings.telemetry.otlp_endpoint.is_none());
    }
}
