use std::path::PathBuf;
use std::time::Duration;
use config::Config;

pub const DEFAULT_BACKEND_URL: &str = "https://subscribe-backend-2.onrender.com";

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Settings {
    pub widget: WidgetSettings,
    pub session: SessionSettings,
    pub notifications: NotificationSettings,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct WidgetSettings {
    pub backend_url: String,
    pub client_id: Option<String>,
    pub strategy: Strategy,
}

#[derive(serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    IdentityProvider,
    Email,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct SessionSettings {
    pub path: PathBuf,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct NotificationSettings {
    pub dismiss_after_milliseconds: u64,
}

impl NotificationSettings {
    pub fn dismiss_after(&self) -> Duration {
        Duration::from_millis(self.dismiss_after_milliseconds)
    }
}

/// The credential strategy after the settings have been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialConfig {
    IdentityProvider { client_id: String },
    Email,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigurationError {
    #[error("`widget.client_id` must be set when the identity_provider strategy is selected")]
    MissingClientId,
    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

impl WidgetSettings {
    pub fn credential_config(&self) -> Result<CredentialConfig, ConfigurationError> {
        match self.strategy {
            Strategy::Email => Ok(CredentialConfig::Email),
            Strategy::IdentityProvider => match self.client_id.as_deref().map(str::trim) {
                Some(client_id) if !client_id.is_empty() => Ok(CredentialConfig::IdentityProvider {
                    client_id: client_id.to_string(),
                }),
                _ => Err(ConfigurationError::MissingClientId),
            },
        }
    }
}

pub fn get_configuration() -> Result<Settings, ConfigurationError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("Failed to determine the current directory: {}", e)))?;
    let configuration_directory = base_path.join("configuration");

    // Detect the running environment.
    // Default to `local` if unspecified.
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;

    let settings = Config::builder()
        .set_default("widget.backend_url", DEFAULT_BACKEND_URL)?
        .set_default("notifications.dismiss_after_milliseconds", 3000)?
        .add_source(config::File::from(configuration_directory.join("base")).required(true))
        .add_source(config::File::from(configuration_directory.join(environment.as_str())).required(true))
        .add_source(config::Environment::with_prefix("app").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// The possible runtime environment for our application.
#[derive(Debug)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!("{} is not a supported environment. Use either `local` or `production`.", other)),
        }
    }
}
