use std::fmt;

use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::error::SearchError;

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub api_keys: ApiKeySettings,
    pub search: SearchSettings,
    pub rate_limit: RateLimitSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub log_file: Option<String>,
}

#[derive(Deserialize, Clone, Default)]
pub struct ApiKeySettings {
    pub google_api_key: Option<String>,
    pub search_engine_id: Option<String>,
    pub client_key: Option<String>,
}

impl fmt::Debug for ApiKeySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[redacted]");
        f.debug_struct("ApiKeySettings")
            .field("google_api_key", &redact(&self.google_api_key))
            .field("search_engine_id", &self.search_engine_id)
            .field("client_key", &redact(&self.client_key))
            .finish()
    }
}

/// Credentials needed to talk to the Custom Search API.
#[derive(Clone)]
pub struct GoogleCredentials {
    pub api_key: String,
    pub search_engine_id: String,
}

impl ApiKeySettings {
    /// Fails when either the API key or the search engine id is missing or blank.
    pub fn google_credentials(&self) -> Result<GoogleCredentials, SearchError> {
        match (non_blank(&self.google_api_key), non_blank(&self.search_engine_id)) {
            (Some(api_key), Some(search_engine_id)) => Ok(GoogleCredentials {
                api_key: api_key.to_string(),
                search_engine_id: search_engine_id.to_string(),
            }),
            _ => Err(SearchError::Configuration(
                "Missing API key or Search Engine ID in configuration".to_string(),
            )),
        }
    }

    pub fn client_key(&self) -> Result<&str, SearchError> {
        non_blank(&self.client_key).ok_or_else(|| {
            SearchError::Configuration("Missing client key in configuration".to_string())
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Deserialize, Debug, Clone)]
pub struct SearchSettings {
    pub endpoint: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_secs: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub page_size: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_results: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_extraction_depth: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            endpoint: "https://www.googleapis.com/customsearch/v1".to_string(),
            timeout_secs: 30,
            page_size: 10,
            max_results: 1000,
            max_extraction_depth: 64,
        }
    }
}

impl SearchSettings {
    /// 1-based `start` offsets requested during one run: 1, 11, 21, ...
    pub fn page_offsets(&self) -> impl Iterator<Item = u32> {
        let step = self.page_size.max(1);
        (0..self.max_results).step_by(step as usize).map(|i| i + 1)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct RateLimitSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub requests_per_minute: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub requests_per_day: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        RateLimitSettings {
            requests_per_minute: 10,
            requests_per_day: 100,
        }
    }
}

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
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    // A missing .env file is fine, real deployments set the variables directly.
    _ = dotenvy::dotenv();

    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("Failed to determine the current directory: {}", e))
    })?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(
            config::File::from(configuration_directory.join(environment_filename)).required(false),
        )
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
