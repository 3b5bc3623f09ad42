use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub server: ServerConfig,
    pub llm: Option<LlmConfig>,
    pub api_keys: Option<ApiKeysConfig>,
    pub cors: Option<CorsConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LlmConfig {
    pub model: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiKeysConfig {
    pub openai_api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8501,
            },
            llm: None,
            api_keys: None,
            cors: Some(CorsConfig {
                allowed_origins: vec!["http://localhost:3000".to_string()],
            }),
        }
    }
}

impl ApiConfig {
    /// Load the config file, creating a commented default on first run.
    ///
    /// `path` overrides the default location under the user config
    /// directory.
    pub fn load(path: Option<PathBuf>) -> Result<(Self, PathBuf), ConfigError> {
        let config_path = path.unwrap_or_else(get_config_path);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        if !config_path.exists() {
            let default_config = r#"
[server]
host = "127.0.0.1"
port = 8501

[cors]
allowed_origins = ["http://localhost:3000"]

[llm]
# model = "gpt-4o"

[api_keys]
# openai_api_key = "your-openai-key"
# Falls back to the OPENAI_API_KEY environment variable when unset.
"#;
            std::fs::write(&config_path, default_config).map_err(|e| {
                ConfigError::Message(format!("Failed to write default config: {e}"))
            })?;
        }

        let builder = Config::builder()
            .add_source(File::from(config_path.clone()))
            .build()?;

        let config: ApiConfig = builder.try_deserialize()?;

        Ok((config, config_path))
    }

    /// Resolve the OpenAI API key from the config file or the environment
    pub fn openai_api_key(&self) -> Option<String> {
        self.api_keys
            .as_ref()
            .and_then(|keys| keys.openai_api_key.clone())
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
    }

    /// Resolve the model name, defaulting to gpt-4o
    pub fn model(&self) -> String {
        self.llm
            .as_ref()
            .and_then(|llm| llm.model.clone())
            .unwrap_or_else(|| finagent_llm::models::openai::GPT_4O.to_string())
    }
}

fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("finagent/api.toml")
    } else {
        PathBuf::from("api.toml")
    }
}
