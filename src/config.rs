use color_eyre::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::assistant::instructions::DEFAULT_MODEL;

const APP_NAME: &str = "dopl-chatbot";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Hosted model API settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: DEFAULT_MODEL.to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 120,
        }
    }
}

/// Retrieval knowledge base
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct KnowledgeConfig {
    pub vector_store_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// The two values every exchange needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub vector_store_id: String,
}

/// Missing setup that stops the program before any chat begins
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SetupError {
    #[error("⚠️ Vector Store ID가 설정되지 않았습니다!")]
    MissingKnowledgeSource,
    #[error("⚠️ OpenAI API 키가 설정되지 않았습니다!")]
    MissingApiKey,
}

impl SetupError {
    /// Headline plus instructions for fixing the environment
    #[must_use]
    pub fn remediation(&self) -> String {
        let config_hint = Config::config_path()
            .map(|path| format!("\n또는 설정 파일({})에 값을 입력하세요.\n", path.display()))
            .unwrap_or_default();
        format!(
            "{}\n\n\
### .env 파일 설정 방법:\n\n\
프로젝트 폴더에 `.env` 파일을 만들고 아래 내용을 추가하세요:\n\n\
OPENAI_API_KEY=sk-proj-xxxxxxxxxxxxx\n\
VECTOR_STORE_ID=vs_xxxxxxxxxxxxx\n{}",
            self, config_hint
        )
    }
}

impl Config {
    /// Loads configuration from disk (creating defaults if absent), then applies `.env` and environment overrides
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let mut config = Self::load_file()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Config::default();
            config.save()?;
            return Ok(config);
        }

        let contents = fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Environment wins over the file; blank values are ignored
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(api_key) = value("OPENAI_API_KEY") {
            self.openai.api_key = api_key;
        }
        if let Some(vector_store_id) = value("VECTOR_STORE_ID") {
            self.knowledge.vector_store_id = vector_store_id;
        }
        if let Some(base_url) = value("OPENAI_BASE_URL") {
            self.openai.base_url = base_url;
        }
        if let Some(model) = value("OPENAI_MODEL") {
            self.openai.model = model;
        }
    }

    /// Checks the knowledge source first, then the API key
    pub fn require_credentials(&self) -> Result<Credentials, SetupError> {
        let vector_store_id = self.knowledge.vector_store_id.trim();
        if vector_store_id.is_empty() {
            return Err(SetupError::MissingKnowledgeSource);
        }
        let api_key = self.openai.api_key.trim();
        if api_key.is_empty() {
            return Err(SetupError::MissingApiKey);
        }
        Ok(Credentials {
            api_key: api_key.to_string(),
            vector_store_id: vector_store_id.to_string(),
        })
    }

    /// Saves configuration to disk
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&config_path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory holding the log file
    pub fn data_dir() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
            .ok_or_else(|| color_eyre::eyre::eyre!("Could not determine config directory"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.openai.base_url, "https://api.openai.com/v1");
        assert_eq!(config.openai.request_timeout_secs, 120);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str("[knowledge]\nvector_store_id = \"vs_1\"\n").unwrap();
        assert_eq!(config.knowledge.vector_store_id, "vs_1");
        assert_eq!(config.openai, OpenAiConfig::default());
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut config = Config::default();
        config.openai.model = "gpt-4.1-mini".to_string();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut config = Config::default();
        config.knowledge.vector_store_id = "vs_file".to_string();
        config.apply_overrides(env(&[
            ("OPENAI_API_KEY", "sk-env"),
            ("VECTOR_STORE_ID", "vs_env"),
            ("OPENAI_MODEL", "  "),
        ]));
        assert_eq!(config.openai.api_key, "sk-env");
        assert_eq!(config.knowledge.vector_store_id, "vs_env");
        assert_eq!(config.openai.model, "gpt-4o-mini");
    }

    #[test]
    fn test_missing_knowledge_source_is_reported_first() {
        let config = Config::default();
        assert_eq!(
            config.require_credentials(),
            Err(SetupError::MissingKnowledgeSource)
        );
    }

    #[test]
    fn test_missing_api_key() {
        let mut config = Config::default();
        config.knowledge.vector_store_id = "vs_1".to_string();
        assert_eq!(config.require_credentials(), Err(SetupError::MissingApiKey));
    }

    #[test]
    fn test_credentials_are_trimmed() {
        let mut config = Config::default();
        config.knowledge.vector_store_id = " vs_1 ".to_string();
        config.openai.api_key = "sk-1\n".to_string();
        assert_eq!(
            config.require_credentials(),
            Ok(Credentials {
                api_key: "sk-1".to_string(),
                vector_store_id: "vs_1".to_string(),
            })
        );
    }

    #[test]
    fn test_remediation_mentions_env_file() {
        let text = SetupError::MissingKnowledgeSource.remediation();
        assert!(text.starts_with("⚠️ Vector Store ID"));
        assert!(text.contains("VECTOR_STORE_ID=vs_"));
        assert!(text.contains("OPENAI_API_KEY=sk-proj-"));
    }
}
