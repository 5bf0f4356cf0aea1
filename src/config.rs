use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, anyhow};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config/app_config.toml";
const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_ENDPOINT: &str = "/chat/completions";
const DEFAULT_MODEL: &str = "google/gemini-2.5-flash-image";
const DEFAULT_IMAGE_SIZE: &str = "832x1248";
const DEFAULT_QUALITY: &str = "standard";
const DEFAULT_STYLE: &str = "natural";
const DEFAULT_TIMEOUT_SECONDS: u64 = 120;

#[derive(Clone, Debug)]
pub struct OpenRouterConfig {
    pub base_url: String,
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub image_size: String,
    pub aspect_ratio: Option<String>,
    pub quality: String,
    pub style: String,
    pub timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub openrouter: OpenRouterConfig,
    pub artifacts_dir: PathBuf,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config_path =
            env::var("APP_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let config_path = Path::new(&config_path);

        let contents = fs::read_to_string(config_path)
            .with_context(|| format!("读取配置文件 {:?} 失败", config_path))?;

        let file_config: FileConfig = toml::from_str(&contents)
            .with_context(|| format!("解析配置文件 {:?} 失败", config_path))?;

        let artifacts_dir = if let Some(dir) = &file_config.artifacts_dir {
            PathBuf::from(dir)
        } else if let Ok(dir) = env::var("ARTIFACTS_DIR") {
            PathBuf::from(dir)
        } else {
            env::current_dir()?.join("artifacts")
        };

        let openrouter = file_config
            .openrouter
            .unwrap_or_default()
            .into_domain(env::var("OPENROUTER_API_KEY").ok())?;

        Ok(Self {
            openrouter,
            artifacts_dir,
        })
    }
}

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    artifacts_dir: Option<String>,
    #[serde(default)]
    openrouter: Option<FileOpenRouterConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct FileOpenRouterConfig {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    endpoint: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    image_size: Option<String>,
    #[serde(default)]
    aspect_ratio: Option<String>,
    #[serde(default)]
    quality: Option<String>,
    #[serde(default)]
    style: Option<String>,
    #[serde(default)]
    timeout_seconds: Option<u64>,
}

impl FileOpenRouterConfig {
    fn into_domain(self, env_api_key: Option<String>) -> anyhow::Result<OpenRouterConfig> {
        let api_key = self.api_key.or(env_api_key).ok_or_else(|| {
            anyhow!("请在 config/app_config.toml 的 [openrouter] 段配置 api_key，或设置 OPENROUTER_API_KEY 环境变量")
        })?;

        Ok(OpenRouterConfig {
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            endpoint: self
                .endpoint
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            api_key,
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            image_size: self
                .image_size
                .unwrap_or_else(|| DEFAULT_IMAGE_SIZE.to_string()),
            aspect_ratio: self.aspect_ratio,
            quality: self.quality.unwrap_or_else(|| DEFAULT_QUALITY.to_string()),
            style: self.style.unwrap_or_else(|| DEFAULT_STYLE.to_string()),
            timeout: Duration::from_secs(self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_section_fills_defaults() {
        let file: FileConfig = toml::from_str(
            r#"
            [openrouter]
            api_key = "sk-test"
            "#,
        )
        .unwrap();

        let config = file.openrouter.unwrap().into_domain(None).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.image_size, DEFAULT_IMAGE_SIZE);
        assert_eq!(config.quality, "standard");
        assert_eq!(config.style, "natural");
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert!(config.aspect_ratio.is_none());
    }

    #[test]
    fn env_api_key_backfills_missing_field() {
        let config = FileOpenRouterConfig::default()
            .into_domain(Some("sk-env".to_string()))
            .unwrap();
        assert_eq!(config.api_key, "sk-env");
    }

    #[test]
    fn missing_api_key_everywhere_is_an_error() {
        assert!(FileOpenRouterConfig::default().into_domain(None).is_err());
    }

    #[test]
    fn explicit_fields_override_defaults() {
        let file: FileConfig = toml::from_str(
            r#"
            artifacts_dir = "out"

            [openrouter]
            api_key = "sk-test"
            model = "openai/gpt-5-image"
            image_size = "1024x1024"
            aspect_ratio = "1:1"
            timeout_seconds = 30
            "#,
        )
        .unwrap();

        assert_eq!(file.artifacts_dir.as_deref(), Some("out"));
        let config = file.openrouter.unwrap().into_domain(None).unwrap();
        assert_eq!(config.model, "openai/gpt-5-image");
        assert_eq!(config.aspect_ratio.as_deref(), Some("1:1"));
        assert_eq!(config.timeout, Duration::from_secs(30));
    }
}
