//! 简化的配置管理器
//!
//! 提供统一的配置接口，支持文件配置、环境变量和默认值

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants;
use crate::translation::error::{TranslationError, TranslationResult};

/// 翻译配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslationConfig {
    // 用户设置
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub translation_ratio: u8,

    // 批次配置
    pub batch_size: usize,
    pub batch_delay_ms: u64,

    // API配置
    pub api_base_url: String,
    pub models: Vec<String>,
    pub user_agent: String,
    /// 0 表示不设置显式超时
    pub request_timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            translation_ratio: constants::DEFAULT_TRANSLATION_RATIO,

            batch_size: constants::BATCH_SIZE,
            batch_delay_ms: constants::BATCH_DELAY.as_millis() as u64,

            api_base_url: constants::DEFAULT_API_BASE_URL.to_string(),
            models: constants::DEFAULT_MODELS
                .iter()
                .map(|model| model.to_string())
                .collect(),
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            request_timeout_secs: 0,
        }
    }
}

impl TranslationConfig {
    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        if self.translation_ratio > 100 {
            return Err(TranslationError::ConfigError(format!(
                "翻译比例必须在0到100之间，当前为 {}",
                self.translation_ratio
            )));
        }

        if self.batch_size == 0 || self.batch_size > constants::BATCH_SIZE {
            return Err(TranslationError::ConfigError(format!(
                "批次大小必须在1到{}之间",
                constants::BATCH_SIZE
            )));
        }

        if self.models.is_empty() {
            return Err(TranslationError::ConfigError("模型列表不能为空".to_string()));
        }

        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(TranslationError::ConfigError(format!(
                "API地址必须以 http:// 或 https:// 开头: {}",
                self.api_base_url
            )));
        }

        Ok(())
    }

    /// 应用环境变量覆盖（使用类型安全环境变量系统）
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{translation, EnvVar};

        if let Ok(api_key) = translation::ApiKey::get() {
            self.api_key = Some(api_key);
            tracing::debug!("环境变量提供了 API Key");
        }

        if translation::Ratio::is_set() {
            match translation::Ratio::get() {
                Ok(ratio) => self.translation_ratio = ratio,
                Err(e) => tracing::warn!("忽略无效的环境变量: {}", e),
            }
        }

        if translation::BatchSize::is_set() {
            match translation::BatchSize::get() {
                Ok(batch_size) => self.batch_size = batch_size,
                Err(e) => tracing::warn!("忽略无效的环境变量: {}", e),
            }
        }

        if translation::BatchDelayMs::is_set() {
            match translation::BatchDelayMs::get() {
                Ok(delay) => self.batch_delay_ms = delay,
                Err(e) => tracing::warn!("忽略无效的环境变量: {}", e),
            }
        }

        if translation::ApiBaseUrl::is_set() {
            match translation::ApiBaseUrl::get() {
                Ok(api_base_url) => {
                    self.api_base_url = api_base_url;
                    tracing::info!("环境变量覆盖 API 地址: {}", self.api_base_url);
                }
                Err(e) => tracing::warn!("忽略无效的环境变量: {}", e),
            }
        }
    }

    /// 是否已配置可用的凭据
    pub fn has_credential(&self) -> bool {
        self.api_key
            .as_deref()
            .map_or(false, |key| !key.trim().is_empty())
    }

    /// 批次间隔
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    /// 请求超时（未设置时返回 None）
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

/// 简化的配置管理器
pub struct ConfigManager {
    config: TranslationConfig,
}

impl ConfigManager {
    /// 创建新的配置管理器
    pub fn new() -> TranslationResult<Self> {
        let mut config = Self::load_config()?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config })
    }

    /// 从指定文件创建配置管理器
    pub fn from_file(path: &str) -> TranslationResult<Self> {
        Self::load_dotenv();

        let expanded_path = shellexpand::tilde(path);
        let mut config = Self::load_from_file(&expanded_path)?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config })
    }

    /// 获取配置
    pub fn get_config(&self) -> &TranslationConfig {
        &self.config
    }

    /// 取出配置
    pub fn into_config(self) -> TranslationConfig {
        self.config
    }

    /// 从文件加载配置
    fn load_config() -> TranslationResult<TranslationConfig> {
        // 首先尝试加载 .env 文件
        Self::load_dotenv();

        // 查找配置文件
        for path in constants::CONFIG_PATHS {
            let expanded_path = shellexpand::tilde(path);
            if Path::new(expanded_path.as_ref()).exists() {
                tracing::info!("加载配置文件: {}", expanded_path);
                return Self::load_from_file(&expanded_path);
            }
        }

        tracing::debug!("未找到配置文件，使用默认配置");
        Ok(TranslationConfig::default())
    }

    /// 从指定文件加载配置
    fn load_from_file(path: &str) -> TranslationResult<TranslationConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TranslationError::ConfigError(format!("读取配置文件失败: {}", e)))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析JSON配置失败: {}", e)))
        } else {
            toml::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析TOML配置失败: {}", e)))
        }
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        let env_files = [".env.local", ".env"];

        for env_file in &env_files {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::debug!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 保存用户设置（API Key 与翻译比例），保留文件中的其他配置
    pub fn save_settings(path: &str, api_key: &str, translation_ratio: u8) -> TranslationResult<()> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(TranslationError::InvalidInput("API Key不能为空".to_string()));
        }

        let expanded_path = shellexpand::tilde(path).to_string();
        let mut config = if Path::new(&expanded_path).exists() {
            Self::load_from_file(&expanded_path)?
        } else {
            TranslationConfig::default()
        };

        config.api_key = Some(api_key.to_string());
        config.translation_ratio = translation_ratio;
        config.validate()?;

        Self::write_config(&expanded_path, &config)?;
        tracing::info!("设置已保存: {}", expanded_path);

        Ok(())
    }

    /// 生成示例配置文件
    pub fn generate_example_config(path: &str) -> TranslationResult<()> {
        let config = TranslationConfig::default();
        Self::write_config(path, &config)
    }

    fn write_config(path: &str, config: &TranslationConfig) -> TranslationResult<()> {
        let content = toml::to_string_pretty(config)
            .map_err(|e| TranslationError::ConfigError(format!("序列化配置失败: {}", e)))?;

        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    TranslationError::ConfigError(format!("创建配置目录失败: {}", e))
                })?;
            }
        }

        std::fs::write(path, content)
            .map_err(|e| TranslationError::ConfigError(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }
}
