//! 翻译配置管理模块
//!
//! 提供简化的配置管理，支持环境变量、配置文件和默认值

pub mod manager;

// 重新导出主要类型
pub use manager::{ConfigManager, TranslationConfig};

/// 配置常量
pub mod constants {
    use std::time::Duration;

    // 批次处理相关
    pub const BATCH_SIZE: usize = 10;
    pub const BATCH_DELAY: Duration = Duration::from_millis(500);

    // 选择相关
    pub const DEFAULT_TRANSLATION_RATIO: u8 = 50;
    pub const MIN_TEXT_LENGTH: usize = 2;
    /// 超过该长度的文本不受标签白名单限制
    pub const LONG_TEXT_LENGTH: usize = 10;

    // 默认API设置
    pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
    pub const API_KEY_HEADER: &str = "x-goog-api-key";

    /// 按优先级排列的模型列表
    pub const DEFAULT_MODELS: &[&str] = &[
        "gemini-2.5-flash",
        "gemini-2.0-flash",
        "gemini-2.5-pro",
        "gemini-1.5-pro",
    ];

    /// 文本节点的父元素若为这些标签则直接排除
    pub const EXCLUDED_PARENT_TAGS: &[&str] =
        &["script", "style", "noscript", "meta", "link", "svg", "path"];

    /// 主要的文本承载元素
    pub const TEXTUAL_TAGS: &[&str] = &[
        "h1", "h2", "h3", "h4", "h5", "h6", "p", "li", "span", "div", "a", "td", "th", "label",
        "button", "article", "section", "header", "footer", "main", "aside", "blockquote", "dd",
        "dt", "figcaption",
    ];

    /// 块级容器，无子元素时其文本也会被收集
    pub const BLOCK_CONTAINER_TAGS: &[&str] = &[
        "div", "section", "article", "main", "aside", "header", "footer", "nav", "figure",
        "center", "form", "fieldset", "details", "summary", "address", "hgroup",
    ];

    // 页面上的状态标记
    pub const ATTR_TRANSLATING: &str = "data-mazegaki-translating";
    pub const ATTR_TRANSLATED: &str = "data-mazegaki-translated";
    pub const ATTR_ORIGINAL: &str = "data-mazegaki-original";
    pub const ORIGINAL_TITLE_PREFIX: &str = "元のテキスト: ";

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "mazegaki.toml",
        ".mazegaki.toml",
        "mazegaki.json",
        "~/.config/mazegaki/config.toml",
        "/etc/mazegaki/config.toml",
    ];

    /// 保存用户设置的默认位置
    pub const USER_CONFIG_PATH: &str = "~/.config/mazegaki/config.toml";
}

/// 便利函数
pub fn config_file_exists() -> bool {
    constants::CONFIG_PATHS
        .iter()
        .any(|path| std::path::Path::new(shellexpand::tilde(path).as_ref()).exists())
}

/// 加载配置，失败时回退到默认配置
pub fn load_translation_config() -> TranslationConfig {
    match ConfigManager::new() {
        Ok(manager) => manager.get_config().clone(),
        Err(e) => {
            tracing::warn!("配置加载失败，使用默认配置: {}", e);
            let mut config = TranslationConfig::default();
            config.apply_env_overrides();
            config
        }
    }
}
