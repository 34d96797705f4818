//! Web 服务器配置

/// Web 服务器配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebConfig {
    pub bind_addr: String,
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 7080,
        }
    }
}

impl WebConfig {
    /// 监听地址
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}
