//! 页面下载会话

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;

use crate::core::{parse_content_type, MazegakiError};
use crate::utils::url::Url;

/// 下载页面使用的 HTTP 会话
#[derive(Clone)]
pub struct Session {
    client: Client,
}

impl Session {
    pub fn new(
        user_agent: Option<&str>,
        timeout: Option<Duration>,
        insecure: bool,
    ) -> Result<Self, MazegakiError> {
        let mut header_map = HeaderMap::new();
        if let Some(user_agent) = user_agent {
            let value = HeaderValue::from_str(user_agent)
                .map_err(|e| MazegakiError::new(&format!("无效的 User-Agent: {}", e)))?;
            header_map.insert(USER_AGENT, value);
        }

        let mut builder = Client::builder()
            .default_headers(header_map)
            .danger_accept_invalid_certs(insecure);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| MazegakiError::new(&format!("无法创建HTTP客户端: {}", e)))?;

        Ok(Self { client })
    }

    /// 下载页面
    ///
    /// 返回 (数据, 最终地址, 媒体类型, 字符集)。
    pub async fn retrieve_page(
        &self,
        url: &Url,
    ) -> Result<(Vec<u8>, Url, String, String), MazegakiError> {
        tracing::debug!("下载页面: {}", url);

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| MazegakiError::new(&format!("请求失败: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MazegakiError::new(&format!(
                "页面返回错误状态 {} ({})",
                status.as_u16(),
                url
            )));
        }

        let final_url = response.url().clone();
        if final_url != *url {
            tracing::info!("{} -> {}", url, final_url);
        }

        let (media_type, charset, _is_base64) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(parse_content_type)
            .unwrap_or_default();

        let data = response
            .bytes()
            .await
            .map_err(|e| MazegakiError::new(&format!("读取响应失败: {}", e)))?;

        Ok((data.to_vec(), final_url, media_type, charset))
    }
}
