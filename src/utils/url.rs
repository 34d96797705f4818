pub use url::Url;

/// 去掉片段标识与空查询串
pub fn clean_url(mut url: Url) -> Url {
    url.set_fragment(None);

    if url.query() == Some("") {
        url.set_query(None);
    }

    url
}

/// 输入是否是带协议的URL（而不是本地路径）
pub fn is_url_and_has_protocol(input: &str) -> bool {
    match Url::parse(input) {
        Ok(parsed_url) => !parsed_url.scheme().is_empty(),
        Err(_) => false,
    }
}
