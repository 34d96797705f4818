use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use encoding_rs::Encoding;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::env::{core::NoColor, EnvVar};
use crate::network::session::Session;
use crate::parsers::html::{create_metadata_tag, get_title, HtmlPage};
use crate::translation::{
    BatchTransport, RunOutcome, RunSettings, TranslationConfig, TranslationService,
};
use crate::utils::url::{is_url_and_has_protocol, Url};

/// 文档处理过程中的错误
#[derive(Debug)]
pub struct MazegakiError {
    details: String,
}

impl MazegakiError {
    pub fn new(msg: &str) -> MazegakiError {
        MazegakiError {
            details: msg.to_string(),
        }
    }
}

impl fmt::Display for MazegakiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.details)
    }
}

impl Error for MazegakiError {}

/// 单次文档翻译的选项
///
/// 未设置的项使用 [`TranslationConfig`] 中的值。
#[derive(Default, Clone, Debug)]
pub struct TranslateOptions {
    pub api_key: Option<String>,
    pub ratio: Option<u8>,
    /// 固定随机种子，使抽样结果可复现
    pub seed: Option<u64>,
    /// 强制使用的文档编码
    pub encoding: Option<String>,
    pub insecure: bool,
    pub no_metadata: bool,
    pub silent: bool,
    /// 页面下载超时（秒），0 表示使用配置值
    pub timeout: u64,
    pub user_agent: Option<String>,
}

impl TranslateOptions {
    /// 合并配置得到运行设置
    pub fn run_settings(&self, config: &TranslationConfig) -> RunSettings {
        RunSettings::new(
            self.api_key.clone().or_else(|| config.api_key.clone()),
            self.ratio.unwrap_or(config.translation_ratio).min(100),
        )
    }
}

/// 抽样使用的随机数生成器，给定种子时结果可复现
pub fn sampling_rng(seed: Option<u64>) -> Box<dyn RngCore> {
    match seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::rng()),
    }
}

/// 翻译完成的文档
pub struct TranslatedDocument {
    /// 按文档原编码序列化的结果
    pub data: Vec<u8>,
    pub title: Option<String>,
    pub outcome: RunOutcome,
}

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";
const PLAINTEXT_MEDIA_TYPES: &[&str] = &[
    "application/xhtml+xml", // .xhtml
    "application/xml",       // .xml
];

/// 翻译一份已载入的 HTML 文档
///
/// 只有认证失败与文档解析失败会返回错误；提前结束的运行以
/// [`TranslatedDocument::outcome`] 表示，此时文档保持原样。
pub async fn translate_document<T: BatchTransport>(
    service: &TranslationService<T>,
    settings: &RunSettings,
    input_data: &[u8],
    input_encoding: Option<&str>,
    input_url: Option<&Url>,
    options: &TranslateOptions,
) -> Result<TranslatedDocument, MazegakiError> {
    if let Some(custom_encoding) = &options.encoding {
        if Encoding::for_label_no_replacement(custom_encoding.as_bytes()).is_none() {
            return Err(MazegakiError::new(&format!(
                "unknown encoding \"{}\"",
                custom_encoding
            )));
        }
    }

    let encoding = options
        .encoding
        .as_deref()
        .or(input_encoding)
        .unwrap_or_default();
    let page = HtmlPage::from_bytes(input_data, encoding)?;

    let mut rng = sampling_rng(options.seed);
    let outcome = service.start(&page, settings, rng.as_mut()).await?;

    if let Some(report) = outcome.report() {
        tracing::info!(
            "翻译完成: {} 个批次, {} 个文本单元已替换, {} 个已撤销",
            report.batches_total,
            report.units_translated,
            report.units_reverted
        );
        if report.units_translated > 0 {
            page.inject_marker_styles();
        }
    }

    let title = get_title(&page.dom().document);
    let mut data = page.to_bytes()?;

    if !options.no_metadata {
        let mut metadata_comment = create_metadata_tag(input_url);
        metadata_comment.push('\n');
        data.splice(0..0, metadata_comment.into_bytes());
    }

    if data.last() != Some(&b'\n') {
        data.push(b'\n');
    }

    Ok(TranslatedDocument {
        data,
        title,
        outcome,
    })
}

/// 载入 URL 或本地文件并翻译
pub async fn translate_target(
    target: &str,
    config: &TranslationConfig,
    options: &TranslateOptions,
) -> Result<TranslatedDocument, MazegakiError> {
    let settings = options.run_settings(config);

    let timeout = if options.timeout > 0 {
        Some(Duration::from_secs(options.timeout))
    } else {
        config.request_timeout()
    };
    let user_agent = options.user_agent.as_deref().unwrap_or(&config.user_agent);
    let session = Session::new(Some(user_agent), timeout, options.insecure)?;

    let (input_data, input_url, charset) = retrieve_target(&session, target).await?;

    let service = TranslationService::from_config(config)?;
    let charset = Some(charset.as_str()).filter(|charset| !charset.is_empty());

    translate_document(
        &service,
        &settings,
        &input_data,
        charset,
        input_url.as_ref(),
        options,
    )
    .await
}

/// 读取目标内容
///
/// 返回 (数据, 来源地址, 字符集)。本地文件的字符集为空。
pub async fn retrieve_target(
    session: &Session,
    target: &str,
) -> Result<(Vec<u8>, Option<Url>, String), MazegakiError> {
    if target.starts_with("http://") || target.starts_with("https://") {
        let url = Url::parse(target).map_err(|_| MazegakiError::new("Invalid URL"))?;
        let (data, final_url, media_type, charset) = session.retrieve_page(&url).await?;

        if !media_type.is_empty() && !is_plaintext_media_type(&media_type) {
            return Err(MazegakiError::new(&format!(
                "Unsupported media type: {media_type}"
            )));
        }

        return Ok((data, Some(final_url), charset));
    }

    let path: PathBuf = if target.starts_with("file://") {
        Url::parse(target)
            .ok()
            .and_then(|url| url.to_file_path().ok())
            .ok_or_else(|| MazegakiError::new("Invalid file URL"))?
    } else if is_url_and_has_protocol(target) && !Path::new(target).exists() {
        return Err(MazegakiError::new(&format!("Unsupported target: {target}")));
    } else {
        PathBuf::from(target)
    };

    if !path.exists() {
        return Err(MazegakiError::new(&format!("File not found: {target}")));
    }

    let data = fs::read(&path)
        .map_err(|e| MazegakiError::new(&format!("Failed to read file: {e}")))?;
    let file_url = fs::canonicalize(&path)
        .ok()
        .and_then(|canonical_path| Url::from_file_path(canonical_path).ok());

    Ok((data, file_url, String::new()))
}

/// 解析 Content-Type 头
///
/// 返回 (媒体类型, 字符集, 是否 base64)。
pub fn parse_content_type(content_type: &str) -> (String, String, bool) {
    let mut media_type = String::new();
    let mut charset = String::new();
    let mut is_base64 = false;

    let parts: Vec<&str> = content_type.split(';').collect();

    if !parts.is_empty() {
        media_type = parts[0].trim().to_lowercase();
    }

    for part in parts.iter().skip(1) {
        let part = part.trim();
        if part.to_ascii_lowercase().starts_with("charset=") {
            charset = part[8..].trim_matches('"').to_string();
        } else if part == "base64" {
            is_base64 = true;
        }
    }

    (media_type, charset, is_base64)
}

/// 媒体类型是否可以作为 HTML 文本处理
pub fn is_plaintext_media_type(media_type: &str) -> bool {
    media_type.starts_with("text/") || PLAINTEXT_MEDIA_TYPES.contains(&media_type)
}

/// 替换输出路径中的 `%title%` 与 `%timestamp%`
pub fn format_output_path(path: &str, document_title: Option<&str>) -> String {
    let datetime: &str = &Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let title = document_title.unwrap_or("");

    path.replace("%timestamp%", &datetime.replace(':', "_"))
        .replace(
            "%title%",
            title
                .replace(['/', '\\'], "_")
                .replace('<', "[")
                .replace('>', "]")
                .replace(':', " - ")
                .replace('\"', "")
                .replace('|', "-")
                .replace('?', "")
                .trim_start_matches('.'),
        )
}

/// 写出结果，`-` 表示标准输出
pub fn write_output(destination: &str, data: &[u8]) -> Result<(), MazegakiError> {
    use std::io::Write;

    if destination == "-" {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        return handle
            .write_all(data)
            .and_then(|_| handle.flush())
            .map_err(|e| MazegakiError::new(&format!("无法写入标准输出: {}", e)));
    }

    if let Some(parent) = Path::new(destination).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| MazegakiError::new(&format!("无法创建目录: {}", e)))?;
        }
    }

    fs::write(destination, data)
        .map_err(|e| MazegakiError::new(&format!("无法写入文件 {}: {}", destination, e)))
}

/// 在标准错误输出错误信息，终端上显示为红色
pub fn print_error_message(msg: &str) {
    if atty::is(atty::Stream::Stderr) && !NoColor::get_or_default(false) {
        eprintln!("{ANSI_COLOR_RED}{msg}{ANSI_COLOR_RESET}");
    } else {
        eprintln!("{msg}");
    }
}

/// 在标准错误输出提示信息
pub fn print_info_message(msg: &str) {
    eprintln!("{msg}");
}
