//! 模型输出解析
//!
//! 从模型的自由文本输出中提取译文数组，并调整为期望的长度。
//! 解析永不失败：无法解析时按行回退。

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"```[A-Za-z0-9_-]*\s*").expect("代码块正则表达式无效"))
}

/// 解析译文数组，结果长度总是等于 `expected`
pub fn parse_translations(raw: &str, expected: usize) -> Vec<String> {
    match parse_json_array(raw) {
        Some(translations) => {
            if translations.len() != expected {
                tracing::warn!(
                    "翻译结果数量不匹配: 期望 {}，得到 {}",
                    expected,
                    translations.len()
                );
            }
            fit_to_length(translations, expected)
        }
        None => {
            tracing::warn!("无法解析模型输出为JSON数组，按行回退");
            tracing::debug!("模型原始输出: {}", raw);

            let lines: Vec<String> = raw
                .lines()
                .filter(|line| !line.trim().is_empty())
                .take(expected)
                .map(str::to_string)
                .collect();
            fit_to_length(lines, expected)
        }
    }
}

/// 去除代码块标记并截取第一个 `[` 到最后一个 `]` 之间的内容
fn extract_array_text(raw: &str) -> String {
    let cleaned = fence_regex().replace_all(raw.trim(), "");

    match (cleaned.find('['), cleaned.rfind(']')) {
        (Some(start), Some(end)) if start < end => cleaned[start..=end].to_string(),
        _ => cleaned.trim().to_string(),
    }
}

fn parse_json_array(raw: &str) -> Option<Vec<String>> {
    let candidate = extract_array_text(raw);

    match serde_json::from_str::<Value>(&candidate) {
        Ok(Value::Array(items)) => Some(items.into_iter().map(value_to_text).collect()),
        Ok(other) => {
            tracing::debug!("解析结果不是数组: {}", other);
            None
        }
        Err(e) => {
            tracing::debug!("JSON解析失败: {}", e);
            None
        }
    }
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn fit_to_length(mut items: Vec<String>, expected: usize) -> Vec<String> {
    items.truncate(expected);
    items.resize(expected, String::new());
    items
}
