//! 提示词构建

/// 将待翻译文本序列化为 JSON 数组并嵌入固定的翻译指令
///
/// 纯函数，相同输入总是得到相同输出。
pub fn build_prompt(texts: &[String]) -> String {
    // 字符串切片的 JSON 序列化不会失败
    let texts_json = serde_json::to_string(texts).unwrap_or_else(|_| "[]".to_string());

    format!(
        "Translate the following array of Japanese texts into English.

Input (JSON array):
{texts_json}

Requirements:
1. Translate each element into English.
2. Return only a JSON array containing the translated strings.
3. Do not include any explanations or commentary.
4. Keep the same order as the input.
5. Return exactly {count} elements, one per input element, preserving each element's meaning.

Output format (JSON array only):
[\"translated text 1\", \"translated text 2\", ...]",
        texts_json = texts_json,
        count = texts.len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_json_array() {
        let texts = vec!["こんにちは".to_string(), "「引用」と\"記号\"".to_string()];
        let prompt = build_prompt(&texts);

        let expected_json = serde_json::to_string(&texts).unwrap();
        assert!(prompt.contains(&expected_json));
        assert!(prompt.contains("Return exactly 2 elements"));
        assert!(prompt.contains("JSON array"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let texts = vec!["日本語".to_string()];
        assert_eq!(build_prompt(&texts), build_prompt(&texts));
    }

    #[test]
    fn test_prompt_for_empty_input() {
        let prompt = build_prompt(&[]);
        assert!(prompt.contains("[]"));
    }
}
