//! 从 LLM 回复中截取 JSON 对象
//!
//! 模型经常在 JSON 前后附带说明文字或 ```json 代码块，
//! 这里取第一个 `{` 到最后一个 `}` 之间的内容再解析。

use serde::de::DeserializeOwned;

/// 截取第一个 `{` 到最后一个 `}`（含）
pub fn json_object_span(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (end > start).then(|| &response[start..=end])
}

/// 截取并解析 JSON 对象
pub fn parse_json_object<T: DeserializeOwned>(response: &str) -> anyhow::Result<T> {
    let span = json_object_span(response)
        .ok_or_else(|| anyhow::anyhow!("响应中没有 JSON 对象"))?;
    Ok(serde_json::from_str(span)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_span_ignores_surrounding_text() {
        let response = "Here you go:\n```json\n{\"0\": \"A\", \"1\": \"B\"}\n```\nDone.";
        assert_eq!(json_object_span(response), Some("{\"0\": \"A\", \"1\": \"B\"}"));
    }

    #[test]
    fn test_span_missing_braces() {
        assert_eq!(json_object_span("no json here"), None);
        assert_eq!(json_object_span("} reversed {"), None);
    }

    #[test]
    fn test_parse_nested_object() {
        let map: HashMap<String, serde_json::Value> =
            parse_json_object("prefix {\"a\": {\"b\": 1}} suffix").unwrap();
        assert_eq!(map["a"]["b"], 1);
    }

    #[test]
    fn test_parse_malformed_json_fails() {
        let result: anyhow::Result<HashMap<String, String>> = parse_json_object("{\"0\": A}");
        assert!(result.is_err());
    }
}
