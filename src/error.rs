use std::fmt;

use thiserror::Error;

/// 文档类型（用于错误信息）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Word,
    Text,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Pdf => write!(f, "PDF"),
            DocumentKind::Word => write!(f, "Word"),
            DocumentKind::Text => write!(f, "text"),
        }
    }
}

/// 试卷解析错误
///
/// 输入类错误（文件类型、空文档、文本过短）直接向调用方传播；
/// AI 归类过程中的错误不会出现在这里，它们在批次内部被降级为启发式结果。
#[derive(Debug, Error)]
pub enum ExamParseError {
    /// 不支持的文件扩展名
    #[error("Unsupported file type: {extension:?}")]
    UnsupportedFileType { extension: String },

    /// 解码后文本为空或只有空白
    #[error("No text content found in {kind} file")]
    EmptyDocument { kind: DocumentKind },

    /// 文本太短，不可能是一份试卷
    #[error("Text too short to be an exam ({length} chars, minimum {min})")]
    TextTooShort { length: usize, min: usize },

    /// 文本足够长，但一道题目都没有识别出来
    #[error("No questions found in {length} chars of text")]
    NoQuestionsFound { length: usize },

    /// 外部解码器失败
    #[error("Failed to parse {kind} file: {source}")]
    Decode {
        kind: DocumentKind,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 读取文件失败
    #[error("Failed to read file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// AI 结构化提取在所有重试后仍然失败
    #[error("AI extraction failed after {attempts} attempts: {message}")]
    AiExtraction { attempts: usize, message: String },

    /// AI 返回的 JSON 结构不符合要求
    #[error("Invalid AI response: {0}")]
    InvalidAiResponse(String),
}

// ========== 便捷构造函数 ==========

impl ExamParseError {
    /// 创建解码错误
    pub fn decode(kind: DocumentKind, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        ExamParseError::Decode {
            kind,
            source: source.into(),
        }
    }

    /// 创建文件读取错误
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        ExamParseError::Io {
            path: path.into(),
            source,
        }
    }

    /// 是否为输入类错误（调用方换一个文件即可，重试没有意义）
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ExamParseError::UnsupportedFileType { .. }
                | ExamParseError::EmptyDocument { .. }
                | ExamParseError::TextTooShort { .. }
                | ExamParseError::NoQuestionsFound { .. }
        )
    }
}

// ========== Result 类型别名 ==========

/// 解析结果类型
pub type ParseResult<T> = Result<T, ExamParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_message_names_document_kind() {
        let err = ExamParseError::decode(DocumentKind::Pdf, "broken xref table");
        assert_eq!(err.to_string(), "Failed to parse PDF file: broken xref table");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_input_errors_are_classified() {
        let unsupported = ExamParseError::UnsupportedFileType {
            extension: "xlsx".to_string(),
        };
        let short = ExamParseError::TextTooShort { length: 5, min: 100 };
        let ai = ExamParseError::AiExtraction {
            attempts: 3,
            message: "timeout".to_string(),
        };

        assert!(unsupported.is_input_error());
        assert!(short.is_input_error());
        assert!(!ai.is_input_error());
    }
}
