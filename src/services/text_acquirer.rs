//! 文本获取服务 - 业务能力层
//!
//! 只负责"把文件变成非空文本"能力：按扩展名分派到对应解码器，拒绝空文档

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{DocumentKind, ExamParseError, ParseResult};
use crate::infrastructure::decoders;

/// 支持的扩展名（小写）
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["pdf", "docx", "doc", "txt"];

/// 根据扩展名判断文档类型
pub fn document_kind(path: &Path) -> ParseResult<DocumentKind> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => Ok(DocumentKind::Pdf),
        "docx" | "doc" => Ok(DocumentKind::Word),
        "txt" => Ok(DocumentKind::Text),
        _ => Err(ExamParseError::UnsupportedFileType { extension }),
    }
}

/// 是否是支持的文件类型
pub fn is_supported_file(path: &Path) -> bool {
    document_kind(path).is_ok()
}

/// 读取文件文本
///
/// # 错误
/// - 不支持的扩展名 → `UnsupportedFileType`
/// - 解码结果为空或只有空白 → `EmptyDocument`
/// - 解码器失败 → `Decode` / `Io`
pub async fn acquire_text(path: impl AsRef<Path>) -> ParseResult<String> {
    let path = path.as_ref();
    let kind = document_kind(path)?;
    info!("📄 读取 {} 文件: {}", kind, path.display());

    let text = decode(kind, path.to_path_buf()).await?;
    let text = reject_empty(kind, text)?;
    debug!("读取完成: {} 字符", text.chars().count());
    Ok(text)
}

/// 提取 PDF 文本，空文本视为错误
pub async fn parse_pdf(path: impl AsRef<Path>) -> ParseResult<String> {
    let text = decode(DocumentKind::Pdf, path.as_ref().to_path_buf()).await?;
    reject_empty(DocumentKind::Pdf, text)
}

/// 提取 Word 文本，空文本视为错误
pub async fn parse_word(path: impl AsRef<Path>) -> ParseResult<String> {
    let text = decode(DocumentKind::Word, path.as_ref().to_path_buf()).await?;
    reject_empty(DocumentKind::Word, text)
}

/// 在阻塞线程池中运行解码器
async fn decode(kind: DocumentKind, path: PathBuf) -> ParseResult<String> {
    tokio::task::spawn_blocking(move || match kind {
        DocumentKind::Pdf => decoders::decode_pdf(&path),
        DocumentKind::Word => decoders::decode_docx(&path),
        DocumentKind::Text => decoders::read_text(&path),
    })
    .await
    .map_err(|e| ExamParseError::decode(kind, e))?
}

fn reject_empty(kind: DocumentKind, text: String) -> ParseResult<String> {
    if text.trim().is_empty() {
        Err(ExamParseError::EmptyDocument { kind })
    } else {
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, content: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("exam_parser_{}_{}", std::process::id(), name));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_document_kind_dispatch() {
        assert_eq!(document_kind(Path::new("exam.PDF")).unwrap(), DocumentKind::Pdf);
        assert_eq!(document_kind(Path::new("exam.docx")).unwrap(), DocumentKind::Word);
        assert_eq!(document_kind(Path::new("exam.doc")).unwrap(), DocumentKind::Word);
        assert_eq!(document_kind(Path::new("exam.txt")).unwrap(), DocumentKind::Text);
        assert!(!is_supported_file(Path::new("README")));
    }

    #[tokio::test]
    async fn test_unsupported_extension() {
        let err = acquire_text("scores.xlsx").await.unwrap_err();
        match err {
            ExamParseError::UnsupportedFileType { extension } => assert_eq!(extension, "xlsx"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_reads_text_file() {
        let path = temp_file("read.txt", b"1. Define RAM.\n");
        let text = acquire_text(&path).await.unwrap();
        assert_eq!(text, "1. Define RAM.\n");
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_whitespace_only_text_is_empty_document() {
        let path = temp_file("blank.txt", b"   \n\t\n");
        let err = acquire_text(&path).await.unwrap_err();
        assert!(matches!(err, ExamParseError::EmptyDocument { kind: DocumentKind::Text }));
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_missing_pdf_is_an_error() {
        tokio_test::assert_err!(parse_pdf("/nonexistent/exam.pdf").await);
        tokio_test::assert_err!(parse_word("/nonexistent/exam.docx").await);
    }

    #[test]
    fn test_empty_pdf_text_is_rejected() {
        let err = reject_empty(DocumentKind::Pdf, String::new()).unwrap_err();
        assert_eq!(err.to_string(), "No text content found in PDF file");
    }
}
