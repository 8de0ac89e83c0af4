//! 文档解码器 - 基础设施层
//!
//! 把 PDF / Word / 纯文本文件变成字符串，只暴露"读出文字"的能力。
//! 这里都是阻塞调用，由上层放到 tokio 的阻塞线程池中执行。

use std::fs::File;
use std::io::Read;
use std::path::Path;

use roxmltree::Document;
use tracing::debug;
use zip::ZipArchive;

use crate::error::{DocumentKind, ExamParseError, ParseResult};

const DOCX_BODY: &str = "word/document.xml";

/// 提取 PDF 文字
///
/// pdf-extract 遇到个别损坏的字体表会 panic，这里把 panic 也转换成解码错误
pub fn decode_pdf(path: &Path) -> ParseResult<String> {
    debug!("解码 PDF: {}", path.display());
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        pdf_extract::extract_text(path)
    }));

    match result {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ExamParseError::decode(DocumentKind::Pdf, e.to_string())),
        Err(_) => Err(ExamParseError::decode(
            DocumentKind::Pdf,
            "pdf-extract panicked while reading the document",
        )),
    }
}

/// 提取 Word 文字：每个段落一行
///
/// 只支持 ZIP 容器格式（.docx）；旧版二进制 .doc 会在打开压缩包时失败
pub fn decode_docx(path: &Path) -> ParseResult<String> {
    debug!("解码 Word: {}", path.display());
    let file = File::open(path).map_err(|e| ExamParseError::io(path.display().to_string(), e))?;
    let mut archive =
        ZipArchive::new(file).map_err(|e| ExamParseError::decode(DocumentKind::Word, e))?;

    let mut document_xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|e| ExamParseError::decode(DocumentKind::Word, e))?
        .read_to_string(&mut document_xml)
        .map_err(|e| ExamParseError::decode(DocumentKind::Word, e))?;

    paragraphs_from_xml(&document_xml)
}

fn paragraphs_from_xml(document_xml: &str) -> ParseResult<String> {
    let doc =
        Document::parse(document_xml).map_err(|e| ExamParseError::decode(DocumentKind::Word, e))?;

    let paragraphs: Vec<String> = doc
        .descendants()
        .filter(|node| node.is_element() && node.tag_name().name() == "p")
        .map(|paragraph| {
            paragraph
                .descendants()
                .filter(|node| node.is_element() && node.tag_name().name() == "t")
                .filter_map(|node| node.text())
                .collect::<Vec<_>>()
                .join("")
        })
        .collect();

    Ok(paragraphs.join("\n"))
}

/// 读取纯文本（非 UTF-8 字节按替换字符处理）
pub fn read_text(path: &Path) -> ParseResult<String> {
    let bytes = std::fs::read(path).map_err(|e| ExamParseError::io(path.display().to_string(), e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
