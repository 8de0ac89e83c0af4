//! 解析层（Extraction）
//!
//! 把纯文本切分成 A/B/C 三个部分的题目。完全确定性：同样的输入永远得到同样的输出。
//!
//! ## 模块划分
//!
//! - `patterns` - 预编译正则与关键词表
//! - `section_classifier` - 部分标题识别（结构 > 关键词 > 前瞻 > 默认推进）
//! - `question_segmenter` - 题目起始行识别、题型与部分推断
//! - `option_collector` - 选择题选项收集
//! - `scan_state` - 逐行扫描状态
//! - `line_scanner` - 单遍扫描，把状态在行之间传递
//! - `heuristics` - 与 AI 兜底共用的归类规则

pub mod heuristics;
pub mod line_scanner;
pub mod option_collector;
pub mod patterns;
pub mod question_segmenter;
pub mod scan_state;
pub mod section_classifier;

pub use line_scanner::{process_line, scan_text};
pub use scan_state::ScanState;
pub use section_classifier::{classify, SectionDecision};

use crate::error::{ExamParseError, ParseResult};
use crate::models::ExamStructure;

/// 可信试卷文本的默认最小长度
pub const DEFAULT_MIN_TEXT_LENGTH: usize = 100;

/// 启发式提取入口
///
/// 文本短于 100 个字符时返回 `TextTooShort`
pub fn extract_questions_directly(text: &str) -> ParseResult<ExamStructure> {
    extract_questions_with_min_length(text, DEFAULT_MIN_TEXT_LENGTH)
}

/// 启发式提取，自定义最小长度
pub fn extract_questions_with_min_length(text: &str, min_length: usize) -> ParseResult<ExamStructure> {
    ensure_min_length(text, min_length)?;
    Ok(scan_text(text))
}

/// 检查文本长度（去掉首尾空白后的字符数）
pub fn ensure_min_length(text: &str, min_length: usize) -> ParseResult<()> {
    let length = text.trim().chars().count();
    if length < min_length {
        return Err(ExamParseError::TextTooShort {
            length,
            min: min_length,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SectionLetter;

    const SAMPLE: &str = "\
COMPUTER STUDIES END OF TERM EXAM
SECTION A: MULTIPLE CHOICE (10 marks)
1. What is a CPU?
(a) Processor
(b) Monitor
(c) Keyboard
(d) Mouse
2. Which of the following is an output device?
a) Scanner
b) Printer
SECTION B: SHORT ANSWER
1. Define RAM.
2. List two input devices.
SECTION C: ESSAY
1. Discuss, with relevant examples drawn from banking, healthcare and education, how the widespread adoption of computers has changed the way people work, and evaluate whether these changes have been mostly positive.
";

    #[test]
    fn test_short_text_is_rejected() {
        let err = extract_questions_directly("short").unwrap_err();
        assert!(matches!(err, ExamParseError::TextTooShort { length: 5, min: 100 }));
    }

    #[test]
    fn test_full_document() {
        let exam = extract_questions_directly(SAMPLE).unwrap();

        let names: Vec<_> = exam.sections().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec![SectionLetter::A, SectionLetter::B, SectionLetter::C]);

        assert_eq!(exam.section(SectionLetter::A).questions.len(), 2);
        assert_eq!(exam.section(SectionLetter::A).description, "MULTIPLE CHOICE (10 marks)");
        assert_eq!(exam.section(SectionLetter::B).questions.len(), 2);
        assert_eq!(exam.section(SectionLetter::C).questions.len(), 1);
        assert_eq!(exam.section(SectionLetter::C).questions[0].points, 10);
        assert_eq!(exam.section(SectionLetter::A).questions[1].options.len(), 2);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let first = extract_questions_directly(SAMPLE).unwrap();
        let second = extract_questions_directly(SAMPLE).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_ids_are_unique_and_in_source_order() {
        let exam = extract_questions_directly(SAMPLE).unwrap();
        let ids: Vec<u32> = exam.questions().map(|q| q.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }
}
