//! 预编译的正则与关键词表
//!
//! 所有级联规则都从这里取模式，规则本身的先后顺序由各个分类器决定。

use std::sync::LazyLock;

use phf::phf_map;
use regex::Regex;

use crate::models::SectionLetter;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid built-in pattern")
}

/// 部分标记（字母 / 数字 / 罗马数字 / 英文数字）
const HEADER_TOKEN: &str = r"(III|II|IV|I|ONE|TWO|THREE|\d{1,2}|[A-Z])\b";

/// 括号分值标注：(10 marks) / [10 points] / (5 questions)
const HEADER_ANNOTATION: &str = r"[\(\[]\s*\d+\s*(?:marks?|points?|pts?|questions?)\s*[\)\]]";

/// 标记 → 部分字母
pub static SECTION_TOKENS: phf::Map<&'static str, SectionLetter> = phf_map! {
    "A" => SectionLetter::A,
    "B" => SectionLetter::B,
    "C" => SectionLetter::C,
    "1" => SectionLetter::A,
    "2" => SectionLetter::B,
    "3" => SectionLetter::C,
    "I" => SectionLetter::A,
    "II" => SectionLetter::B,
    "III" => SectionLetter::C,
    "ONE" => SectionLetter::A,
    "TWO" => SectionLetter::B,
    "THREE" => SectionLetter::C,
};

pub fn section_from_token(token: &str) -> Option<SectionLetter> {
    SECTION_TOKENS.get(token.trim().to_ascii_uppercase().as_str()).copied()
}

// ========== 部分标题 ==========

/// 行首/行尾的装饰符（`---`、`===`、`***`）
pub static DECORATION: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^[-=*_#~\s]*?[-=*_#~]{3,}\s*|\s*[-=*_#~]{3,}[-=*_#~\s]*$"));

/// SECTION A (20 marks) - desc / PART 2 [10 points] desc
pub static HEADER_WITH_ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?i)^(?:SECTION|PART)\s+{HEADER_TOKEN}\s*{HEADER_ANNOTATION}\s*(?:[:\-–—.]\s*)?(.*)$"
    ))
});

/// SECTION B: desc / PART 1 - desc
pub static HEADER_WITH_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(r"(?i)^(?:SECTION|PART)\s+{HEADER_TOKEN}\s*[:\-–—.]\s*(.*)$"))
});

/// SECTION C / SECTION C ESSAY QUESTIONS
///
/// 标记后面以小写字母开头的是正文（"Part 1 of the essay ..."），不算标题
pub static HEADER_PLAIN: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(r"(?i)^(?:SECTION|PART)\s+{HEADER_TOKEN}(?:\s+((?-i:[^a-z\s]).*))?$"))
});

/// SECTION: desc / PART (20 marks) desc，没有字母
pub static HEADER_UNLETTERED: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(r"(?i)^(?:SECTION|PART)\s*(?:{HEADER_ANNOTATION}\s*[:\-–—]?|[:\-–—])\s*(.*)$"))
});

/// 只有 SECTION / PART
pub static HEADER_BARE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)^(?:SECTION|PART)\s*$"));

/// 标题行中的 "SECTION" / "PART" 关键词
pub static HEADER_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)^(?:SECTION|PART)\b"));

// ========== 部分描述 ==========

/// (N marks) desc
pub static DESCRIPTION_AFTER_ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?i)^(?:SECTION|PART)(?:\s+{HEADER_TOKEN})?\s*{HEADER_ANNOTATION}\s*[:\-–—.]?\s*(\S.*)$"
    ))
});

/// : desc
pub static DESCRIPTION_AFTER_COLON: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(r"(?i)^(?:SECTION|PART)(?:\s+{HEADER_TOKEN})?\s*:\s*(\S.*)$"))
});

/// - desc
pub static DESCRIPTION_AFTER_DASH: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(r"(?i)^(?:SECTION|PART)(?:\s+{HEADER_TOKEN})?\s*[-–—]\s*(\S.*)$"))
});

// ========== 题目 ==========

/// 1. text
pub static QUESTION_DOTTED: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^(\d{1,3})\.\s+(.*)$"));

/// Question 1: text
pub static QUESTION_LABELLED: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)^question\s+(\d{1,3})\s*[:.)\-–]?\s*(.*)$"));

/// Q1: text / Q.1) text
pub static QUESTION_SHORT_LABEL: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)^Q\.?\s*(\d{1,3})\s*[:.)\-–]\s*(.*)$"));

/// 1) text
pub static QUESTION_PAREN: LazyLock<Regex> = LazyLock::new(|| compile(r"^(\d{1,3})\)\s*(.*)$"));

/// (1) text
pub static QUESTION_ENCLOSED: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^\((\d{1,3})\)\s*(.*)$"));

// ========== 选项 ==========

/// 选择题选项标记：(a) / a) / a.
pub static OPTION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)^(?:\([a-d]\)|[a-d][\).])\s*\S"));

/// (a) text
pub static OPTION_ENCLOSED: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)^\(([a-d])\)\s*(.+)$"));

/// a) text
pub static OPTION_PAREN: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)^([a-d])\)\s*(.+)$"));

/// a. text
pub static OPTION_DOTTED: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)^([a-d])\.\s+(.+)$"));

/// Option a: text
pub static OPTION_LABELLED: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)^option\s+([a-d])\s*[:.)\-]\s*(.+)$"));

// ========== 关键词 ==========

/// 分值标注，例如 (5 marks)
pub static MARKS_ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)[\(\[]\s*\d+\s*(?:marks?|points?|pts?)\s*[\)\]]"));

/// 标题中的选择题词汇
pub static HEADER_OBJECTIVE_VOCAB: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\b(?:multiple[\s-]*choice|objective|mcqs?|true[\s/-]*(?:or[\s-]*)?false|choose\s+the\s+(?:correct|best))\b")
});

/// 标题中的简答题词汇
pub static HEADER_SHORT_VOCAB: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\b(?:short[\s-]*answers?|short|theory|define|definitions?|list|identify|fill[\s-]*in)\b")
});

/// 论述题词汇（标题与前瞻共用）
pub static ESSAY_VOCAB: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\b(?:essays?|long[\s-]*answers?|structured|discuss|analy[sz]e|compare|extended)\b")
});

/// 题干中的简答题词汇
pub static QUESTION_SHORT_VOCAB: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\b(?:define|list|name|identify|state|what\s+is|explain\s+briefly)\b")
});

/// 题干中的论述题词汇
pub static QUESTION_ESSAY_VOCAB: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\b(?:discuss|analy[sz]e|evaluate|explain\s+in\s+detail|compare|contrast|essay|elaborate)\b")
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_tokens_map_numbers_and_numerals() {
        assert_eq!(section_from_token("b"), Some(SectionLetter::B));
        assert_eq!(section_from_token("2"), Some(SectionLetter::B));
        assert_eq!(section_from_token("III"), Some(SectionLetter::C));
        assert_eq!(section_from_token("one"), Some(SectionLetter::A));
        assert_eq!(section_from_token("4"), None);
        assert_eq!(section_from_token("D"), None);
    }

    #[test]
    fn test_header_token_does_not_swallow_words() {
        assert!(!HEADER_PLAIN.is_match("Part of the cell that stores DNA"));
        assert!(!HEADER_PLAIN.is_match("Sections of a report"));
        assert!(HEADER_PLAIN.is_match("Section II"));
        assert!(HEADER_PLAIN.is_match("PART B ESSAY QUESTIONS"));
        assert!(!HEADER_PLAIN.is_match("Part 1 of the essay should cover memory"));
    }

    #[test]
    fn test_brackets_must_hold_an_annotation() {
        assert!(HEADER_UNLETTERED.is_match("PART (20 marks) Essays"));
        assert!(HEADER_UNLETTERED.is_match("SECTION [5 questions]: Theory"));
        assert!(!HEADER_UNLETTERED.is_match("Part (a) Describe the arithmetic logic unit."));
        assert!(!HEADER_UNLETTERED.is_match("Part [i] State two uses of ROM."));
        assert!(!DESCRIPTION_AFTER_ANNOTATION.is_match("Part (b) Describe the control unit."));
        assert!(HEADER_WITH_ANNOTATION.is_match("SECTION B [10 marks] Short answers"));
    }

    #[test]
    fn test_decoration_strips_both_ends() {
        let stripped = DECORATION.replace_all("=== SECTION A ===", "");
        assert_eq!(stripped, "SECTION A");
        let stripped = DECORATION.replace_all("*** PART 2: ESSAY ***", "");
        assert_eq!(stripped, "PART 2: ESSAY");
    }

    #[test]
    fn test_option_marker_variants() {
        assert!(OPTION_MARKER.is_match("(a) Processor"));
        assert!(OPTION_MARKER.is_match("b) Monitor"));
        assert!(OPTION_MARKER.is_match("C. Keyboard"));
        assert!(!OPTION_MARKER.is_match("e) Mouse"));
        assert!(!OPTION_MARKER.is_match("a"));
    }

    #[test]
    fn test_vocabulary_respects_word_boundaries() {
        assert!(QUESTION_SHORT_VOCAB.is_match("State two uses of RAM"));
        assert!(!QUESTION_SHORT_VOCAB.is_match("The United States economy"));
        assert!(QUESTION_ESSAY_VOCAB.is_match("Analyse the causes"));
        assert!(HEADER_OBJECTIVE_VOCAB.is_match("TRUE/FALSE QUESTIONS"));
    }
}
