//! 题目识别
//!
//! 支持五种编号方式：`N.`、`Question N:`、`QN:`、`N)`、`(N)`，先命中者生效。
//! 选择题一律归入 A 部分；开放题按长度和词汇推断部分。

use std::sync::LazyLock;

use regex::Regex;

use super::heuristics::infer_open_ended_section;
use super::patterns::{
    OPTION_MARKER, QUESTION_DOTTED, QUESTION_ENCLOSED, QUESTION_LABELLED, QUESTION_PAREN,
    QUESTION_SHORT_LABEL,
};
use super::section_classifier::is_header_line;
use crate::models::{Question, QuestionType, SectionLetter};

/// 判断题型时向后看的最大行数
pub const TYPE_LOOKAHEAD_LINES: usize = 5;

/// 编号模式，按优先级排列
static QUESTION_RULES: [&LazyLock<Regex>; 5] = [
    &QUESTION_DOTTED,
    &QUESTION_LABELLED,
    &QUESTION_SHORT_LABEL,
    &QUESTION_PAREN,
    &QUESTION_ENCLOSED,
];

/// 识别出的题目起始行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionStart<'a> {
    pub number: &'a str,
    pub text: &'a str,
}

/// 匹配题目起始行
///
/// 只使用第一个匹配的模式；题号或题干为空时不算题目
pub fn match_question_start(line: &str) -> Option<QuestionStart<'_>> {
    let caps = QUESTION_RULES.iter().find_map(|rule| rule.captures(line))?;
    let number = caps.get(1)?.as_str().trim();
    let text = caps.get(2)?.as_str().trim();
    if number.is_empty() || text.is_empty() {
        return None;
    }
    Some(QuestionStart { number, text })
}

/// 根据后续行判断题型
///
/// 向后最多看 5 行，遇到下一道题或新的部分标题即停止
pub fn infer_question_type(lookahead: &[&str]) -> QuestionType {
    let has_options = lookahead
        .iter()
        .take(TYPE_LOOKAHEAD_LINES)
        .take_while(|line| match_question_start(line).is_none() && !is_header_line(line))
        .any(|line| OPTION_MARKER.is_match(line));

    if has_options {
        QuestionType::MultipleChoice
    } else {
        QuestionType::OpenEnded
    }
}

/// 题目应归入的部分
pub fn target_section(
    question_type: QuestionType,
    text: &str,
    current_section: Option<SectionLetter>,
) -> SectionLetter {
    match question_type {
        QuestionType::MultipleChoice => SectionLetter::A,
        QuestionType::OpenEnded => infer_open_ended_section(text, current_section),
    }
}

/// 构建题目记录
pub fn build_question(
    id: u32,
    start: &QuestionStart<'_>,
    question_type: QuestionType,
    section: SectionLetter,
) -> Question {
    Question {
        id,
        text: start.text.to_string(),
        question_type,
        options: Vec::new(),
        correct_answer: String::new(),
        points: section.default_points(),
        section,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbering_styles() {
        let cases = [
            ("1. What is a CPU?", "1", "What is a CPU?"),
            ("Question 2: Define RAM.", "2", "Define RAM."),
            ("Q3: List two input devices.", "3", "List two input devices."),
            ("4) Name a storage device.", "4", "Name a storage device."),
            ("(5) State Ohm's law.", "5", "State Ohm's law."),
        ];
        for (line, number, text) in cases {
            let start = match_question_start(line).unwrap();
            assert_eq!(start.number, number, "line: {}", line);
            assert_eq!(start.text, text, "line: {}", line);
        }
    }

    #[test]
    fn test_non_question_lines() {
        assert!(match_question_start("1.5 kilograms of sand").is_none());
        assert!(match_question_start("(a) Processor").is_none());
        assert!(match_question_start("Question 1:").is_none());
        assert!(match_question_start("SECTION A").is_none());
    }

    #[test]
    fn test_type_inference_from_options() {
        let lookahead = ["(a) Processor", "(b) Monitor"];
        assert_eq!(infer_question_type(&lookahead), QuestionType::MultipleChoice);

        let lookahead = ["Explain your answer.", "a) Cache"];
        assert_eq!(infer_question_type(&lookahead), QuestionType::MultipleChoice);

        assert_eq!(infer_question_type(&[]), QuestionType::OpenEnded);
    }

    #[test]
    fn test_type_lookahead_stops_at_next_question() {
        let lookahead = ["2. What is a CPU?", "(a) Processor", "(b) Monitor"];
        assert_eq!(infer_question_type(&lookahead), QuestionType::OpenEnded);

        let lookahead = ["SECTION A", "(a) Processor"];
        assert_eq!(infer_question_type(&lookahead), QuestionType::OpenEnded);
    }

    #[test]
    fn test_type_lookahead_is_bounded() {
        let lookahead = ["l1", "l2", "l3", "l4", "l5", "(a) too far"];
        assert_eq!(infer_question_type(&lookahead), QuestionType::OpenEnded);
    }

    #[test]
    fn test_multiple_choice_targets_section_a() {
        let long = "x".repeat(300);
        assert_eq!(
            target_section(QuestionType::MultipleChoice, &long, Some(SectionLetter::C)),
            SectionLetter::A
        );
        assert_eq!(
            target_section(QuestionType::OpenEnded, "Define RAM.", Some(SectionLetter::A)),
            SectionLetter::B
        );
    }
}
