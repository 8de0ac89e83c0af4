//! 选择题选项收集
//!
//! 只在"选项模式"下生效（当前题目是选择题）。遇到新的标题或题目时隐式结束。
//! 启发式路径无法判断正确答案，`is_correct` 一律为 false。

use std::sync::LazyLock;

use regex::Regex;

use super::patterns::{OPTION_DOTTED, OPTION_ENCLOSED, OPTION_LABELLED, OPTION_PAREN};
use crate::models::{ExamStructure, QuestionOption};

/// 选项模式，按优先级排列
static OPTION_RULES: [&LazyLock<Regex>; 4] = [
    &OPTION_ENCLOSED,
    &OPTION_PAREN,
    &OPTION_DOTTED,
    &OPTION_LABELLED,
];

/// 识别出的选项行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionLine<'a> {
    pub letter: char,
    pub text: &'a str,
}

/// 匹配选项行，先命中者生效
pub fn match_option(line: &str) -> Option<OptionLine<'_>> {
    let caps = OPTION_RULES.iter().find_map(|rule| rule.captures(line))?;
    let letter = caps.get(1)?.as_str().chars().next()?.to_ascii_lowercase();
    let text = caps.get(2)?.as_str().trim();
    if text.is_empty() {
        return None;
    }
    Some(OptionLine { letter, text })
}

/// 把选项追加到指定题目，题目不存在时返回 false
pub fn attach_option(exam: &mut ExamStructure, question_id: u32, option: &OptionLine<'_>) -> bool {
    match exam.question_mut(question_id) {
        Some(question) => {
            question.options.push(QuestionOption::new(option.text));
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_styles() {
        assert_eq!(
            match_option("(a) Processor"),
            Some(OptionLine { letter: 'a', text: "Processor" })
        );
        assert_eq!(
            match_option("B) Monitor"),
            Some(OptionLine { letter: 'b', text: "Monitor" })
        );
        assert_eq!(
            match_option("c. Keyboard"),
            Some(OptionLine { letter: 'c', text: "Keyboard" })
        );
        assert_eq!(
            match_option("Option D: Mouse"),
            Some(OptionLine { letter: 'd', text: "Mouse" })
        );
    }

    #[test]
    fn test_non_option_lines() {
        assert_eq!(match_option("e) Printer"), None);
        assert_eq!(match_option("1. Next question"), None);
        assert_eq!(match_option("a.m. is before noon"), None);
        assert_eq!(match_option("(a)"), None);
    }
}
