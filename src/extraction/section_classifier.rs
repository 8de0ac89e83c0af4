//! 部分标题识别
//!
//! 判断一行文本是否开启新的部分（A/B/C）。规则按优先级依次尝试，先命中者生效：
//!
//! 1. 结构模式：`SECTION/PART + 字母/数字 + 分值标注 + 分隔符 + 描述`，含装饰变体
//! 2. 关键词推断：标题匹配但没有可用字母时，按词汇判断
//! 3. 前瞻推断：看后面 4 行的选项标记 / 分值标注 / 论述词汇
//! 4. 默认推进：上一部分的下一个（A → B → C → A），没有上一部分时为 A

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use super::patterns::{
    section_from_token, DECORATION, DESCRIPTION_AFTER_ANNOTATION, DESCRIPTION_AFTER_COLON,
    DESCRIPTION_AFTER_DASH, ESSAY_VOCAB, HEADER_BARE, HEADER_KEYWORD, HEADER_OBJECTIVE_VOCAB,
    HEADER_PLAIN, HEADER_SHORT_VOCAB, HEADER_UNLETTERED, HEADER_WITH_ANNOTATION,
    HEADER_WITH_SEPARATOR, MARKS_ANNOTATION, OPTION_MARKER,
};
use crate::models::SectionLetter;

/// 前瞻推断检查的行数
pub const HEADER_LOOKAHEAD_LINES: usize = 4;

/// 识别结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionDecision {
    pub letter: SectionLetter,
    pub description: Option<String>,
    /// 字母来自哪一级规则（日志用）
    pub resolved_by: Resolution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Structural,
    Keyword,
    Lookahead,
    Progression,
}

/// 结构模式匹配结果：可能带有一个字母/数字标记
struct HeaderShape<'a> {
    token: Option<&'a str>,
}

struct StructuralRule {
    pattern: &'static LazyLock<Regex>,
    has_token: bool,
}

/// 结构模式，按优先级排列
static STRUCTURAL_RULES: [StructuralRule; 5] = [
    StructuralRule {
        pattern: &HEADER_WITH_ANNOTATION,
        has_token: true,
    },
    StructuralRule {
        pattern: &HEADER_WITH_SEPARATOR,
        has_token: true,
    },
    StructuralRule {
        pattern: &HEADER_PLAIN,
        has_token: true,
    },
    StructuralRule {
        pattern: &HEADER_UNLETTERED,
        has_token: false,
    },
    StructuralRule {
        pattern: &HEADER_BARE,
        has_token: false,
    },
];

/// 描述提取模式，按优先级排列
static DESCRIPTION_RULES: [&LazyLock<Regex>; 3] = [
    &DESCRIPTION_AFTER_ANNOTATION,
    &DESCRIPTION_AFTER_COLON,
    &DESCRIPTION_AFTER_DASH,
];

/// 标题词汇 → 部分，按优先级排列
static VOCABULARY_RULES: [(&LazyLock<Regex>, SectionLetter); 3] = [
    (&HEADER_OBJECTIVE_VOCAB, SectionLetter::A),
    (&HEADER_SHORT_VOCAB, SectionLetter::B),
    (&ESSAY_VOCAB, SectionLetter::C),
];

/// 去掉首尾装饰符（`---`、`===`、`***`）
fn strip_decoration(line: &str) -> Cow<'_, str> {
    match DECORATION.replace_all(line.trim(), "") {
        Cow::Borrowed(s) => Cow::Borrowed(s.trim()),
        Cow::Owned(s) => Cow::Owned(s.trim().to_string()),
    }
}

fn match_structure(line: &str) -> Option<HeaderShape<'_>> {
    STRUCTURAL_RULES.iter().find_map(|rule| {
        let caps = rule.pattern.captures(line)?;
        let token = if rule.has_token {
            caps.get(1).map(|m| m.as_str())
        } else {
            None
        };
        Some(HeaderShape { token })
    })
}

/// 是否是结构上的标题行（不解析字母）
pub fn is_header_line(line: &str) -> bool {
    match_structure(&strip_decoration(line)).is_some()
}

/// 识别部分标题
///
/// # 参数
/// - `line`: 当前行
/// - `prior_section`: 上一个部分（用于默认推进）
/// - `lookahead`: 当前行之后的若干行
///
/// # 返回
/// 不是标题时返回 `None`
pub fn classify(
    line: &str,
    prior_section: Option<SectionLetter>,
    lookahead: &[&str],
) -> Option<SectionDecision> {
    let stripped = strip_decoration(line);
    let shape = match_structure(&stripped)?;

    let (letter, resolved_by) = if let Some(letter) = shape.token.and_then(section_from_token) {
        (letter, Resolution::Structural)
    } else if let Some(letter) = letter_from_vocabulary(&stripped) {
        (letter, Resolution::Keyword)
    } else if let Some(letter) = letter_from_lookahead(&stripped, lookahead) {
        (letter, Resolution::Lookahead)
    } else {
        (progress_from(prior_section), Resolution::Progression)
    };

    Some(SectionDecision {
        letter,
        description: extract_description(&stripped),
        resolved_by,
    })
}

fn letter_from_vocabulary(line: &str) -> Option<SectionLetter> {
    VOCABULARY_RULES
        .iter()
        .find(|(pattern, _)| pattern.is_match(line))
        .map(|(_, letter)| *letter)
}

fn letter_from_lookahead(line: &str, lookahead: &[&str]) -> Option<SectionLetter> {
    if !HEADER_KEYWORD.is_match(line) {
        return None;
    }

    let window = &lookahead[..lookahead.len().min(HEADER_LOOKAHEAD_LINES)];

    if window.iter().any(|l| OPTION_MARKER.is_match(l.trim())) {
        return Some(SectionLetter::A);
    }

    let has_essay_vocab = window.iter().any(|l| ESSAY_VOCAB.is_match(l));
    if !has_essay_vocab && window.iter().any(|l| MARKS_ANNOTATION.is_match(l)) {
        return Some(SectionLetter::B);
    }
    if has_essay_vocab {
        return Some(SectionLetter::C);
    }

    None
}

fn progress_from(prior_section: Option<SectionLetter>) -> SectionLetter {
    prior_section.map(SectionLetter::next).unwrap_or(SectionLetter::A)
}

fn extract_description(line: &str) -> Option<String> {
    DESCRIPTION_RULES.iter().find_map(|pattern| {
        let caps = pattern.captures(line)?;
        let desc = caps.get(caps.len() - 1)?.as_str().trim();
        (!desc.is_empty()).then(|| desc.to_string())
    })
}
