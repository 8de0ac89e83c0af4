//! 题目归类的启发式规则
//!
//! 启发式提取与 AI 归类失败时的兜底共用这里的规则。

use super::patterns::{QUESTION_ESSAY_VOCAB, QUESTION_SHORT_VOCAB};
use crate::models::{Question, SectionLetter};

/// 短于该长度的开放题归入 B
pub const SHORT_QUESTION_MAX_CHARS: usize = 100;
/// 长于该长度的开放题归入 C
pub const LONG_QUESTION_MIN_CHARS: usize = 200;

fn char_len(text: &str) -> usize {
    text.chars().count()
}

pub fn has_short_answer_vocab(text: &str) -> bool {
    QUESTION_SHORT_VOCAB.is_match(text)
}

pub fn has_essay_vocab(text: &str) -> bool {
    QUESTION_ESSAY_VOCAB.is_match(text)
}

/// 开放题的目标部分
///
/// 依次判断：短文本或简答词汇 ⇒ B；论述词汇或长文本 ⇒ C；否则沿用当前部分（默认 C）
pub fn infer_open_ended_section(text: &str, current: Option<SectionLetter>) -> SectionLetter {
    let len = char_len(text);
    if len < SHORT_QUESTION_MAX_CHARS || has_short_answer_vocab(text) {
        SectionLetter::B
    } else if has_essay_vocab(text) || len > LONG_QUESTION_MIN_CHARS {
        SectionLetter::C
    } else {
        current.unwrap_or(SectionLetter::C)
    }
}

/// AI 不可用时的单题兜底归类：有选项 ⇒ A；论述词汇或长文本 ⇒ C；否则 B
pub fn fallback_section(question: &Question) -> SectionLetter {
    if question.looks_like_multiple_choice() {
        SectionLetter::A
    } else if has_essay_vocab(&question.text) || char_len(&question.text) > LONG_QUESTION_MIN_CHARS {
        SectionLetter::C
    } else {
        SectionLetter::B
    }
}

/// 是否是可以挪到 B 的短开放题
pub fn is_short_open_ended(question: &Question) -> bool {
    !question.is_multiple_choice() && char_len(&question.text) < LONG_QUESTION_MIN_CHARS
}
