//! 分布检查 - 业务能力层
//!
//! 只负责判断"启发式结果是否需要 AI 重新归类"，不修改试卷

use std::fmt;

use crate::models::{ExamStructure, SectionLetter};

/// 全部集中在 A 部分时，超过该数量才认为异常
const ALL_IN_A_THRESHOLD: usize = 10;
/// 至少两个部分为空时，达到该数量才认为异常
const SPARSE_THRESHOLD: usize = 10;

/// 各部分题目数量
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionCounts {
    pub a: usize,
    pub b: usize,
    pub c: usize,
}

impl SectionCounts {
    pub fn of(exam: &ExamStructure) -> Self {
        Self {
            a: exam.section(SectionLetter::A).questions.len(),
            b: exam.section(SectionLetter::B).questions.len(),
            c: exam.section(SectionLetter::C).questions.len(),
        }
    }

    pub fn total(&self) -> usize {
        self.a + self.b + self.c
    }

    pub fn empty_sections(&self) -> usize {
        [self.a, self.b, self.c].iter().filter(|&&n| n == 0).count()
    }
}

impl fmt::Display for SectionCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A={} B={} C={} (共 {})", self.a, self.b, self.c, self.total())
    }
}

/// 是否需要 AI 重新归类
///
/// 以下情况返回 true：
/// - 有题目且全部在 C，或全部在 B
/// - 全部在 A 且超过 10 道
/// - 至少 10 道题且至少两个部分为空
pub fn needs_ai(exam: &ExamStructure) -> bool {
    needs_ai_for(SectionCounts::of(exam))
}

pub fn needs_ai_for(counts: SectionCounts) -> bool {
    let total = counts.total();
    if total == 0 {
        return false;
    }

    let all_in_c = counts.c == total;
    let all_in_b = counts.b == total;
    let all_in_a = counts.a == total && total > ALL_IN_A_THRESHOLD;
    let sparse = total >= SPARSE_THRESHOLD && counts.empty_sections() >= 2;

    all_in_c || all_in_b || all_in_a || sparse
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(a: usize, b: usize, c: usize) -> SectionCounts {
        SectionCounts { a, b, c }
    }

    #[test]
    fn test_empty_exam_never_needs_ai() {
        assert!(!needs_ai(&ExamStructure::new()));
        assert!(!needs_ai_for(counts(0, 0, 0)));
    }

    #[test]
    fn test_single_section_exams() {
        assert!(needs_ai_for(counts(0, 0, 1)));
        assert!(needs_ai_for(counts(0, 7, 0)));
        // 全部在 A 需要超过 10 道；恰好 10 道时由"两个部分为空"触发
        assert!(!needs_ai_for(counts(5, 0, 0)));
        assert!(needs_ai_for(counts(10, 0, 0)));
        assert!(needs_ai_for(counts(11, 0, 0)));
    }

    #[test]
    fn test_balanced_distribution_is_kept() {
        // 场景 4：A=5, B=5, C=2
        assert!(!needs_ai_for(counts(5, 5, 2)));
        assert!(!needs_ai_for(counts(9, 1, 0)));
    }

    #[test]
    fn test_sparse_distribution() {
        assert_eq!(counts(10, 0, 0).empty_sections(), 2);
        assert!(!needs_ai_for(counts(9, 0, 0)));
        assert!(!needs_ai_for(counts(9, 0, 1)));
        assert!(needs_ai_for(counts(0, 12, 0)));
    }

    #[test]
    fn test_counts_display() {
        assert_eq!(counts(5, 5, 2).to_string(), "A=5 B=5 C=2 (共 12)");
    }
}
