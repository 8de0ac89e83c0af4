//! 逐行扫描的状态
//!
//! 状态是一个显式的值，在行与行之间传递（fold），不依赖闭包捕获的可变变量。

use crate::models::{QuestionType, SectionLetter};

/// 当前正在收集的题目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveQuestion {
    pub id: u32,
    pub question_type: QuestionType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanState {
    pub current_section: Option<SectionLetter>,
    pub current_question: Option<ActiveQuestion>,
    pub in_options: bool,
    /// 下一道题的 id（即已创建的题目总数）
    pub next_id: u32,
}

impl ScanState {
    /// 进入新的部分：清空当前题目与选项模式
    pub fn enter_section(self, section: SectionLetter) -> Self {
        Self {
            current_section: Some(section),
            current_question: None,
            in_options: false,
            ..self
        }
    }

    /// 开始一道新题，选择题进入选项模式
    pub fn start_question(self, id: u32, question_type: QuestionType, section: SectionLetter) -> Self {
        Self {
            current_section: Some(section),
            current_question: Some(ActiveQuestion { id, question_type }),
            in_options: question_type == QuestionType::MultipleChoice,
            next_id: id + 1,
        }
    }

    /// 当前是否在收集选择题选项
    pub fn collecting_options(&self) -> Option<u32> {
        match self.current_question {
            Some(q) if self.in_options && q.question_type == QuestionType::MultipleChoice => Some(q.id),
            _ => None,
        }
    }
}
