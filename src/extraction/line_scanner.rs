//! 单遍逐行扫描
//!
//! 每一行依次交给处理器列表，先返回新状态的处理器生效：
//! 部分标题 → 选项行 → 题目起始行 → 续行。

use tracing::{debug, trace};

use super::option_collector::{attach_option, match_option};
use super::question_segmenter::{build_question, infer_question_type, match_question_start, target_section};
use super::scan_state::ScanState;
use super::section_classifier::classify;
use crate::models::ExamStructure;

/// 当前行及其后续行
pub struct LineContext<'a> {
    pub line: &'a str,
    pub lookahead: &'a [&'a str],
}

type LineHandler = fn(&LineContext<'_>, ScanState, &mut ExamStructure) -> Option<ScanState>;

/// 行处理器，按优先级排列
static LINE_HANDLERS: [(&str, LineHandler); 4] = [
    ("section_header", handle_section_header),
    ("option", handle_option),
    ("question_start", handle_question_start),
    ("continuation", handle_continuation),
];

fn handle_section_header(ctx: &LineContext<'_>, state: ScanState, exam: &mut ExamStructure) -> Option<ScanState> {
    let decision = classify(ctx.line, state.current_section, ctx.lookahead)?;
    debug!(
        "识别到部分标题: {} -> {} ({:?})",
        ctx.line, decision.letter, decision.resolved_by
    );
    if let Some(description) = decision.description {
        exam.section_mut(decision.letter).description = description;
    }
    Some(state.enter_section(decision.letter))
}

fn handle_option(ctx: &LineContext<'_>, state: ScanState, exam: &mut ExamStructure) -> Option<ScanState> {
    let question_id = state.collecting_options()?;
    let option = match_option(ctx.line)?;
    attach_option(exam, question_id, &option).then_some(state)
}

fn handle_question_start(ctx: &LineContext<'_>, state: ScanState, exam: &mut ExamStructure) -> Option<ScanState> {
    let start = match_question_start(ctx.line)?;
    let question_type = infer_question_type(ctx.lookahead);
    let section = target_section(question_type, start.text, state.current_section);
    let id = state.next_id;

    trace!("题目 #{} (编号 {}) -> {} {}", id, start.number, section, question_type.as_str());
    exam.push_question(build_question(id, &start, question_type, section));

    Some(state.start_question(id, question_type, section))
}

/// 未识别的行接到当前题目的题干后面（选择题只在出现选项之前接续）
fn handle_continuation(ctx: &LineContext<'_>, state: ScanState, exam: &mut ExamStructure) -> Option<ScanState> {
    let active = state.current_question?;
    let question = exam.question_mut(active.id)?;
    if state.in_options && !question.options.is_empty() {
        return None;
    }
    question.text.push(' ');
    question.text.push_str(ctx.line);
    Some(state)
}

/// 处理一行，返回新的状态
pub fn process_line(line: &str, lookahead: &[&str], state: ScanState, exam: &mut ExamStructure) -> ScanState {
    let ctx = LineContext { line, lookahead };
    LINE_HANDLERS
        .iter()
        .find_map(|(name, handler)| {
            let next = handler(&ctx, state, exam)?;
            trace!("[{}] {}", name, line);
            Some(next)
        })
        .unwrap_or(state)
}

/// 拆分为去空白的非空行
pub fn normalize_lines(text: &str) -> Vec<String> {
    text.replace('\u{00A0}', " ")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// 扫描整段文本（不做长度检查）
pub fn scan_text(text: &str) -> ExamStructure {
    let lines = normalize_lines(text);
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();

    let mut exam = ExamStructure::new();
    let final_state = lines
        .iter()
        .enumerate()
        .fold(ScanState::default(), |state, (idx, line)| {
            process_line(line, &lines[idx + 1..], state, &mut exam)
        });

    debug!(
        "扫描完成: {} 行, {} 道题目",
        lines.len(),
        final_state.next_id
    );
    exam
}
