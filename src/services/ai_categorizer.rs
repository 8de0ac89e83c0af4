//! AI 归类服务 - 业务能力层
//!
//! 启发式分布异常时，把题目按小批次交给 LLM 重新归入 A/B/C。
//!
//! ## 流程
//! 1. 展开所有题目，带上创建时所在的部分
//! 2. 每 3 道题一批，调用 LLM（超时 10 秒）
//! 3. 解析回复中的 `{ "<id>": "A|B|C" }`；失败则该批按启发式兜底
//! 4. 批次之间等待 1 秒（最后一批之后不等待）
//! 5. 重建三部分结构，再做一次补位
//!
//! 任何 LLM 错误都不会让归类失败。

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::extraction::heuristics::{fallback_section, is_short_open_ended};
use crate::models::{ExamStructure, Question, SectionLetter};
use crate::services::distribution_auditor::SectionCounts;
use crate::services::llm_service::LlmBackend;
use crate::utils::json_extract::parse_json_object;
use crate::utils::logging::truncate_text;

pub const DEFAULT_BATCH_SIZE: usize = 3;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_secs(1);

const SYSTEM_PROMPT: &str = "You are an assistant that sorts exam questions into sections. \
Reply with a single JSON object and nothing else.";

/// 一个批次的归类结果：题目 id → 部分
pub type BatchCategorization = BTreeMap<u32, SectionLetter>;

/// 带有创建时所在部分的题目
#[derive(Debug, Clone)]
struct TaggedQuestion {
    question: Question,
    origin: SectionLetter,
}

/// 提示词中的单道题
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PromptQuestion<'a> {
    id: u32,
    text: &'a str,
    #[serde(rename = "type")]
    question_type: &'static str,
    options: Vec<&'a str>,
    current_section: &'static str,
}

/// AI 归类服务
///
/// 职责：
/// - 分批调用 LLM 并合并结果
/// - 单批失败时只对该批做启发式兜底
/// - 重建并补位，保证选择题一定在 A
pub struct AiCategorizer {
    llm: Arc<dyn LlmBackend>,
    batch_size: usize,
    timeout: Duration,
    batch_delay: Duration,
}

impl AiCategorizer {
    /// 使用默认参数（每批 3 道，超时 10 秒，间隔 1 秒）
    pub fn new(llm: Arc<dyn LlmBackend>) -> Self {
        Self {
            llm,
            batch_size: DEFAULT_BATCH_SIZE,
            timeout: DEFAULT_TIMEOUT,
            batch_delay: DEFAULT_BATCH_DELAY,
        }
    }

    pub fn from_config(llm: Arc<dyn LlmBackend>, config: &Config) -> Self {
        Self::new(llm)
            .with_batch_size(config.ai_batch_size)
            .with_timeout(config.ai_timeout())
            .with_batch_delay(config.ai_batch_delay())
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_batch_delay(mut self, batch_delay: Duration) -> Self {
        self.batch_delay = batch_delay;
        self
    }

    /// 重新归类整份试卷并补位，永不失败
    pub async fn categorize(&self, exam: ExamStructure) -> ExamStructure {
        let balanced = rebalance(self.assign(exam).await);
        info!("✓ AI 归类完成: {}", SectionCounts::of(&balanced));
        balanced
    }

    /// 分批归类并重建三部分结构（不补位）
    pub async fn assign(&self, exam: ExamStructure) -> ExamStructure {
        let tagged: Vec<TaggedQuestion> = exam
            .questions()
            .map(|q| TaggedQuestion {
                question: q.clone(),
                origin: exam.origin_section_of(q),
            })
            .collect();

        if tagged.is_empty() {
            debug!("试卷没有题目，跳过 AI 归类");
            return exam;
        }

        let total_batches = tagged.len().div_ceil(self.batch_size);
        info!(
            "🤖 开始 AI 归类: {} 道题目，分 {} 批",
            tagged.len(),
            total_batches
        );

        let mut assignments = BatchCategorization::new();
        for (idx, batch) in tagged.chunks(self.batch_size).enumerate() {
            if idx > 0 {
                tokio::time::sleep(self.batch_delay).await;
            }
            let result = self.categorize_batch(batch, idx + 1, total_batches).await;
            assignments.extend(result);
        }

        rebuild(&exam, tagged, &assignments)
    }

    /// 归类单个批次，失败时降级为启发式
    async fn categorize_batch(
        &self,
        batch: &[TaggedQuestion],
        batch_num: usize,
        total_batches: usize,
    ) -> BatchCategorization {
        match self.request_batch(batch).await {
            Ok(result) => {
                debug!(
                    "[批次 {}/{}] ✓ LLM 归类 {} 道题目",
                    batch_num,
                    total_batches,
                    result.len()
                );
                result
            }
            Err(e) => {
                warn!(
                    "[批次 {}/{}] ⚠️ LLM 归类失败，使用启发式兜底: {}",
                    batch_num, total_batches, e
                );
                fallback_batch(batch)
            }
        }
    }

    async fn request_batch(&self, batch: &[TaggedQuestion]) -> Result<BatchCategorization> {
        let prompt = build_prompt(batch);
        let response = tokio::time::timeout(
            self.timeout,
            self.llm.complete(&prompt, Some(SYSTEM_PROMPT)),
        )
        .await
        .map_err(|_| anyhow::anyhow!("LLM 调用超时 ({:?})", self.timeout))??;

        debug!("LLM 归类响应: {}", truncate_text(&response, 200));
        parse_assignments(&response, batch)
    }
}

/// AI 归类入口（默认参数）
pub async fn categorize_questions_with_ai(
    exam: ExamStructure,
    llm: Arc<dyn LlmBackend>,
) -> ExamStructure {
    AiCategorizer::new(llm).categorize(exam).await
}

fn build_prompt(batch: &[TaggedQuestion]) -> String {
    let questions: Vec<PromptQuestion<'_>> = batch
        .iter()
        .map(|t| PromptQuestion {
            id: t.question.id,
            text: &t.question.text,
            question_type: t.question.question_type.as_str(),
            options: t.question.options.iter().map(|o| o.text.as_str()).collect(),
            current_section: t.origin.as_str(),
        })
        .collect();

    let questions_json = serde_json::to_string_pretty(&questions).unwrap_or_default();

    format!(
        r#"Assign each exam question below to one section.

Sections:
- A: multiple-choice questions (any question with options)
- B: short answer questions (define, list, name, identify, state, "what is", "explain briefly")
- C: long answer / essay questions (discuss, analyze, evaluate, "explain in detail", compare, contrast, essay, elaborate)

Rules:
1. A question of type "multiple-choice" always goes to A.
2. Brief explanation vocabulary goes to B.
3. Essay vocabulary goes to C.

Questions:
{}

Return only a JSON object mapping each question id to its section letter, for example {{"0": "A", "1": "B"}}."#,
        questions_json
    )
}

/// 解析 LLM 回复；不在本批内的 id 和无效字母会被忽略
fn parse_assignments(response: &str, batch: &[TaggedQuestion]) -> Result<BatchCategorization> {
    let raw: HashMap<String, serde_json::Value> = parse_json_object(response)?;

    let mut result = BatchCategorization::new();
    for tagged in batch {
        let id = tagged.question.id;
        let letter = raw
            .get(&id.to_string())
            .and_then(|v| v.as_str())
            .and_then(SectionLetter::parse);
        match letter {
            Some(letter) => {
                result.insert(id, letter);
            }
            None => debug!("题目 #{} 没有有效的归类结果", id),
        }
    }
    Ok(result)
}

/// 整批启发式兜底
fn fallback_batch(batch: &[TaggedQuestion]) -> BatchCategorization {
    batch
        .iter()
        .map(|t| (t.question.id, fallback_section(&t.question)))
        .collect()
}

/// 按归类结果重建三部分结构
///
/// 没有结果的题目回到创建时所在部分；选择题一律放入 A
fn rebuild(
    source: &ExamStructure,
    tagged: Vec<TaggedQuestion>,
    assignments: &BatchCategorization,
) -> ExamStructure {
    let mut exam =
        ExamStructure::with_descriptions_of(source).with_metadata(source.metadata().clone());

    for TaggedQuestion {
        mut question,
        origin,
    } in tagged
    {
        let target = if question.is_multiple_choice() {
            SectionLetter::A
        } else {
            assignments.get(&question.id).copied().unwrap_or(origin)
        };
        question.move_to(target);
        exam.push_question(question);
    }
    exam
}

/// 补位
///
/// - A 为空：把 B、C 中的选择题或带选项的题目移入 A
/// - B 为空且 C 不为空：把 C 中 200 字符以内的开放题移入 B
pub fn rebalance(mut exam: ExamStructure) -> ExamStructure {
    if exam.section(SectionLetter::A).questions.is_empty() {
        for from in [SectionLetter::B, SectionLetter::C] {
            let moved = take_where(&mut exam, from, Question::looks_like_multiple_choice);
            move_into(&mut exam, SectionLetter::A, moved);
        }
    }

    if exam.section(SectionLetter::B).questions.is_empty()
        && !exam.section(SectionLetter::C).questions.is_empty()
    {
        let moved = take_where(&mut exam, SectionLetter::C, is_short_open_ended);
        move_into(&mut exam, SectionLetter::B, moved);
    }

    exam.sort_sections_by_id();
    exam
}

fn take_where(
    exam: &mut ExamStructure,
    from: SectionLetter,
    predicate: impl Fn(&Question) -> bool,
) -> Vec<Question> {
    let section = exam.section_mut(from);
    let (taken, kept): (Vec<Question>, Vec<Question>) = std::mem::take(&mut section.questions)
        .into_iter()
        .partition(|q| predicate(q));
    section.questions = kept;
    taken
}

fn move_into(exam: &mut ExamStructure, to: SectionLetter, questions: Vec<Question>) {
    if !questions.is_empty() {
        debug!("补位: {} 道题目移入 {}", questions.len(), to);
    }
    for mut question in questions {
        question.move_to(to);
        exam.section_mut(to).questions.push(question);
    }
}
