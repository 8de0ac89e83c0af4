//! AI 结构化提取 - 业务能力层
//!
//! 让 LLM 直接从全文生成完整的试卷结构（部分 + 题目 + 选项 + 答案），
//! 作为启发式提取之外的可选路径。结果会被规范化：
//! 永远是 A/B/C 三部分、id 连续、选择题在 A、分值限制在该部分的范围内。

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{ExamParseError, ParseResult};
use crate::extraction::heuristics::infer_open_ended_section;
use crate::extraction::patterns::section_from_token;
use crate::models::{ExamStructure, Question, QuestionOption, QuestionType, SectionLetter};
use crate::services::llm_service::LlmBackend;
use crate::utils::json_extract::parse_json_object;
use crate::utils::retry::RetryPolicy;

const SYSTEM_PROMPT: &str = "You are an assistant that converts exam papers into structured JSON. \
Reply with a single JSON object and nothing else.";

#[derive(Debug, Deserialize)]
struct AiExam {
    sections: Vec<AiSection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AiSection {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    questions: Vec<AiQuestion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AiQuestion {
    #[serde(default)]
    text: String,
    #[serde(rename = "type", default)]
    question_type: Option<String>,
    #[serde(default)]
    options: Vec<AiOption>,
    #[serde(default)]
    correct_answer: Option<String>,
    #[serde(default)]
    points: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AiOption {
    #[serde(default)]
    text: String,
    #[serde(default)]
    is_correct: bool,
}

/// AI 结构化提取服务
pub struct AiExtractor {
    llm: Arc<dyn LlmBackend>,
    retry: RetryPolicy,
    timeout: Duration,
}

impl AiExtractor {
    pub fn new(llm: Arc<dyn LlmBackend>, retry: RetryPolicy, timeout: Duration) -> Self {
        Self {
            llm,
            retry,
            timeout,
        }
    }

    pub fn from_config(llm: Arc<dyn LlmBackend>, config: &Config) -> Self {
        Self::new(
            llm,
            RetryPolicy::new(config.ai_max_attempts, config.ai_retry_backoff()),
            config.ai_timeout(),
        )
    }

    /// 提取试卷结构，重试耗尽后返回 `AiExtraction`
    pub async fn extract(&self, text: &str) -> ParseResult<ExamStructure> {
        info!("🤖 使用 AI 提取试卷结构 ({} 字符)", text.chars().count());

        let structure = self
            .retry
            .run("AI 结构化提取", |attempt| {
                debug!("AI 结构化提取第 {} 次尝试", attempt);
                self.request_structure(text)
            })
            .await
            .map_err(|exhausted| ExamParseError::AiExtraction {
                attempts: exhausted.attempts,
                message: exhausted.last_error.to_string(),
            })?;

        let exam = normalize(structure);
        info!("✓ AI 提取完成: {} 道题目", exam.question_count());
        Ok(exam)
    }

    async fn request_structure(&self, text: &str) -> Result<AiExam> {
        let prompt = build_prompt(text);
        let response = tokio::time::timeout(
            self.timeout,
            self.llm.complete(&prompt, Some(SYSTEM_PROMPT)),
        )
        .await
        .map_err(|_| anyhow::anyhow!("LLM 调用超时 ({:?})", self.timeout))??;

        parse_structure(&response)
    }
}

/// AI 结构化提取入口（默认重试策略：3 次，间隔 1 秒）
pub async fn extract_questions_with_ai(
    text: &str,
    llm: Arc<dyn LlmBackend>,
) -> ParseResult<ExamStructure> {
    AiExtractor::new(llm, RetryPolicy::default(), Duration::from_secs(60))
        .extract(text)
        .await
}

fn build_prompt(text: &str) -> String {
    format!(
        r#"Extract every question from the exam paper below.

Use three sections:
- A: multiple-choice questions (1-2 points each)
- B: short answer questions (5-10 points each)
- C: long answer / essay questions (10-20 points each)

Return JSON in exactly this shape:
{{
  "sections": [
    {{
      "name": "A",
      "description": "Multiple Choice Questions",
      "questions": [
        {{
          "text": "question text",
          "type": "multiple-choice" or "open-ended",
          "options": [{{ "text": "option text", "isCorrect": false }}],
          "correctAnswer": "",
          "points": 1
        }}
      ]
    }}
  ]
}}

Exam paper:
{}"#,
        text
    )
}

/// 解析回复；缺少 `sections` 数组视为无效
fn parse_structure(response: &str) -> Result<AiExam> {
    let value: serde_json::Value = parse_json_object(response)?;
    if !value.get("sections").is_some_and(|s| s.is_array()) {
        return Err(ExamParseError::InvalidAiResponse("missing sections array".to_string()).into());
    }
    Ok(serde_json::from_value(value)?)
}

/// "A" / "Section B" / "Part 3" → 部分字母
fn section_letter_of(name: &str) -> Option<SectionLetter> {
    SectionLetter::parse(name).or_else(|| name.split_whitespace().last().and_then(section_from_token))
}

fn question_type_of(raw: &AiQuestion) -> QuestionType {
    let declared_mc = raw
        .question_type
        .as_deref()
        .is_some_and(|t| t.trim().eq_ignore_ascii_case("multiple-choice"));
    if declared_mc || !raw.options.is_empty() {
        QuestionType::MultipleChoice
    } else {
        QuestionType::OpenEnded
    }
}

fn clamp_points(points: Option<u32>, section: SectionLetter) -> u32 {
    let (min, max) = section.points_range();
    points.unwrap_or_else(|| section.default_points()).clamp(min, max)
}

/// 规范化 AI 返回的结构
fn normalize(raw: AiExam) -> ExamStructure {
    let mut exam = ExamStructure::new();
    let mut described = [false; 3];
    let mut next_id = 0u32;

    for section in raw.sections {
        let declared = section_letter_of(&section.name);

        if let (Some(letter), Some(description)) = (declared, section.description.as_deref()) {
            let description = description.trim();
            if !description.is_empty() && !described[letter.index()] {
                exam.section_mut(letter).description = description.to_string();
                described[letter.index()] = true;
            }
        }

        for raw_question in section.questions {
            let text = raw_question.text.trim();
            if text.is_empty() {
                continue;
            }

            let question_type = question_type_of(&raw_question);
            let target = match question_type {
                QuestionType::MultipleChoice => SectionLetter::A,
                QuestionType::OpenEnded => declared.unwrap_or_else(|| infer_open_ended_section(text, None)),
            };

            let options = raw_question
                .options
                .iter()
                .filter(|o| !o.text.trim().is_empty())
                .map(|o| QuestionOption {
                    text: o.text.trim().to_string(),
                    is_correct: o.is_correct,
                })
                .collect();

            exam.push_question(Question {
                id: next_id,
                text: text.to_string(),
                question_type,
                options,
                correct_answer: raw_question.correct_answer.unwrap_or_default(),
                points: clamp_points(raw_question.points, target),
                section: target,
            });
            next_id += 1;
        }
    }

    exam
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const VALID_RESPONSE: &str = r#"Here is the structure:
{
  "sections": [
    {
      "name": "Section A",
      "description": "Objective questions",
      "questions": [
        {
          "text": "What is a CPU?",
          "type": "multiple-choice",
          "options": [
            { "text": "Processor", "isCorrect": true },
            { "text": "Monitor", "isCorrect": false }
          ],
          "correctAnswer": "Processor",
          "points": 5
        }
      ]
    },
    {
      "name": "C",
      "questions": [
        { "text": "Define RAM.", "type": "open-ended", "points": 3 },
        { "text": "Which is an input device?", "options": [{ "text": "Mouse" }] },
        { "text": "   " }
      ]
    }
  ]
}"#;

    /// 前 `failures` 次失败，之后返回固定回复
    struct FlakyLlm {
        failures: usize,
        reply: &'static str,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LlmBackend for FlakyLlm {
        async fn complete(&self, _user: &str, _system: Option<&str>) -> Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                anyhow::bail!("temporary failure {}", call);
            }
            Ok(self.reply.to_string())
        }
    }

    fn extractor(llm: Arc<dyn LlmBackend>) -> AiExtractor {
        AiExtractor::new(
            llm,
            RetryPolicy::new(3, Duration::from_millis(1)),
            Duration::from_secs(1),
        )
    }

    #[tokio::test]
    async fn test_structure_is_normalized() {
        let llm = Arc::new(FlakyLlm {
            failures: 0,
            reply: VALID_RESPONSE,
            calls: AtomicUsize::new(0),
        });

        let exam = extractor(llm).extract("exam text").await.unwrap();

        let a = exam.section(SectionLetter::A);
        assert_eq!(a.description, "Objective questions");
        assert_eq!(a.questions.len(), 2);
        assert_eq!(a.questions[0].id, 0);
        // 分值限制在 A 的范围 1-2
        assert_eq!(a.questions[0].points, 2);
        assert!(a.questions[0].options[0].is_correct);
        assert_eq!(a.questions[0].correct_answer, "Processor");
        // 带选项的题目归入 A
        assert_eq!(a.questions[1].id, 2);
        assert_eq!(a.questions[1].question_type, QuestionType::MultipleChoice);

        let c = exam.section(SectionLetter::C);
        assert_eq!(c.questions.len(), 1);
        assert_eq!(c.questions[0].id, 1);
        assert_eq!(c.questions[0].points, 10);
        assert_eq!(exam.question_count(), 3);
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let llm = Arc::new(FlakyLlm {
            failures: 2,
            reply: VALID_RESPONSE,
            calls: AtomicUsize::new(0),
        });

        let exam = extractor(llm.clone()).extract("exam text").await.unwrap();

        assert_eq!(llm.calls.load(Ordering::SeqCst), 3);
        assert_eq!(exam.question_count(), 3);
    }

    #[tokio::test]
    async fn test_missing_sections_fails_after_retries() {
        let llm = Arc::new(FlakyLlm {
            failures: 0,
            reply: "{\"questions\": []}",
            calls: AtomicUsize::new(0),
        });

        let err = extractor(llm.clone()).extract("exam text").await.unwrap_err();

        assert_eq!(llm.calls.load(Ordering::SeqCst), 3);
        match err {
            ExamParseError::AiExtraction { attempts, message } => {
                assert_eq!(attempts, 3);
                assert!(message.contains("sections"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_section_letter_of() {
        assert_eq!(section_letter_of("b"), Some(SectionLetter::B));
        assert_eq!(section_letter_of("Section C"), Some(SectionLetter::C));
        assert_eq!(section_letter_of("Part 2"), Some(SectionLetter::B));
        assert_eq!(section_letter_of("Bonus"), None);
    }
}
