//! 试卷解析流程 - 流程层
//!
//! 核心职责：定义"一个文件"的完整处理流程
//!
//! 流程顺序：
//! 1. 读取文本（失败直接返回错误）
//! 2. 逐行扫描（AI 模式下先尝试 AI 结构化提取，失败再回到扫描）
//! 3. 检查分布
//! 4. 分布异常时 AI 归类 → 补位（AI 失败降级为启发式，不会中断）

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{Config, ExtractionMode};
use crate::error::{ExamParseError, ParseResult};
use crate::extraction::{ensure_min_length, scan_text};
use crate::models::ExamStructure;
use crate::services::ai_categorizer::{rebalance, AiCategorizer};
use crate::services::distribution_auditor::{needs_ai, SectionCounts};
use crate::services::{acquire_text, AiExtractor, LlmBackend, LlmService};
use crate::utils::logging::log_distribution;
use crate::workflow::file_ctx::FileCtx;

/// 流程阶段，按顺序推进，不会回退
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineStage {
    Idle,
    Acquiring,
    LineScanning,
    Auditing,
    AiCategorizing,
    Rebalancing,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Idle => "空闲",
            PipelineStage::Acquiring => "读取文本",
            PipelineStage::LineScanning => "逐行扫描",
            PipelineStage::Auditing => "检查分布",
            PipelineStage::AiCategorizing => "AI 归类",
            PipelineStage::Rebalancing => "补位",
            PipelineStage::Done => "完成",
        };
        write!(f, "{}", name)
    }
}

/// 试卷解析流程
///
/// - 编排完整的单文件处理流程
/// - 决定何时调用 AI、何时兜底
/// - 只依赖业务能力（services）
pub struct ExamFlow {
    categorizer: Option<AiCategorizer>,
    extractor: Option<AiExtractor>,
    mode: ExtractionMode,
    min_text_length: usize,
}

impl ExamFlow {
    /// 根据配置创建流程；没有配置 API key 时不使用 LLM
    pub fn new(config: &Config) -> Self {
        if config.llm_api_key.trim().is_empty() {
            warn!("⚠️ 未配置 LLM_API_KEY，只使用启发式提取");
            return Self::heuristic_only(config);
        }
        Self::with_llm(config, Arc::new(LlmService::new(config)))
    }

    /// 使用指定的 LLM 能力创建流程
    pub fn with_llm(config: &Config, llm: Arc<dyn LlmBackend>) -> Self {
        let categorizer = config
            .ai_categorization_enabled
            .then(|| AiCategorizer::from_config(llm.clone(), config));
        Self {
            categorizer,
            extractor: Some(AiExtractor::from_config(llm, config)),
            mode: config.extraction_mode,
            min_text_length: config.min_text_length,
        }
    }

    /// 不使用 LLM 的流程
    pub fn heuristic_only(config: &Config) -> Self {
        Self {
            categorizer: None,
            extractor: None,
            mode: ExtractionMode::Heuristic,
            min_text_length: config.min_text_length,
        }
    }

    /// 解析单个文件
    pub async fn parse_file(&self, path: impl AsRef<Path>) -> ParseResult<ExamStructure> {
        let ctx = FileCtx::new(1, path.as_ref());
        self.run(&ctx).await
    }

    /// 按上下文执行完整流程
    pub async fn run(&self, ctx: &FileCtx) -> ParseResult<ExamStructure> {
        enter(ctx, PipelineStage::Acquiring);
        let text = acquire_text(ctx.path()).await?;
        self.extract(ctx, &text).await
    }

    /// 从文本开始执行流程
    pub async fn extract(&self, ctx: &FileCtx, text: &str) -> ParseResult<ExamStructure> {
        ensure_min_length(text, self.min_text_length)?;

        if self.mode == ExtractionMode::Ai {
            if let Some(exam) = self.try_ai_extraction(ctx, text).await {
                enter(ctx, PipelineStage::Done);
                return Ok(exam);
            }
        }

        enter(ctx, PipelineStage::LineScanning);
        let exam = scan_text(text);
        if exam.question_count() == 0 {
            warn!("{} ⚠️ 没有识别出任何题目", ctx);
            return Err(ExamParseError::NoQuestionsFound {
                length: text.trim().chars().count(),
            });
        }

        enter(ctx, PipelineStage::Auditing);
        let counts = SectionCounts::of(&exam);
        log_distribution(&ctx.to_string(), counts);

        if !needs_ai(&exam) {
            enter(ctx, PipelineStage::Done);
            return Ok(exam);
        }

        let Some(categorizer) = &self.categorizer else {
            info!("{} 分布异常，但未启用 AI 归类，保留启发式结果", ctx);
            enter(ctx, PipelineStage::Done);
            return Ok(exam);
        };

        info!("{} 🤖 分布异常 ({})，交给 AI 归类", ctx, counts);
        enter(ctx, PipelineStage::AiCategorizing);
        let assigned = categorizer.assign(exam).await;

        enter(ctx, PipelineStage::Rebalancing);
        let balanced = rebalance(assigned);
        log_distribution(&ctx.to_string(), SectionCounts::of(&balanced));

        enter(ctx, PipelineStage::Done);
        Ok(balanced)
    }

    async fn try_ai_extraction(&self, ctx: &FileCtx, text: &str) -> Option<ExamStructure> {
        let Some(extractor) = &self.extractor else {
            warn!("{} ⚠️ AI 提取模式需要 LLM，改用启发式提取", ctx);
            return None;
        };

        match extractor.extract(text).await {
            Ok(exam) if exam.question_count() == 0 => {
                warn!("{} ⚠️ AI 提取没有返回题目，改用启发式提取", ctx);
                None
            }
            Ok(exam) => Some(exam),
            Err(e) => {
                warn!("{} ⚠️ AI 提取失败，改用启发式提取: {}", ctx, e);
                None
            }
        }
    }
}

fn enter(ctx: &FileCtx, stage: PipelineStage) {
    debug!("{} → {}", ctx, stage);
}
