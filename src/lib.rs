//! # Exam File Parser
//!
//! 把试卷文档（PDF / Word / 纯文本）解析成 A/B/C 三部分题目结构的 Rust 库
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 文档解码器，只暴露"读出文字"的能力
//!
//! ### ② 解析层（Extraction）
//! - `extraction/` - 确定性的逐行扫描：部分标题、题目、选项
//!
//! ### ③ 业务能力层（Services）
//! - `TextAcquirer` - 按扩展名读取文本
//! - `DistributionAuditor` - 判断是否需要 AI
//! - `AiCategorizer` - 分批 AI 归类 + 启发式兜底 + 补位
//! - `AiExtractor` - AI 结构化提取（可选路径）
//! - `LlmService` - LLM 调用能力
//! - `WarnWriter` - 写 warn.txt 能力
//!
//! ### ④ 流程层（Workflow）
//! - `ExamFlow` - 单个文件的完整流程（读取 → 扫描 → 检查 → AI 归类 → 补位）
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量处理输入目录，管理并发
//! - `orchestrator/file_processor` - 单个文件的输出与失败记录
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod extraction;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

use std::path::Path;

// 重新导出常用类型
pub use config::{Config, ExtractionMode};
pub use error::{DocumentKind, ExamParseError, ParseResult};
pub use extraction::{extract_questions_directly, scan_text};
pub use models::{ExamStructure, Question, QuestionOption, QuestionType, Section, SectionLetter};
pub use orchestrator::App;
pub use services::{
    categorize_questions_with_ai, extract_questions_with_ai, needs_ai, parse_pdf, parse_word,
    LlmBackend, LlmService,
};
pub use workflow::{ExamFlow, FileCtx};

/// 解析单个文件（配置与命令行相同：配置文件 + 环境变量）
///
/// 读取 → 启发式扫描 → 分布检查 → 必要时 AI 归类
pub async fn parse_file(path: impl AsRef<Path>) -> ParseResult<ExamStructure> {
    ExamFlow::new(&Config::load_or_env()).parse_file(path).await
}
