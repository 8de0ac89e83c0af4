//! 单个文件处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **流程调度**：委托 `ExamFlow` 完成解析
//! 2. **结果输出**：把试卷结构写成 JSON 文件
//! 3. **失败记录**：解析失败的文件写入 warn.txt
//! 4. **统计输出**：记录每个部分的题目数量

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::config::Config;
use crate::models::ExamStructure;
use crate::services::{SectionCounts, WarnWriter};
use crate::workflow::{ExamFlow, FileCtx};

/// 处理单个文件
///
/// # 返回
/// - `Ok(true)`: 解析成功并已写出 JSON
/// - `Ok(false)`: 文件无法解析（已写入 warn.txt）
/// - `Err`: 写出结果时发生 IO 错误
pub async fn process_file(flow: &ExamFlow, ctx: &FileCtx, config: &Config) -> Result<bool> {
    info!("{} 开始处理", ctx);

    let exam = match flow.run(ctx).await {
        Ok(exam) => exam,
        Err(e) => {
            error!("{} ❌ 解析失败: {}", ctx, e);
            WarnWriter::with_path(&config.warn_file)
                .write(ctx.file_index, &ctx.path().display().to_string(), &e.to_string())
                .with_context(|| format!("无法写入警告文件: {}", config.warn_file))?;
            return Ok(false);
        }
    };

    let output_path = output_path_for(ctx, Path::new(&config.output_folder));
    write_exam_json(&exam, &output_path)?;

    log_file_complete(ctx, &exam, &output_path);
    Ok(true)
}

/// 输出文件路径：`<output_folder>/<文件名>.json`
pub fn output_path_for(ctx: &FileCtx, output_folder: &Path) -> PathBuf {
    output_folder.join(format!("{}.json", ctx.file_stem()))
}

/// 写出格式化的 JSON
pub fn write_exam_json(exam: &ExamStructure, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("无法创建输出目录: {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(exam)?;
    fs::write(path, json).with_context(|| format!("无法写入文件: {}", path.display()))?;
    Ok(())
}

// ========== 日志辅助函数 ==========

fn log_file_complete(ctx: &FileCtx, exam: &ExamStructure, output_path: &Path) {
    info!("{} 题目统计: {}", ctx, SectionCounts::of(exam));
    info!("{} ✅ 已写入 {}", ctx, output_path.display());
}
