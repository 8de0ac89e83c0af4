//! 批量文件处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是批量模式的入口，负责扫描输入目录并发处理所有文件。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：初始化日志文件、创建 `ExamFlow`
//! 2. **批量加载**：扫描输入目录中所有支持的文件
//! 3. **并发控制**：使用 Semaphore 限制并发数量
//! 4. **分批处理**：每批完成后再开始下一批
//! 5. **全局统计**：汇总所有文件的处理结果
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个文件的细节
//! - **共享流程**：`ExamFlow` 无状态，通过 Arc 在任务间共享
//! - **向下委托**：委托 file_processor 处理单个文件

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::orchestrator::file_processor;
use crate::services::text_acquirer::is_supported_file;
use crate::utils::logging::{
    init_log_file, log_batch_complete, log_batch_start, log_files_loaded, log_startup,
    print_final_stats,
};
use crate::workflow::{ExamFlow, FileCtx};

/// 应用主结构
pub struct App {
    config: Config,
    flow: Arc<ExamFlow>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        init_log_file(&config.output_log_file)
            .with_context(|| format!("无法初始化日志文件: {}", config.output_log_file))?;

        let mode = format!("{:?}", config.extraction_mode);
        log_startup(config.max_concurrent_files, &mode);

        let flow = Arc::new(ExamFlow::new(&config));
        Ok(Self::with_flow(config, flow))
    }

    /// 使用指定的流程创建（测试中注入脚本化的 LLM）
    pub fn with_flow(config: Config, flow: Arc<ExamFlow>) -> Self {
        Self { config, flow }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ProcessingStats> {
        let files = self.load_files()?;

        if files.is_empty() {
            warn!("⚠️ 没有找到待解析的文件，程序结束");
            return Ok(ProcessingStats::default());
        }

        log_files_loaded(files.len(), self.concurrency());

        let stats = self.process_all_files(files).await?;

        print_final_stats(
            stats.success,
            stats.failed,
            stats.total,
            &self.config.output_log_file,
        );

        Ok(stats)
    }

    fn concurrency(&self) -> usize {
        self.config.max_concurrent_files.max(1)
    }

    /// 扫描输入目录（按文件名排序，保证顺序稳定）
    fn load_files(&self) -> Result<Vec<PathBuf>> {
        info!("\n📁 正在扫描待解析的文件...");
        collect_input_files(Path::new(&self.config.input_folder))
    }

    /// 处理所有文件
    async fn process_all_files(&self, files: Vec<PathBuf>) -> Result<ProcessingStats> {
        let batch_size = self.concurrency();
        let semaphore = Arc::new(Semaphore::new(batch_size));
        let total_files = files.len();
        let total_batches = total_files.div_ceil(batch_size);
        let mut stats = ProcessingStats {
            total: total_files,
            ..Default::default()
        };

        for (batch_idx, batch_files) in files.chunks(batch_size).enumerate() {
            let batch_start = batch_idx * batch_size;
            let batch_num = batch_idx + 1;

            log_batch_start(
                batch_num,
                total_batches,
                batch_start + 1,
                batch_start + batch_files.len(),
                total_files,
            );

            let batch_result = self
                .process_batch(batch_files, batch_start, semaphore.clone())
                .await?;

            stats.success += batch_result.success;
            stats.failed += batch_result.failed;

            log_batch_complete(
                batch_num,
                batch_result.success,
                batch_result.success + batch_result.failed,
            );
        }

        Ok(stats)
    }

    /// 处理单个批次
    async fn process_batch(
        &self,
        batch_files: &[PathBuf],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<BatchResult> {
        let mut batch_handles = Vec::new();

        for (idx, file_path) in batch_files.iter().enumerate() {
            let ctx = FileCtx::new(batch_start + idx + 1, file_path.clone());
            let permit = semaphore.clone().acquire_owned().await?;
            let flow = self.flow.clone();
            let config = self.config.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                match file_processor::process_file(&flow, &ctx, &config).await {
                    Ok(done) => Ok(done),
                    Err(e) => {
                        error!("{} ❌ 处理过程中发生错误: {}", ctx, e);
                        Err(e)
                    }
                }
            });
            batch_handles.push((batch_start + idx + 1, handle));
        }

        let mut result = BatchResult::default();

        for (file_index, handle) in batch_handles {
            match handle.await {
                Ok(Ok(true)) => {
                    result.success += 1;
                }
                Ok(Ok(false)) | Ok(Err(_)) => {
                    result.failed += 1;
                }
                Err(e) => {
                    error!("[文件 #{}] 任务执行失败: {}", file_index, e);
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }
}

/// 列出目录中所有支持的文件
pub fn collect_input_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(folder).with_context(|| format!("无法读取输入目录: {}", folder.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && is_supported_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// 处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStats {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
}

/// 批次处理结果
#[derive(Debug, Default)]
struct BatchResult {
    success: usize,
    failed: usize,
}
