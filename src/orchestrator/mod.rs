//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量文件处理器
//! - 扫描输入目录（Vec<PathBuf>）
//! - 控制并发数量（Semaphore）
//! - 输出全局统计信息
//!
//! ### `file_processor` - 单个文件处理器
//! - 委托 ExamFlow 解析
//! - 写出 JSON / 记录失败文件
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<文件>)
//!     ↓
//! file_processor (处理单个文件的输入输出)
//!     ↓
//! workflow::ExamFlow (单个文件的解析流程)
//!     ↓
//! services / extraction (能力层：读取 / 扫描 / 归类)
//!     ↓
//! infrastructure (基础设施：文档解码器)
//! ```

pub mod batch_processor;
pub mod file_processor;

pub use batch_processor::{App, ProcessingStats};
pub use file_processor::process_file;
