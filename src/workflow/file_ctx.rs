//! 文件处理上下文
//!
//! 封装"我正在处理第几个文件、是哪个文件"这一信息

use std::fmt::Display;
use std::path::{Path, PathBuf};

/// 文件处理上下文
#[derive(Debug, Clone)]
pub struct FileCtx {
    /// 文件编号（从 1 开始，仅用于日志显示）
    pub file_index: usize,

    /// 文件路径
    pub file_path: PathBuf,
}

impl FileCtx {
    /// 创建新的文件上下文
    pub fn new(file_index: usize, file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_index,
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// 文件名（不含目录）
    pub fn file_name(&self) -> String {
        self.file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file_path.display().to_string())
    }

    /// 去掉扩展名的文件名，用于输出 JSON 的命名
    pub fn file_stem(&self) -> String {
        self.file_path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("file_{}", self.file_index))
    }
}

impl Display for FileCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[文件 #{} {}]", self.file_index, self.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_names() {
        let ctx = FileCtx::new(3, "input_files/biology.final.pdf");
        assert_eq!(ctx.to_string(), "[文件 #3 biology.final.pdf]");
        assert_eq!(ctx.file_stem(), "biology.final");
    }
}
