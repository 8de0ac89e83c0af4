use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

/// 默认配置文件
pub const DEFAULT_CONFIG_FILE: &str = "exam_parser.toml";

/// 题目提取方式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// 正则/关键词启发式提取（默认）
    Heuristic,
    /// 由 LLM 直接生成完整的试卷结构
    Ai,
}

impl ExtractionMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "heuristic" => Some(ExtractionMode::Heuristic),
            "ai" => Some(ExtractionMode::Ai),
            _ => None,
        }
    }
}

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 待解析文件所在目录
    pub input_folder: String,
    /// JSON 输出目录
    pub output_folder: String,
    /// 同时处理的文件数量
    pub max_concurrent_files: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 解析失败的文件记录
    pub warn_file: String,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    // --- AI 归类配置 ---
    /// 是否在分布异常时启用 AI 重新归类
    pub ai_categorization_enabled: bool,
    /// 每批发送给 LLM 的题目数量
    pub ai_batch_size: usize,
    /// 单批调用超时（秒）
    pub ai_timeout_secs: u64,
    /// 批次之间的间隔（毫秒）
    pub ai_batch_delay_ms: u64,
    /// AI 结构化提取的最大尝试次数
    pub ai_max_attempts: usize,
    /// AI 结构化提取的重试间隔（毫秒）
    pub ai_retry_backoff_ms: u64,
    // --- 提取配置 ---
    /// 可信试卷文本的最小长度
    pub min_text_length: usize,
    pub extraction_mode: ExtractionMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_folder: "input_files".to_string(),
            output_folder: "output_json".to_string(),
            max_concurrent_files: 4,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            warn_file: "warn.txt".to_string(),
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            llm_temperature: 0.1,
            llm_max_tokens: 1024,
            ai_categorization_enabled: true,
            ai_batch_size: 3,
            ai_timeout_secs: 10,
            ai_batch_delay_ms: 1000,
            ai_max_attempts: 3,
            ai_retry_backoff_ms: 1000,
            min_text_length: 100,
            extraction_mode: ExtractionMode::Heuristic,
        }
    }
}

impl Config {
    /// 加载配置：TOML 文件（如果存在）+ 环境变量覆盖
    ///
    /// 配置文件路径取自 `EXAM_PARSER_CONFIG`，默认 `exam_parser.toml`
    pub fn load() -> Result<Self> {
        let path = std::env::var("EXAM_PARSER_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(Path::new(&path))
    }

    /// 从指定文件加载（文件不存在时使用默认值）+ 环境变量覆盖
    pub fn load_from(path: &Path) -> Result<Self> {
        let base = if path.exists() {
            Self::from_toml_file(path)?
        } else {
            Self::default()
        };

        Ok(base.with_env_overrides())
    }

    /// 同 `load`，配置文件无效时记录警告并退回到环境变量配置
    pub fn load_or_env() -> Self {
        Self::load().unwrap_or_else(|e| {
            warn!("⚠️ 配置文件无效，改用环境变量配置: {:#}", e);
            Self::from_env()
        })
    }

    /// 从 TOML 文件加载，缺失的字段使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    fn with_env_overrides(self) -> Self {
        let base = self;
        Self {
            input_folder: std::env::var("INPUT_FOLDER").unwrap_or(base.input_folder),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(base.output_folder),
            max_concurrent_files: env_parse("MAX_CONCURRENT_FILES").unwrap_or(base.max_concurrent_files),
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(base.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(base.output_log_file),
            warn_file: std::env::var("WARN_FILE").unwrap_or(base.warn_file),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(base.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(base.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(base.llm_model_name),
            llm_temperature: env_parse("LLM_TEMPERATURE").unwrap_or(base.llm_temperature),
            llm_max_tokens: env_parse("LLM_MAX_TOKENS").unwrap_or(base.llm_max_tokens),
            ai_categorization_enabled: env_parse("AI_CATEGORIZATION_ENABLED").unwrap_or(base.ai_categorization_enabled),
            ai_batch_size: env_parse("AI_BATCH_SIZE").unwrap_or(base.ai_batch_size),
            ai_timeout_secs: env_parse("AI_TIMEOUT_SECS").unwrap_or(base.ai_timeout_secs),
            ai_batch_delay_ms: env_parse("AI_BATCH_DELAY_MS").unwrap_or(base.ai_batch_delay_ms),
            ai_max_attempts: env_parse("AI_MAX_ATTEMPTS").unwrap_or(base.ai_max_attempts),
            ai_retry_backoff_ms: env_parse("AI_RETRY_BACKOFF_MS").unwrap_or(base.ai_retry_backoff_ms),
            min_text_length: env_parse("MIN_TEXT_LENGTH").unwrap_or(base.min_text_length),
            extraction_mode: std::env::var("EXTRACTION_MODE")
                .ok()
                .and_then(|v| ExtractionMode::parse(&v))
                .unwrap_or(base.extraction_mode),
        }
    }

    pub fn ai_timeout(&self) -> Duration {
        Duration::from_secs(self.ai_timeout_secs)
    }

    pub fn ai_batch_delay(&self) -> Duration {
        Duration::from_millis(self.ai_batch_delay_ms)
    }

    pub fn ai_retry_backoff(&self) -> Duration {
        Duration::from_millis(self.ai_retry_backoff_ms)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_pipeline_constants() {
        let config = Config::default();
        assert_eq!(config.ai_batch_size, 3);
        assert_eq!(config.ai_timeout(), Duration::from_secs(10));
        assert_eq!(config.ai_batch_delay(), Duration::from_secs(1));
        assert_eq!(config.ai_max_attempts, 3);
        assert_eq!(config.min_text_length, 100);
        assert_eq!(config.extraction_mode, ExtractionMode::Heuristic);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
input_folder = "papers"
ai_batch_size = 5
extraction_mode = "ai"
"#,
        )
        .unwrap();

        assert_eq!(config.input_folder, "papers");
        assert_eq!(config.ai_batch_size, 5);
        assert_eq!(config.extraction_mode, ExtractionMode::Ai);
        assert_eq!(config.output_folder, "output_json");
        assert_eq!(config.ai_timeout_secs, 10);
    }

    #[test]
    fn test_load_from_reads_file_and_tolerates_missing_file() {
        let dir = std::env::temp_dir().join(format!("exam_parser_cfg_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("exam_parser.toml");
        std::fs::write(&path, "output_folder = \"parsed\"\nai_batch_size = 4\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.ai_batch_size, 4);

        let missing = Config::load_from(&dir.join("missing.toml")).unwrap();
        assert_eq!(missing.ai_batch_size, 3);

        std::fs::write(&path, "ai_batch_size = \"many\"").unwrap();
        assert!(Config::load_from(&path).is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_unknown_extraction_mode_is_rejected() {
        assert!(Config::from_toml_str(r#"extraction_mode = "magic""#).is_err());
        assert_eq!(ExtractionMode::parse(" AI "), Some(ExtractionMode::Ai));
        assert_eq!(ExtractionMode::parse("other"), None);
    }
}
