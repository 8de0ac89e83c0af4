use anyhow::Result;
use exam_file_parser::utils::logging::init_tracing;
use exam_file_parser::{App, Config, ExamFlow};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    init_tracing(config.verbose_logging)?;

    match std::env::args().nth(1) {
        // 单文件模式：解析并把 JSON 打印到标准输出
        Some(path) => {
            let exam = ExamFlow::new(&config).parse_file(&path).await?;
            println!("{}", serde_json::to_string_pretty(&exam)?);
        }
        // 批量模式：处理输入目录
        None => {
            App::initialize(config).await?.run().await?;
        }
    }

    Ok(())
}
