//! LLM 服务 - 业务能力层
//!
//! 只负责"调用 LLM"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;

/// LLM 能力
///
/// 归类器和结构化提取只依赖这个接口，测试中可以替换为脚本化的实现
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// 发送一条用户消息（可附带系统消息），返回回复文本
    async fn complete(&self, user_message: &str, system_message: Option<&str>) -> Result<String>;
}

/// LLM 服务
///
/// 职责：
/// - 调用兼容 OpenAI 的 Chat Completions 接口
/// - 限制生成参数（temperature / max_tokens）
/// - 不关心题目、批次和流程顺序
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
        }
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（去掉首尾空白）
    pub async fn send_to_llm(&self, user_message: &str, system_message: Option<&str>) -> Result<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            anyhow::anyhow!("LLM API 调用失败: {}", e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("LLM 返回内容为空"))?;

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl LlmBackend for LlmService {
    async fn complete(&self, user_message: &str, system_message: Option<&str>) -> Result<String> {
        self.send_to_llm(user_message, system_message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 从环境变量创建测试用的 LlmService
    fn create_test_service() -> LlmService {
        LlmService::new(&Config::from_env())
    }

    #[test]
    fn test_service_uses_config_generation_settings() {
        let config = Config {
            llm_model_name: "test-model".to_string(),
            llm_temperature: 0.2,
            llm_max_tokens: 256,
            ..Config::default()
        };
        let service = LlmService::new(&config);
        assert_eq!(service.model_name, "test-model");
        assert_eq!(service.max_tokens, 256);
        assert!((service.temperature - 0.2).abs() < f32::EPSILON);
    }

    /// 测试通用 LLM 调用（需要 LLM_API_KEY）
    #[tokio::test]
    #[ignore]
    async fn test_send_to_llm_simple() {
        let _ = tracing_subscriber::fmt::try_init();

        let service = create_test_service();
        let result = service
            .complete("Reply with the single word: ok", Some("You are a terse assistant."))
            .await;

        match result {
            Ok(response) => {
                println!("✅ 通用 LLM 调用成功: {}", response);
                assert!(!response.is_empty());
            }
            Err(e) => panic!("测试失败: {}", e),
        }
    }
}
