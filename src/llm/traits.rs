//! LLM 客户端抽象
//!
//! 所有后端（OpenAI 兼容 / Mock）实现 ChatClient：chat 接收消息列表与可选工具描述，
//! 返回纯文本回复或一组按序的工具调用请求。客户端进程内构造一次，
//! 以 Arc<dyn ChatClient> 在路由器与各专家之间共享。

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::memory::{Message, ToolCallRequest};

/// LLM 调用失败（网络、鉴权、限流等都折叠为 Request）
#[derive(Error, Debug, Clone)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("completion returned no choices")]
    EmptyResponse,
}

/// 暴露给 provider 的工具描述：name / description / JSON Schema 参数。
/// 由 ToolRegistry::specs 从工具契约纯映射而来。
#[derive(Clone, Debug, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// 一次完成请求：消息列表、工具描述与部署期固定的采样参数（model 由客户端持有）
#[derive(Clone, Debug)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    pub tools: Vec<ToolSpec>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// 完成结果：纯文本回复，或一组非空的工具调用请求（二者互斥）
#[derive(Clone, Debug)]
pub enum ChatOutcome {
    Text(String),
    ToolCalls(Vec<ToolCallRequest>),
}

/// LLM 客户端 trait
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn chat(&self, request: ChatRequest) -> Result<ChatOutcome, LlmError>;

    /// 获取累计 token 使用统计：(prompt_tokens, completion_tokens, total_tokens)
    /// 默认返回 (0, 0, 0)，具体实现可覆盖
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}
