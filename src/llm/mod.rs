//! LLM 层：客户端抽象与实现（OpenAI 兼容 / Mock）

pub mod mock;
pub mod openai;
pub mod traits;

pub use mock::{ErrorChatClient, MockChatClient};
pub use openai::{OpenAiClient, TokenUsage};
pub use traits::{ChatClient, ChatOutcome, ChatRequest, LlmError, ToolSpec};

use std::sync::Arc;

use crate::config::AppConfig;

/// 根据配置与环境变量选择 LLM 后端（Groq / OpenAI 兼容端点 / Mock）
pub fn create_chat_client_from_config(cfg: &AppConfig) -> Arc<dyn ChatClient> {
    let provider = cfg.llm.provider.to_lowercase();
    let use_groq = provider == "groq" && std::env::var("GROQ_API_KEY").is_ok();
    let use_openai = std::env::var("OPENAI_API_KEY").is_ok() && provider != "groq";

    if use_groq {
        let model = cfg
            .llm
            .groq
            .model
            .clone()
            .unwrap_or_else(|| cfg.llm.model.clone());
        tracing::info!("Using Groq LLM ({})", model);
        Arc::new(OpenAiClient::new(
            Some(cfg.llm.groq.base_url.as_str()),
            &model,
            std::env::var("GROQ_API_KEY").ok().as_deref(),
        ))
    } else if use_openai {
        let model = cfg
            .llm
            .openai
            .model
            .clone()
            .unwrap_or_else(|| "gpt-4o-mini".to_string());
        let base = cfg.llm.base_url.as_deref();
        tracing::info!("Using OpenAI LLM ({})", model);
        Arc::new(OpenAiClient::new(
            base,
            &model,
            std::env::var("OPENAI_API_KEY").ok().as_deref(),
        ))
    } else {
        tracing::warn!("No API key set or provider unknown, using Mock LLM");
        Arc::new(MockChatClient::new())
    }
}
