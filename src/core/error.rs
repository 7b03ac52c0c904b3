//! Agent 错误类型
//!
//! 可恢复失败的统一出口：provider 失败、JSON 解析失败、工具缺失、参数非法。
//! 各层就地捕获并降级为结构化响应，任何变体都不会穿透到编排器之外。

use thiserror::Error;

use crate::llm::LlmError;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidToolArguments(String),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}
