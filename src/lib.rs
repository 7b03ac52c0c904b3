//! Deskbee - 多智能体客服系统核心
//!
//! 一条用户消息先经路由分类器选定专家（support / order / billing），
//! 专家按「对话 → 工具调用 → 再对话」协议产出最终回复，编排器保证任何
//! 失败路径都降级为结构化响应。
//!
//! 模块划分：
//! - **agents**: 专家 Agent、路由分类器与编排器
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / Mock）
//! - **memory**: 对话消息模型与短期记忆
//! - **observability**: tracing 初始化
//! - **tools**: 工具契约、注册表与客服领域工具

pub mod agents;
pub mod config;
pub mod core;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod tools;
