//! 记忆层：对话消息模型与短期记忆

pub mod conversation;

pub use conversation::{tail, ConversationMemory, Message, Role, ToolCallRequest};
