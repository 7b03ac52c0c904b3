//! Mock LLM 客户端（用于测试，无需 API）
//!
//! 支持三种行为：回显最后一条 user 消息（默认）、固定回复、按脚本顺序出队回复。
//! 每次请求都会被记录，便于断言消息构造与调用次数。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{ChatClient, ChatOutcome, ChatRequest, LlmError};
use crate::memory::Role;

/// Mock 客户端：脚本耗尽（或未设脚本）时回落到固定回复或回显
#[derive(Default)]
pub struct MockChatClient {
    script: Mutex<VecDeque<ChatOutcome>>,
    fixed: Option<String>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockChatClient {
    /// 回显最后一条 user 消息
    pub fn new() -> Self {
        Self::default()
    }

    /// 每次都返回同一条文本回复
    pub fn fixed(reply: impl Into<String>) -> Self {
        Self {
            fixed: Some(reply.into()),
            ..Self::default()
        }
    }

    /// 按脚本顺序出队回复
    pub fn scripted(outcomes: Vec<ChatOutcome>) -> Self {
        Self {
            script: Mutex::new(outcomes.into()),
            ..Self::default()
        }
    }

    /// 已收到的请求快照（按到达顺序）
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatOutcome, LlmError> {
        let last_user = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .and_then(|m| m.content.clone())
            .unwrap_or_else(|| "(no input)".to_string());

        self.requests.lock().unwrap().push(request);

        if let Some(outcome) = self.script.lock().unwrap().pop_front() {
            return Ok(outcome);
        }
        if let Some(fixed) = &self.fixed {
            return Ok(ChatOutcome::Text(fixed.clone()));
        }
        Ok(ChatOutcome::Text(format!("Echo from Mock: {last_user}")))
    }
}

/// 始终失败的客户端，用于验证各层的降级路径
pub struct ErrorChatClient;

#[async_trait]
impl ChatClient for ErrorChatClient {
    async fn chat(&self, _request: ChatRequest) -> Result<ChatOutcome, LlmError> {
        Err(LlmError::Request("connection refused".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Message;

    fn request(text: &str) -> ChatRequest {
        ChatRequest {
            messages: vec![Message::user(text)],
            tools: Vec::new(),
            temperature: 0.0,
            max_tokens: 16,
        }
    }

    #[tokio::test]
    async fn test_echo_fallback() {
        let mock = MockChatClient::new();
        let outcome = mock.chat(request("hi")).await.unwrap();
        match outcome {
            ChatOutcome::Text(t) => assert!(t.contains("hi")),
            ChatOutcome::ToolCalls(_) => panic!("expected text"),
        }
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_scripted_order() {
        let mock = MockChatClient::scripted(vec![
            ChatOutcome::Text("first".to_string()),
            ChatOutcome::Text("second".to_string()),
        ]);
        let ChatOutcome::Text(a) = mock.chat(request("x")).await.unwrap() else {
            panic!("expected text");
        };
        let ChatOutcome::Text(b) = mock.chat(request("y")).await.unwrap() else {
            panic!("expected text");
        };
        assert_eq!((a.as_str(), b.as_str()), ("first", "second"));
    }
}
