//! 专家 Agent：对话 / 工具调用 / 再对话协议
//!
//! process 的状态机：组装消息（system + 最近历史 + user）→ 首次完成（带工具描述）→
//! 无工具调用则直接返回；否则按请求顺序逐个分发工具（缺失 / 参数非法合成错误结果，
//! 不中断批次），把结果以 tool 消息追加后做第二次完成收尾。
//! 任何 provider 失败都在 process 顶层折叠为带 error 字段的道歉响应。

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::AgentError;
use crate::llm::{ChatClient, ChatOutcome, ChatRequest};
use crate::memory::{tail, Message, ToolCallRequest};
use crate::tools::{ToolRegistry, ToolResult};

/// 组装上下文时保留的最近历史条数（更旧的直接丢弃，不做摘要）
const MAX_HISTORY_MESSAGES: usize = 10;

/// 实际执行的一次工具调用（参数已解码）
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub tool: String,
    pub arguments: Value,
}

/// Agent 对单条消息的最终输出
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentResponse {
    pub content: String,
    pub agent: String,
    pub tool_calls: Option<Vec<ToolInvocation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 采样参数，部署期固定（见 config [llm]），不随单次调用变化
#[derive(Clone, Copy, Debug)]
pub struct ChatSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// 专家 Agent：固定 system prompt 与固定工具集，与其他组件共享同一个 ChatClient
pub struct SpecialistAgent {
    name: String,
    description: String,
    system_prompt: String,
    tools: ToolRegistry,
    llm: Arc<dyn ChatClient>,
    settings: ChatSettings,
}

impl SpecialistAgent {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        system_prompt: impl Into<String>,
        tools: ToolRegistry,
        llm: Arc<dyn ChatClient>,
        settings: ChatSettings,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            system_prompt: system_prompt.into(),
            tools,
            llm,
            settings,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.tool_names()
    }

    /// 处理单条用户消息；绝不返回 Err，provider 失败降级为道歉响应
    pub async fn process(&self, message: &str, history: &[Message]) -> AgentResponse {
        match self.run(message, history).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(agent = %self.name, error = %e, "agent process failed");
                AgentResponse {
                    content: format!("I apologize, but I encountered an error: {e}"),
                    agent: self.name.clone(),
                    tool_calls: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn run(&self, message: &str, history: &[Message]) -> Result<AgentResponse, AgentError> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(self.system_prompt.as_str()));
        messages.extend_from_slice(tail(history, MAX_HISTORY_MESSAGES));
        messages.push(Message::user(message));

        let first = self
            .llm
            .chat(ChatRequest {
                messages: messages.clone(),
                tools: self.tools.specs(),
                temperature: self.settings.temperature,
                max_tokens: self.settings.max_tokens,
            })
            .await?;

        let calls = match first {
            ChatOutcome::Text(content) => {
                return Ok(AgentResponse {
                    content,
                    agent: self.name.clone(),
                    tool_calls: None,
                    error: None,
                });
            }
            ChatOutcome::ToolCalls(calls) => calls,
        };

        // 调用声明必须先入列，第二次完成才能把 tool 结果与调用 id 对应起来
        messages.push(Message::assistant_tool_calls(calls.clone()));

        let mut invocations = Vec::with_capacity(calls.len());
        for call in &calls {
            let (content, invocation) = self.dispatch(call).await;
            messages.push(Message::tool(call.id.as_str(), content));
            if let Some(invocation) = invocation {
                invocations.push(invocation);
            }
        }

        // 收尾轮不再提供工具描述：本设计每回合只允许一轮工具调用
        let second = self
            .llm
            .chat(ChatRequest {
                messages,
                tools: Vec::new(),
                temperature: self.settings.temperature,
                max_tokens: self.settings.max_tokens,
            })
            .await?;

        let content = match second {
            ChatOutcome::Text(content) => content,
            ChatOutcome::ToolCalls(_) => String::new(),
        };

        Ok(AgentResponse {
            content,
            agent: self.name.clone(),
            tool_calls: Some(invocations),
            error: None,
        })
    }

    /// 单次调用分发：解码参数 → 查找工具 → 执行。
    /// 失败路径各自合成 tool 消息内容，返回 None 表示未真正执行。
    async fn dispatch(&self, call: &ToolCallRequest) -> (String, Option<ToolInvocation>) {
        let args = match serde_json::from_str::<Value>(&call.arguments) {
            Ok(value) if value.is_object() => value,
            _ => {
                let error = AgentError::InvalidToolArguments(call.name.clone());
                tracing::warn!(call_id = %call.id, "{error}");
                return (format!("Error: {error}"), None);
            }
        };

        let Some(tool) = self.tools.get(&call.name) else {
            let error = AgentError::ToolNotFound(call.name.clone());
            tracing::warn!(call_id = %call.id, "{error}");
            return (format!("Error: {error}"), None);
        };

        let start = Instant::now();
        let result = tool.execute(&args).await;
        let audit = serde_json::json!({
            "event": "tool_audit",
            "agent": self.name,
            "tool": call.name,
            "ok": result.success,
            "duration_ms": start.elapsed().as_millis() as u64,
        });
        tracing::info!(audit = %audit.to_string(), "tool");

        (
            serialize_result(&result),
            Some(ToolInvocation {
                tool: call.name.clone(),
                arguments: args,
            }),
        )
    }
}

fn serialize_result(result: &ToolResult) -> String {
    serde_json::to_string(result).unwrap_or_else(|_| {
        r#"{"success":false,"data":null,"error":"result serialization failed"}"#.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ErrorChatClient, MockChatClient};
    use crate::memory::Role;
    use crate::tools::Tool;
    use async_trait::async_trait;
    use serde_json::json;

    struct StubOrderTool;

    #[async_trait]
    impl Tool for StubOrderTool {
        fn name(&self) -> &str {
            "fetch_order_details"
        }

        fn description(&self) -> &str {
            "Fetches order details"
        }

        async fn execute(&self, _args: &Value) -> ToolResult {
            ToolResult::ok(json!({ "status": "shipped" }))
        }
    }

    fn agent_with(llm: Arc<MockChatClient>, tools: ToolRegistry) -> SpecialistAgent {
        SpecialistAgent::new(
            "order",
            "Handles order queries",
            "You are an order specialist.",
            tools,
            llm,
            ChatSettings {
                temperature: 0.7,
                max_tokens: 1000,
            },
        )
    }

    fn call(id: &str, name: &str, arguments: &str) -> ToolCallRequest {
        ToolCallRequest {
            id: id.to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }

    #[tokio::test]
    async fn test_direct_reply_skips_second_completion() {
        let llm = Arc::new(MockChatClient::scripted(vec![ChatOutcome::Text(
            "Hello".to_string(),
        )]));
        let agent = agent_with(llm.clone(), ToolRegistry::new());

        let response = agent.process("hi", &[]).await;

        assert_eq!(response.content, "Hello");
        assert_eq!(response.agent, "order");
        assert!(response.tool_calls.is_none());
        assert!(response.error.is_none());
        assert_eq!(llm.request_count(), 1);
        assert!(llm.requests()[0].tools.is_empty());
    }

    #[tokio::test]
    async fn test_tool_round_trip() {
        let llm = Arc::new(MockChatClient::scripted(vec![
            ChatOutcome::ToolCalls(vec![call(
                "c1",
                "fetch_order_details",
                r#"{"order_number":"ORD-1"}"#,
            )]),
            ChatOutcome::Text("Your order has shipped.".to_string()),
        ]));
        let mut tools = ToolRegistry::new();
        tools.register(StubOrderTool);
        let agent = agent_with(llm.clone(), tools);

        let response = agent.process("where is ORD-1?", &[]).await;

        assert_eq!(response.content, "Your order has shipped.");
        assert_eq!(
            response.tool_calls,
            Some(vec![ToolInvocation {
                tool: "fetch_order_details".to_string(),
                arguments: json!({ "order_number": "ORD-1" }),
            }])
        );

        let requests = llm.requests();
        assert_eq!(requests.len(), 2);
        // 首轮请求携带工具描述，收尾轮不带
        assert_eq!(requests[0].tools.len(), 1);
        assert!(requests[1].tools.is_empty());

        let second = &requests[1].messages;
        let declaration = second
            .iter()
            .find(|m| m.role == Role::Assistant && !m.tool_calls.is_empty())
            .expect("assistant declaration present");
        assert_eq!(declaration.tool_calls[0].id, "c1");

        let tool_msg = second
            .iter()
            .find(|m| m.role == Role::Tool)
            .expect("tool message present");
        assert_eq!(tool_msg.tool_call_id.as_deref(), Some("c1"));
        assert_eq!(
            tool_msg.content.as_deref(),
            Some(r#"{"success":true,"data":{"status":"shipped"},"error":null}"#)
        );
    }

    #[tokio::test]
    async fn test_unknown_tool_does_not_abort_batch() {
        let llm = Arc::new(MockChatClient::scripted(vec![
            ChatOutcome::ToolCalls(vec![
                call("c1", "nonexistent_tool", r#"{"x":1}"#),
                call("c2", "fetch_order_details", r#"{"order_number":"ORD-1"}"#),
            ]),
            ChatOutcome::Text("Done.".to_string()),
        ]));
        let mut tools = ToolRegistry::new();
        tools.register(StubOrderTool);
        let agent = agent_with(llm.clone(), tools);

        let response = agent.process("do things", &[]).await;

        assert_eq!(response.content, "Done.");
        // 只有真正执行的调用进入 tool_calls
        assert_eq!(response.tool_calls.as_ref().unwrap().len(), 1);

        let second = &llm.requests()[1].messages;
        let tool_messages: Vec<&Message> =
            second.iter().filter(|m| m.role == Role::Tool).collect();
        assert_eq!(tool_messages.len(), 2);
        assert_eq!(tool_messages[0].tool_call_id.as_deref(), Some("c1"));
        assert!(tool_messages[0]
            .content
            .as_deref()
            .unwrap()
            .contains("not found"));
        assert_eq!(tool_messages[1].tool_call_id.as_deref(), Some("c2"));
    }

    #[tokio::test]
    async fn test_invalid_arguments_recovered() {
        let llm = Arc::new(MockChatClient::scripted(vec![
            ChatOutcome::ToolCalls(vec![call("c1", "fetch_order_details", "not json")]),
            ChatOutcome::Text("Sorry, that failed.".to_string()),
        ]));
        let mut tools = ToolRegistry::new();
        tools.register(StubOrderTool);
        let agent = agent_with(llm.clone(), tools);

        let response = agent.process("broken call", &[]).await;

        assert_eq!(response.content, "Sorry, that failed.");
        assert_eq!(response.tool_calls, Some(vec![]));
        let second = &llm.requests()[1].messages;
        let tool_msg = second.iter().find(|m| m.role == Role::Tool).unwrap();
        assert!(tool_msg
            .content
            .as_deref()
            .unwrap()
            .contains("Invalid tool arguments"));
    }

    #[tokio::test]
    async fn test_provider_failure_becomes_apology() {
        let agent = SpecialistAgent::new(
            "order",
            "Handles order queries",
            "You are an order specialist.",
            ToolRegistry::new(),
            Arc::new(ErrorChatClient),
            ChatSettings {
                temperature: 0.7,
                max_tokens: 1000,
            },
        );

        let response = agent.process("hi", &[]).await;

        assert!(response.content.starts_with("I apologize"));
        assert!(response.error.is_some());
        assert!(response.tool_calls.is_none());
    }

    #[tokio::test]
    async fn test_history_capped_at_ten() {
        let llm = Arc::new(MockChatClient::scripted(vec![ChatOutcome::Text(
            "ok".to_string(),
        )]));
        let agent = agent_with(llm.clone(), ToolRegistry::new());

        let history: Vec<Message> = (0..15).map(|i| Message::user(format!("m{i}"))).collect();
        agent.process("latest", &history).await;

        let composed = &llm.requests()[0].messages;
        // system + 10 条历史 + 新 user 消息
        assert_eq!(composed.len(), 12);
        assert_eq!(composed[0].role, Role::System);
        assert_eq!(composed[1].content.as_deref(), Some("m5"));
        assert_eq!(composed[11].content.as_deref(), Some("latest"));
    }
}
