//! 路由分类器
//!
//! 无工具的退化 Agent：让 provider 返回一个 JSON 分类对象并做防御性解析。
//! 任何失败（调用异常、非 JSON 文本、字段缺失）都降级为 support 默认路由，
//! 分类绝不阻塞流水线。

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::AgentError;
use crate::llm::{ChatClient, ChatOutcome, ChatRequest};
use crate::memory::{tail, Message};

/// 路由上下文保留的最近历史条数
const MAX_HISTORY_MESSAGES: usize = 5;
/// 分类用低温度 + 小输出上限，偏向确定性
const ROUTER_TEMPERATURE: f32 = 0.3;
const ROUTER_MAX_TOKENS: u32 = 200;

/// 分类失败或命中未注册专家时的默认去向
pub const DEFAULT_AGENT: &str = "support";

const ROUTER_SYSTEM_PROMPT: &str = r#"You are a routing agent for a customer support system.

Your job is to analyze the customer's query and determine which specialist agent should handle it:

1. **SUPPORT Agent** - For:
   - General questions and FAQs
   - Account issues
   - How-to questions
   - Policy questions
   - Anything that doesn't fit other categories

2. **ORDER Agent** - For:
   - Order status inquiries
   - Tracking information
   - Order modifications
   - Order cancellations
   - Shipping questions
   - Delivery estimates

3. **BILLING Agent** - For:
   - Payment issues
   - Invoice inquiries
   - Refund requests
   - Subscription questions
   - Pricing questions

Respond with ONLY a JSON object in this exact format:
{
    "agent": "support" | "order" | "billing",
    "confidence": 0.0-1.0,
    "reasoning": "brief explanation"
}

Do not include any other text or markdown formatting."#;

/// 分类结果。confidence 仅作参考与遥测，不参与分派判断
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub agent: String,
    pub confidence: f64,
    pub reasoning: String,
}

/// 解析中间形：三个字段都允许缺省
#[derive(Deserialize)]
struct RawDecision {
    agent: Option<String>,
    confidence: Option<f64>,
    reasoning: Option<String>,
}

/// 路由分类器：持有共享的 ChatClient，无工具集
pub struct RouterClassifier {
    llm: Arc<dyn ChatClient>,
}

impl RouterClassifier {
    pub fn new(llm: Arc<dyn ChatClient>) -> Self {
        Self { llm }
    }

    /// 分类一条消息；绝不失败，异常时回落到 support 并带诊断说明
    pub async fn route(&self, message: &str, history: &[Message]) -> RoutingDecision {
        match self.classify(message, history).await {
            Ok(decision) => decision,
            Err(e) => RoutingDecision {
                agent: DEFAULT_AGENT.to_string(),
                confidence: 0.5,
                reasoning: format!("Routing error, defaulting to support: {e}"),
            },
        }
    }

    async fn classify(
        &self,
        message: &str,
        history: &[Message],
    ) -> Result<RoutingDecision, AgentError> {
        let mut messages = vec![Message::system(ROUTER_SYSTEM_PROMPT)];
        messages.extend_from_slice(tail(history, MAX_HISTORY_MESSAGES));
        messages.push(Message::user(message));

        let outcome = self
            .llm
            .chat(ChatRequest {
                messages,
                tools: Vec::new(),
                temperature: ROUTER_TEMPERATURE,
                max_tokens: ROUTER_MAX_TOKENS,
            })
            .await?;

        let ChatOutcome::Text(reply) = outcome else {
            return Err(AgentError::JsonParse(
                "classifier replied with tool calls".to_string(),
            ));
        };
        parse_routing_reply(&reply)
    }
}

/// 从模型回复中提取 JSON 并解析为 RoutingDecision，缺省字段按约定填充。
/// 容忍 ```json 与 ``` 围栏，以及围栏外的散文。
pub fn parse_routing_reply(reply: &str) -> Result<RoutingDecision, AgentError> {
    let json_str = extract_json(reply)
        .ok_or_else(|| AgentError::JsonParse(format!("no JSON object in reply: {reply}")))?;
    let raw: RawDecision = serde_json::from_str(json_str)
        .map_err(|e| AgentError::JsonParse(format!("{e}: {json_str}")))?;
    Ok(RoutingDecision {
        agent: raw.agent.unwrap_or_else(|| DEFAULT_AGENT.to_string()),
        confidence: raw.confidence.unwrap_or(0.5),
        reasoning: raw.reasoning.unwrap_or_default(),
    })
}

/// 提取回复中的 JSON 块（```json ... ``` / ``` ... ``` / 裸对象）
fn extract_json(reply: &str) -> Option<&str> {
    let trimmed = reply.trim();
    let body = if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + 7..];
        rest.find("```").map(|end| &rest[..end]).unwrap_or(rest)
    } else if let Some(start) = trimmed.find("```") {
        let rest = &trimmed[start + 3..];
        rest.find("```").map(|end| &rest[..end]).unwrap_or(rest)
    } else {
        trimmed
    };
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&body[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ErrorChatClient, MockChatClient};

    #[test]
    fn test_parse_fenced_json() {
        let decision = parse_routing_reply(
            "```json\n{\"agent\":\"order\",\"confidence\":0.9,\"reasoning\":\"order query\"}\n```",
        )
        .unwrap();
        assert_eq!(decision.agent, "order");
        assert_eq!(decision.confidence, 0.9);
        assert_eq!(decision.reasoning, "order query");
    }

    #[test]
    fn test_parse_unlabeled_fence() {
        let decision =
            parse_routing_reply("```\n{\"agent\":\"billing\",\"confidence\":0.8}\n```").unwrap();
        assert_eq!(decision.agent, "billing");
        assert_eq!(decision.reasoning, "");
    }

    #[test]
    fn test_parse_bare_json_with_prose() {
        let decision =
            parse_routing_reply("Sure! Here is the result: {\"agent\":\"support\"} hope it helps")
                .unwrap();
        assert_eq!(decision.agent, "support");
        assert_eq!(decision.confidence, 0.5);
    }

    #[test]
    fn test_parse_defaults_for_missing_fields() {
        let decision = parse_routing_reply("{}").unwrap();
        assert_eq!(decision.agent, "support");
        assert_eq!(decision.confidence, 0.5);
        assert_eq!(decision.reasoning, "");
    }

    #[test]
    fn test_parse_rejects_plain_text() {
        assert!(parse_routing_reply("not json").is_err());
    }

    #[tokio::test]
    async fn test_route_falls_back_on_plain_text() {
        let router = RouterClassifier::new(Arc::new(MockChatClient::fixed("not json")));
        let decision = router.route("hello", &[]).await;
        assert_eq!(decision.agent, "support");
        assert_eq!(decision.confidence, 0.5);
        assert!(!decision.reasoning.is_empty());
    }

    #[tokio::test]
    async fn test_route_falls_back_on_provider_error() {
        let router = RouterClassifier::new(Arc::new(ErrorChatClient));
        let decision = router.route("hello", &[]).await;
        assert_eq!(decision.agent, "support");
        assert!(decision.reasoning.contains("Routing error"));
    }

    #[tokio::test]
    async fn test_route_is_deterministic_for_same_input() {
        let reply = "{\"agent\":\"order\",\"confidence\":0.9,\"reasoning\":\"order query\"}";
        let router = RouterClassifier::new(Arc::new(MockChatClient::fixed(reply)));
        let history = vec![Message::user("earlier"), Message::assistant("noted")];
        let first = router.route("where is my order?", &history).await;
        let second = router.route("where is my order?", &history).await;
        assert_eq!(first, second);
    }
}
