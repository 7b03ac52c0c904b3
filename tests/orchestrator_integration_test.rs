//! 编排器集成测试：脚本化 Mock 客户端 + 种子数据源，跑通「分类 → 分派 → 工具 → 收尾」全链路

use std::sync::Arc;

use deskbee::agents::{build_orchestrator, ChatSettings};
use deskbee::llm::{ChatOutcome, ErrorChatClient, MockChatClient};
use deskbee::memory::{Message, Role, ToolCallRequest};
use deskbee::tools::DemoStore;

fn settings() -> ChatSettings {
    ChatSettings {
        temperature: 0.7,
        max_tokens: 1000,
    }
}

#[tokio::test]
async fn test_order_query_end_to_end() {
    // 脚本按出队顺序对应：路由分类 → 订单专家首轮 → 订单专家收尾轮
    let llm = Arc::new(MockChatClient::scripted(vec![
        ChatOutcome::Text(
            r#"{"agent":"order","confidence":0.95,"reasoning":"order status inquiry"}"#.to_string(),
        ),
        ChatOutcome::ToolCalls(vec![ToolCallRequest {
            id: "call_1".to_string(),
            name: "fetch_order_details".to_string(),
            arguments: r#"{"order_number":"ORD-2024-002"}"#.to_string(),
        }]),
        ChatOutcome::Text("Your order ORD-2024-002 is in transit.".to_string()),
    ]));
    let store = Arc::new(DemoStore::seeded());
    let orchestrator = build_orchestrator(llm.clone(), store, settings());

    let response = orchestrator
        .process_message("Where is my order ORD-2024-002?", &[])
        .await;

    assert_eq!(response.response.agent, "order");
    assert_eq!(
        response.response.content,
        "Your order ORD-2024-002 is in transit."
    );
    assert_eq!(response.routing.selected_agent, "order");
    assert_eq!(response.routing.confidence, 0.95);

    let calls = response.response.tool_calls.expect("tool calls recorded");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].tool, "fetch_order_details");
    assert_eq!(calls[0].arguments["order_number"], "ORD-2024-002");

    // 收尾轮请求里必须带有与调用 id 对应的 tool 结果，内容来自种子数据
    let requests = llm.requests();
    assert_eq!(requests.len(), 3);
    let finalize = &requests[2].messages;
    let tool_msg = finalize
        .iter()
        .find(|m| m.role == Role::Tool)
        .expect("tool message present");
    assert_eq!(tool_msg.tool_call_id.as_deref(), Some("call_1"));
    let content = tool_msg.content.as_deref().unwrap();
    assert!(content.contains(r#""success":true"#));
    assert!(content.contains("TRK987654321"));
}

#[tokio::test]
async fn test_billing_route_with_history() {
    let llm = Arc::new(MockChatClient::scripted(vec![
        ChatOutcome::Text(
            r#"```json
{"agent":"billing","confidence":0.88,"reasoning":"refund request"}
```"#
                .to_string(),
        ),
        ChatOutcome::Text("Your refund was already processed.".to_string()),
    ]));
    let store = Arc::new(DemoStore::seeded());
    let orchestrator = build_orchestrator(llm.clone(), store, settings());

    let history = vec![
        Message::user("I bought a phone last week"),
        Message::assistant("Thanks, how can I help with it?"),
    ];
    let response = orchestrator
        .process_message("I want a refund for INV-2024-004", &history)
        .await;

    assert_eq!(response.response.agent, "billing");
    assert_eq!(response.routing.selected_agent, "billing");
    assert!(response.response.error.is_none());

    // 分类请求应携带历史消息
    let route_request = &llm.requests()[0];
    assert!(route_request
        .messages
        .iter()
        .any(|m| m.content.as_deref() == Some("I bought a phone last week")));
}

#[tokio::test]
async fn test_provider_outage_still_yields_response() {
    let store = Arc::new(DemoStore::seeded());
    let orchestrator = build_orchestrator(Arc::new(ErrorChatClient), store, settings());

    let response = orchestrator.process_message("anything", &[]).await;

    assert!(!response.response.content.is_empty());
    assert!(response.response.error.is_some());
    assert_eq!(response.routing.selected_agent, "support");
    assert!(response.routing.reasoning.contains("Routing error"));
}

#[tokio::test]
async fn test_unregistered_route_falls_back_to_support() {
    let llm = Arc::new(MockChatClient::scripted(vec![
        ChatOutcome::Text(r#"{"agent":"sales","confidence":0.6,"reasoning":"??"}"#.to_string()),
        ChatOutcome::Text("Let me help with that.".to_string()),
    ]));
    let store = Arc::new(DemoStore::seeded());
    let orchestrator = build_orchestrator(llm, store, settings());

    let response = orchestrator.process_message("I want to buy in bulk", &[]).await;

    assert_eq!(response.response.agent, "support");
    assert_eq!(response.routing.selected_agent, "sales");
}
