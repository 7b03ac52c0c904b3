//! 通用支持工具
//!
//! search_faq 在 FAQ 库做关键词检索；query_conversation_history 取会话日志的最近片段。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::tools::store::DemoStore;
use crate::tools::{Tool, ToolResult};

/// FAQ 关键词检索
pub struct SearchFaqTool {
    store: Arc<DemoStore>,
}

impl SearchFaqTool {
    pub fn new(store: Arc<DemoStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for SearchFaqTool {
    fn name(&self) -> &str {
        "search_faq"
    }

    fn description(&self) -> &str {
        "Searches FAQ database"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string" }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: &Value) -> ToolResult {
        let Some(query) = args.get("query").and_then(|v| v.as_str()) else {
            return ToolResult::fail("query is required");
        };
        let results: Vec<Value> = self
            .store
            .search_faq(query)
            .into_iter()
            .map(|faq| json!({ "question": faq.question, "answer": faq.answer }))
            .collect();
        ToolResult::ok(json!({ "results": results }))
    }
}

/// 取会话日志的最近 limit 条消息
pub struct QueryConversationHistoryTool {
    store: Arc<DemoStore>,
}

impl QueryConversationHistoryTool {
    pub fn new(store: Arc<DemoStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for QueryConversationHistoryTool {
    fn name(&self) -> &str {
        "query_conversation_history"
    }

    fn description(&self) -> &str {
        "Retrieves previous messages from conversation"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "conversation_id": { "type": "string" },
                "limit": { "type": "integer", "default": 10 }
            },
            "required": ["conversation_id"]
        })
    }

    async fn execute(&self, args: &Value) -> ToolResult {
        let Some(conversation_id) = args.get("conversation_id").and_then(|v| v.as_str()) else {
            return ToolResult::fail("conversation_id is required");
        };
        let limit = args
            .get("limit")
            .and_then(|v| v.as_u64())
            .unwrap_or(10) as usize;
        let messages: Vec<Value> = self
            .store
            .conversation_tail(conversation_id, limit)
            .into_iter()
            .map(|(role, content)| json!({ "role": role, "content": content }))
            .collect();
        ToolResult::ok(json!({ "messages": messages }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Arc<DemoStore> {
        Arc::new(DemoStore::seeded())
    }

    #[tokio::test]
    async fn test_faq_hit() {
        let tool = SearchFaqTool::new(store());
        let result = tool.execute(&json!({ "query": "return policy" })).await;
        assert!(result.success);
        let data = result.data.unwrap();
        assert!(!data["results"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_faq_miss_is_still_success() {
        let tool = SearchFaqTool::new(store());
        let result = tool.execute(&json!({ "query": "zzzz" })).await;
        assert!(result.success);
        assert!(result.data.unwrap()["results"]
            .as_array()
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_history_limit() {
        let store = store();
        store.append_message("c7", "user", "first");
        store.append_message("c7", "assistant", "second");
        store.append_message("c7", "user", "third");
        let tool = QueryConversationHistoryTool::new(store);
        let result = tool
            .execute(&json!({ "conversation_id": "c7", "limit": 2 }))
            .await;
        assert!(result.success);
        let data = result.data.unwrap();
        let messages = data["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["content"], "second");
    }
}
