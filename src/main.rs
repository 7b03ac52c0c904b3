//! Deskbee 演示入口
//!
//! `deskbee --demo` 跑一组预置查询；默认进入 stdin REPL，维护单会话滚动历史。
//! 无 API Key 时自动落到 Mock 客户端，便于本地跑通流程。

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use deskbee::agents::{build_orchestrator, ChatSettings, OrchestratorResponse};
use deskbee::config::load_config;
use deskbee::llm::create_chat_client_from_config;
use deskbee::memory::{ConversationMemory, Message};
use deskbee::tools::DemoStore;

const DEMO_QUERIES: &[&str] = &[
    "Where is my order ORD-2024-002?",
    "I want to check invoice INV-2024-004",
    "How do I reset my password?",
    "Cancel order ORD-2024-003",
];

/// REPL 的短期记忆上限（条数，非轮数）
const REPL_HISTORY_MESSAGES: usize = 20;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    deskbee::observability::init();

    let cfg = load_config(None).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        deskbee::config::AppConfig::default()
    });
    let llm = create_chat_client_from_config(&cfg);
    let store = Arc::new(DemoStore::seeded());
    let settings = ChatSettings {
        temperature: cfg.llm.temperature,
        max_tokens: cfg.llm.max_tokens,
    };
    let orchestrator = build_orchestrator(llm, store.clone(), settings);

    if std::env::args().any(|a| a == "--demo") {
        for (i, query) in DEMO_QUERIES.iter().enumerate() {
            println!("\n{}. Query: {query}", i + 1);
            println!("{}", "-".repeat(50));
            let response = orchestrator.process_message(query, &[]).await;
            print_response(&response);
        }
        return Ok(());
    }

    let conversation_id = uuid::Uuid::new_v4().to_string();
    let mut memory = ConversationMemory::new(REPL_HISTORY_MESSAGES);

    println!("deskbee ready. Type a message, /quit to exit.");
    print!("> ");
    io::stdout().flush()?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            print!("> ");
            io::stdout().flush()?;
            continue;
        }
        if input == "/quit" {
            break;
        }

        let response = orchestrator.process_message(input, memory.messages()).await;
        print_response(&response);

        store.append_message(&conversation_id, "user", input);
        store.append_message(&conversation_id, "assistant", &response.response.content);
        memory.push(Message::user(input));
        memory.push(Message::assistant(response.response.content.as_str()));

        print!("> ");
        io::stdout().flush()?;
    }

    Ok(())
}

fn print_response(response: &OrchestratorResponse) {
    println!(
        "[{} | confidence {:.2}] {}",
        response.routing.selected_agent, response.routing.confidence, response.response.content
    );
    if let Some(calls) = &response.response.tool_calls {
        if !calls.is_empty() {
            let names: Vec<&str> = calls.iter().map(|c| c.tool.as_str()).collect();
            println!("(tools used: {})", names.join(", "));
        }
    }
}
