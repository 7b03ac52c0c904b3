//! Agent 编排器
//!
//! 每条消息的主流程：分类 → 按名分派给专家 → 把路由元数据附到响应上。
//! 未注册的分类结果落到 support；连默认专家都缺失时返回罐头降级响应。
//! process_message 对调用方绝不抛错。

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::llm::ChatClient;
use crate::memory::Message;
use crate::tools::DemoStore;

use super::presets::{billing_agent, order_agent, support_agent};
use super::router::{RouterClassifier, DEFAULT_AGENT};
use super::specialist::{AgentResponse, ChatSettings, SpecialistAgent};

/// 附加在响应上的路由元数据。selected_agent 记录分类器的原始输出，
/// 即便它命中了未注册的名字而实际由 support 兜底处理
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoutingMeta {
    pub selected_agent: String,
    pub confidence: f64,
    pub reasoning: String,
}

/// 编排器最终输出：专家响应 + 路由元数据
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrchestratorResponse {
    #[serde(flatten)]
    pub response: AgentResponse,
    pub routing: RoutingMeta,
}

/// 单个专家的对外说明
#[derive(Clone, Debug, Serialize)]
pub struct AgentInfo {
    pub name: String,
    pub description: String,
    pub tools: Vec<String>,
}

/// 编排器：一个路由分类器 + 按名索引的专家集合
pub struct AgentOrchestrator {
    router: RouterClassifier,
    agents: HashMap<String, Arc<SpecialistAgent>>,
}

impl AgentOrchestrator {
    pub fn new(router: RouterClassifier) -> Self {
        Self {
            router,
            agents: HashMap::new(),
        }
    }

    pub fn register(&mut self, agent: SpecialistAgent) {
        self.agents.insert(agent.name().to_string(), Arc::new(agent));
    }

    /// 处理单条用户消息；任何内部失败都折叠为降级响应，绝不向调用方抛错
    pub async fn process_message(
        &self,
        message: &str,
        history: &[Message],
    ) -> OrchestratorResponse {
        let decision = self.router.route(message, history).await;
        tracing::info!(
            agent = %decision.agent,
            confidence = decision.confidence,
            "routing decision"
        );

        let specialist = self
            .agents
            .get(&decision.agent)
            .or_else(|| self.agents.get(DEFAULT_AGENT));
        let Some(specialist) = specialist else {
            tracing::error!(agent = %decision.agent, "no specialist registered, using canned fallback");
            return Self::error_fallback();
        };

        let response = specialist.process(message, history).await;
        OrchestratorResponse {
            response,
            routing: RoutingMeta {
                selected_agent: decision.agent,
                confidence: decision.confidence,
                reasoning: decision.reasoning,
            },
        }
    }

    /// 查询一个或全部专家的信息（按名排序，输出稳定）
    pub fn agent_info(&self, name: Option<&str>) -> Vec<AgentInfo> {
        let mut infos: Vec<AgentInfo> = self
            .agents
            .values()
            .filter(|a| name.is_none() || name == Some(a.name()))
            .map(|a| AgentInfo {
                name: a.name().to_string(),
                description: a.description().to_string(),
                tools: a.tool_names(),
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    /// 最终兜底：专家集合为空（或 support 未注册且分类命中未知名字）时的罐头响应
    fn error_fallback() -> OrchestratorResponse {
        OrchestratorResponse {
            response: AgentResponse {
                content: "I apologize, but I encountered an error processing your request. \
                          How can I help you?"
                    .to_string(),
                agent: DEFAULT_AGENT.to_string(),
                tool_calls: None,
                error: Some("no specialist agent available".to_string()),
            },
            routing: RoutingMeta {
                selected_agent: DEFAULT_AGENT.to_string(),
                confidence: 0.0,
                reasoning: "Error fallback".to_string(),
            },
        }
    }
}

/// 装配完整生产编排器：路由器与三个预置专家共享同一个客户端与数据源
pub fn build_orchestrator(
    llm: Arc<dyn ChatClient>,
    store: Arc<DemoStore>,
    settings: ChatSettings,
) -> AgentOrchestrator {
    let mut orchestrator = AgentOrchestrator::new(RouterClassifier::new(llm.clone()));
    orchestrator.register(support_agent(llm.clone(), store.clone(), settings));
    orchestrator.register(order_agent(llm.clone(), store.clone(), settings));
    orchestrator.register(billing_agent(llm, store, settings));
    orchestrator
}
