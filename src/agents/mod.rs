//! Agent 层：专家、路由分类器与编排器

pub mod orchestrator;
pub mod presets;
pub mod router;
pub mod specialist;

pub use orchestrator::{
    build_orchestrator, AgentInfo, AgentOrchestrator, OrchestratorResponse, RoutingMeta,
};
pub use presets::{billing_agent, order_agent, support_agent};
pub use router::{parse_routing_reply, RouterClassifier, RoutingDecision, DEFAULT_AGENT};
pub use specialist::{AgentResponse, ChatSettings, SpecialistAgent, ToolInvocation};
