//! 工具箱：工具契约、注册表与三类客服领域工具

pub mod billing;
pub mod order;
pub mod registry;
pub mod store;
pub mod support;

pub use billing::{CheckRefundStatusTool, GetInvoiceDetailsTool, ProcessRefundTool};
pub use order::{CancelOrderTool, CheckDeliveryStatusTool, FetchOrderDetailsTool, ModifyOrderTool};
pub use registry::{Tool, ToolRegistry, ToolResult};
pub use store::{DemoStore, OrderStatus, PaymentStatus};
pub use support::{QueryConversationHistoryTool, SearchFaqTool};
