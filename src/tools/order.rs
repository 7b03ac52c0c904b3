//! 订单工具
//!
//! fetch_order_details / check_delivery_status / modify_order / cancel_order。
//! 修改与取消仅对未发货（PENDING/CONFIRMED）订单生效。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::tools::store::{DemoStore, OrderStatus};
use crate::tools::{Tool, ToolResult};

fn order_number_arg(args: &Value) -> Option<&str> {
    args.get("order_number").and_then(|v| v.as_str())
}

/// 按订单号取完整订单信息
pub struct FetchOrderDetailsTool {
    store: Arc<DemoStore>,
}

impl FetchOrderDetailsTool {
    pub fn new(store: Arc<DemoStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for FetchOrderDetailsTool {
    fn name(&self) -> &str {
        "fetch_order_details"
    }

    fn description(&self) -> &str {
        "Fetches complete order details by order number"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "order_number": { "type": "string", "description": "Order number" }
            },
            "required": ["order_number"]
        })
    }

    async fn execute(&self, args: &Value) -> ToolResult {
        let Some(number) = order_number_arg(args) else {
            return ToolResult::fail("order_number is required");
        };
        match self.store.order(number) {
            Some(order) => ToolResult::ok(json!({
                "order_number": order.order_number,
                "status": order.status,
                "items": order.items,
                "total_amount": order.total_amount,
                "tracking_number": order.tracking_number,
            })),
            None => ToolResult::fail(format!("Order {number} not found")),
        }
    }
}

/// 查询配送状态与追踪号
pub struct CheckDeliveryStatusTool {
    store: Arc<DemoStore>,
}

impl CheckDeliveryStatusTool {
    pub fn new(store: Arc<DemoStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for CheckDeliveryStatusTool {
    fn name(&self) -> &str {
        "check_delivery_status"
    }

    fn description(&self) -> &str {
        "Checks delivery status and tracking"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "order_number": { "type": "string" }
            },
            "required": ["order_number"]
        })
    }

    async fn execute(&self, args: &Value) -> ToolResult {
        let Some(number) = order_number_arg(args) else {
            return ToolResult::fail("order_number is required");
        };
        match self.store.order(number) {
            Some(order) => ToolResult::ok(json!({
                "status": order.status,
                "tracking_number": order.tracking_number,
                "estimated_delivery": order.estimated_delivery,
            })),
            None => ToolResult::fail("Order not found"),
        }
    }
}

/// 修改未发货订单（当前支持更新收货地址）
pub struct ModifyOrderTool {
    store: Arc<DemoStore>,
}

impl ModifyOrderTool {
    pub fn new(store: Arc<DemoStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ModifyOrderTool {
    fn name(&self) -> &str {
        "modify_order"
    }

    fn description(&self) -> &str {
        "Modifies order (if not shipped)"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "order_number": { "type": "string" },
                "modifications": { "type": "object" }
            },
            "required": ["order_number", "modifications"]
        })
    }

    async fn execute(&self, args: &Value) -> ToolResult {
        let Some(number) = order_number_arg(args) else {
            return ToolResult::fail("order_number is required");
        };
        let Some(modifications) = args.get("modifications").filter(|m| m.is_object()) else {
            return ToolResult::fail("modifications object is required");
        };

        let outcome = self.store.with_order_mut(number, |order| {
            if !order.status.is_mutable() {
                return Err(format!(
                    "Order {} can no longer be modified (status: {:?})",
                    order.order_number, order.status
                ));
            }
            if let Some(address) = modifications.get("shipping_address") {
                order.shipping_address = address.clone();
            }
            Ok(())
        });

        match outcome {
            Some(Ok(())) => ToolResult::ok(json!({ "message": "Order modified" })),
            Some(Err(reason)) => ToolResult::fail(reason),
            None => ToolResult::fail(format!("Order {number} not found")),
        }
    }
}

/// 取消未发货订单
pub struct CancelOrderTool {
    store: Arc<DemoStore>,
}

impl CancelOrderTool {
    pub fn new(store: Arc<DemoStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for CancelOrderTool {
    fn name(&self) -> &str {
        "cancel_order"
    }

    fn description(&self) -> &str {
        "Cancels order (if not shipped)"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "order_number": { "type": "string" },
                "reason": { "type": "string" }
            },
            "required": ["order_number"]
        })
    }

    async fn execute(&self, args: &Value) -> ToolResult {
        let Some(number) = order_number_arg(args) else {
            return ToolResult::fail("order_number is required");
        };

        let outcome = self.store.with_order_mut(number, |order| {
            if !order.status.is_mutable() {
                return Err(format!(
                    "Order {} can no longer be cancelled (status: {:?})",
                    order.order_number, order.status
                ));
            }
            order.status = OrderStatus::Cancelled;
            order.tracking_number = None;
            order.estimated_delivery = None;
            Ok(())
        });

        match outcome {
            Some(Ok(())) => ToolResult::ok(json!({ "message": "Order cancelled" })),
            Some(Err(reason)) => ToolResult::fail(reason),
            None => ToolResult::fail(format!("Order {number} not found")),
        }
    }
}
