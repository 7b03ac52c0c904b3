//! 账单工具
//!
//! get_invoice_details / check_refund_status / process_refund。
//! 退款仅对 COMPLETED 支付生效，支持部分退款，必须附原因。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::tools::store::{DemoStore, PaymentStatus};
use crate::tools::{Tool, ToolResult};

fn invoice_number_arg(args: &Value) -> Option<&str> {
    args.get("invoice_number").and_then(|v| v.as_str())
}

/// 按发票号取支付信息
pub struct GetInvoiceDetailsTool {
    store: Arc<DemoStore>,
}

impl GetInvoiceDetailsTool {
    pub fn new(store: Arc<DemoStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for GetInvoiceDetailsTool {
    fn name(&self) -> &str {
        "get_invoice_details"
    }

    fn description(&self) -> &str {
        "Fetches invoice/payment details"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "invoice_number": { "type": "string" }
            },
            "required": ["invoice_number"]
        })
    }

    async fn execute(&self, args: &Value) -> ToolResult {
        let Some(number) = invoice_number_arg(args) else {
            return ToolResult::fail("invoice_number is required");
        };
        match self.store.payment(number) {
            Some(payment) => ToolResult::ok(json!({
                "invoice_number": payment.invoice_number,
                "amount": payment.amount,
                "status": payment.status,
                "payment_method": payment.payment_method,
                "refund_amount": payment.refund_amount,
            })),
            None => ToolResult::fail("Invoice not found"),
        }
    }
}

/// 查询退款状态
pub struct CheckRefundStatusTool {
    store: Arc<DemoStore>,
}

impl CheckRefundStatusTool {
    pub fn new(store: Arc<DemoStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for CheckRefundStatusTool {
    fn name(&self) -> &str {
        "check_refund_status"
    }

    fn description(&self) -> &str {
        "Checks if payment has been refunded"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "invoice_number": { "type": "string" }
            },
            "required": ["invoice_number"]
        })
    }

    async fn execute(&self, args: &Value) -> ToolResult {
        let Some(number) = invoice_number_arg(args) else {
            return ToolResult::fail("invoice_number is required");
        };
        match self.store.payment(number) {
            Some(payment) => {
                let is_refunded = matches!(
                    payment.status,
                    PaymentStatus::Refunded | PaymentStatus::PartiallyRefunded
                );
                ToolResult::ok(json!({
                    "invoice_number": payment.invoice_number,
                    "is_refunded": is_refunded,
                    "refund_amount": payment.refund_amount,
                    "status": payment.status,
                }))
            }
            None => ToolResult::fail("Invoice not found"),
        }
    }
}

/// 处理退款请求（全额或部分，需原因）
pub struct ProcessRefundTool {
    store: Arc<DemoStore>,
}

impl ProcessRefundTool {
    pub fn new(store: Arc<DemoStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ProcessRefundTool {
    fn name(&self) -> &str {
        "process_refund"
    }

    fn description(&self) -> &str {
        "Processes a refund for payment"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "invoice_number": { "type": "string" },
                "reason": { "type": "string" },
                "amount": { "type": "number" }
            },
            "required": ["invoice_number", "reason"]
        })
    }

    async fn execute(&self, args: &Value) -> ToolResult {
        let Some(number) = invoice_number_arg(args) else {
            return ToolResult::fail("invoice_number is required");
        };
        let Some(reason) = args
            .get("reason")
            .and_then(|v| v.as_str())
            .filter(|r| !r.trim().is_empty())
        else {
            return ToolResult::fail("A reason is required for all refunds");
        };
        let requested_amount = args.get("amount").and_then(|v| v.as_f64());

        let outcome = self.store.with_payment_mut(number, |payment| {
            if payment.status != PaymentStatus::Completed {
                return Err(format!(
                    "Only COMPLETED payments can be refunded (status: {:?})",
                    payment.status
                ));
            }
            let amount = requested_amount.unwrap_or(payment.amount);
            if amount <= 0.0 || amount > payment.amount {
                return Err(format!(
                    "Refund amount must be between 0 and {}",
                    payment.amount
                ));
            }
            payment.refund_amount = amount;
            payment.refund_reason = Some(reason.to_string());
            payment.status = if amount < payment.amount {
                PaymentStatus::PartiallyRefunded
            } else {
                PaymentStatus::Refunded
            };
            Ok(json!({
                "message": "Refund processed, expect 5-7 business days",
                "refund_amount": amount,
                "status": payment.status,
            }))
        });

        match outcome {
            Some(Ok(data)) => ToolResult::ok(data),
            Some(Err(reason)) => ToolResult::fail(reason),
            None => ToolResult::fail("Invoice not found"),
        }
    }
}
