//! 演示数据源（内存版）
//!
//! 以进程内 HashMap 模拟订单 / 支付 / FAQ / 会话日志，带种子数据，供各领域工具读写。
//! 真实部署中由外部持久化服务替代；工具契约不随数据源变化。

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// 订单状态；PENDING/CONFIRMED 为未发货，才允许修改或取消
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn is_mutable(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

/// 支付状态；仅 COMPLETED 可退款
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
    PartiallyRefunded,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub quantity: u32,
    pub price: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct OrderRecord {
    pub order_number: String,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub shipping_address: Value,
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PaymentRecord {
    pub invoice_number: String,
    pub amount: f64,
    pub status: PaymentStatus,
    pub payment_method: String,
    pub refund_amount: f64,
    pub refund_reason: Option<String>,
    pub description: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// 进程内数据源：订单、支付、FAQ 与会话消息日志
#[derive(Default)]
pub struct DemoStore {
    orders: RwLock<HashMap<String, OrderRecord>>,
    payments: RwLock<HashMap<String, PaymentRecord>>,
    faqs: Vec<FaqEntry>,
    conversations: RwLock<HashMap<String, Vec<(String, String)>>>,
}

impl DemoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置演示数据：三张订单、四张发票、常见 FAQ（与种子脚本一致）
    pub fn seeded() -> Self {
        let now = Utc::now();
        let store = Self {
            faqs: seed_faqs(),
            ..Self::default()
        };
        {
            let mut orders = store.orders.write().unwrap();
            for order in seed_orders(now) {
                orders.insert(order.order_number.clone(), order);
            }
        }
        {
            let mut payments = store.payments.write().unwrap();
            for payment in seed_payments() {
                payments.insert(payment.invoice_number.clone(), payment);
            }
        }
        store
    }

    pub fn order(&self, order_number: &str) -> Option<OrderRecord> {
        self.orders.read().unwrap().get(order_number).cloned()
    }

    /// 对单张订单执行一次变更；订单不存在时返回 None
    pub fn with_order_mut<R>(
        &self,
        order_number: &str,
        f: impl FnOnce(&mut OrderRecord) -> R,
    ) -> Option<R> {
        self.orders.write().unwrap().get_mut(order_number).map(f)
    }

    pub fn payment(&self, invoice_number: &str) -> Option<PaymentRecord> {
        self.payments.read().unwrap().get(invoice_number).cloned()
    }

    /// 对单张发票执行一次变更；发票不存在时返回 None
    pub fn with_payment_mut<R>(
        &self,
        invoice_number: &str,
        f: impl FnOnce(&mut PaymentRecord) -> R,
    ) -> Option<R> {
        self.payments
            .write()
            .unwrap()
            .get_mut(invoice_number)
            .map(f)
    }

    /// 关键词匹配 FAQ（问句与答案都参与匹配，大小写不敏感）
    pub fn search_faq(&self, query: &str) -> Vec<FaqEntry> {
        let query = query.to_lowercase();
        let terms: Vec<&str> = query.split_whitespace().collect();
        self.faqs
            .iter()
            .filter(|faq| {
                let haystack = format!("{} {}", faq.question, faq.answer).to_lowercase();
                terms.iter().any(|t| haystack.contains(t))
            })
            .cloned()
            .collect()
    }

    pub fn append_message(&self, conversation_id: &str, role: &str, content: &str) {
        self.conversations
            .write()
            .unwrap()
            .entry(conversation_id.to_string())
            .or_default()
            .push((role.to_string(), content.to_string()));
    }

    /// 取某会话最近 limit 条消息（(role, content) 对）
    pub fn conversation_tail(&self, conversation_id: &str, limit: usize) -> Vec<(String, String)> {
        let conversations = self.conversations.read().unwrap();
        let Some(messages) = conversations.get(conversation_id) else {
            return Vec::new();
        };
        let start = messages.len().saturating_sub(limit);
        messages[start..].to_vec()
    }
}

fn seed_orders(now: DateTime<Utc>) -> Vec<OrderRecord> {
    vec![
        OrderRecord {
            order_number: "ORD-2024-001".to_string(),
            status: OrderStatus::Delivered,
            items: vec![
                OrderItem {
                    name: "Laptop".to_string(),
                    quantity: 1,
                    price: 55000.0,
                },
                OrderItem {
                    name: "Mouse".to_string(),
                    quantity: 1,
                    price: 500.0,
                },
            ],
            total_amount: 55500.0,
            shipping_address: json!({
                "street": "123 MG Road",
                "city": "Bangalore",
                "state": "Karnataka",
                "pincode": "560001"
            }),
            tracking_number: Some("TRK123456789".to_string()),
            estimated_delivery: Some(now - Duration::days(5)),
        },
        OrderRecord {
            order_number: "ORD-2024-002".to_string(),
            status: OrderStatus::Shipped,
            items: vec![OrderItem {
                name: "Phone".to_string(),
                quantity: 1,
                price: 25000.0,
            }],
            total_amount: 25000.0,
            shipping_address: json!({
                "street": "123 MG Road",
                "city": "Bangalore",
                "state": "Karnataka",
                "pincode": "560001"
            }),
            tracking_number: Some("TRK987654321".to_string()),
            estimated_delivery: Some(now + Duration::days(2)),
        },
        OrderRecord {
            order_number: "ORD-2024-003".to_string(),
            status: OrderStatus::Pending,
            items: vec![OrderItem {
                name: "Headphones".to_string(),
                quantity: 2,
                price: 2000.0,
            }],
            total_amount: 4000.0,
            shipping_address: json!({
                "street": "456 Park Street",
                "city": "Mumbai",
                "state": "Maharashtra",
                "pincode": "400001"
            }),
            tracking_number: None,
            estimated_delivery: None,
        },
    ]
}

fn seed_payments() -> Vec<PaymentRecord> {
    vec![
        PaymentRecord {
            invoice_number: "INV-2024-001".to_string(),
            amount: 55500.0,
            status: PaymentStatus::Completed,
            payment_method: "card".to_string(),
            refund_amount: 0.0,
            refund_reason: None,
            description: "Payment for ORD-2024-001".to_string(),
        },
        PaymentRecord {
            invoice_number: "INV-2024-002".to_string(),
            amount: 25000.0,
            status: PaymentStatus::Completed,
            payment_method: "upi".to_string(),
            refund_amount: 0.0,
            refund_reason: None,
            description: "Payment for ORD-2024-002".to_string(),
        },
        PaymentRecord {
            invoice_number: "INV-2024-003".to_string(),
            amount: 4000.0,
            status: PaymentStatus::Pending,
            payment_method: "card".to_string(),
            refund_amount: 0.0,
            refund_reason: None,
            description: "Payment for ORD-2024-003".to_string(),
        },
        PaymentRecord {
            invoice_number: "INV-2024-004".to_string(),
            amount: 12000.0,
            status: PaymentStatus::Refunded,
            payment_method: "card".to_string(),
            refund_amount: 12000.0,
            refund_reason: Some("Defective item".to_string()),
            description: "Payment for returned order".to_string(),
        },
    ]
}

fn seed_faqs() -> Vec<FaqEntry> {
    vec![
        FaqEntry {
            question: "How do I reset my password?".to_string(),
            answer: "Go to Settings > Account > Reset Password and follow the email link."
                .to_string(),
        },
        FaqEntry {
            question: "What is the return policy?".to_string(),
            answer: "Items can be returned within 30 days of delivery in original packaging."
                .to_string(),
        },
        FaqEntry {
            question: "How long does shipping take?".to_string(),
            answer: "Standard shipping takes 3-5 business days; express takes 1-2.".to_string(),
        },
        FaqEntry {
            question: "How do I contact support?".to_string(),
            answer: "Use this chat, or email support@example.com for complex issues.".to_string(),
        },
    ]
}
