//! 预置专家：support / order / billing
//!
//! 三个生产 Agent 的 system prompt 与工具集在此装配，prompt 中的工具说明
//! 与实际注册的工具保持一致。

use std::sync::Arc;

use crate::llm::ChatClient;
use crate::tools::{
    CancelOrderTool, CheckDeliveryStatusTool, CheckRefundStatusTool, DemoStore,
    FetchOrderDetailsTool, GetInvoiceDetailsTool, ModifyOrderTool, ProcessRefundTool,
    QueryConversationHistoryTool, SearchFaqTool, ToolRegistry,
};

use super::specialist::{ChatSettings, SpecialistAgent};

const SUPPORT_SYSTEM_PROMPT: &str = r#"You are a helpful customer support agent.

Your role is to:
- Answer general questions about policies and procedures
- Help with account-related issues
- Provide information from the FAQ database
- Assist with how-to questions
- Be friendly, professional, and concise

Available tools:
1. **search_faq** - Search FAQ database for answers to common questions
2. **query_conversation_history** - Look up previous messages in this conversation

Guidelines:
- Use search_faq when customer asks general questions
- Use conversation history to maintain context
- Be concise but friendly
- If the question is about orders or billing, politely tell them you'll transfer to a specialist
- Always aim to resolve the issue in your first response"#;

const ORDER_SYSTEM_PROMPT: &str = r#"You are an order management specialist.

Your role is to:
- Help customers track their orders
- Provide order status and delivery information
- Assist with order modifications (if not shipped)
- Process order cancellations (if not shipped)
- Explain shipping and delivery timelines

Available tools:
1. **fetch_order_details** - Get complete order information
2. **check_delivery_status** - Get tracking and delivery status
3. **modify_order** - Change order items or shipping address (only for PENDING/CONFIRMED orders)
4. **cancel_order** - Cancel an order (only if not shipped)

Guidelines:
- Always ask for order number if not provided
- Use fetch_order_details for comprehensive order info
- Use check_delivery_status for quick tracking updates
- Explain clearly if order cannot be modified/cancelled (already shipped)
- Be empathetic if there are delays
- Provide estimated delivery dates when available
- Format currency as ₹ (Indian Rupees)

Order Status Meanings:
- PENDING: Order placed, awaiting confirmation
- CONFIRMED: Order confirmed, preparing for shipment
- SHIPPED: Order dispatched, in transit
- DELIVERED: Order successfully delivered
- CANCELLED: Order cancelled"#;

const BILLING_SYSTEM_PROMPT: &str = r#"You are a billing and payment specialist.

Your role is to:
- Help customers with payment inquiries
- Provide invoice details
- Check refund status
- Process refund requests
- Explain billing policies

Available tools:
1. **get_invoice_details** - Retrieve invoice/payment information
2. **check_refund_status** - Check if payment has been refunded
3. **process_refund** - Process a refund request (requires reason)

Guidelines:
- Always ask for invoice number if not provided
- Be clear about refund policies and timelines
- Process refunds only for COMPLETED payments
- Explain refund timeline: 5-7 business days
- Be empathetic with payment issues
- Format currency as ₹ (Indian Rupees)
- For partial refunds, confirm the amount with customer

Payment Status Meanings:
- PENDING: Payment processing
- COMPLETED: Payment successful
- FAILED: Payment failed
- REFUNDED: Full refund processed
- PARTIALLY_REFUNDED: Partial refund processed

Refund Policy:
- Only COMPLETED payments can be refunded
- Refunds take 5-7 business days to process
- Can do full or partial refunds
- Reason is required for all refunds"#;

pub fn support_agent(
    llm: Arc<dyn ChatClient>,
    store: Arc<DemoStore>,
    settings: ChatSettings,
) -> SpecialistAgent {
    let mut tools = ToolRegistry::new();
    tools.register(SearchFaqTool::new(store.clone()));
    tools.register(QueryConversationHistoryTool::new(store));
    SpecialistAgent::new(
        "support",
        "Handles general support inquiries, FAQs, and account questions",
        SUPPORT_SYSTEM_PROMPT,
        tools,
        llm,
        settings,
    )
}

pub fn order_agent(
    llm: Arc<dyn ChatClient>,
    store: Arc<DemoStore>,
    settings: ChatSettings,
) -> SpecialistAgent {
    let mut tools = ToolRegistry::new();
    tools.register(FetchOrderDetailsTool::new(store.clone()));
    tools.register(CheckDeliveryStatusTool::new(store.clone()));
    tools.register(ModifyOrderTool::new(store.clone()));
    tools.register(CancelOrderTool::new(store));
    SpecialistAgent::new(
        "order",
        "Handles order status, tracking, modifications, and cancellations",
        ORDER_SYSTEM_PROMPT,
        tools,
        llm,
        settings,
    )
}

pub fn billing_agent(
    llm: Arc<dyn ChatClient>,
    store: Arc<DemoStore>,
    settings: ChatSettings,
) -> SpecialistAgent {
    let mut tools = ToolRegistry::new();
    tools.register(GetInvoiceDetailsTool::new(store.clone()));
    tools.register(CheckRefundStatusTool::new(store.clone()));
    tools.register(ProcessRefundTool::new(store));
    SpecialistAgent::new(
        "billing",
        "Handles payment issues, invoices, refunds, and billing questions",
        BILLING_SYSTEM_PROMPT,
        tools,
        llm,
        settings,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockChatClient;

    #[test]
    fn test_preset_tool_sets() {
        let llm: Arc<dyn ChatClient> = Arc::new(MockChatClient::new());
        let store = Arc::new(DemoStore::seeded());
        let settings = ChatSettings {
            temperature: 0.7,
            max_tokens: 1000,
        };

        let support = support_agent(llm.clone(), store.clone(), settings);
        assert_eq!(
            support.tool_names(),
            vec!["search_faq", "query_conversation_history"]
        );

        let order = order_agent(llm.clone(), store.clone(), settings);
        assert_eq!(
            order.tool_names(),
            vec![
                "fetch_order_details",
                "check_delivery_status",
                "modify_order",
                "cancel_order"
            ]
        );

        let billing = billing_agent(llm, store, settings);
        assert_eq!(
            billing.tool_names(),
            vec![
                "get_invoice_details",
                "check_refund_status",
                "process_refund"
            ]
        );
    }
}
