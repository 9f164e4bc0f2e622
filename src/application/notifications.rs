//! Admin notifications: message formatting, callback actions and the
//! best-effort broadcast over an [`AdminNotifier`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::account::Account;
use crate::domain::errors::DomainError;
use crate::domain::order::OrderView;
use crate::domain::ports::{AdminNotifier, NotificationAction};

/// What an admin can do from a notification button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    ApproveUser(i64),
    RejectUser(i64),
    ApproveOrder(Uuid),
    RejectOrder(Uuid),
}

impl AdminAction {
    pub fn callback_data(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AdminAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminAction::ApproveUser(id) => write!(f, "user_approve:{id}"),
            AdminAction::RejectUser(id) => write!(f, "user_reject:{id}"),
            AdminAction::ApproveOrder(id) => write!(f, "order_approve:{id}"),
            AdminAction::RejectOrder(id) => write!(f, "order_reject:{id}"),
        }
    }
}

impl FromStr for AdminAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidInput(format!("unrecognised admin action '{s}'"));
        let (verb, target) = s.split_once(':').ok_or_else(invalid)?;
        match verb {
            "user_approve" => target.parse().map(AdminAction::ApproveUser).map_err(|_| invalid()),
            "user_reject" => target.parse().map(AdminAction::RejectUser).map_err(|_| invalid()),
            "order_approve" => target.parse().map(AdminAction::ApproveOrder).map_err(|_| invalid()),
            "order_reject" => target.parse().map(AdminAction::RejectOrder).map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminMessage {
    pub text: String,
    pub actions: Vec<NotificationAction>,
}

fn action(label: &str, action: AdminAction) -> NotificationAction {
    NotificationAction {
        label: label.to_string(),
        callback_data: action.callback_data(),
    }
}

impl AdminMessage {
    pub fn order_created(order: &OrderView) -> Self {
        let items = if order.items.is_empty() {
            "No items".to_string()
        } else {
            order
                .items
                .iter()
                .map(|item| {
                    let mut line = format!(
                        "• {} x{} - ${}",
                        item.product_name,
                        item.quantity,
                        item.line_total().with_scale(2)
                    );
                    if !item.customization.is_empty() {
                        line.push_str(&format!("\n  └ Customizations: {}", item.customization));
                    }
                    line
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        let c = &order.contact;
        let text = format!(
            "📦 New order created!\n\n\
             Order #: {}\n\
             Customer: {} {}\n\
             Email: {}\n\n\
             Items:\n{}\n\n\
             Shipping Address:\n\
             {} {}\n\
             {}\n\
             {}, {}\n\
             {}\n\n\
             Total: ${}\n\
             Items: {}",
            order.order_number,
            c.customer_first_name,
            c.customer_last_name,
            c.customer_email,
            items,
            c.shipping_first_name,
            c.shipping_last_name,
            c.shipping_address,
            c.shipping_city,
            c.shipping_zip_code,
            c.shipping_country,
            order.total_amount.with_scale(2),
            order.total_items,
        );

        Self {
            text,
            actions: vec![
                action("✅ Approve", AdminAction::ApproveOrder(order.id)),
                action("❌ Reject", AdminAction::RejectOrder(order.id)),
            ],
        }
    }

    pub fn user_registered(account: &Account) -> Self {
        let text = format!(
            "🆕 New user registration\n\n\
             Name: {}\n\
             Username: @{}\n\
             Telegram ID: {}\n\n\
             Approve access to the store?",
            account.display_name(),
            account.username.as_deref().unwrap_or("—"),
            account.telegram_id,
        );

        Self {
            text,
            actions: vec![
                action("✅ Approve", AdminAction::ApproveUser(account.telegram_id)),
                action("❌ Reject", AdminAction::RejectUser(account.telegram_id)),
            ],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Fans messages out to admins. One recipient failing never stops the rest,
/// and nothing is retried or returned as an error.
#[derive(Clone)]
pub struct NotificationRelay {
    notifier: Arc<dyn AdminNotifier>,
}

impl NotificationRelay {
    pub fn new(notifier: Arc<dyn AdminNotifier>) -> Self {
        Self { notifier }
    }

    pub async fn broadcast(&self, recipients: &[i64], message: &AdminMessage) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        if recipients.is_empty() {
            log::info!("No admins to notify");
            return report;
        }
        for &admin_id in recipients {
            match self
                .notifier
                .send_admin_notification(admin_id, &message.text, &message.actions)
                .await
            {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    log::warn!("Failed to notify admin {admin_id}: {e}");
                    report.failed += 1;
                }
            }
        }
        report
    }
}
