use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::account::{Account, AccountProfile, Registration};
use super::cart::{CartLine, NewCartLine};
use super::catalog::{Brand, CatalogQuery, Category, Homepage, ProductDetail, ProductPage};
use super::errors::DomainError;
use super::order::{ListResult, OrderContact, OrderNumber, OrderStatus, OrderView, StatusTotal};

pub trait CatalogRepository: Send + Sync + 'static {
    fn homepage(&self) -> Result<Homepage, DomainError>;
    fn list_products(&self, query: &CatalogQuery) -> Result<ProductPage, DomainError>;
    fn product_detail(&self, slug: &str) -> Result<Option<ProductDetail>, DomainError>;
    fn categories(&self) -> Result<Vec<Category>, DomainError>;
    fn brands(&self) -> Result<Vec<Brand>, DomainError>;
}

pub trait CartRepository: Send + Sync + 'static {
    /// Inserts the line or, for an identical configuration, adds to its quantity.
    fn add_item(&self, account_id: Uuid, line: &NewCartLine) -> Result<CartLine, DomainError>;
    fn update_quantity(
        &self,
        account_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<CartLine, DomainError>;
    fn remove_item(&self, account_id: Uuid, item_id: Uuid) -> Result<(), DomainError>;
    fn clear(&self, account_id: Uuid) -> Result<usize, DomainError>;
    fn items(&self, account_id: Uuid) -> Result<Vec<CartLine>, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Turns the account's cart into an order and empties the cart, atomically.
    fn create_from_cart(
        &self,
        account_id: Uuid,
        contact: &OrderContact,
        next_number: &dyn Fn() -> OrderNumber,
    ) -> Result<OrderView, DomainError>;
    fn find_by_number(&self, order_number: &str) -> Result<Option<OrderView>, DomainError>;
    fn list_for_account(
        &self,
        account_id: Uuid,
        page: i64,
        limit: i64,
    ) -> Result<ListResult, DomainError>;
    fn totals_by_status(&self, account_id: Uuid) -> Result<Vec<StatusTotal>, DomainError>;
    fn set_status(&self, id: Uuid, status: OrderStatus) -> Result<OrderView, DomainError>;
}

pub trait AccountRepository: Send + Sync + 'static {
    fn register(&self, profile: &AccountProfile) -> Result<Registration, DomainError>;
    fn find_by_telegram_id(&self, telegram_id: i64) -> Result<Option<Account>, DomainError>;
    fn set_approved(&self, telegram_id: i64, approved: bool) -> Result<Account, DomainError>;
    fn list_admins(&self) -> Result<Vec<Account>, DomainError>;
}

/// Button attached to an admin notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationAction {
    pub label: String,
    pub callback_data: String,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification transport failed: {0}")]
    Transport(String),
    #[error("messaging API rejected the notification: {0}")]
    Rejected(String),
    #[error("notifications are not configured")]
    Disabled,
}

/// Outbound channel to administrators on the chat platform.
#[async_trait]
pub trait AdminNotifier: Send + Sync + 'static {
    async fn send_admin_notification(
        &self,
        admin_telegram_id: i64,
        text: &str,
        actions: &[NotificationAction],
    ) -> Result<(), NotifyError>;
}
