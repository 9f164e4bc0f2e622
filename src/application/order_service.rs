use chrono::Utc;
use uuid::Uuid;

use crate::domain::account::Account;
use crate::domain::errors::DomainError;
use crate::domain::order::{
    AccountStatistics, ListResult, OrderNumber, OrderStatus, OrderView, ShippingInfo,
};
use crate::domain::ports::OrderRepository;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

pub struct OrderService<R> {
    repo: R,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Checks out the account's cart.
    ///
    /// The form is validated before any database work, so an incomplete
    /// form never touches the cart.
    pub fn create_from_cart(
        &self,
        account: &Account,
        shipping: &ShippingInfo,
    ) -> Result<OrderView, DomainError> {
        let contact = shipping.resolve(account)?;
        let order = self
            .repo
            .create_from_cart(account.id, &contact, &|| OrderNumber::generate(Utc::now()))?;
        log::info!(
            "Order {} created for account {} ({} items, total {})",
            order.order_number,
            account.telegram_id,
            order.total_items,
            order.total_amount
        );
        Ok(order)
    }

    /// Looks up an order by number, hiding orders owned by other accounts.
    pub fn get_for_account(
        &self,
        account_id: Uuid,
        order_number: &str,
    ) -> Result<OrderView, DomainError> {
        self.repo
            .find_by_number(order_number)?
            .filter(|order| order.account_id == account_id)
            .ok_or(DomainError::NotFound("Order"))
    }

    pub fn list_orders(
        &self,
        account_id: Uuid,
        page: i64,
        limit: i64,
    ) -> Result<ListResult, DomainError> {
        self.repo
            .list_for_account(account_id, page.max(1), limit.clamp(1, MAX_PAGE_SIZE))
    }

    pub fn statistics(&self, account_id: Uuid) -> Result<AccountStatistics, DomainError> {
        let totals = self.repo.totals_by_status(account_id)?;
        Ok(AccountStatistics::from_totals(&totals))
    }

    pub fn set_status(&self, id: Uuid, status: OrderStatus) -> Result<OrderView, DomainError> {
        let order = self.repo.set_status(id, status)?;
        log::info!("Order {} is now {}", order.order_number, order.status);
        Ok(order)
    }
}
