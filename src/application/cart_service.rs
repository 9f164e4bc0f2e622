use uuid::Uuid;

use crate::domain::cart::{validate_quantity, CartLine, CartSnapshot, NewCartLine};
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;

pub struct CartService<R> {
    repo: R,
}

impl<R: CartRepository> CartService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn add_item(&self, account_id: Uuid, line: &NewCartLine) -> Result<CartLine, DomainError> {
        line.validate()?;
        self.repo.add_item(account_id, line)
    }

    pub fn update_quantity(
        &self,
        account_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<CartLine, DomainError> {
        validate_quantity(quantity)?;
        self.repo.update_quantity(account_id, item_id, quantity)
    }

    pub fn remove_item(&self, account_id: Uuid, item_id: Uuid) -> Result<(), DomainError> {
        self.repo.remove_item(account_id, item_id)
    }

    pub fn clear(&self, account_id: Uuid) -> Result<(), DomainError> {
        let removed = self.repo.clear(account_id)?;
        log::debug!("Cleared {removed} cart items for account {account_id}");
        Ok(())
    }

    /// Current cart contents with totals recomputed from the stored lines.
    pub fn snapshot(&self, account_id: Uuid) -> Result<CartSnapshot, DomainError> {
        Ok(CartSnapshot::from_lines(self.repo.items(account_id)?))
    }
}
