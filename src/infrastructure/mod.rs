pub mod account_repo;
pub mod cart_repo;
pub mod catalog_repo;
pub mod models;
pub mod order_repo;
pub mod telegram;

#[cfg(test)]
pub(crate) mod test_support;

pub use account_repo::DieselAccountRepository;
pub use cart_repo::DieselCartRepository;
pub use catalog_repo::DieselCatalogRepository;
pub use order_repo::DieselOrderRepository;
pub use telegram::{DisabledNotifier, TelegramNotifier};

use crate::domain::errors::DomainError;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}
