use thiserror::Error;

use super::order::OrderStatus;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Product '{0}' is out of stock")]
    OutOfStock(String),
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Order status cannot change from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Internal error: {0}")]
    Internal(String),
}
