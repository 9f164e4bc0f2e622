use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::customization::CustomizationSelection;
use super::errors::DomainError;

/// Most units of one configuration a cart line may hold.
pub const MAX_QUANTITY: i32 = 99;

/// Upper bound of a per-unit customization surcharge (`NUMERIC(10, 2)`).
pub fn max_customization_price() -> BigDecimal {
    BigDecimal::new(9_999_999_999_i64.into(), 2)
}

/// Request to put a product configuration into a cart.
#[derive(Debug, Clone)]
pub struct NewCartLine {
    pub product_slug: String,
    pub quantity: i32,
    pub customization: CustomizationSelection,
    pub customization_price: BigDecimal,
}

impl NewCartLine {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.product_slug.trim().is_empty() {
            return Err(DomainError::InvalidInput("product_id is required".to_string()));
        }
        validate_quantity(self.quantity)?;
        if self.customization_price < BigDecimal::zero() {
            return Err(DomainError::InvalidInput(
                "customization_price cannot be negative".to_string(),
            ));
        }
        if self.customization_price > max_customization_price() {
            return Err(DomainError::InvalidInput(format!(
                "customization_price cannot exceed {}",
                max_customization_price()
            )));
        }
        Ok(())
    }
}

pub fn validate_quantity(quantity: i32) -> Result<(), DomainError> {
    if quantity < 1 {
        return Err(DomainError::InvalidInput(
            "quantity must be at least 1".to_string(),
        ));
    }
    if quantity > MAX_QUANTITY {
        return Err(DomainError::InvalidInput(format!(
            "quantity cannot exceed {MAX_QUANTITY}"
        )));
    }
    Ok(())
}

/// Sum of line quantities, as stored on an order.
pub fn total_quantity(quantities: impl IntoIterator<Item = i32>) -> Result<i32, DomainError> {
    let total: i64 = quantities.into_iter().map(i64::from).sum();
    i32::try_from(total)
        .map_err(|_| DomainError::InvalidInput("too many items in the cart".to_string()))
}

#[derive(Debug, Clone)]
pub struct CartLine {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_slug: String,
    pub product_name: String,
    pub brand_name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub customization: CustomizationSelection,
    pub customization_price: BigDecimal,
    pub created_at: DateTime<Utc>,
}

impl CartLine {
    /// (unit price + customization price) × quantity.
    pub fn line_total(&self) -> BigDecimal {
        (&self.unit_price + &self.customization_price) * BigDecimal::from(self.quantity)
    }
}

#[derive(Debug, Clone)]
pub struct CartSnapshot {
    pub items: Vec<CartLine>,
    pub total_items: i64,
    pub total_price: BigDecimal,
    pub distinct_item_count: usize,
}

impl CartSnapshot {
    pub fn from_lines(items: Vec<CartLine>) -> Self {
        let total_items = items.iter().map(|l| i64::from(l.quantity)).sum();
        let total_price = items
            .iter()
            .fold(BigDecimal::zero(), |acc, l| acc + l.line_total());
        let distinct_item_count = items.len();
        Self {
            items,
            total_items,
            total_price,
            distinct_item_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
