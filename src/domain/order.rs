use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::account::Account;
use super::customization::CustomizationSelection;
use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Statuses whose amounts count as money spent.
    pub fn counts_as_spent(self) -> bool {
        matches!(
            self,
            OrderStatus::Confirmed
                | OrderStatus::Processing
                | OrderStatus::Shipped
                | OrderStatus::Delivered
        )
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        self == next
            || matches!(
                (self, next),
                (Pending, Confirmed)
                    | (Pending, Cancelled)
                    | (Confirmed, Processing)
                    | (Confirmed, Cancelled)
                    | (Processing, Shipped)
                    | (Shipped, Delivered)
            )
    }

    pub fn transition_to(self, next: OrderStatus) -> Result<OrderStatus, DomainError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::InvalidInput(format!("unknown order status '{s}'")))
    }
}

/// Human-readable order number: `ORD-YYYYMMDD-XXXXXXXX`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderNumber(String);

impl OrderNumber {
    pub const PREFIX: &'static str = "ORD";

    pub fn generate(now: DateTime<Utc>) -> Self {
        let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
        Self(format!("{}-{}-{}", Self::PREFIX, now.format("%Y%m%d"), suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl FromStr for OrderNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidInput(format!("malformed order number '{s}'"));
        let mut parts = s.split('-');
        let (Some(prefix), Some(date), Some(suffix), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        let well_formed = prefix == Self::PREFIX
            && date.len() == 8
            && date.bytes().all(|b| b.is_ascii_digit())
            && suffix.len() == 8
            && suffix
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b));
        if well_formed {
            Ok(Self(s.to_string()))
        } else {
            Err(invalid())
        }
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Checkout form as submitted by the shopper; every field is optional.
#[derive(Debug, Clone, Default)]
pub struct ShippingInfo {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub shipping_first_name: Option<String>,
    pub shipping_last_name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub notes: Option<String>,
}

/// Contact and shipping fields frozen onto an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderContact {
    pub customer_first_name: String,
    pub customer_last_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_first_name: String,
    pub shipping_last_name: String,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_zip_code: String,
    pub shipping_country: String,
    pub notes: String,
}

fn filled(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl ShippingInfo {
    /// Resolves the form against the account profile.
    ///
    /// Customer names fall back to the profile, shipping names fall back to
    /// the customer names. Address, city and country are required.
    pub fn resolve(&self, account: &Account) -> Result<OrderContact, DomainError> {
        let required = |value: &Option<String>, field: &str| {
            filled(value).ok_or_else(|| DomainError::InvalidInput(format!("{field} is required")))
        };

        let shipping_address = required(&self.address, "shipping_address")?;
        let shipping_city = required(&self.city, "shipping_city")?;
        let shipping_country = required(&self.country, "shipping_country")?;

        let customer_first_name = filled(&self.first_name)
            .or_else(|| filled(&account.first_name))
            .unwrap_or_default();
        let customer_last_name = filled(&self.last_name)
            .or_else(|| filled(&account.last_name))
            .unwrap_or_default();

        let contact = OrderContact {
            shipping_first_name: filled(&self.shipping_first_name)
                .unwrap_or_else(|| customer_first_name.clone()),
            shipping_last_name: filled(&self.shipping_last_name)
                .unwrap_or_else(|| customer_last_name.clone()),
            customer_first_name,
            customer_last_name,
            customer_email: filled(&self.email).unwrap_or_default(),
            customer_phone: filled(&self.phone).unwrap_or_default(),
            shipping_address,
            shipping_city,
            shipping_zip_code: filled(&self.zip_code).unwrap_or_default(),
            shipping_country,
            notes: filled(&self.notes).unwrap_or_default(),
        };
        contact.check_lengths()?;
        Ok(contact)
    }
}

fn check_length(field: &str, value: &str, max: usize) -> Result<(), DomainError> {
    if value.chars().count() > max {
        return Err(DomainError::InvalidInput(format!(
            "{field} is too long (max {max} characters)"
        )));
    }
    Ok(())
}

impl OrderContact {
    /// Column widths of the orders table.
    fn check_lengths(&self) -> Result<(), DomainError> {
        check_length("first_name", &self.customer_first_name, 150)?;
        check_length("last_name", &self.customer_last_name, 150)?;
        check_length("email", &self.customer_email, 254)?;
        check_length("phone", &self.customer_phone, 32)?;
        check_length("shipping_first_name", &self.shipping_first_name, 150)?;
        check_length("shipping_last_name", &self.shipping_last_name, 150)?;
        check_length("shipping_city", &self.shipping_city, 100)?;
        check_length("shipping_zip_code", &self.shipping_zip_code, 20)?;
        check_length("shipping_country", &self.shipping_country, 100)
    }
}

/// Largest amount a NUMERIC(12,2) order total can hold.
pub fn max_order_total() -> BigDecimal {
    BigDecimal::new(999_999_999_999_i64.into(), 2)
}

/// Sums the lines of a checkout, refusing totals the orders table cannot store.
pub fn order_total<'a>(
    lines: impl IntoIterator<Item = (&'a BigDecimal, &'a BigDecimal, i32)>,
) -> Result<BigDecimal, DomainError> {
    let total = lines
        .into_iter()
        .fold(BigDecimal::zero(), |acc, (unit_price, customization_price, quantity)| {
            acc + (unit_price + customization_price) * BigDecimal::from(quantity)
        });
    if total > max_order_total() {
        return Err(DomainError::InvalidInput(
            "order total exceeds the maximum allowed amount".to_string(),
        ));
    }
    Ok(total)
}

#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub price: BigDecimal,
    pub customization_price: BigDecimal,
    pub customization: CustomizationSelection,
}

impl OrderItemView {
    pub fn line_total(&self) -> BigDecimal {
        (&self.price + &self.customization_price) * BigDecimal::from(self.quantity)
    }
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: Uuid,
    pub order_number: String,
    pub account_id: Uuid,
    pub status: OrderStatus,
    pub total_amount: BigDecimal,
    pub total_items: i32,
    pub contact: OrderContact,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItemView>,
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<OrderView>,
    pub total: i64,
}

/// Aggregate of one account's orders in a single status.
#[derive(Debug, Clone)]
pub struct StatusTotal {
    pub status: OrderStatus,
    pub count: i64,
    pub amount: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountStatistics {
    pub order_count: i64,
    pub total_spent: BigDecimal,
    pub total_order_value: BigDecimal,
    pub pending_value: BigDecimal,
}

impl AccountStatistics {
    pub fn from_totals(totals: &[StatusTotal]) -> Self {
        let mut order_count = 0;
        let mut total_spent = BigDecimal::zero();
        let mut total_order_value = BigDecimal::zero();
        for total in totals {
            order_count += total.count;
            total_order_value += &total.amount;
            if total.status.counts_as_spent() {
                total_spent += &total.amount;
            }
        }
        let pending_value = &total_order_value - &total_spent;
        Self {
            order_count,
            total_spent,
            total_order_value,
            pending_value,
        }
    }
}
