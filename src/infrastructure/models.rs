use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::account::Account;
use crate::domain::cart::CartLine;
use crate::domain::catalog::{
    Brand, Category, CustomizationOption, JewelrySpecs, ProductSummary, WatchSpecs,
};
use crate::domain::customization::CustomizationSelection;
use crate::domain::errors::DomainError;
use crate::domain::order::{OrderContact, OrderItemView, OrderView};
use crate::schema::{
    accounts, brands, cart_items, carts, categories, jewelry_specifications, order_items, orders,
    product_customizations, products, watch_specifications,
};

// ── Catalog ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = brands)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BrandRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub founded_year: Option<i32>,
    pub country: String,
    pub website: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = brands)]
pub struct NewBrandRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub is_active: bool,
    pub show_on_homepage: bool,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CategoryRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub parent_id: Option<Uuid>,
    pub sort_order: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = categories)]
pub struct NewCategoryRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<Uuid>,
    pub is_active: bool,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = products)]
#[diesel(belongs_to(BrandRow, foreign_key = brand_id))]
#[diesel(belongs_to(CategoryRow, foreign_key = category_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub brand_id: Uuid,
    pub category_id: Uuid,
    pub description: String,
    pub short_description: String,
    pub price: BigDecimal,
    pub original_price: Option<BigDecimal>,
    pub stock_status: String,
    pub stock_quantity: i32,
    pub low_stock_threshold: i32,
    pub rating_stars: i32,
    pub review_count: i32,
    pub is_active: bool,
    pub is_featured: bool,
    pub is_limited_edition: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub brand_id: Uuid,
    pub category_id: Uuid,
    pub description: String,
    pub price: BigDecimal,
    pub original_price: Option<BigDecimal>,
    pub stock_status: String,
    pub stock_quantity: i32,
    pub is_active: bool,
    pub show_on_homepage: bool,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = watch_specifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WatchSpecRow {
    pub product_id: Uuid,
    pub case_material: String,
    pub case_size: String,
    pub movement: String,
    pub movement_caliber: String,
    pub power_reserve: String,
    pub dial_color: String,
    pub crystal_type: String,
    pub water_resistance: String,
    pub bracelet_material: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = jewelry_specifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct JewelrySpecRow {
    pub product_id: Uuid,
    pub jewelry_type: String,
    pub metal_type: String,
    pub metal_purity: String,
    pub metal_weight: Option<BigDecimal>,
    pub primary_gemstone: String,
    pub gemstone_carat: Option<BigDecimal>,
    pub ring_size: String,
    pub chain_length: String,
    pub style: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = product_customizations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CustomizationOptionRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub customization_type: String,
    pub name: String,
    pub value: String,
    pub price_modifier: BigDecimal,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = product_customizations)]
pub struct NewCustomizationOptionRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub customization_type: String,
    pub name: String,
    pub value: String,
    pub price_modifier: BigDecimal,
    pub is_available: bool,
    pub sort_order: i32,
}

// ── Accounts ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AccountRow {
    pub id: Uuid,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub approved: bool,
    pub is_admin: bool,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = accounts)]
pub struct NewAccountRow {
    pub id: Uuid,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub approved: bool,
    pub is_admin: bool,
}

/// Name fields refreshed on re-registration; `None` leaves the column alone.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = accounts)]
pub struct AccountNamesChangeset {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl AccountNamesChangeset {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.first_name.is_none() && self.last_name.is_none()
    }
}

// ── Carts ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = carts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartRow {
    pub id: Uuid,
    pub account_id: Uuid,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = carts)]
pub struct NewCartRow {
    pub id: Uuid,
    pub account_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = cart_items)]
#[diesel(belongs_to(CartRow, foreign_key = cart_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartItemRow {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub customization: Value,
    pub customization_price: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = cart_items)]
pub struct NewCartItemRow {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub customization: Value,
    pub customization_key: String,
    pub customization_price: BigDecimal,
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub order_number: String,
    pub account_id: Uuid,
    pub status: String,
    pub total_amount: BigDecimal,
    pub total_items: i32,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub order_number: String,
    pub account_id: Uuid,
    pub status: String,
    pub total_amount: BigDecimal,
    pub total_items: i32,
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

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub price: BigDecimal,
    pub customization_price: BigDecimal,
    pub customization: Value,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub price: BigDecimal,
    pub customization_price: BigDecimal,
    pub customization: Value,
}

// ── Row → domain ─────────────────────────────────────────────────────────────

fn selection(value: Value) -> Result<CustomizationSelection, DomainError> {
    serde_json::from_value(value)
        .map_err(|e| DomainError::Internal(format!("corrupt customization payload: {e}")))
}

impl From<BrandRow> for Brand {
    fn from(row: BrandRow) -> Self {
        Brand {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            founded_year: row.founded_year,
            country: row.country,
            website: row.website,
        }
    }
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            parent_id: row.parent_id,
            sort_order: row.sort_order,
        }
    }
}

/// A product joined with the brand and category columns a summary needs.
pub type ProductListingRow = (ProductRow, String, String, String);

pub fn product_summary(
    (row, brand_name, brand_slug, category_slug): ProductListingRow,
) -> Result<ProductSummary, DomainError> {
    Ok(ProductSummary {
        id: row.id,
        name: row.name,
        slug: row.slug,
        sku: row.sku,
        brand_name,
        brand_slug,
        category_slug,
        short_description: row.short_description,
        price: row.price,
        original_price: row.original_price,
        stock_status: row.stock_status.parse()?,
        stock_quantity: row.stock_quantity,
        low_stock_threshold: row.low_stock_threshold,
        rating_stars: row.rating_stars,
        review_count: row.review_count,
        is_featured: row.is_featured,
        is_limited_edition: row.is_limited_edition,
        created_at: row.created_at,
    })
}

impl From<WatchSpecRow> for WatchSpecs {
    fn from(row: WatchSpecRow) -> Self {
        WatchSpecs {
            case_material: row.case_material,
            case_size: row.case_size,
            movement: row.movement,
            movement_caliber: row.movement_caliber,
            power_reserve: row.power_reserve,
            dial_color: row.dial_color,
            crystal_type: row.crystal_type,
            water_resistance: row.water_resistance,
            bracelet_material: row.bracelet_material,
        }
    }
}

impl From<JewelrySpecRow> for JewelrySpecs {
    fn from(row: JewelrySpecRow) -> Self {
        JewelrySpecs {
            jewelry_type: row.jewelry_type,
            metal_type: row.metal_type,
            metal_purity: row.metal_purity,
            metal_weight: row.metal_weight,
            primary_gemstone: row.primary_gemstone,
            gemstone_carat: row.gemstone_carat,
            ring_size: row.ring_size,
            chain_length: row.chain_length,
            style: row.style,
        }
    }
}

impl TryFrom<CustomizationOptionRow> for CustomizationOption {
    type Error = DomainError;

    fn try_from(row: CustomizationOptionRow) -> Result<Self, Self::Error> {
        Ok(CustomizationOption {
            id: row.id,
            kind: row.customization_type.parse().map_err(|_| {
                DomainError::Internal(format!(
                    "unknown customization type '{}'",
                    row.customization_type
                ))
            })?,
            name: row.name,
            value: row.value,
            price_modifier: row.price_modifier,
        })
    }
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: row.id,
            telegram_id: row.telegram_id,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            approved: row.approved,
            is_admin: row.is_admin,
            date_joined: row.date_joined,
        }
    }
}

/// A cart item joined with product slug, product name and brand name.
pub type CartLineRow = (CartItemRow, String, String, String);

pub fn cart_line(
    (row, product_slug, product_name, brand_name): CartLineRow,
) -> Result<CartLine, DomainError> {
    Ok(CartLine {
        id: row.id,
        product_id: row.product_id,
        product_slug,
        product_name,
        brand_name,
        quantity: row.quantity,
        unit_price: row.unit_price,
        customization: selection(row.customization)?,
        customization_price: row.customization_price,
        created_at: row.created_at,
    })
}

impl TryFrom<OrderItemRow> for OrderItemView {
    type Error = DomainError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        Ok(OrderItemView {
            id: row.id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            price: row.price,
            customization_price: row.customization_price,
            customization: selection(row.customization)?,
        })
    }
}

pub fn order_view(row: OrderRow, items: Vec<OrderItemRow>) -> Result<OrderView, DomainError> {
    Ok(OrderView {
        id: row.id,
        order_number: row.order_number,
        account_id: row.account_id,
        status: row.status.parse().map_err(|_| {
            DomainError::Internal(format!("unknown order status '{}'", row.status))
        })?,
        total_amount: row.total_amount,
        total_items: row.total_items,
        contact: OrderContact {
            customer_first_name: row.customer_first_name,
            customer_last_name: row.customer_last_name,
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            shipping_first_name: row.shipping_first_name,
            shipping_last_name: row.shipping_last_name,
            shipping_address: row.shipping_address,
            shipping_city: row.shipping_city,
            shipping_zip_code: row.shipping_zip_code,
            shipping_country: row.shipping_country,
            notes: row.notes,
        },
        created_at: row.created_at,
        updated_at: row.updated_at,
        items: items
            .into_iter()
            .map(OrderItemView::try_from)
            .collect::<Result<_, _>>()?,
    })
}
