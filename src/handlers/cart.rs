use std::collections::BTreeMap;
use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::cart::{CartLine, CartSnapshot, NewCartLine};
use crate::domain::customization::CustomizationSelection;
use crate::errors::AppError;
use crate::state::AppState;

use super::auth::CurrentAccount;
use super::money;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    /// Product slug.
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    /// Map of customization kind to chosen value, e.g. `{"engraving": "A.B."}`.
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub customization: Option<Value>,
    /// Decimal string or number; defaults to 0.
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "50.00")]
    pub customization_price: Option<Value>,
}

fn default_quantity() -> i32 {
    1
}

fn parse_price(value: Option<&Value>) -> Result<BigDecimal, AppError> {
    let invalid = || AppError::Validation("customization_price must be a decimal".to_string());
    match value {
        None | Some(Value::Null) => Ok(BigDecimal::zero()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(BigDecimal::zero()),
        Some(Value::String(s)) => BigDecimal::from_str(s.trim()).map_err(|_| invalid()),
        Some(Value::Number(n)) => BigDecimal::from_str(&n.to_string()).map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

impl AddToCartRequest {
    fn into_line(self) -> Result<NewCartLine, AppError> {
        Ok(NewCartLine {
            customization: CustomizationSelection::from_json(self.customization.as_ref())?,
            customization_price: parse_price(self.customization_price.as_ref())?,
            product_slug: self.product_id,
            quantity: self.quantity,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub item_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RemoveFromCartRequest {
    pub item_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartChangeResponse {
    pub success: bool,
    pub message: String,
    /// Sum of quantities across the cart.
    pub cart_item_count: i64,
    pub cart_total: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_total: Option<String>,
}

impl CartChangeResponse {
    fn new(message: &str, snapshot: &CartSnapshot) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            cart_item_count: snapshot.total_items,
            cart_total: money(&snapshot.total_price),
            item_total: None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_slug: String,
    pub product_name: String,
    pub brand_name: String,
    pub quantity: i32,
    pub unit_price: String,
    pub customization: BTreeMap<String, String>,
    pub customization_display: String,
    pub customization_price: String,
    pub line_total: String,
}

impl From<&CartLine> for CartItemResponse {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id,
            product_id: line.product_id,
            product_slug: line.product_slug.clone(),
            product_name: line.product_name.clone(),
            brand_name: line.brand_name.clone(),
            quantity: line.quantity,
            unit_price: money(&line.unit_price),
            customization: line.customization.to_map(),
            customization_display: line.customization.to_string(),
            customization_price: money(&line.customization_price),
            line_total: money(&line.line_total()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartBody {
    pub items: Vec<CartItemResponse>,
    pub total_items: i64,
    pub total_price: String,
    /// Number of distinct lines.
    pub item_count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub success: bool,
    pub cart: CartBody,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/add-to-cart
///
/// Adds a product configuration to the caller's cart. Re-adding an identical
/// configuration increases the quantity of the existing line.
#[utoipa::path(
    post,
    path = "/api/add-to-cart",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Item added", body = CartChangeResponse),
        (status = 400, description = "Invalid input or product out of stock"),
        (status = 401, description = "Unknown caller"),
        (status = 403, description = "Account not approved"),
        (status = 404, description = "Product not found"),
    ),
    security(("telegram_user" = [])),
    tag = "cart"
)]
pub async fn add_to_cart(
    state: web::Data<AppState>,
    CurrentAccount(account): CurrentAccount,
    body: web::Json<AddToCartRequest>,
) -> Result<HttpResponse, AppError> {
    let line = body.into_inner().into_line()?;

    let snapshot = web::block(move || {
        state.carts.add_item(account.id, &line)?;
        state.carts.snapshot(account.id)
    })
    .await??;

    Ok(HttpResponse::Ok().json(CartChangeResponse::new("Product added to cart", &snapshot)))
}

/// POST /api/update-cart-item
#[utoipa::path(
    post,
    path = "/api/update-cart-item",
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Quantity updated", body = CartChangeResponse),
        (status = 400, description = "Quantity below 1"),
        (status = 404, description = "Item not in the caller's cart"),
    ),
    security(("telegram_user" = [])),
    tag = "cart"
)]
pub async fn update_cart_item(
    state: web::Data<AppState>,
    CurrentAccount(account): CurrentAccount,
    body: web::Json<UpdateCartItemRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let (line, snapshot) = web::block(move || {
        let line = state
            .carts
            .update_quantity(account.id, body.item_id, body.quantity)?;
        Ok::<_, crate::domain::errors::DomainError>((line, state.carts.snapshot(account.id)?))
    })
    .await??;

    let mut response = CartChangeResponse::new("Cart updated", &snapshot);
    response.item_total = Some(money(&line.line_total()));
    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/remove-from-cart
#[utoipa::path(
    post,
    path = "/api/remove-from-cart",
    request_body = RemoveFromCartRequest,
    responses(
        (status = 200, description = "Item removed", body = CartChangeResponse),
        (status = 404, description = "Item not in the caller's cart"),
    ),
    security(("telegram_user" = [])),
    tag = "cart"
)]
pub async fn remove_from_cart(
    state: web::Data<AppState>,
    CurrentAccount(account): CurrentAccount,
    body: web::Json<RemoveFromCartRequest>,
) -> Result<HttpResponse, AppError> {
    let item_id = body.into_inner().item_id;

    let snapshot = web::block(move || {
        state.carts.remove_item(account.id, item_id)?;
        state.carts.snapshot(account.id)
    })
    .await??;

    Ok(HttpResponse::Ok().json(CartChangeResponse::new(
        "Product removed from cart",
        &snapshot,
    )))
}

/// GET /api/get-cart
///
/// Returns the cart with totals recomputed from the stored lines.
#[utoipa::path(
    get,
    path = "/api/get-cart",
    responses(
        (status = 200, description = "Current cart", body = CartResponse),
        (status = 401, description = "Unknown caller"),
    ),
    security(("telegram_user" = [])),
    tag = "cart"
)]
pub async fn get_cart(
    state: web::Data<AppState>,
    CurrentAccount(account): CurrentAccount,
) -> Result<HttpResponse, AppError> {
    let snapshot = web::block(move || state.carts.snapshot(account.id)).await??;

    Ok(HttpResponse::Ok().json(CartResponse {
        success: true,
        cart: CartBody {
            items: snapshot.items.iter().map(CartItemResponse::from).collect(),
            total_items: snapshot.total_items,
            total_price: money(&snapshot.total_price),
            item_count: snapshot.distinct_item_count,
        },
    }))
}

/// POST /api/clear-cart
#[utoipa::path(
    post,
    path = "/api/clear-cart",
    responses(
        (status = 200, description = "Cart emptied", body = SuccessResponse),
    ),
    security(("telegram_user" = [])),
    tag = "cart"
)]
pub async fn clear_cart(
    state: web::Data<AppState>,
    CurrentAccount(account): CurrentAccount,
) -> Result<HttpResponse, AppError> {
    web::block(move || state.carts.clear(account.id)).await??;

    Ok(HttpResponse::Ok().json(SuccessResponse {
        success: true,
        message: "Cart cleared".to_string(),
    }))
}
