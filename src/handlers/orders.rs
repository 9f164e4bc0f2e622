use std::collections::BTreeMap;

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::order_service::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::application::AdminMessage;
use crate::domain::order::{OrderItemView, OrderNumber, OrderView, ShippingInfo};
use crate::errors::AppError;
use crate::state::AppState;

use super::auth::CurrentAccount;
use super::{money, notify_admins};

// ── Request / response DTOs ──────────────────────────────────────────────────

/// Checkout form. Names, email and phone fall back to the account profile;
/// address, city and country are required.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
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

impl From<CreateOrderRequest> for ShippingInfo {
    fn from(r: CreateOrderRequest) -> Self {
        ShippingInfo {
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            phone: r.phone,
            shipping_first_name: r.shipping_first_name,
            shipping_last_name: r.shipping_last_name,
            address: r.address,
            city: r.city,
            zip_code: r.zip_code,
            country: r.country,
            notes: r.notes,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOrderResponse {
    pub success: bool,
    pub message: String,
    pub order_number: String,
    pub order_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub price: String,
    pub customization_price: String,
    pub customization: BTreeMap<String, String>,
    pub line_total: String,
}

impl From<&OrderItemView> for OrderItemResponse {
    fn from(item: &OrderItemView) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            price: money(&item.price),
            customization_price: money(&item.customization_price),
            customization: item.customization.to_map(),
            line_total: money(&item.line_total()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShippingResponse {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub country: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub status: String,
    pub total_amount: String,
    pub total_items: i32,
    pub customer_first_name: String,
    pub customer_last_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping: ShippingResponse,
    pub notes: String,
    pub created_at: String,
    pub updated_at: String,
    pub items: Vec<OrderItemResponse>,
}

impl From<&OrderView> for OrderResponse {
    fn from(order: &OrderView) -> Self {
        let c = &order.contact;
        Self {
            id: order.id,
            order_number: order.order_number.clone(),
            status: order.status.to_string(),
            total_amount: money(&order.total_amount),
            total_items: order.total_items,
            customer_first_name: c.customer_first_name.clone(),
            customer_last_name: c.customer_last_name.clone(),
            customer_email: c.customer_email.clone(),
            customer_phone: c.customer_phone.clone(),
            shipping: ShippingResponse {
                first_name: c.shipping_first_name.clone(),
                last_name: c.shipping_last_name.clone(),
                address: c.shipping_address.clone(),
                city: c.shipping_city.clone(),
                zip_code: c.shipping_zip_code.clone(),
                country: c.shipping_country.clone(),
            },
            notes: c.notes.clone(),
            created_at: order.created_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
            items: order.items.iter().map(OrderItemResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetailResponse {
    pub success: bool,
    pub order: OrderResponse,
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub success: bool,
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AccountStatsResponse {
    pub success: bool,
    pub order_count: i64,
    pub total_spent: String,
    pub total_order_value: String,
    pub pending_value: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/create-order
///
/// Turns the caller's cart into a pending order and empties the cart, all in
/// one transaction. Admins are notified in the background once it commits.
#[utoipa::path(
    post,
    path = "/api/create-order",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order created", body = CreateOrderResponse),
        (status = 400, description = "Incomplete shipping form or empty cart"),
        (status = 401, description = "Unknown caller"),
        (status = 403, description = "Account not approved"),
    ),
    security(("telegram_user" = [])),
    tag = "orders"
)]
pub async fn create_order(
    state: web::Data<AppState>,
    CurrentAccount(account): CurrentAccount,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let shipping = ShippingInfo::from(body.into_inner());

    let worker = state.clone();
    let order = web::block(move || worker.orders.create_from_cart(&account, &shipping)).await??;

    notify_admins(state, AdminMessage::order_created(&order));

    Ok(HttpResponse::Ok().json(CreateOrderResponse {
        success: true,
        message: "Order created successfully".to_string(),
        order_number: order.order_number,
        order_id: order.id,
    }))
}

/// GET /api/orders
///
/// The caller's orders, newest first, with their items.
#[utoipa::path(
    get,
    path = "/api/orders",
    params(ListOrdersParams),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
    ),
    security(("telegram_user" = [])),
    tag = "orders"
)]
pub async fn list_orders(
    state: web::Data<AppState>,
    CurrentAccount(account): CurrentAccount,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, MAX_PAGE_SIZE);

    let result = web::block(move || state.orders.list_orders(account.id, page, limit)).await??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        success: true,
        items: result.items.iter().map(OrderResponse::from).collect(),
        total: result.total,
        page,
        limit,
    }))
}

/// GET /api/orders/{order_number}
#[utoipa::path(
    get,
    path = "/api/orders/{order_number}",
    params(
        ("order_number" = String, Path, description = "Order number, e.g. ORD-20260102-0A1B2C3D"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderDetailResponse),
        (status = 400, description = "Malformed order number"),
        (status = 404, description = "No such order for this account"),
    ),
    security(("telegram_user" = [])),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    CurrentAccount(account): CurrentAccount,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let number: OrderNumber = path.into_inner().parse()?;

    let order = web::block(move || state.orders.get_for_account(account.id, number.as_str()))
        .await??;

    Ok(HttpResponse::Ok().json(OrderDetailResponse {
        success: true,
        order: OrderResponse::from(&order),
    }))
}

/// GET /api/account/stats
///
/// Spending summary, recomputed from the caller's orders on every call.
#[utoipa::path(
    get,
    path = "/api/account/stats",
    responses(
        (status = 200, description = "Order statistics", body = AccountStatsResponse),
    ),
    security(("telegram_user" = [])),
    tag = "orders"
)]
pub async fn account_stats(
    state: web::Data<AppState>,
    CurrentAccount(account): CurrentAccount,
) -> Result<HttpResponse, AppError> {
    let stats = web::block(move || state.orders.statistics(account.id)).await??;

    Ok(HttpResponse::Ok().json(AccountStatsResponse {
        success: true,
        order_count: stats.order_count,
        total_spent: money(&stats.total_spent),
        total_order_value: money(&stats.total_order_value),
        pending_value: money(&stats.pending_value),
    }))
}
