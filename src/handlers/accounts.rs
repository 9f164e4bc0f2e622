//! Gateway endpoints used by the chat-bot backend. All of them require the
//! shared bearer secret.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::AdminMessage;
use crate::domain::account::{Account, AccountProfile};
use crate::domain::order::OrderStatus;
use crate::errors::AppError;
use crate::state::AppState;

use super::auth::BotAuth;
use super::notify_admins;
use super::orders::{OrderDetailResponse, OrderResponse};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterUserRequest {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    pub id: Uuid,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: String,
    pub approved: bool,
    pub is_admin: bool,
    pub date_joined: String,
}

impl From<&Account> for AccountResponse {
    fn from(a: &Account) -> Self {
        Self {
            id: a.id,
            telegram_id: a.telegram_id,
            username: a.username.clone(),
            first_name: a.first_name.clone(),
            last_name: a.last_name.clone(),
            display_name: a.display_name(),
            approved: a.approved,
            is_admin: a.is_admin,
            date_joined: a.date_joined.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TelegramIdParams {
    /// Telegram numeric user id.
    pub telegram_id: Option<String>,
}

impl TelegramIdParams {
    fn telegram_id(&self) -> Result<i64, AppError> {
        let raw = self
            .telegram_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Validation("telegram_id is required".to_string()))?;
        raw.parse()
            .map_err(|_| AppError::Validation("telegram_id must be an integer".to_string()))
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IsAdminResponse {
    pub is_admin: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SetOrderStatusRequest {
    /// One of pending, confirmed, processing, shipped, delivered, cancelled.
    pub status: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/auth/users
///
/// Registers the Telegram user, or refreshes the names of an existing one.
/// New accounts start unapproved and trigger an admin notification.
#[utoipa::path(
    post,
    path = "/api/auth/users",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 200, description = "Account already existed", body = AccountResponse),
        (status = 400, description = "Invalid telegram_id"),
        (status = 401, description = "Missing or wrong bearer token"),
    ),
    security(("bot_token" = [])),
    tag = "auth"
)]
pub async fn register_user(
    _auth: BotAuth,
    state: web::Data<AppState>,
    body: web::Json<RegisterUserRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let profile = AccountProfile {
        telegram_id: body.telegram_id,
        username: body.username,
        first_name: body.first_name,
        last_name: body.last_name,
    };

    let worker = state.clone();
    let registration = web::block(move || worker.accounts.register_or_fetch(&profile)).await??;

    let response = AccountResponse::from(&registration.account);
    if registration.created {
        notify_admins(state, AdminMessage::user_registered(&registration.account));
        Ok(HttpResponse::Created().json(response))
    } else {
        Ok(HttpResponse::Ok().json(response))
    }
}

/// GET /api/auth/user-info
#[utoipa::path(
    get,
    path = "/api/auth/user-info",
    params(TelegramIdParams),
    responses(
        (status = 200, description = "Account found", body = AccountResponse),
        (status = 400, description = "Missing or malformed telegram_id"),
        (status = 404, description = "Unknown user"),
    ),
    security(("bot_token" = [])),
    tag = "auth"
)]
pub async fn user_info(
    _auth: BotAuth,
    state: web::Data<AppState>,
    query: web::Query<TelegramIdParams>,
) -> Result<HttpResponse, AppError> {
    let telegram_id = query.telegram_id()?;

    let account = web::block(move || state.accounts.fetch(telegram_id)).await??;

    Ok(HttpResponse::Ok().json(AccountResponse::from(&account)))
}

/// GET /api/auth/check-admin
///
/// Unknown users are simply not admins.
#[utoipa::path(
    get,
    path = "/api/auth/check-admin",
    params(TelegramIdParams),
    responses(
        (status = 200, description = "Admin flag", body = IsAdminResponse),
        (status = 400, description = "Missing or malformed telegram_id"),
    ),
    security(("bot_token" = [])),
    tag = "auth"
)]
pub async fn check_admin(
    _auth: BotAuth,
    state: web::Data<AppState>,
    query: web::Query<TelegramIdParams>,
) -> Result<HttpResponse, AppError> {
    let telegram_id = query.telegram_id()?;

    let is_admin = web::block(move || state.accounts.is_admin(telegram_id)).await??;

    Ok(HttpResponse::Ok().json(IsAdminResponse { is_admin }))
}

/// GET /api/auth/all-admins
#[utoipa::path(
    get,
    path = "/api/auth/all-admins",
    responses(
        (status = 200, description = "Every administrator", body = [AccountResponse]),
    ),
    security(("bot_token" = [])),
    tag = "auth"
)]
pub async fn all_admins(
    _auth: BotAuth,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let admins = web::block(move || state.accounts.list_admins()).await??;

    let body: Vec<AccountResponse> = admins.iter().map(AccountResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /api/auth/user-approve/{telegram_id}
#[utoipa::path(
    post,
    path = "/api/auth/user-approve/{telegram_id}",
    params(
        ("telegram_id" = i64, Path, description = "Telegram numeric user id"),
    ),
    responses(
        (status = 200, description = "Account approved", body = AccountResponse),
        (status = 404, description = "Unknown user; nothing is created"),
    ),
    security(("bot_token" = [])),
    tag = "auth"
)]
pub async fn approve_user(
    _auth: BotAuth,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let telegram_id = path.into_inner();

    let account = web::block(move || state.accounts.approve(telegram_id)).await??;

    Ok(HttpResponse::Ok().json(AccountResponse::from(&account)))
}

/// POST /api/auth/user-reject/{telegram_id}
#[utoipa::path(
    post,
    path = "/api/auth/user-reject/{telegram_id}",
    params(
        ("telegram_id" = i64, Path, description = "Telegram numeric user id"),
    ),
    responses(
        (status = 200, description = "Account access revoked", body = AccountResponse),
        (status = 404, description = "Unknown user; nothing is created"),
    ),
    security(("bot_token" = [])),
    tag = "auth"
)]
pub async fn reject_user(
    _auth: BotAuth,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let telegram_id = path.into_inner();

    let account = web::block(move || state.accounts.reject(telegram_id)).await??;

    Ok(HttpResponse::Ok().json(AccountResponse::from(&account)))
}

/// POST /api/auth/orders/{order_id}/status
///
/// Moves an order along its lifecycle; transitions outside the lifecycle are
/// rejected with 400.
#[utoipa::path(
    post,
    path = "/api/auth/orders/{order_id}/status",
    params(
        ("order_id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = SetOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = OrderDetailResponse),
        (status = 400, description = "Unknown status or disallowed transition"),
        (status = 404, description = "Order not found"),
    ),
    security(("bot_token" = [])),
    tag = "auth"
)]
pub async fn set_order_status(
    _auth: BotAuth,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<SetOrderStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let status: OrderStatus = body.status.trim().parse()?;

    let order = web::block(move || state.orders.set_status(order_id, status)).await??;

    Ok(HttpResponse::Ok().json(OrderDetailResponse {
        success: true,
        order: OrderResponse::from(&order),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telegram_id_param_is_required_and_numeric() {
        let params = |v: Option<&str>| TelegramIdParams {
            telegram_id: v.map(str::to_string),
        };

        assert_eq!(params(Some(" 42 ")).telegram_id().ok(), Some(42));
        assert!(matches!(
            params(None).telegram_id(),
            Err(AppError::Validation(msg)) if msg == "telegram_id is required"
        ));
        assert!(matches!(
            params(Some("")).telegram_id(),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            params(Some("forty-two")).telegram_id(),
            Err(AppError::Validation(_))
        ));
    }
}
