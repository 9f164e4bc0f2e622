//! Request identity: storefront shoppers and the chat-bot backend.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::domain::account::Account;
use crate::domain::errors::DomainError;
use crate::errors::AppError;
use crate::state::AppState;

/// Header carrying the shopper's Telegram ID, set by the edge that verified
/// the Web-App init data.
pub const TELEGRAM_USER_HEADER: &str = "X-Telegram-User-Id";

fn telegram_id(req: &HttpRequest) -> Result<i64, AppError> {
    let raw = req
        .headers()
        .get(TELEGRAM_USER_HEADER)
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;
    raw.to_str()
        .ok()
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::Unauthorized("Invalid Telegram user id".to_string()))
}

fn app_state(req: &HttpRequest) -> Result<web::Data<AppState>, AppError> {
    req.app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| AppError::Internal("application state is not configured".to_string()))
}

/// An approved storefront account.
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub Account);

impl FromRequest for CurrentAccount {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let lookup = telegram_id(req).and_then(|id| Ok((id, app_state(req)?)));
        Box::pin(async move {
            let (telegram_id, state) = lookup?;
            let account = match web::block(move || state.accounts.fetch(telegram_id)).await? {
                Ok(account) => account,
                Err(DomainError::NotFound(_)) => {
                    return Err(AppError::Unauthorized(
                        "Unknown Telegram user".to_string(),
                    ))
                }
                Err(e) => return Err(e.into()),
            };
            if !account.approved {
                return Err(AppError::Forbidden(
                    "Your account is awaiting administrator approval".to_string(),
                ));
            }
            Ok(CurrentAccount(account))
        })
    }
}

/// Caller presented the shared bot secret as a bearer token.
#[derive(Debug, Clone, Copy)]
pub struct BotAuth;

/// Compares SHA-256 digests in constant time so neither content nor length leaks.
fn secrets_match(presented: &str, expected: &str) -> bool {
    let presented = Sha256::digest(presented.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    presented.as_slice().ct_eq(expected.as_slice()).into()
}

fn check_bearer(req: &HttpRequest) -> Result<BotAuth, AppError> {
    let state = app_state(req)?;
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;
    if token.is_empty() || !secrets_match(token, &state.api_secret) {
        return Err(AppError::Unauthorized("Invalid bearer token".to_string()));
    }
    Ok(BotAuth)
}

impl FromRequest for BotAuth {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(check_bearer(req))
    }
}
