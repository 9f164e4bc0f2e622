pub mod accounts;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;

use actix_web::{error, web, HttpRequest};
use bigdecimal::{BigDecimal, RoundingMode};

use crate::application::AdminMessage;
use crate::errors::AppError;
use crate::state::AppState;

/// Money on the wire: a decimal string with two places, e.g. `"6050.00"`.
pub(crate) fn money(value: &BigDecimal) -> String {
    value.with_scale_round(2, RoundingMode::HalfUp).to_string()
}

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req: &HttpRequest| AppError::Validation(err.to_string()).into())
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req: &HttpRequest| AppError::Validation(err.to_string()).into())
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err: error::PathError, _req: &HttpRequest| {
        AppError::Validation(err.to_string()).into()
    })
}

/// Fires `message` at every admin in the background. Failures are logged and
/// never reach the request that triggered them.
pub(crate) fn notify_admins(state: web::Data<AppState>, message: AdminMessage) {
    actix_web::rt::spawn(async move {
        let lookup = state.clone();
        let admins = match web::block(move || lookup.accounts.list_admins()).await {
            Ok(Ok(admins)) => admins,
            Ok(Err(e)) => {
                log::warn!("Could not load admins to notify: {e}");
                return;
            }
            Err(e) => {
                log::warn!("Could not load admins to notify: {e}");
                return;
            }
        };
        let recipients: Vec<i64> = admins.iter().map(|a| a.telegram_id).collect();
        let report = state.relay.broadcast(&recipients, &message).await;
        log::info!(
            "Admin notification delivered to {}/{} admins",
            report.delivered,
            recipients.len()
        );
    });
}
