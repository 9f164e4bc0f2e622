//! HTTP client the chat bot uses to reach the account gateway.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::application::AdminAction;
use crate::domain::account::AccountProfile;
use crate::domain::order::OrderStatus;
use crate::handlers::accounts::{AccountResponse, IsAdminResponse, RegisterUserRequest};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend answered {status}: {message}")]
    Status { status: StatusCode, message: String },
}

/// Order as reported back after a status change.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdatedOrder {
    pub id: Uuid,
    pub order_number: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
struct OrderEnvelope {
    order: UpdatedOrder,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Result of an admin pressing a notification button.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Account(AccountResponse),
    Order(UpdatedOrder),
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
    api_secret: String,
}

impl BackendClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        api_secret: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_secret: api_secret.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/auth{path}", self.base_url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = request.bearer_auth(&self.api_secret).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.error)
            .unwrap_or(text);
        Err(BackendError::Status { status, message })
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        Ok(self.send(request).await?.json().await?)
    }

    /// Registers the user; the flag is true when the account was just created.
    pub async fn create_user(
        &self,
        profile: &AccountProfile,
    ) -> Result<(AccountResponse, bool), BackendError> {
        let body = RegisterUserRequest {
            telegram_id: profile.telegram_id,
            username: profile.username.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
        };
        let response = self.send(self.http.post(self.url("/users")).json(&body)).await?;
        let created = response.status() == StatusCode::CREATED;
        Ok((response.json().await?, created))
    }

    /// `None` when the backend does not know the user.
    pub async fn user_info(&self, telegram_id: i64) -> Result<Option<AccountResponse>, BackendError> {
        let request = self
            .http
            .get(self.url("/user-info"))
            .query(&[("telegram_id", telegram_id)]);
        match self.json(request).await {
            Ok(account) => Ok(Some(account)),
            Err(BackendError::Status { status, .. }) if status == StatusCode::NOT_FOUND => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Any failure counts as "not an admin".
    pub async fn is_admin(&self, telegram_id: i64) -> bool {
        let request = self
            .http
            .get(self.url("/check-admin"))
            .query(&[("telegram_id", telegram_id)]);
        match self.json::<IsAdminResponse>(request).await {
            Ok(body) => body.is_admin,
            Err(e) => {
                log::warn!("Admin check for {telegram_id} failed: {e}");
                false
            }
        }
    }

    pub async fn list_admins(&self) -> Result<Vec<AccountResponse>, BackendError> {
        self.json(self.http.get(self.url("/all-admins"))).await
    }

    pub async fn set_user_approval(
        &self,
        telegram_id: i64,
        approved: bool,
    ) -> Result<AccountResponse, BackendError> {
        let verb = if approved { "user-approve" } else { "user-reject" };
        self.json(self.http.post(self.url(&format!("/{verb}/{telegram_id}"))))
            .await
    }

    pub async fn set_order_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<UpdatedOrder, BackendError> {
        let request = self
            .http
            .post(self.url(&format!("/orders/{order_id}/status")))
            .json(&json!({ "status": status.as_str() }));
        let envelope: OrderEnvelope = self.json(request).await?;
        Ok(envelope.order)
    }

    pub async fn apply_admin_action(&self, action: AdminAction) -> Result<ActionOutcome, BackendError> {
        match action {
            AdminAction::ApproveUser(id) => self
                .set_user_approval(id, true)
                .await
                .map(ActionOutcome::Account),
            AdminAction::RejectUser(id) => self
                .set_user_approval(id, false)
                .await
                .map(ActionOutcome::Account),
            AdminAction::ApproveOrder(id) => self
                .set_order_status(id, OrderStatus::Confirmed)
                .await
                .map(ActionOutcome::Order),
            AdminAction::RejectOrder(id) => self
                .set_order_status(id, OrderStatus::Cancelled)
                .await
                .map(ActionOutcome::Order),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
    use serde_json::Value;

    use super::*;

    const SECRET: &str = "gateway-secret";
    const ORDER_ID: &str = "0b0f5a52-4a55-4a0e-9d1c-3f5d2f1a6b10";

    #[derive(Default)]
    struct Calls(Mutex<Vec<String>>);

    fn account(telegram_id: i64, approved: bool) -> Value {
        json!({
            "id": "5c4e1d53-2b8f-4d4e-8f2f-7a8e4c1f0a11",
            "telegram_id": telegram_id,
            "username": "jdoe",
            "first_name": "Jane",
            "last_name": null,
            "display_name": "Jane",
            "approved": approved,
            "is_admin": false,
            "date_joined": "2026-01-02T10:00:00+00:00"
        })
    }

    async fn gateway(req: HttpRequest, calls: web::Data<Calls>, body: web::Bytes) -> HttpResponse {
        let authorized = req
            .headers()
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            == Some(format!("Bearer {SECRET}").as_str());
        calls
            .0
            .lock()
            .expect("lock poisoned")
            .push(format!("{} {}", req.method(), req.uri()));
        if !authorized {
            return HttpResponse::Unauthorized()
                .json(json!({"success": false, "error": "Invalid bearer token"}));
        }

        let query = req.query_string();
        match (req.method().as_str(), req.path()) {
            ("POST", "/api/auth/users") => {
                let body: Value = serde_json::from_slice(&body).unwrap_or_default();
                let id = body["telegram_id"].as_i64().unwrap_or_default();
                if id == 7 {
                    HttpResponse::Created().json(account(7, false))
                } else {
                    HttpResponse::Ok().json(account(id, true))
                }
            }
            ("GET", "/api/auth/user-info") if query == "telegram_id=7" => {
                HttpResponse::Ok().json(account(7, false))
            }
            ("GET", "/api/auth/user-info") => HttpResponse::NotFound()
                .json(json!({"success": false, "error": "User not found"})),
            ("GET", "/api/auth/check-admin") => {
                HttpResponse::Ok().json(json!({"is_admin": query == "telegram_id=1"}))
            }
            ("GET", "/api/auth/all-admins") => HttpResponse::Ok().json(json!([account(1, true)])),
            ("POST", "/api/auth/user-approve/7") => HttpResponse::Ok().json(account(7, true)),
            ("POST", "/api/auth/user-reject/7") => HttpResponse::Ok().json(account(7, false)),
            ("POST", path) if path.ends_with("/status") => {
                let body: Value = serde_json::from_slice(&body).unwrap_or_default();
                if body["status"] == "confirmed" {
                    HttpResponse::Ok().json(json!({
                        "success": true,
                        "order": {
                            "id": ORDER_ID,
                            "order_number": "ORD-20260102-0A1B2C3D",
                            "status": "confirmed"
                        }
                    }))
                } else {
                    HttpResponse::BadRequest().json(json!({
                        "success": false,
                        "error": "Cannot move order from delivered to cancelled"
                    }))
                }
            }
            _ => HttpResponse::NotFound().finish(),
        }
    }

    /// Starts a stub gateway on an ephemeral port and returns its base URL.
    fn stub_gateway(calls: web::Data<Calls>) -> String {
        let server = HttpServer::new(move || {
            App::new()
                .app_data(calls.clone())
                .default_service(web::to(gateway))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind failed");
        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        format!("http://{addr}")
    }

    fn client(url: &str, secret: &str) -> BackendClient {
        BackendClient::new(url, secret, Duration::from_secs(5)).expect("client")
    }

    #[actix_web::test]
    async fn create_user_reports_whether_the_account_is_new() {
        let url = stub_gateway(web::Data::new(Calls::default()));
        let client = client(&url, SECRET);

        let profile = AccountProfile {
            telegram_id: 7,
            first_name: Some("Jane".to_string()),
            ..AccountProfile::default()
        };
        let (created, is_new) = client.create_user(&profile).await.expect("create");
        assert!(is_new);
        assert!(!created.approved);

        let profile = AccountProfile {
            telegram_id: 8,
            ..AccountProfile::default()
        };
        let (existing, is_new) = client.create_user(&profile).await.expect("fetch");
        assert!(!is_new);
        assert_eq!(existing.telegram_id, 8);
    }

    #[actix_web::test]
    async fn user_info_maps_not_found_to_none() {
        let url = stub_gateway(web::Data::new(Calls::default()));
        let client = client(&url, SECRET);

        let known = client.user_info(7).await.expect("lookup");
        assert_eq!(known.map(|a| a.telegram_id), Some(7));
        assert_eq!(client.user_info(99).await.expect("lookup"), None);
    }

    #[actix_web::test]
    async fn is_admin_is_false_on_any_failure() {
        let url = stub_gateway(web::Data::new(Calls::default()));

        assert!(client(&url, SECRET).is_admin(1).await);
        assert!(!client(&url, SECRET).is_admin(2).await);
        assert!(!client(&url, "wrong").is_admin(1).await);
        assert!(!client("http://127.0.0.1:9", SECRET).is_admin(1).await);
    }

    #[actix_web::test]
    async fn wrong_secret_surfaces_the_gateway_error() {
        let url = stub_gateway(web::Data::new(Calls::default()));

        let err = client(&url, "wrong")
            .list_admins()
            .await
            .expect_err("unauthorized");

        assert!(matches!(
            err,
            BackendError::Status { status, ref message }
                if status == StatusCode::UNAUTHORIZED && message == "Invalid bearer token"
        ));
    }

    #[actix_web::test]
    async fn admin_actions_dispatch_to_the_matching_endpoint() {
        let calls = web::Data::new(Calls::default());
        let url = stub_gateway(calls.clone());
        let client = client(&url, SECRET);
        let order_id: Uuid = ORDER_ID.parse().expect("uuid");

        let approved = client
            .apply_admin_action(AdminAction::ApproveUser(7))
            .await
            .expect("approve");
        assert!(matches!(approved, ActionOutcome::Account(ref a) if a.approved));

        let rejected = client
            .apply_admin_action(AdminAction::RejectUser(7))
            .await
            .expect("reject");
        assert!(matches!(rejected, ActionOutcome::Account(ref a) if !a.approved));

        let confirmed = client
            .apply_admin_action(AdminAction::ApproveOrder(order_id))
            .await
            .expect("confirm");
        assert!(matches!(confirmed, ActionOutcome::Order(ref o) if o.status == "confirmed"));

        let refused = client
            .apply_admin_action(AdminAction::RejectOrder(order_id))
            .await
            .expect_err("transition refused");
        assert!(matches!(
            refused,
            BackendError::Status { status, .. } if status == StatusCode::BAD_REQUEST
        ));

        let seen = calls.0.lock().expect("lock poisoned").clone();
        assert_eq!(
            seen,
            vec![
                "POST /api/auth/user-approve/7".to_string(),
                "POST /api/auth/user-reject/7".to_string(),
                format!("POST /api/auth/orders/{ORDER_ID}/status"),
                format!("POST /api/auth/orders/{ORDER_ID}/status"),
            ]
        );
    }
}
