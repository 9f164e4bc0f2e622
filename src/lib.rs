pub mod application;
pub mod bot_client;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;
pub mod state;

use std::error::Error;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

pub use config::Config;
pub use db::{create_pool, DbPool};
pub use state::AppState;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    if !applied.is_empty() {
        log::info!("Applied {} database migration(s)", applied.len());
    }
    Ok(())
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Storefront API", description = "Luxury watch and jewelry storefront"),
    paths(
        handlers::catalog::home,
        handlers::catalog::list_products,
        handlers::catalog::product_detail,
        handlers::catalog::list_categories,
        handlers::catalog::list_brands,
        handlers::cart::add_to_cart,
        handlers::cart::update_cart_item,
        handlers::cart::remove_from_cart,
        handlers::cart::get_cart,
        handlers::cart::clear_cart,
        handlers::orders::create_order,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::account_stats,
        handlers::accounts::register_user,
        handlers::accounts::user_info,
        handlers::accounts::check_admin,
        handlers::accounts::all_admins,
        handlers::accounts::approve_user,
        handlers::accounts::reject_user,
        handlers::accounts::set_order_status,
    ),
    components(schemas(
        handlers::catalog::BrandResponse,
        handlers::catalog::CategoryResponse,
        handlers::catalog::ProductSummaryResponse,
        handlers::catalog::HomeResponse,
        handlers::catalog::ProductPageResponse,
        handlers::catalog::WatchSpecsResponse,
        handlers::catalog::JewelrySpecsResponse,
        handlers::catalog::CustomizationOptionResponse,
        handlers::catalog::CustomizationGroupResponse,
        handlers::catalog::ProductDetailResponse,
        handlers::catalog::CategoriesResponse,
        handlers::catalog::BrandsResponse,
        handlers::cart::AddToCartRequest,
        handlers::cart::UpdateCartItemRequest,
        handlers::cart::RemoveFromCartRequest,
        handlers::cart::CartChangeResponse,
        handlers::cart::CartItemResponse,
        handlers::cart::CartBody,
        handlers::cart::CartResponse,
        handlers::cart::SuccessResponse,
        handlers::orders::CreateOrderRequest,
        handlers::orders::CreateOrderResponse,
        handlers::orders::OrderItemResponse,
        handlers::orders::ShippingResponse,
        handlers::orders::OrderResponse,
        handlers::orders::OrderDetailResponse,
        handlers::orders::ListOrdersResponse,
        handlers::orders::AccountStatsResponse,
        handlers::accounts::RegisterUserRequest,
        handlers::accounts::AccountResponse,
        handlers::accounts::IsAdminResponse,
        handlers::accounts::SetOrderStatusRequest,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "catalog", description = "Public product catalog"),
        (name = "cart", description = "Shopping cart of the calling Telegram user"),
        (name = "orders", description = "Checkout and order history"),
        (name = "auth", description = "Account gateway for the chat bot"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let Some(components) = openapi.components.as_mut() else {
            return;
        };
        components.add_security_scheme(
            "telegram_user",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                handlers::auth::TELEGRAM_USER_HEADER,
                "Telegram user id of the shopper",
            ))),
        );
        components.add_security_scheme(
            "bot_token",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("Shared API secret of the chat bot"))
                    .build(),
            ),
        );
    }
}

/// Registers every route, the extractor configs and the API docs.
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    use handlers::{accounts, cart, catalog, orders};

    cfg.app_data(handlers::json_config())
        .app_data(handlers::query_config())
        .app_data(handlers::path_config())
        .service(
            web::scope("/api")
                .route("/home", web::get().to(catalog::home))
                .route("/products", web::get().to(catalog::list_products))
                .route("/products/{slug}", web::get().to(catalog::product_detail))
                .route("/categories", web::get().to(catalog::list_categories))
                .route("/brands", web::get().to(catalog::list_brands))
                .route("/add-to-cart", web::post().to(cart::add_to_cart))
                .route("/update-cart-item", web::post().to(cart::update_cart_item))
                .route("/remove-from-cart", web::post().to(cart::remove_from_cart))
                .route("/get-cart", web::get().to(cart::get_cart))
                .route("/clear-cart", web::post().to(cart::clear_cart))
                .route("/create-order", web::post().to(orders::create_order))
                .route("/orders", web::get().to(orders::list_orders))
                .route("/orders/{order_number}", web::get().to(orders::get_order))
                .route("/account/stats", web::get().to(orders::account_stats))
                .service(
                    web::scope("/auth")
                        .route("/users", web::post().to(accounts::register_user))
                        .route("/user-info", web::get().to(accounts::user_info))
                        .route("/check-admin", web::get().to(accounts::check_admin))
                        .route("/all-admins", web::get().to(accounts::all_admins))
                        .route(
                            "/user-approve/{telegram_id}",
                            web::post().to(accounts::approve_user),
                        )
                        .route(
                            "/user-reject/{telegram_id}",
                            web::post().to(accounts::reject_user),
                        )
                        .route(
                            "/orders/{order_id}/status",
                            web::post().to(accounts::set_order_status),
                        ),
                ),
        )
        .service(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: web::Data<AppState>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(configure_app)
    })
    .bind((host.to_string(), port))?
    .run())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::test;
    use diesel::r2d2::{ConnectionManager, Pool};
    use serde_json::{json, Value};

    use super::*;
    use crate::infrastructure::DisabledNotifier;

    const SECRET: &str = "bot-secret";

    /// State over a pool that never connects; only paths rejected before any
    /// query can be exercised with it.
    fn offline_state() -> web::Data<AppState> {
        let manager = ConnectionManager::new("postgres://nobody@127.0.0.1:1/none");
        let pool = Pool::builder().min_idle(Some(0)).build_unchecked(manager);
        web::Data::new(AppState::new(
            pool,
            Arc::new(DisabledNotifier),
            SECRET.to_string(),
        ))
    }

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .app_data(offline_state())
                    .configure(configure_app),
            )
            .await
        };
    }

    async fn error_body(resp: actix_web::dev::ServiceResponse) -> Value {
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        body
    }

    #[actix_web::test]
    async fn cart_requires_telegram_header() {
        let app = app!();

        let req = test::TestRequest::get().uri("/api/get-cart").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = error_body(resp).await;
        assert_eq!(body["error"], "Authentication required");
    }

    #[actix_web::test]
    async fn malformed_telegram_header_is_unauthorized() {
        let app = app!();

        let req = test::TestRequest::post()
            .uri("/api/create-order")
            .insert_header((handlers::auth::TELEGRAM_USER_HEADER, "not-a-number"))
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn gateway_rejects_missing_or_wrong_bearer() {
        let app = app!();

        let missing = test::TestRequest::get().uri("/api/auth/all-admins").to_request();
        assert_eq!(
            test::call_service(&app, missing).await.status(),
            StatusCode::UNAUTHORIZED
        );

        let wrong = test::TestRequest::post()
            .uri("/api/auth/users")
            .insert_header(("Authorization", "Bearer guess"))
            .set_json(json!({ "telegram_id": 1 }))
            .to_request();
        let resp = test::call_service(&app, wrong).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = error_body(resp).await;
        assert_eq!(body["error"], "Invalid bearer token");
    }

    #[actix_web::test]
    async fn gateway_input_errors_are_bad_requests() {
        let app = app!();
        let bearer = ("Authorization", format!("Bearer {SECRET}"));

        let malformed = test::TestRequest::post()
            .uri("/api/auth/users")
            .insert_header(bearer.clone())
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, malformed).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        error_body(resp).await;

        let missing_id = test::TestRequest::get()
            .uri("/api/auth/check-admin")
            .insert_header(bearer.clone())
            .to_request();
        let resp = test::call_service(&app, missing_id).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = error_body(resp).await;
        assert_eq!(body["error"], "telegram_id is required");

        let bad_path = test::TestRequest::post()
            .uri("/api/auth/user-approve/abc")
            .insert_header(bearer.clone())
            .to_request();
        assert_eq!(
            test::call_service(&app, bad_path).await.status(),
            StatusCode::BAD_REQUEST
        );

        let unknown_status = test::TestRequest::post()
            .uri("/api/auth/orders/6f1c1f4e-8d9a-4d55-9d3e-1f0b2a6c7e01/status")
            .insert_header(bearer)
            .set_json(json!({ "status": "teleported" }))
            .to_request();
        assert_eq!(
            test::call_service(&app, unknown_status).await.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[actix_web::test]
    async fn openapi_document_lists_routes_and_schemes() {
        let app = app!();

        let req = test::TestRequest::get()
            .uri("/api-docs/openapi.json")
            .to_request();
        let doc: Value = test::call_and_read_body_json(&app, req).await;

        assert!(doc["paths"]["/api/add-to-cart"]["post"].is_object());
        assert!(doc["paths"]["/api/auth/orders/{order_id}/status"]["post"].is_object());
        assert_eq!(
            doc["components"]["securitySchemes"]["telegram_user"]["name"],
            handlers::auth::TELEGRAM_USER_HEADER
        );
        assert_eq!(
            doc["components"]["securitySchemes"]["bot_token"]["scheme"],
            "bearer"
        );
    }
}
