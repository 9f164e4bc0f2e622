use std::sync::Arc;

use crate::application::{
    AccountService, CartService, CatalogService, NotificationRelay, OrderService,
};
use crate::db::DbPool;
use crate::domain::ports::AdminNotifier;
use crate::infrastructure::{
    DieselAccountRepository, DieselCartRepository, DieselCatalogRepository, DieselOrderRepository,
};

/// Everything a handler needs, built once at startup and shared via `web::Data`.
pub struct AppState {
    pub catalog: CatalogService<DieselCatalogRepository>,
    pub carts: CartService<DieselCartRepository>,
    pub orders: OrderService<DieselOrderRepository>,
    pub accounts: AccountService<DieselAccountRepository>,
    pub relay: NotificationRelay,
    pub api_secret: String,
}

impl AppState {
    pub fn new(pool: DbPool, notifier: Arc<dyn AdminNotifier>, api_secret: String) -> Self {
        Self {
            catalog: CatalogService::new(DieselCatalogRepository::new(pool.clone())),
            carts: CartService::new(DieselCartRepository::new(pool.clone())),
            orders: OrderService::new(DieselOrderRepository::new(pool.clone())),
            accounts: AccountService::new(DieselAccountRepository::new(pool)),
            relay: NotificationRelay::new(notifier),
            api_secret,
        }
    }
}
