pub mod account_service;
pub mod cart_service;
pub mod catalog_service;
pub mod notifications;
pub mod order_service;

pub use account_service::AccountService;
pub use cart_service::CartService;
pub use catalog_service::CatalogService;
pub use notifications::{AdminAction, AdminMessage, NotificationRelay};
pub use order_service::OrderService;
