pub mod account;
pub mod cart;
pub mod catalog;
pub mod customization;
pub mod errors;
pub mod order;
pub mod ports;

/// Rows skipped before `page` (1-based); saturates instead of overflowing.
pub fn page_offset(page: i64, per_page: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(per_page.max(0))
}
