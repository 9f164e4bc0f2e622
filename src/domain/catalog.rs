use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive, Zero};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::customization::CustomizationKind;
use super::errors::DomainError;

pub const PRODUCTS_PER_PAGE: i64 = 12;
pub const FEATURED_PRODUCTS: i64 = 8;
pub const HOMEPAGE_BRANDS: i64 = 6;
pub const RELATED_PRODUCTS: i64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    InStock,
    Limited,
    PreOrder,
    OutOfStock,
}

impl StockStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            StockStatus::InStock => "in_stock",
            StockStatus::Limited => "limited",
            StockStatus::PreOrder => "pre_order",
            StockStatus::OutOfStock => "out_of_stock",
        }
    }

    pub fn is_purchasable(self) -> bool {
        self != StockStatus::OutOfStock
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StockStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_stock" => Ok(StockStatus::InStock),
            "limited" => Ok(StockStatus::Limited),
            "pre_order" => Ok(StockStatus::PreOrder),
            "out_of_stock" => Ok(StockStatus::OutOfStock),
            other => Err(DomainError::Internal(format!(
                "unknown stock status '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub founded_year: Option<i32>,
    pub country: String,
    pub website: String,
}

#[derive(Debug, Clone)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub parent_id: Option<Uuid>,
    pub sort_order: i32,
}

#[derive(Debug, Clone)]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub brand_name: String,
    pub brand_slug: String,
    pub category_slug: String,
    pub short_description: String,
    pub price: BigDecimal,
    pub original_price: Option<BigDecimal>,
    pub stock_status: StockStatus,
    pub stock_quantity: i32,
    pub low_stock_threshold: i32,
    pub rating_stars: i32,
    pub review_count: i32,
    pub is_featured: bool,
    pub is_limited_edition: bool,
    pub created_at: DateTime<Utc>,
}

impl ProductSummary {
    pub fn is_on_sale(&self) -> bool {
        matches!(&self.original_price, Some(original) if *original > self.price)
    }

    /// Whole-percent discount against the original price, 0 when not on sale.
    pub fn discount_percentage(&self) -> u32 {
        match &self.original_price {
            Some(original) if self.is_on_sale() && !original.is_zero() => {
                let ratio = (original - &self.price) * BigDecimal::from(100) / original.clone();
                ratio
                    .with_scale_round(0, RoundingMode::HalfEven)
                    .to_u32()
                    .unwrap_or(0)
            }
            _ => 0,
        }
    }

    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.low_stock_threshold
    }
}

#[derive(Debug, Clone)]
pub struct WatchSpecs {
    pub case_material: String,
    pub case_size: String,
    pub movement: String,
    pub movement_caliber: String,
    pub power_reserve: String,
    pub dial_color: String,
    pub crystal_type: String,
    pub water_resistance: String,
    pub bracelet_material: String,
}

#[derive(Debug, Clone)]
pub struct JewelrySpecs {
    pub jewelry_type: String,
    pub metal_type: String,
    pub metal_purity: String,
    pub metal_weight: Option<BigDecimal>,
    pub primary_gemstone: String,
    pub gemstone_carat: Option<BigDecimal>,
    pub ring_size: String,
    pub chain_length: String,
    pub style: String,
}

#[derive(Debug, Clone)]
pub struct CustomizationOption {
    pub id: Uuid,
    pub kind: CustomizationKind,
    pub name: String,
    pub value: String,
    pub price_modifier: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct CustomizationGroup {
    pub kind: CustomizationKind,
    pub options: Vec<CustomizationOption>,
}

/// Groups options by kind, preserving the order they arrive in.
pub fn group_customizations(options: Vec<CustomizationOption>) -> Vec<CustomizationGroup> {
    let mut groups: Vec<CustomizationGroup> = Vec::new();
    for option in options {
        match groups.iter_mut().find(|g| g.kind == option.kind) {
            Some(group) => group.options.push(option),
            None => groups.push(CustomizationGroup {
                kind: option.kind,
                options: vec![option],
            }),
        }
    }
    groups
}

#[derive(Debug, Clone)]
pub struct ProductDetail {
    pub product: ProductSummary,
    pub description: String,
    pub brand: Brand,
    pub category: Category,
    pub watch_specs: Option<WatchSpecs>,
    pub jewelry_specs: Option<JewelrySpecs>,
    pub customizations: Vec<CustomizationGroup>,
    pub related: Vec<ProductSummary>,
}

#[derive(Debug, Clone)]
pub struct Homepage {
    pub featured_products: Vec<ProductSummary>,
    pub categories: Vec<Category>,
    pub brands: Vec<Brand>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    #[default]
    Name,
    PriceLow,
    PriceHigh,
    Newest,
    Rating,
}

impl ProductSort {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductSort::Name => "name",
            ProductSort::PriceLow => "price_low",
            ProductSort::PriceHigh => "price_high",
            ProductSort::Newest => "newest",
            ProductSort::Rating => "rating",
        }
    }

    /// Unrecognised values fall back to sorting by name.
    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "price_low" => ProductSort::PriceLow,
            "price_high" => ProductSort::PriceHigh,
            "newest" => ProductSort::Newest,
            "rating" => ProductSort::Rating,
            _ => ProductSort::Name,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub search: Option<String>,
    pub sort: ProductSort,
    pub page: i64,
}

impl CatalogQuery {
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    pub fn offset(&self) -> i64 {
        super::page_offset(self.page(), PRODUCTS_PER_PAGE)
    }

    /// Trimmed search text, `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct ProductPage {
    pub items: Vec<ProductSummary>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

impl ProductPage {
    pub fn total_pages(&self) -> i64 {
        if self.total == 0 {
            1
        } else {
            (self.total + self.per_page - 1) / self.per_page
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: &str, original: Option<&str>) -> ProductSummary {
        ProductSummary {
            id: Uuid::new_v4(),
            name: "Submariner".to_string(),
            slug: "rolex-submariner".to_string(),
            sku: "ROL-1-SUBMARINER".to_string(),
            brand_name: "Rolex".to_string(),
            brand_slug: "rolex".to_string(),
            category_slug: "watches".to_string(),
            short_description: String::new(),
            price: price.parse().expect("valid decimal"),
            original_price: original.map(|o| o.parse().expect("valid decimal")),
            stock_status: StockStatus::InStock,
            stock_quantity: 3,
            low_stock_threshold: 5,
            rating_stars: 5,
            review_count: 0,
            is_featured: false,
            is_limited_edition: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn discount_is_rounded_percentage_of_original_price() {
        let p = product("7500.00", Some("10000.00"));
        assert!(p.is_on_sale());
        assert_eq!(p.discount_percentage(), 25);
    }

    #[test]
    fn no_discount_without_higher_original_price() {
        assert_eq!(product("100.00", None).discount_percentage(), 0);
        let p = product("100.00", Some("90.00"));
        assert!(!p.is_on_sale());
        assert_eq!(p.discount_percentage(), 0);
    }

    #[test]
    fn low_stock_is_inclusive_of_threshold() {
        let mut p = product("1.00", None);
        p.stock_quantity = 5;
        assert!(p.is_low_stock());
        p.stock_quantity = 6;
        assert!(!p.is_low_stock());
    }

    #[test]
    fn only_out_of_stock_blocks_purchase() {
        for status in ["in_stock", "limited", "pre_order"] {
            let parsed: StockStatus = status.parse().expect("known status");
            assert!(parsed.is_purchasable(), "{status} should be purchasable");
        }
        assert!(!StockStatus::OutOfStock.is_purchasable());
    }

    #[test]
    fn unknown_sort_falls_back_to_name() {
        assert_eq!(ProductSort::parse_lenient("price_high"), ProductSort::PriceHigh);
        assert_eq!(ProductSort::parse_lenient("popularity"), ProductSort::Name);
    }

    #[test]
    fn page_is_clamped_to_one() {
        let query = CatalogQuery {
            page: -3,
            ..CatalogQuery::default()
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.offset(), 0);

        let query = CatalogQuery {
            page: 3,
            ..CatalogQuery::default()
        };
        assert_eq!(query.offset(), 24);

        let query = CatalogQuery {
            page: i64::MAX,
            ..CatalogQuery::default()
        };
        assert_eq!(query.page(), i64::MAX);
        assert_eq!(query.offset(), i64::MAX);
    }

    #[test]
    fn blank_search_is_ignored() {
        let query = CatalogQuery {
            search: Some("   ".to_string()),
            ..CatalogQuery::default()
        };
        assert_eq!(query.search_term(), None);
    }

    #[test]
    fn customization_options_are_grouped_by_kind() {
        let option = |kind, value: &str| CustomizationOption {
            id: Uuid::new_v4(),
            kind,
            name: value.to_string(),
            value: value.to_string(),
            price_modifier: BigDecimal::zero(),
        };
        let groups = group_customizations(vec![
            option(CustomizationKind::BandColor, "black"),
            option(CustomizationKind::BandColor, "brown"),
            option(CustomizationKind::Engraving, "text"),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].kind, CustomizationKind::BandColor);
        assert_eq!(groups[0].options.len(), 2);
        assert_eq!(groups[1].kind, CustomizationKind::Engraving);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = ProductPage {
            items: vec![],
            total: 25,
            page: 1,
            per_page: PRODUCTS_PER_PAGE,
        };
        assert_eq!(page.total_pages(), 3);
    }
}
