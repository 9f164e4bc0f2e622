use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::catalog::{
    Brand, CatalogQuery, Category, CustomizationGroup, JewelrySpecs, ProductDetail, ProductSort,
    ProductSummary, WatchSpecs,
};
use crate::errors::AppError;
use crate::state::AppState;

use super::money;

// ── Response DTOs ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct BrandResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub founded_year: Option<i32>,
    pub country: String,
    pub website: String,
}

impl From<Brand> for BrandResponse {
    fn from(b: Brand) -> Self {
        Self {
            id: b.id,
            name: b.name,
            slug: b.slug,
            description: b.description,
            founded_year: b.founded_year,
            country: b.country,
            website: b.website,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub parent_id: Option<Uuid>,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            parent_id: c.parent_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductSummaryResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub brand: String,
    pub brand_slug: String,
    pub category_slug: String,
    pub short_description: String,
    pub price: String,
    pub original_price: Option<String>,
    pub is_on_sale: bool,
    pub discount_percentage: u32,
    pub stock_status: String,
    pub is_low_stock: bool,
    pub rating_stars: i32,
    pub review_count: i32,
    pub is_featured: bool,
    pub is_limited_edition: bool,
}

impl From<ProductSummary> for ProductSummaryResponse {
    fn from(p: ProductSummary) -> Self {
        Self {
            is_on_sale: p.is_on_sale(),
            discount_percentage: p.discount_percentage(),
            is_low_stock: p.is_low_stock(),
            price: money(&p.price),
            original_price: p.original_price.as_ref().map(money),
            stock_status: p.stock_status.to_string(),
            id: p.id,
            name: p.name,
            slug: p.slug,
            sku: p.sku,
            brand: p.brand_name,
            brand_slug: p.brand_slug,
            category_slug: p.category_slug,
            short_description: p.short_description,
            rating_stars: p.rating_stars,
            review_count: p.review_count,
            is_featured: p.is_featured,
            is_limited_edition: p.is_limited_edition,
        }
    }
}

fn summaries(items: Vec<ProductSummary>) -> Vec<ProductSummaryResponse> {
    items.into_iter().map(ProductSummaryResponse::from).collect()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HomeResponse {
    pub success: bool,
    pub featured_products: Vec<ProductSummaryResponse>,
    pub categories: Vec<CategoryResponse>,
    pub brands: Vec<BrandResponse>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductsParams {
    /// Category slug.
    pub category: Option<String>,
    /// Brand slug.
    pub brand: Option<String>,
    /// Matches product name, description and brand name.
    pub search: Option<String>,
    /// One of name, price_low, price_high, newest, rating.
    pub sort: Option<String>,
    /// 1-based page number.
    pub page: Option<i64>,
}

impl From<ProductsParams> for CatalogQuery {
    fn from(p: ProductsParams) -> Self {
        CatalogQuery {
            category: p.category.filter(|s| !s.trim().is_empty()),
            brand: p.brand.filter(|s| !s.trim().is_empty()),
            search: p.search,
            sort: p
                .sort
                .as_deref()
                .map(ProductSort::parse_lenient)
                .unwrap_or_default(),
            page: p.page.unwrap_or(1),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductPageResponse {
    pub success: bool,
    pub items: Vec<ProductSummaryResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
    pub sort: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WatchSpecsResponse {
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

impl From<WatchSpecs> for WatchSpecsResponse {
    fn from(w: WatchSpecs) -> Self {
        Self {
            case_material: w.case_material,
            case_size: w.case_size,
            movement: w.movement,
            movement_caliber: w.movement_caliber,
            power_reserve: w.power_reserve,
            dial_color: w.dial_color,
            crystal_type: w.crystal_type,
            water_resistance: w.water_resistance,
            bracelet_material: w.bracelet_material,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct JewelrySpecsResponse {
    pub jewelry_type: String,
    pub metal_type: String,
    pub metal_purity: String,
    pub metal_weight: Option<String>,
    pub primary_gemstone: String,
    pub gemstone_carat: Option<String>,
    pub ring_size: String,
    pub chain_length: String,
    pub style: String,
}

impl From<JewelrySpecs> for JewelrySpecsResponse {
    fn from(j: JewelrySpecs) -> Self {
        Self {
            jewelry_type: j.jewelry_type,
            metal_type: j.metal_type,
            metal_purity: j.metal_purity,
            metal_weight: j.metal_weight.as_ref().map(money),
            primary_gemstone: j.primary_gemstone,
            gemstone_carat: j.gemstone_carat.as_ref().map(money),
            ring_size: j.ring_size,
            chain_length: j.chain_length,
            style: j.style,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomizationOptionResponse {
    pub id: Uuid,
    pub name: String,
    pub value: String,
    pub price_modifier: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomizationGroupResponse {
    /// Customization kind, e.g. `band_color`.
    pub kind: String,
    pub label: String,
    pub options: Vec<CustomizationOptionResponse>,
}

impl From<CustomizationGroup> for CustomizationGroupResponse {
    fn from(g: CustomizationGroup) -> Self {
        Self {
            kind: g.kind.as_str().to_string(),
            label: g.kind.label().to_string(),
            options: g
                .options
                .into_iter()
                .map(|o| CustomizationOptionResponse {
                    id: o.id,
                    name: o.name,
                    value: o.value,
                    price_modifier: money(&o.price_modifier),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetailResponse {
    pub success: bool,
    pub product: ProductSummaryResponse,
    pub description: String,
    pub brand: BrandResponse,
    pub category: CategoryResponse,
    pub watch_specs: Option<WatchSpecsResponse>,
    pub jewelry_specs: Option<JewelrySpecsResponse>,
    pub customizations: Vec<CustomizationGroupResponse>,
    pub related_products: Vec<ProductSummaryResponse>,
}

impl From<ProductDetail> for ProductDetailResponse {
    fn from(d: ProductDetail) -> Self {
        Self {
            success: true,
            product: d.product.into(),
            description: d.description,
            brand: d.brand.into(),
            category: d.category.into(),
            watch_specs: d.watch_specs.map(Into::into),
            jewelry_specs: d.jewelry_specs.map(Into::into),
            customizations: d.customizations.into_iter().map(Into::into).collect(),
            related_products: summaries(d.related),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoriesResponse {
    pub success: bool,
    pub categories: Vec<CategoryResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BrandsResponse {
    pub success: bool,
    pub brands: Vec<BrandResponse>,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /api/home
#[utoipa::path(
    get,
    path = "/api/home",
    responses(
        (status = 200, description = "Homepage selections", body = HomeResponse),
    ),
    tag = "catalog"
)]
pub async fn home(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let homepage = web::block(move || state.catalog.homepage()).await??;

    Ok(HttpResponse::Ok().json(HomeResponse {
        success: true,
        featured_products: summaries(homepage.featured_products),
        categories: homepage.categories.into_iter().map(Into::into).collect(),
        brands: homepage.brands.into_iter().map(Into::into).collect(),
    }))
}

/// GET /api/products
///
/// Active products, 12 per page.
#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductsParams),
    responses(
        (status = 200, description = "Page of products", body = ProductPageResponse),
        (status = 404, description = "Unknown category or brand"),
    ),
    tag = "catalog"
)]
pub async fn list_products(
    state: web::Data<AppState>,
    query: web::Query<ProductsParams>,
) -> Result<HttpResponse, AppError> {
    let query = CatalogQuery::from(query.into_inner());
    let sort = query.sort;

    let page = web::block(move || state.catalog.list_products(&query)).await??;

    Ok(HttpResponse::Ok().json(ProductPageResponse {
        success: true,
        total: page.total,
        page: page.page,
        per_page: page.per_page,
        total_pages: page.total_pages(),
        sort: sort.as_str().to_string(),
        items: summaries(page.items),
    }))
}

/// GET /api/products/{slug}
#[utoipa::path(
    get,
    path = "/api/products/{slug}",
    params(
        ("slug" = String, Path, description = "Product slug"),
    ),
    responses(
        (status = 200, description = "Product with specifications and options", body = ProductDetailResponse),
        (status = 404, description = "Product not found or inactive"),
    ),
    tag = "catalog"
)]
pub async fn product_detail(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let slug = path.into_inner();

    let detail = web::block(move || state.catalog.product_detail(&slug)).await??;

    Ok(HttpResponse::Ok().json(ProductDetailResponse::from(detail)))
}

/// GET /api/categories
#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "Active categories", body = CategoriesResponse),
    ),
    tag = "catalog"
)]
pub async fn list_categories(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let categories = web::block(move || state.catalog.categories()).await??;

    Ok(HttpResponse::Ok().json(CategoriesResponse {
        success: true,
        categories: categories.into_iter().map(Into::into).collect(),
    }))
}

/// GET /api/brands
#[utoipa::path(
    get,
    path = "/api/brands",
    responses(
        (status = 200, description = "Active brands", body = BrandsResponse),
    ),
    tag = "catalog"
)]
pub async fn list_brands(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let brands = web::block(move || state.catalog.brands()).await??;

    Ok(HttpResponse::Ok().json(BrandsResponse {
        success: true,
        brands: brands.into_iter().map(Into::into).collect(),
    }))
}
