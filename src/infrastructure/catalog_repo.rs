use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::catalog::{
    group_customizations, Brand, CatalogQuery, Category, CustomizationOption, Homepage,
    ProductDetail, ProductPage, ProductSort, ProductSummary, FEATURED_PRODUCTS, HOMEPAGE_BRANDS,
    PRODUCTS_PER_PAGE, RELATED_PRODUCTS,
};
use crate::domain::errors::DomainError;
use crate::domain::ports::CatalogRepository;
use crate::schema::{
    brands, categories, jewelry_specifications, product_customizations, products,
    watch_specifications,
};

use super::models::{
    product_summary, BrandRow, CategoryRow, CustomizationOptionRow, JewelrySpecRow,
    ProductListingRow, ProductRow, WatchSpecRow,
};

pub struct DieselCatalogRepository {
    pool: DbPool,
}

impl DieselCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// `%term%` for ILIKE with the wildcard characters of `term` escaped.
fn contains_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn summaries(rows: Vec<ProductListingRow>) -> Result<Vec<ProductSummary>, DomainError> {
    rows.into_iter().map(product_summary).collect()
}

fn category_id(conn: &mut PgConnection, slug: &str) -> Result<Uuid, DomainError> {
    categories::table
        .filter(categories::slug.eq(slug))
        .filter(categories::is_active.eq(true))
        .select(categories::id)
        .first(conn)
        .optional()?
        .ok_or(DomainError::NotFound("Category"))
}

fn brand_id(conn: &mut PgConnection, slug: &str) -> Result<Uuid, DomainError> {
    brands::table
        .filter(brands::slug.eq(slug))
        .filter(brands::is_active.eq(true))
        .select(brands::id)
        .first(conn)
        .optional()?
        .ok_or(DomainError::NotFound("Brand"))
}

impl CatalogRepository for DieselCatalogRepository {
    fn homepage(&self) -> Result<Homepage, DomainError> {
        let mut conn = self.pool.get()?;

        let featured: Vec<ProductListingRow> = products::table
            .inner_join(brands::table)
            .inner_join(categories::table)
            .filter(products::is_active.eq(true))
            .filter(products::show_on_homepage.eq(true))
            .select((
                ProductRow::as_select(),
                brands::name,
                brands::slug,
                categories::slug,
            ))
            .order(products::created_at.desc())
            .limit(FEATURED_PRODUCTS)
            .load(&mut conn)?;

        let top_categories = categories::table
            .filter(categories::is_active.eq(true))
            .filter(categories::parent_id.is_null())
            .select(CategoryRow::as_select())
            .order((categories::sort_order.asc(), categories::name.asc()))
            .load(&mut conn)?;

        let homepage_brands = brands::table
            .filter(brands::is_active.eq(true))
            .filter(brands::show_on_homepage.eq(true))
            .select(BrandRow::as_select())
            .order(brands::name.asc())
            .limit(HOMEPAGE_BRANDS)
            .load(&mut conn)?;

        Ok(Homepage {
            featured_products: summaries(featured)?,
            categories: top_categories.into_iter().map(Category::from).collect(),
            brands: homepage_brands.into_iter().map(Brand::from).collect(),
        })
    }

    fn list_products(&self, query: &CatalogQuery) -> Result<ProductPage, DomainError> {
        let mut conn = self.pool.get()?;

        let category = query
            .category
            .as_deref()
            .map(|slug| category_id(&mut conn, slug))
            .transpose()?;
        let brand = query
            .brand
            .as_deref()
            .map(|slug| brand_id(&mut conn, slug))
            .transpose()?;
        let pattern = query.search_term().map(contains_pattern);

        let filtered = || {
            let mut q = products::table
                .inner_join(brands::table)
                .inner_join(categories::table)
                .filter(products::is_active.eq(true))
                .into_boxed();
            if let Some(id) = category {
                q = q.filter(products::category_id.eq(id));
            }
            if let Some(id) = brand {
                q = q.filter(products::brand_id.eq(id));
            }
            if let Some(pattern) = &pattern {
                q = q.filter(
                    products::name
                        .ilike(pattern.clone())
                        .or(products::description.ilike(pattern.clone()))
                        .or(brands::name.ilike(pattern.clone())),
                );
            }
            q
        };

        let total: i64 = filtered().count().get_result(&mut conn)?;

        let listing = filtered().select((
            ProductRow::as_select(),
            brands::name,
            brands::slug,
            categories::slug,
        ));
        let listing = match query.sort {
            ProductSort::Name => listing.order(products::name.asc()),
            ProductSort::PriceLow => listing.order(products::price.asc()),
            ProductSort::PriceHigh => listing.order(products::price.desc()),
            ProductSort::Newest => listing.order(products::created_at.desc()),
            ProductSort::Rating => listing
                .order(products::rating_stars.desc())
                .then_order_by(products::review_count.desc()),
        };
        let rows: Vec<ProductListingRow> = listing
            .then_order_by(products::id.asc())
            .limit(PRODUCTS_PER_PAGE)
            .offset(query.offset())
            .load(&mut conn)?;

        Ok(ProductPage {
            items: summaries(rows)?,
            total,
            page: query.page(),
            per_page: PRODUCTS_PER_PAGE,
        })
    }

    fn product_detail(&self, slug: &str) -> Result<Option<ProductDetail>, DomainError> {
        let mut conn = self.pool.get()?;

        let found = products::table
            .inner_join(brands::table)
            .inner_join(categories::table)
            .filter(products::slug.eq(slug))
            .filter(products::is_active.eq(true))
            .select((
                ProductRow::as_select(),
                BrandRow::as_select(),
                CategoryRow::as_select(),
            ))
            .first::<(ProductRow, BrandRow, CategoryRow)>(&mut conn)
            .optional()?;
        let Some((product, brand, category)) = found else {
            return Ok(None);
        };

        let watch_specs = watch_specifications::table
            .find(product.id)
            .select(WatchSpecRow::as_select())
            .first(&mut conn)
            .optional()?;
        let jewelry_specs = jewelry_specifications::table
            .find(product.id)
            .select(JewelrySpecRow::as_select())
            .first(&mut conn)
            .optional()?;

        let options = product_customizations::table
            .filter(product_customizations::product_id.eq(product.id))
            .filter(product_customizations::is_available.eq(true))
            .select(CustomizationOptionRow::as_select())
            .order((
                product_customizations::customization_type.asc(),
                product_customizations::sort_order.asc(),
                product_customizations::name.asc(),
            ))
            .load(&mut conn)?
            .into_iter()
            .map(CustomizationOption::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let related: Vec<ProductListingRow> = products::table
            .inner_join(brands::table)
            .inner_join(categories::table)
            .filter(products::is_active.eq(true))
            .filter(products::category_id.eq(product.category_id))
            .filter(products::id.ne(product.id))
            .select((
                ProductRow::as_select(),
                brands::name,
                brands::slug,
                categories::slug,
            ))
            .order((products::is_featured.desc(), products::created_at.desc()))
            .limit(RELATED_PRODUCTS)
            .load(&mut conn)?;

        let description = product.description.clone();
        let summary = product_summary((
            product,
            brand.name.clone(),
            brand.slug.clone(),
            category.slug.clone(),
        ))?;

        Ok(Some(ProductDetail {
            product: summary,
            description,
            brand: brand.into(),
            category: category.into(),
            watch_specs: watch_specs.map(Into::into),
            jewelry_specs: jewelry_specs.map(Into::into),
            customizations: group_customizations(options),
            related: summaries(related)?,
        }))
    }

    fn categories(&self) -> Result<Vec<Category>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = categories::table
            .filter(categories::is_active.eq(true))
            .select(CategoryRow::as_select())
            .order((categories::sort_order.asc(), categories::name.asc()))
            .load(&mut conn)?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    fn brands(&self) -> Result<Vec<Brand>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = brands::table
            .filter(brands::is_active.eq(true))
            .select(BrandRow::as_select())
            .order(brands::name.asc())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(Brand::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{contains_pattern, DieselCatalogRepository};
    use crate::domain::catalog::{CatalogQuery, ProductSort};
    use crate::domain::customization::CustomizationKind;
    use crate::domain::errors::DomainError;
    use crate::domain::ports::CatalogRepository;
    use crate::infrastructure::test_support::{
        seed_catalog, seed_customization, seed_product, setup_db,
    };

    #[test]
    fn search_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("oak"), "%oak%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for the Postgres container"]
    async fn list_products_filters_sorts_and_counts() {
        let (_container, pool) = setup_db().await;
        let fixture = seed_catalog(&pool);
        seed_product(&pool, &fixture, "royal-oak", "6000.00", "in_stock");
        seed_product(&pool, &fixture, "code-11-59", "9000.00", "in_stock");
        seed_product(&pool, &fixture, "offshore", "4000.00", "limited");
        let repo = DieselCatalogRepository::new(pool);

        let page = repo
            .list_products(&CatalogQuery {
                category: Some("watches".to_string()),
                sort: ProductSort::PriceHigh,
                page: 1,
                ..CatalogQuery::default()
            })
            .expect("list failed");
        assert_eq!(page.total, 3);
        assert_eq!(page.items[0].slug, "code-11-59");
        assert_eq!(page.items[2].slug, "offshore");

        let searched = repo
            .list_products(&CatalogQuery {
                search: Some("  OAK ".to_string()),
                page: 1,
                ..CatalogQuery::default()
            })
            .expect("search failed");
        assert_eq!(searched.total, 1);
        assert_eq!(searched.items[0].slug, "royal-oak");

        let by_brand = repo
            .list_products(&CatalogQuery {
                search: Some("piguet".to_string()),
                page: 1,
                ..CatalogQuery::default()
            })
            .expect("brand search failed");
        assert_eq!(by_brand.total, 3);
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for the Postgres container"]
    async fn unknown_category_is_not_found() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCatalogRepository::new(pool);

        let result = repo.list_products(&CatalogQuery {
            category: Some("sunglasses".to_string()),
            ..CatalogQuery::default()
        });

        assert!(matches!(result, Err(DomainError::NotFound("Category"))));
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for the Postgres container"]
    async fn product_detail_groups_options_and_lists_related() {
        let (_container, pool) = setup_db().await;
        let fixture = seed_catalog(&pool);
        let id = seed_product(&pool, &fixture, "royal-oak", "6000.00", "in_stock");
        seed_product(&pool, &fixture, "offshore", "4000.00", "in_stock");
        seed_customization(&pool, id, "band_color", "black", "0");
        seed_customization(&pool, id, "band_color", "blue", "0");
        seed_customization(&pool, id, "engraving", "custom", "50");
        let repo = DieselCatalogRepository::new(pool);

        let detail = repo
            .product_detail("royal-oak")
            .expect("detail failed")
            .expect("product should exist");

        assert_eq!(detail.brand.slug, "audemars-piguet");
        assert_eq!(detail.customizations.len(), 2);
        assert_eq!(detail.customizations[0].kind, CustomizationKind::BandColor);
        assert_eq!(detail.customizations[0].options.len(), 2);
        assert_eq!(detail.related.len(), 1);
        assert_eq!(detail.related[0].slug, "offshore");
        assert!(repo.product_detail("missing").expect("lookup failed").is_none());
    }
}
