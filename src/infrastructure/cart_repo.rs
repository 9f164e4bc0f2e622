use chrono::Utc;
use diesel::pg::upsert::excluded;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::{CartLine, NewCartLine, MAX_QUANTITY};
use crate::domain::catalog::StockStatus;
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;
use crate::schema::{brands, cart_items, carts, products};

use super::models::{cart_line, CartItemRow, CartLineRow, CartRow, NewCartItemRow, NewCartRow};

pub struct DieselCartRepository {
    pool: DbPool,
}

impl DieselCartRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn find_cart(conn: &mut PgConnection, account_id: Uuid) -> QueryResult<Option<CartRow>> {
    carts::table
        .filter(carts::account_id.eq(account_id))
        .select(CartRow::as_select())
        .first(conn)
        .optional()
}

fn get_or_create_cart(conn: &mut PgConnection, account_id: Uuid) -> QueryResult<CartRow> {
    diesel::insert_into(carts::table)
        .values(&NewCartRow {
            id: Uuid::new_v4(),
            account_id,
        })
        .on_conflict(carts::account_id)
        .do_nothing()
        .execute(conn)?;
    carts::table
        .filter(carts::account_id.eq(account_id))
        .select(CartRow::as_select())
        .first(conn)
}

fn load_line(conn: &mut PgConnection, item_id: Uuid) -> Result<CartLine, DomainError> {
    let row: CartLineRow = cart_items::table
        .inner_join(products::table.inner_join(brands::table))
        .filter(cart_items::id.eq(item_id))
        .select((
            CartItemRow::as_select(),
            products::slug,
            products::name,
            brands::name,
        ))
        .first(conn)?;
    cart_line(row)
}

impl CartRepository for DieselCartRepository {
    fn add_item(&self, account_id: Uuid, line: &NewCartLine) -> Result<CartLine, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let (product_id, price, stock_status) = products::table
                .filter(products::slug.eq(&line.product_slug))
                .filter(products::is_active.eq(true))
                .select((products::id, products::price, products::stock_status))
                .first::<(Uuid, bigdecimal::BigDecimal, String)>(conn)
                .optional()?
                .ok_or(DomainError::NotFound("Product"))?;

            if !stock_status.parse::<StockStatus>()?.is_purchasable() {
                return Err(DomainError::OutOfStock(line.product_slug.clone()));
            }

            let cart = get_or_create_cart(conn, account_id)?;

            // Same product with an identical selection merges into one line.
            let item = diesel::insert_into(cart_items::table)
                .values(&NewCartItemRow {
                    id: Uuid::new_v4(),
                    cart_id: cart.id,
                    product_id,
                    quantity: line.quantity,
                    unit_price: price,
                    customization: line.customization.to_json(),
                    customization_key: line.customization.canonical_key(),
                    customization_price: line.customization_price.clone(),
                })
                .on_conflict((
                    cart_items::cart_id,
                    cart_items::product_id,
                    cart_items::customization_key,
                ))
                .do_update()
                .set((
                    cart_items::quantity.eq(cart_items::quantity + excluded(cart_items::quantity)),
                    cart_items::updated_at.eq(Utc::now()),
                ))
                .returning((cart_items::id, cart_items::quantity))
                .get_result::<(Uuid, i32)>(conn)?;
            let (item_id, merged_quantity) = item;
            // Rolls the merge back with the transaction.
            if merged_quantity > MAX_QUANTITY {
                return Err(DomainError::InvalidInput(format!(
                    "quantity cannot exceed {MAX_QUANTITY}"
                )));
            }

            diesel::update(carts::table.find(cart.id))
                .set(carts::updated_at.eq(Utc::now()))
                .execute(conn)?;

            load_line(conn, item_id)
        })
    }

    fn update_quantity(
        &self,
        account_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<CartLine, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let cart = find_cart(conn, account_id)?.ok_or(DomainError::NotFound("Cart item"))?;
            let updated = diesel::update(
                cart_items::table
                    .filter(cart_items::id.eq(item_id))
                    .filter(cart_items::cart_id.eq(cart.id)),
            )
            .set((
                cart_items::quantity.eq(quantity),
                cart_items::updated_at.eq(Utc::now()),
            ))
            .execute(conn)?;
            if updated == 0 {
                return Err(DomainError::NotFound("Cart item"));
            }
            load_line(conn, item_id)
        })
    }

    fn remove_item(&self, account_id: Uuid, item_id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let cart = find_cart(&mut conn, account_id)?.ok_or(DomainError::NotFound("Cart item"))?;
        let deleted = diesel::delete(
            cart_items::table
                .filter(cart_items::id.eq(item_id))
                .filter(cart_items::cart_id.eq(cart.id)),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(DomainError::NotFound("Cart item"));
        }
        Ok(())
    }

    fn clear(&self, account_id: Uuid) -> Result<usize, DomainError> {
        let mut conn = self.pool.get()?;

        let Some(cart) = find_cart(&mut conn, account_id)? else {
            return Ok(0);
        };
        let deleted = diesel::delete(cart_items::table.filter(cart_items::cart_id.eq(cart.id)))
            .execute(&mut conn)?;
        Ok(deleted)
    }

    fn items(&self, account_id: Uuid) -> Result<Vec<CartLine>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows: Vec<CartLineRow> = cart_items::table
            .inner_join(carts::table)
            .inner_join(products::table.inner_join(brands::table))
            .filter(carts::account_id.eq(account_id))
            .select((
                CartItemRow::as_select(),
                products::slug,
                products::name,
                brands::name,
            ))
            .order(cart_items::created_at.asc())
            .load(&mut conn)?;

        rows.into_iter().map(cart_line).collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use uuid::Uuid;

    use super::DieselCartRepository;
    use crate::domain::cart::{CartSnapshot, NewCartLine, MAX_QUANTITY};
    use crate::domain::customization::CustomizationSelection;
    use crate::domain::errors::DomainError;
    use crate::domain::ports::CartRepository;
    use crate::infrastructure::test_support::{
        decimal, seed_account, seed_catalog, seed_product, setup_db,
    };

    fn line(slug: &str, quantity: i32, customization: serde_json::Value, price: &str) -> NewCartLine {
        NewCartLine {
            product_slug: slug.to_string(),
            quantity,
            customization: CustomizationSelection::from_json(Some(&customization))
                .expect("valid selection"),
            customization_price: decimal(price),
        }
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for the Postgres container"]
    async fn add_item_snapshots_current_price() {
        let (_container, pool) = setup_db().await;
        let fixture = seed_catalog(&pool);
        seed_product(&pool, &fixture, "royal-oak", "6000.00", "in_stock");
        let account = seed_account(&pool, 10, true, false);
        let repo = DieselCartRepository::new(pool);

        let added = repo
            .add_item(account.id, &line("royal-oak", 1, json!({}), "0"))
            .expect("add failed");

        assert_eq!(added.quantity, 1);
        assert_eq!(added.unit_price, decimal("6000.00"));
        assert_eq!(repo.items(account.id).expect("items failed").len(), 1);
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for the Postgres container"]
    async fn identical_configuration_merges_regardless_of_key_order() {
        let (_container, pool) = setup_db().await;
        let fixture = seed_catalog(&pool);
        seed_product(&pool, &fixture, "royal-oak", "6000.00", "in_stock");
        let account = seed_account(&pool, 10, true, false);
        let repo = DieselCartRepository::new(pool);

        repo.add_item(
            account.id,
            &line(
                "royal-oak",
                1,
                json!({"engraving": "A.B.", "band_color": "black"}),
                "50",
            ),
        )
        .expect("add failed");
        let merged = repo
            .add_item(
                account.id,
                &line(
                    "royal-oak",
                    2,
                    json!({"band_color": "black", "engraving": "A.B."}),
                    "50",
                ),
            )
            .expect("add failed");
        repo.add_item(
            account.id,
            &line("royal-oak", 1, json!({"engraving": "C.D."}), "50"),
        )
        .expect("add failed");

        let items = repo.items(account.id).expect("items failed");
        assert_eq!(merged.quantity, 3);
        assert_eq!(items.len(), 2);

        let snapshot = CartSnapshot::from_lines(items);
        assert_eq!(snapshot.total_items, 4);
        assert_eq!(snapshot.total_price, decimal("24200.00"));
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for the Postgres container"]
    async fn out_of_stock_and_unknown_products_are_rejected() {
        let (_container, pool) = setup_db().await;
        let fixture = seed_catalog(&pool);
        seed_product(&pool, &fixture, "nautilus", "30000.00", "out_of_stock");
        let account = seed_account(&pool, 10, true, false);
        let repo = DieselCartRepository::new(pool);

        assert!(matches!(
            repo.add_item(account.id, &line("nautilus", 1, json!({}), "0")),
            Err(DomainError::OutOfStock(_))
        ));
        assert!(matches!(
            repo.add_item(account.id, &line("no-such-watch", 1, json!({}), "0")),
            Err(DomainError::NotFound(_))
        ));
        assert!(repo.items(account.id).expect("items failed").is_empty());
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for the Postgres container"]
    async fn items_of_other_accounts_are_not_found() {
        let (_container, pool) = setup_db().await;
        let fixture = seed_catalog(&pool);
        seed_product(&pool, &fixture, "royal-oak", "6000.00", "in_stock");
        let owner = seed_account(&pool, 10, true, false);
        let stranger = seed_account(&pool, 11, true, false);
        let repo = DieselCartRepository::new(pool);
        let added = repo
            .add_item(owner.id, &line("royal-oak", 1, json!({}), "0"))
            .expect("add failed");
        repo.add_item(stranger.id, &line("royal-oak", 1, json!({}), "0"))
            .expect("add failed");

        assert!(matches!(
            repo.update_quantity(stranger.id, added.id, 5),
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            repo.remove_item(stranger.id, added.id),
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            repo.remove_item(owner.id, Uuid::new_v4()),
            Err(DomainError::NotFound(_))
        ));

        let updated = repo
            .update_quantity(owner.id, added.id, 5)
            .expect("update failed");
        assert_eq!(updated.quantity, 5);
        assert_eq!(repo.clear(owner.id).expect("clear failed"), 1);
        assert!(repo.items(owner.id).expect("items failed").is_empty());
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for the Postgres container"]
    async fn merge_past_the_quantity_cap_is_rejected_and_rolled_back() {
        let (_container, pool) = setup_db().await;
        let fixture = seed_catalog(&pool);
        seed_product(&pool, &fixture, "royal-oak", "6000.00", "in_stock");
        let account = seed_account(&pool, 10, true, false);
        let repo = DieselCartRepository::new(pool);

        repo.add_item(account.id, &line("royal-oak", MAX_QUANTITY, json!({}), "0"))
            .expect("add failed");

        assert!(matches!(
            repo.add_item(account.id, &line("royal-oak", 1, json!({}), "0")),
            Err(DomainError::InvalidInput(_))
        ));
        let items = repo.items(account.id).expect("items failed");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, MAX_QUANTITY);
    }
}
