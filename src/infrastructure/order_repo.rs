use bigdecimal::{BigDecimal, Zero};
use chrono::Utc;
use diesel::dsl::{count_star, exists, sum};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::total_quantity;
use crate::domain::errors::DomainError;
use crate::domain::page_offset;
use crate::domain::order::{
    order_total, ListResult, OrderContact, OrderNumber, OrderStatus, OrderView, StatusTotal,
};
use crate::domain::ports::OrderRepository;
use crate::schema::{cart_items, carts, order_items, orders, products};

use super::models::{
    order_view, CartItemRow, CartRow, NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow,
};

/// Attempts at drawing an unused order number before giving up.
const ORDER_NUMBER_ATTEMPTS: usize = 5;

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn load_view(conn: &mut PgConnection, order: OrderRow) -> Result<OrderView, DomainError> {
    let items = OrderItemRow::belonging_to(&order)
        .select(OrderItemRow::as_select())
        .order(order_items::created_at.asc())
        .load(conn)?;
    order_view(order, items)
}

fn unused_order_number(
    conn: &mut PgConnection,
    next_number: &dyn Fn() -> OrderNumber,
) -> Result<OrderNumber, DomainError> {
    for _ in 0..ORDER_NUMBER_ATTEMPTS {
        let candidate = next_number();
        let taken: bool = diesel::select(exists(
            orders::table.filter(orders::order_number.eq(candidate.as_str())),
        ))
        .get_result(conn)?;
        if !taken {
            return Ok(candidate);
        }
        log::warn!("Order number {} already taken, drawing another", candidate.as_str());
    }
    Err(DomainError::Internal(
        "could not generate a unique order number".to_string(),
    ))
}

impl OrderRepository for DieselOrderRepository {
    fn create_from_cart(
        &self,
        account_id: Uuid,
        contact: &OrderContact,
        next_number: &dyn Fn() -> OrderNumber,
    ) -> Result<OrderView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Lock the cart so concurrent checkouts of the same cart serialize.
            let cart = carts::table
                .filter(carts::account_id.eq(account_id))
                .select(CartRow::as_select())
                .for_update()
                .first(conn)
                .optional()?
                .ok_or(DomainError::EmptyCart)?;

            let lines: Vec<(CartItemRow, String)> = cart_items::table
                .inner_join(products::table)
                .filter(cart_items::cart_id.eq(cart.id))
                .select((CartItemRow::as_select(), products::name))
                .order(cart_items::created_at.asc())
                .load(conn)?;
            if lines.is_empty() {
                return Err(DomainError::EmptyCart);
            }

            let total_amount = order_total(lines.iter().map(|(item, _)| {
                (&item.unit_price, &item.customization_price, item.quantity)
            }))?;
            let total_items = total_quantity(lines.iter().map(|(item, _)| item.quantity))?;

            // 2. Insert the order under a number nobody holds yet
            let order_id = Uuid::new_v4();
            let order_number = unused_order_number(conn, next_number)?;
            diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: order_id,
                    order_number: order_number.into_string(),
                    account_id,
                    status: OrderStatus::Pending.as_str().to_string(),
                    total_amount,
                    total_items,
                    customer_first_name: contact.customer_first_name.clone(),
                    customer_last_name: contact.customer_last_name.clone(),
                    customer_email: contact.customer_email.clone(),
                    customer_phone: contact.customer_phone.clone(),
                    shipping_first_name: contact.shipping_first_name.clone(),
                    shipping_last_name: contact.shipping_last_name.clone(),
                    shipping_address: contact.shipping_address.clone(),
                    shipping_city: contact.shipping_city.clone(),
                    shipping_zip_code: contact.shipping_zip_code.clone(),
                    shipping_country: contact.shipping_country.clone(),
                    notes: contact.notes.clone(),
                })
                .execute(conn)?;

            // 3. Freeze every cart line into an order item
            let new_items: Vec<NewOrderItemRow> = lines
                .into_iter()
                .map(|(item, product_name)| NewOrderItemRow {
                    id: Uuid::new_v4(),
                    order_id,
                    product_id: item.product_id,
                    product_name,
                    quantity: item.quantity,
                    price: item.unit_price,
                    customization_price: item.customization_price,
                    customization: item.customization,
                })
                .collect();
            diesel::insert_into(order_items::table)
                .values(&new_items)
                .execute(conn)?;

            // 4. Empty the cart in the same transaction
            diesel::delete(cart_items::table.filter(cart_items::cart_id.eq(cart.id)))
                .execute(conn)?;
            diesel::update(carts::table.find(cart.id))
                .set(carts::updated_at.eq(Utc::now()))
                .execute(conn)?;

            let order = orders::table
                .find(order_id)
                .select(OrderRow::as_select())
                .first(conn)?;
            load_view(conn, order)
        })
    }

    fn find_by_number(&self, order_number: &str) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .filter(orders::order_number.eq(order_number))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        order.map(|order| load_view(&mut conn, order)).transpose()
    }

    fn list_for_account(
        &self,
        account_id: Uuid,
        page: i64,
        limit: i64,
    ) -> Result<ListResult, DomainError> {
        let mut conn = self.pool.get()?;

        let offset = page_offset(page, limit);
        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = orders::table
                .filter(orders::account_id.eq(account_id))
                .count()
                .get_result(conn)?;

            let rows = orders::table
                .filter(orders::account_id.eq(account_id))
                .select(OrderRow::as_select())
                .order(orders::created_at.desc())
                .limit(limit)
                .offset(offset)
                .load(conn)?;

            let items = OrderItemRow::belonging_to(&rows)
                .select(OrderItemRow::as_select())
                .order(order_items::created_at.asc())
                .load(conn)?
                .grouped_by(&rows);

            Ok(ListResult {
                items: rows
                    .into_iter()
                    .zip(items)
                    .map(|(order, items)| order_view(order, items))
                    .collect::<Result<_, _>>()?,
                total,
            })
        })
    }

    fn totals_by_status(&self, account_id: Uuid) -> Result<Vec<StatusTotal>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows: Vec<(String, i64, Option<BigDecimal>)> = orders::table
            .filter(orders::account_id.eq(account_id))
            .group_by(orders::status)
            .select((orders::status, count_star(), sum(orders::total_amount)))
            .load(&mut conn)?;

        rows.into_iter()
            .map(|(status, count, amount)| {
                Ok(StatusTotal {
                    status: status.parse()?,
                    count,
                    amount: amount.unwrap_or_else(BigDecimal::zero),
                })
            })
            .collect()
    }

    fn set_status(&self, id: Uuid, status: OrderStatus) -> Result<OrderView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let order = orders::table
                .find(id)
                .select(OrderRow::as_select())
                .for_update()
                .first(conn)
                .optional()?
                .ok_or(DomainError::NotFound("Order"))?;

            let current: OrderStatus = order.status.parse()?;
            if current.transition_to(status)? == current {
                return load_view(conn, order);
            }

            let order = diesel::update(orders::table.find(id))
                .set((
                    orders::status.eq(status.as_str()),
                    orders::updated_at.eq(Utc::now()),
                ))
                .returning(OrderRow::as_returning())
                .get_result(conn)?;
            load_view(conn, order)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    use super::DieselOrderRepository;
    use crate::domain::cart::NewCartLine;
    use crate::domain::customization::CustomizationSelection;
    use crate::domain::errors::DomainError;
    use crate::domain::order::{AccountStatistics, OrderContact, OrderNumber, OrderStatus};
    use crate::domain::ports::{CartRepository, OrderRepository};
    use crate::infrastructure::cart_repo::DieselCartRepository;
    use crate::infrastructure::test_support::{
        decimal, seed_account, seed_catalog, seed_product, setup_db,
    };

    fn contact() -> OrderContact {
        OrderContact {
            customer_first_name: "Lilit".to_string(),
            customer_last_name: "Sargsyan".to_string(),
            customer_email: "lilit@example.com".to_string(),
            customer_phone: String::new(),
            shipping_first_name: "Lilit".to_string(),
            shipping_last_name: "Sargsyan".to_string(),
            shipping_address: "12 Abovyan St".to_string(),
            shipping_city: "Yerevan".to_string(),
            shipping_zip_code: "0010".to_string(),
            shipping_country: "Armenia".to_string(),
            notes: String::new(),
        }
    }

    fn next_number() -> OrderNumber {
        OrderNumber::generate(Utc::now())
    }

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
    async fn create_from_cart_freezes_lines_and_empties_cart() {
        let (_container, pool) = setup_db().await;
        let fixture = seed_catalog(&pool);
        seed_product(&pool, &fixture, "royal-oak", "6000.00", "in_stock");
        seed_product(&pool, &fixture, "tennis-bracelet", "2500.00", "limited");
        let account = seed_account(&pool, 20, true, false);
        let carts = DieselCartRepository::new(pool.clone());
        let orders = DieselOrderRepository::new(pool);
        carts
            .add_item(account.id, &line("royal-oak", 2, json!({"engraving": "L.S."}), "50"))
            .expect("add failed");
        carts
            .add_item(account.id, &line("tennis-bracelet", 1, json!({}), "0"))
            .expect("add failed");

        let order = orders
            .create_from_cart(account.id, &contact(), &next_number)
            .expect("create failed");

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_amount, decimal("14600.00"));
        assert_eq!(order.total_items, 3);
        assert_eq!(order.items.len(), 2);
        assert!(order.order_number.starts_with("ORD-"));
        assert!(carts.items(account.id).expect("items failed").is_empty());

        let by_number = orders
            .find_by_number(&order.order_number)
            .expect("find failed")
            .expect("order should exist");
        assert_eq!(by_number.id, order.id);
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for the Postgres container"]
    async fn create_from_empty_cart_creates_no_order() {
        let (_container, pool) = setup_db().await;
        let account = seed_account(&pool, 21, true, false);
        let orders = DieselOrderRepository::new(pool);

        let result = orders.create_from_cart(account.id, &contact(), &next_number);

        assert!(matches!(result, Err(DomainError::EmptyCart)));
        assert_eq!(orders.list_for_account(account.id, 1, 20).expect("list").total, 0);
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for the Postgres container"]
    async fn colliding_order_numbers_are_redrawn() {
        let (_container, pool) = setup_db().await;
        let fixture = seed_catalog(&pool);
        seed_product(&pool, &fixture, "royal-oak", "6000.00", "in_stock");
        let account = seed_account(&pool, 22, true, false);
        let carts = DieselCartRepository::new(pool.clone());
        let orders = DieselOrderRepository::new(pool);

        let mut numbers = HashSet::new();
        for _ in 0..3 {
            carts
                .add_item(account.id, &line("royal-oak", 1, json!({}), "0"))
                .expect("add failed");
            let order = orders
                .create_from_cart(account.id, &contact(), &next_number)
                .expect("create failed");
            numbers.insert(order.order_number);
        }

        assert_eq!(numbers.len(), 3);

        carts
            .add_item(account.id, &line("royal-oak", 1, json!({}), "0"))
            .expect("add failed");
        let taken = numbers.iter().next().cloned().expect("at least one number");
        let always_taken = move || taken.parse::<OrderNumber>().expect("generated number");
        assert!(matches!(
            orders.create_from_cart(account.id, &contact(), &always_taken),
            Err(DomainError::Internal(_))
        ));
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for the Postgres container"]
    async fn statistics_and_transitions_follow_status() {
        let (_container, pool) = setup_db().await;
        let fixture = seed_catalog(&pool);
        seed_product(&pool, &fixture, "ten", "10.00", "in_stock");
        seed_product(&pool, &fixture, "twenty", "20.00", "in_stock");
        seed_product(&pool, &fixture, "thirty", "30.00", "in_stock");
        let account = seed_account(&pool, 23, true, false);
        let carts = DieselCartRepository::new(pool.clone());
        let orders = DieselOrderRepository::new(pool);

        let mut created = vec![];
        for slug in ["ten", "twenty", "thirty"] {
            carts
                .add_item(account.id, &line(slug, 1, json!({}), "0"))
                .expect("add failed");
            created.push(
                orders
                    .create_from_cart(account.id, &contact(), &next_number)
                    .expect("create failed"),
            );
        }
        orders
            .set_status(created[1].id, OrderStatus::Confirmed)
            .expect("confirm failed");
        for next in [OrderStatus::Confirmed, OrderStatus::Processing, OrderStatus::Shipped] {
            orders.set_status(created[2].id, next).expect("transition failed");
        }

        let stats = AccountStatistics::from_totals(
            &orders.totals_by_status(account.id).expect("totals failed"),
        );
        assert_eq!(stats.order_count, 3);
        assert_eq!(stats.total_spent, decimal("50"));
        assert_eq!(stats.total_order_value, decimal("60"));
        assert_eq!(stats.pending_value, decimal("10"));

        assert!(matches!(
            orders.set_status(created[2].id, OrderStatus::Pending),
            Err(DomainError::InvalidTransition { .. })
        ));
        assert!(matches!(
            orders.set_status(Uuid::new_v4(), OrderStatus::Confirmed),
            Err(DomainError::NotFound(_))
        ));

        let page = orders.list_for_account(account.id, 1, 2).expect("list failed");
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].id, created[2].id);
        assert_eq!(page.items[0].items.len(), 1);
    }
}
