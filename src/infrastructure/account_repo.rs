use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::account::{Account, AccountProfile, Registration};
use crate::domain::errors::DomainError;
use crate::domain::ports::AccountRepository;
use crate::schema::accounts;

use super::models::{AccountNamesChangeset, AccountRow, NewAccountRow};

pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl AccountRepository for DieselAccountRepository {
    fn register(&self, profile: &AccountProfile) -> Result<Registration, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // A concurrent first contact loses the insert and falls through to the refresh.
            let inserted = diesel::insert_into(accounts::table)
                .values(&NewAccountRow {
                    id: Uuid::new_v4(),
                    telegram_id: profile.telegram_id,
                    username: profile.username.clone(),
                    first_name: profile.first_name.clone(),
                    last_name: profile.last_name.clone(),
                    approved: false,
                    is_admin: false,
                })
                .on_conflict(accounts::telegram_id)
                .do_nothing()
                .returning(AccountRow::as_returning())
                .get_result(conn)
                .optional()?;

            if let Some(row) = inserted {
                return Ok(Registration {
                    account: row.into(),
                    created: true,
                });
            }

            let names = AccountNamesChangeset {
                username: profile.username.clone(),
                first_name: profile.first_name.clone(),
                last_name: profile.last_name.clone(),
            };
            let by_telegram_id = accounts::telegram_id.eq(profile.telegram_id);
            // Diesel rejects an empty changeset.
            if !names.is_empty() {
                diesel::update(accounts::table.filter(by_telegram_id))
                    .set(&names)
                    .execute(conn)?;
            }

            let row = accounts::table
                .filter(by_telegram_id)
                .select(AccountRow::as_select())
                .first(conn)?;
            Ok(Registration {
                account: row.into(),
                created: false,
            })
        })
    }

    fn find_by_telegram_id(&self, telegram_id: i64) -> Result<Option<Account>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = accounts::table
            .filter(accounts::telegram_id.eq(telegram_id))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(Account::from))
    }

    fn set_approved(&self, telegram_id: i64, approved: bool) -> Result<Account, DomainError> {
        let mut conn = self.pool.get()?;

        diesel::update(accounts::table.filter(accounts::telegram_id.eq(telegram_id)))
            .set(accounts::approved.eq(approved))
            .returning(AccountRow::as_returning())
            .get_result(&mut conn)
            .optional()?
            .map(Account::from)
            .ok_or(DomainError::NotFound("User"))
    }

    fn list_admins(&self) -> Result<Vec<Account>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = accounts::table
            .filter(accounts::is_admin.eq(true))
            .select(AccountRow::as_select())
            .order(accounts::date_joined.asc())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(Account::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::DieselAccountRepository;
    use crate::domain::account::AccountProfile;
    use crate::domain::errors::DomainError;
    use crate::domain::ports::AccountRepository;
    use crate::infrastructure::test_support::{seed_admin, setup_db};

    fn profile(telegram_id: i64, first_name: &str) -> AccountProfile {
        AccountProfile {
            telegram_id,
            username: None,
            first_name: Some(first_name.to_string()),
            last_name: None,
        }
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for the Postgres container"]
    async fn register_creates_then_refreshes_names() {
        let (_container, pool) = setup_db().await;
        let repo = DieselAccountRepository::new(pool);

        let first = repo.register(&profile(101, "Ani")).expect("register failed");
        let second = repo.register(&profile(101, "Anna")).expect("register failed");

        assert!(first.created);
        assert!(!first.account.approved);
        assert!(!second.created);
        assert_eq!(second.account.id, first.account.id);
        assert_eq!(second.account.first_name.as_deref(), Some("Anna"));
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for the Postgres container"]
    async fn set_approved_on_unknown_user_creates_nothing() {
        let (_container, pool) = setup_db().await;
        let repo = DieselAccountRepository::new(pool);

        let result = repo.set_approved(404, true);

        assert!(matches!(result, Err(DomainError::NotFound(_))));
        assert!(repo.find_by_telegram_id(404).expect("lookup failed").is_none());
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for the Postgres container"]
    async fn list_admins_only_returns_admins() {
        let (_container, pool) = setup_db().await;
        seed_admin(&pool, 1);
        let repo = DieselAccountRepository::new(pool);
        repo.register(&profile(2, "Davit")).expect("register failed");

        let admins = repo.list_admins().expect("list failed");

        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].telegram_id, 1);
    }
}
