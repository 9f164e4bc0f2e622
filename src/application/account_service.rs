use crate::domain::account::{Account, AccountProfile, Registration};
use crate::domain::errors::DomainError;
use crate::domain::ports::AccountRepository;

pub struct AccountService<R> {
    repo: R,
}

impl<R: AccountRepository> AccountService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates the account on first contact, otherwise refreshes its names.
    /// New accounts start unapproved.
    pub fn register_or_fetch(&self, profile: &AccountProfile) -> Result<Registration, DomainError> {
        profile.validate()?;
        let registration = self.repo.register(profile)?;
        if registration.created {
            log::info!("Registered account for Telegram user {}", profile.telegram_id);
        }
        Ok(registration)
    }

    pub fn fetch(&self, telegram_id: i64) -> Result<Account, DomainError> {
        self.repo
            .find_by_telegram_id(telegram_id)?
            .ok_or(DomainError::NotFound("User"))
    }

    pub fn is_admin(&self, telegram_id: i64) -> Result<bool, DomainError> {
        Ok(self
            .repo
            .find_by_telegram_id(telegram_id)?
            .is_some_and(|account| account.is_admin))
    }

    pub fn approve(&self, telegram_id: i64) -> Result<Account, DomainError> {
        let account = self.repo.set_approved(telegram_id, true)?;
        log::info!("Approved Telegram user {telegram_id}");
        Ok(account)
    }

    pub fn reject(&self, telegram_id: i64) -> Result<Account, DomainError> {
        let account = self.repo.set_approved(telegram_id, false)?;
        log::info!("Rejected Telegram user {telegram_id}");
        Ok(account)
    }

    pub fn list_admins(&self) -> Result<Vec<Account>, DomainError> {
        self.repo.list_admins()
    }
}
