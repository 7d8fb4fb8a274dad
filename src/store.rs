use std::collections::HashMap;
use std::collections::hash_map::Entry;

use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::{Account, AccountError, AccountId};

/// Possible errors to occur while reading or mutating an account store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Account id {0} already exists")]
    DuplicateAccountId(AccountId),
    #[error("Account {0} cannot be opened with a negative balance")]
    NegativeBalance(AccountId),
    #[error("Account {0} does not exist")]
    NotFound(AccountId),
    #[error("Account {0} does not hold enough funds")]
    InsufficientFunds(AccountId),
    #[error("The balance of account {0} would overflow")]
    Overflow(AccountId),
}

impl StoreError {
    fn from_account(id: &AccountId, error: AccountError) -> Self {
        match error {
            AccountError::InsufficientFunds => Self::InsufficientFunds(id.clone()),
            AccountError::Overflow => Self::Overflow(id.clone()),
        }
    }
}

/// Storage of accounts consumed by the [`TransferEngine`](crate::TransferEngine)
pub trait AccountStore: Send + Sync {
    /// A snapshot of the account, or `None` if no account with this id exists
    fn get_account(&self, id: &AccountId) -> Option<Account>;

    /// Atomically applies signed balance changes to several accounts
    ///
    /// Either every delta is applied or none is. Readers never observe a
    /// partially applied batch.
    fn apply_deltas(&self, deltas: &[(&AccountId, Decimal)]) -> Result<(), StoreError>;
}

/// An [`AccountStore`] keeping all accounts in memory behind a read/write lock
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl InMemoryAccountStore {
    /// Creates a new, empty store
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
        }
    }

    /// Adds a new account to the store
    pub fn create_account(&self, account: Account) -> Result<(), StoreError> {
        if account.balance() < Decimal::ZERO {
            return Err(StoreError::NegativeBalance(account.id().clone()));
        }

        match self.accounts.write().entry(account.id().clone()) {
            Entry::Vacant(v) => {
                tracing::debug!(id = %account.id(), balance = %account.balance(), "account created");
                v.insert(account);
                Ok(())
            }
            Entry::Occupied(o) => Err(StoreError::DuplicateAccountId(o.key().clone())),
        }
    }

    /// A consistent snapshot of all accounts, ordered by id
    pub fn accounts(&self) -> Vec<Account> {
        let mut accounts = self.accounts
            .read()
            .values()
            .cloned()
            .collect::<Vec<_>>();
        accounts.sort_by(|a, b| a.id().cmp(b.id()));
        accounts
    }

    /// The sum of all balances, taken from one consistent view of the store
    pub fn total_balance(&self) -> Decimal {
        self.accounts
            .read()
            .values()
            .map(Account::balance)
            .sum()
    }

    /// Removes every account
    pub fn clear_accounts(&self) {
        self.accounts.write().clear();
    }
}

impl AccountStore for InMemoryAccountStore {
    fn get_account(&self, id: &AccountId) -> Option<Account> {
        self.accounts.read().get(id).cloned()
    }

    fn apply_deltas(&self, deltas: &[(&AccountId, Decimal)]) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write();

        // stage every change on copies first, so a failing delta leaves the
        // store untouched
        let mut staged: HashMap<&AccountId, Account> = HashMap::with_capacity(deltas.len());
        for &(id, delta) in deltas {
            let account = match staged.entry(id) {
                Entry::Occupied(o) => o.into_mut(),
                Entry::Vacant(v) => {
                    let account = accounts
                        .get(id)
                        .ok_or_else(|| StoreError::NotFound(id.clone()))?;
                    v.insert(account.clone())
                }
            };
            account
                .apply_delta(delta)
                .map_err(|e| StoreError::from_account(id, e))?;
        }

        for (id, account) in staged {
            accounts.insert(id.clone(), account);
        }

        Ok(())
    }
}
