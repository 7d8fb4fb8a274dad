use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::{AccountId, AccountStore, Notifier, StoreError, Transfer};

/// Possible errors to occur during the processing of a transfer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    #[error("Transfer amount must be positive.")]
    InvalidAmount,
    #[error("Cannot transfer money to the same account.")]
    SameAccount,
    #[error("One or both accounts do not exist.")]
    AccountNotFound,
    #[error("Insufficient balance in the source account.")]
    InsufficientFunds,
    #[error("The transfer engine is busy, the lock was not acquired within {0:?}")]
    Busy(Duration),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for TransferError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(_) => Self::AccountNotFound,
            StoreError::InsufficientFunds(_) => Self::InsufficientFunds,
            error => Self::Store(error),
        }
    }
}

/// Tuning knobs of the [`TransferEngine`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// How long a transfer waits for the engine lock
    ///
    /// `None` waits forever.
    pub lock_timeout: Option<Duration>,
}

impl EngineConfig {
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = Some(timeout);
        self
    }
}

/// The central engine moving funds between accounts
///
/// Every transfer runs through one exclusive critical section that spans the
/// account lookup, the balance check, both balance mutations and both
/// notifications. Transfers are therefore fully serialized, even when they
/// touch disjoint accounts. This trades throughput for the absence of lost
/// updates, double spends and lock ordering concerns between accounts.
///
/// The amount and account-equality checks don't need shared state and run
/// before the lock is taken.
#[derive(Debug)]
pub struct TransferEngine<S, N> {
    store: S,
    notifier: N,
    config: EngineConfig,
    lock: Mutex<()>,
}

impl<S: AccountStore, N: Notifier> TransferEngine<S, N> {
    /// Creates a new transfer engine that waits for its lock indefinitely
    pub fn new(store: S, notifier: N) -> Self {
        Self::with_config(store, notifier, EngineConfig::default())
    }

    /// Creates a new transfer engine with the specified configuration
    pub fn with_config(store: S, notifier: N, config: EngineConfig) -> Self {
        Self {
            store,
            notifier,
            config,
            lock: Mutex::new(()),
        }
    }

    /// The account store backing this engine
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The notifier receiving post-transfer events
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Processes one transfer request
    pub fn execute(&self, transfer: &Transfer) -> Result<(), TransferError> {
        self.transfer(transfer.source(), transfer.destination(), transfer.amount())
    }

    /// Moves `amount` from account `from` to account `to`
    ///
    /// Checks are performed in a fixed order and the first violated one is
    /// reported:
    /// 1. the amount is positive
    /// 2. the accounts differ
    /// 3. both accounts exist
    /// 4. the source holds at least `amount`
    ///
    /// Nothing is mutated unless all of them pass. On success the source is
    /// notified about the debit and the destination about the credit, in
    /// that order.
    pub fn transfer(&self, from: &AccountId, to: &AccountId, amount: Decimal) -> Result<(), TransferError> {
        tracing::debug!(%from, %to, %amount, "validating transfer");
        if amount <= Decimal::ZERO {
            return Err(TransferError::InvalidAmount);
        }
        if from == to {
            return Err(TransferError::SameAccount);
        }

        let _guard = self.acquire()?;
        tracing::debug!(%from, %to, "lock acquired");

        let (source, destination) = match (self.store.get_account(from), self.store.get_account(to)) {
            (Some(source), Some(destination)) => (source, destination),
            _ => {
                tracing::warn!(%from, %to, "transfer rejected, account not found");
                return Err(TransferError::AccountNotFound);
            }
        };
        if source.balance() < amount {
            tracing::warn!(%from, balance = %source.balance(), %amount, "transfer rejected, insufficient funds");
            return Err(TransferError::InsufficientFunds);
        }

        tracing::debug!(%from, %to, "applying balance changes");
        self.store.apply_deltas(&[(from, -amount), (to, amount)])?;
        tracing::info!(%from, %to, %amount, "transfer committed");

        // the snapshots are only used to address the notifications, their
        // balances are the pre-transfer ones
        let shown = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        self.notifier.notify_about_transfer(
            &source,
            &format!("Transferred {:.2} to account ID: {}", shown, to),
        );
        self.notifier.notify_about_transfer(
            &destination,
            &format!("Received {:.2} from account ID: {}", shown, from),
        );

        Ok(())
    }

    fn acquire(&self) -> Result<MutexGuard<'_, ()>, TransferError> {
        match self.config.lock_timeout {
            None => Ok(self.lock.lock()),
            Some(timeout) => self.lock.try_lock_for(timeout).ok_or_else(|| {
                tracing::warn!(?timeout, "transfer rejected, engine lock not acquired in time");
                TransferError::Busy(timeout)
            }),
        }
    }
}
