use std::fmt;

use rust_decimal::Decimal;

/// Possible errors to occur during account operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountError {
    #[error("The account does not hold enough funds")]
    InsufficientFunds,
    #[error("The balance of the account would overflow")]
    Overflow,
}

/// The unique identifier of an account
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId(String);

impl AccountId {
    /// Creates an account id from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AccountId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A user account
///
/// An account is identified by an immutable [`AccountId`] and holds a single
/// balance. The balance never drops below zero: [`Account::withdrawal`]
/// refuses to overdraw.
///
/// Accounts are owned by an [`AccountStore`](crate::AccountStore). Callers only
/// ever see snapshots, mutation goes through
/// [`AccountStore::apply_deltas`](crate::AccountStore::apply_deltas).
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Account {
    id: AccountId,
    balance: Decimal,
}

impl Account {
    /// Creates a new account with the specified id and opening balance
    pub fn new(id: impl Into<AccountId>, balance: Decimal) -> Self {
        Self {
            id: id.into(),
            balance,
        }
    }

    /// The identifier of the account
    pub fn id(&self) -> &AccountId {
        &self.id
    }

    /// The current balance of the account
    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Deposits the specified amount on the account
    pub fn deposit(&mut self, amount: Decimal) -> Result<(), AccountError> {
        self.balance = self.balance
            .checked_add(amount)
            .ok_or(AccountError::Overflow)?;

        Ok(())
    }

    /// Withdrawals the specified amount from the account
    pub fn withdrawal(&mut self, amount: Decimal) -> Result<(), AccountError> {
        if self.balance < amount {
            return Err(AccountError::InsufficientFunds);
        }
        self.balance = self.balance
            .checked_sub(amount)
            .ok_or(AccountError::Overflow)?;

        Ok(())
    }

    /// Applies a signed balance change
    ///
    /// Positive deltas are deposits, negative deltas are withdrawals.
    pub fn apply_delta(&mut self, delta: Decimal) -> Result<(), AccountError> {
        match delta.is_sign_negative() {
            false => self.deposit(delta),
            true => self.withdrawal(-delta),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn withdrawal_cannot_overdraw() {
        let mut account = Account::new("A1", dec!(50.00));

        assert_eq!(account.withdrawal(dec!(50.01)), Err(AccountError::InsufficientFunds));
        assert_eq!(account.balance(), dec!(50.00));

        account.withdrawal(dec!(50.00)).unwrap();
        assert_eq!(account.balance(), Decimal::ZERO);
    }

    #[test]
    fn deposit_overflow() {
        let mut account = Account::new("A1", Decimal::MAX);

        assert_eq!(account.deposit(dec!(1)), Err(AccountError::Overflow));
        assert_eq!(account.balance(), Decimal::MAX);
    }

    #[test]
    fn apply_delta_dispatches_on_sign() {
        let mut account = Account::new("A1", dec!(10));

        account.apply_delta(dec!(2.50)).unwrap();
        assert_eq!(account.balance(), dec!(12.50));
        account.apply_delta(dec!(-12.50)).unwrap();
        assert_eq!(account.balance(), Decimal::ZERO);
        assert_eq!(account.apply_delta(dec!(-0.01)), Err(AccountError::InsufficientFunds));
    }
}
