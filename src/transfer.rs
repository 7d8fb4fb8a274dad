use rust_decimal::Decimal;

use crate::AccountId;

/// A request to move funds from one account to another
///
/// Transfers only live for the duration of a single
/// [`TransferEngine::execute`](crate::TransferEngine::execute) call.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
pub struct Transfer {
    from: AccountId,
    to: AccountId,
    amount: Decimal,
}

impl Transfer {
    pub fn new(from: impl Into<AccountId>, to: impl Into<AccountId>, amount: Decimal) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
        }
    }

    /// The account the funds are taken from
    pub fn source(&self) -> &AccountId {
        &self.from
    }

    /// The account the funds are credited to
    pub fn destination(&self) -> &AccountId {
        &self.to
    }

    /// The amount to move
    pub fn amount(&self) -> Decimal {
        self.amount
    }
}
