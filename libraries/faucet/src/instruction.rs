use anyhow::Result;
use cosmrs::{AccountId, Any, Coin};

/// A single bank transfer awaiting inclusion in the next transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct SendInstruction {
    from_address: AccountId,
    to_address: AccountId,
    amount: Coin,
}

impl SendInstruction {
    #[inline]
    pub const fn new(
        from_address: AccountId,
        to_address: AccountId,
        amount: Coin,
    ) -> Self {
        Self {
            from_address,
            to_address,
            amount,
        }
    }

    #[must_use]
    #[inline]
    pub const fn to_address(&self) -> &AccountId {
        &self.to_address
    }

    pub(crate) fn to_message(&self) -> Result<Any> {
        chain_ops::tx::bank_send(
            self.from_address.clone(),
            self.to_address.clone(),
            self.amount.clone(),
        )
    }
}
