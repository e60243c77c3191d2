use anyhow::{anyhow, Context as _, Result};
use cosmrs::{
    bank::MsgSend,
    tx::{Body as TxBody, Msg as _},
    AccountId, Any, Coin,
};

/// Builds a transaction body carrying `messages` in the given order.
#[must_use]
pub fn body<I>(messages: I, memo: String) -> TxBody
where
    I: IntoIterator<Item = Any>,
{
    TxBody {
        messages: messages.into_iter().collect(),
        memo,
        timeout_height: 0_u32.into(),
        extension_options: vec![],
        non_critical_extension_options: vec![],
    }
}

pub fn bank_send(
    from_address: AccountId,
    to_address: AccountId,
    amount: Coin,
) -> Result<Any> {
    MsgSend {
        from_address,
        to_address,
        amount: vec![amount],
    }
    .to_any()
    .map_err(|error| anyhow!(error))
    .context("Failed to encode bank send message into binary Protobuf format!")
}
