use cosmrs::{
    proto::cosmos::base::abci::v1beta1::TxResponse, tendermint::abci::Code,
};
use serde::Serialize;

use crate::Error;

/// What a subscriber eventually receives for its batch.
pub type Delivery = Result<TxOutcome, Error>;

/// Chain response to a broadcast transaction.
///
/// A non-zero [`code`](Self::code) is a rejection reported by the chain,
/// not a failure of the submission itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[must_use]
pub struct TxOutcome {
    pub hash: String,
    pub code: u32,
    pub raw_log: String,
    pub gas_wanted: i64,
    pub gas_used: i64,
}

impl TxOutcome {
    #[must_use]
    #[inline]
    pub fn is_ok(&self) -> bool {
        Code::from(self.code).is_ok()
    }
}

impl From<TxResponse> for TxOutcome {
    fn from(
        TxResponse {
            txhash,
            code,
            raw_log,
            gas_wanted,
            gas_used,
            ..
        }: TxResponse,
    ) -> Self {
        Self {
            hash: txhash,
            code,
            raw_log,
            gas_wanted,
            gas_used,
        }
    }
}
