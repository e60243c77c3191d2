use anyhow::{Context as _, Result};
use cosmrs::proto::cosmos::{
    base::abci::v1beta1::TxResponse,
    tx::v1beta1::{BroadcastMode, BroadcastTxRequest},
};

use super::{set_reconnect_if_required, BroadcastTx};

impl BroadcastTx {
    /// Broadcasts already encoded transaction bytes in synchronous mode.
    ///
    /// The node answers once the transaction has passed `CheckTx`, so the
    /// response reflects mempool acceptance and not block inclusion.
    pub async fn sync(&mut self, tx_bytes: Vec<u8>) -> Result<TxResponse> {
        const BROADCAST_TRANSACTION_ERROR: &str =
            "Failed to broadcast transaction!";

        const MISSING_TRANSACTION_RESPONSE_ERROR: &str =
            "Node didn't respond with transaction response!";

        self.inner
            .tx_service_client()
            .await?
            .broadcast_tx(BroadcastTxRequest {
                tx_bytes,
                mode: BroadcastMode::Sync.into(),
            })
            .await
            .inspect_err(|status| {
                set_reconnect_if_required(&self.inner, status.code());
            })
            .context(BROADCAST_TRANSACTION_ERROR)
            .and_then(|response| {
                response
                    .into_inner()
                    .tx_response
                    .context(MISSING_TRANSACTION_RESPONSE_ERROR)
            })
    }
}
