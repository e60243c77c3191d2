use std::{future::Future, sync::Arc};

use cosmrs::{auth::BaseAccount, AccountId};

use chain_ops::{
    node::{self, BroadcastTx, QueryAuth},
    signer::AccountState,
};

use crate::{Deadline, Error, TxOutcome};

/// Remote operations the submitter needs from the chain.
///
/// Both calls give up with an error once `deadline` passes.
pub trait Gateway: Send + Sync + 'static {
    fn account(
        &self,
        address: &AccountId,
        deadline: Deadline,
    ) -> impl Future<Output = Result<AccountState, Error>> + Send;

    /// Broadcasts in synchronous mode; the outcome reflects mempool
    /// acceptance, not block inclusion.
    fn broadcast(
        &self,
        tx_bytes: Vec<u8>,
        deadline: Deadline,
    ) -> impl Future<Output = Result<TxOutcome, Error>> + Send;
}

impl<T> Gateway for Arc<T>
where
    T: Gateway,
{
    #[inline]
    fn account(
        &self,
        address: &AccountId,
        deadline: Deadline,
    ) -> impl Future<Output = Result<AccountState, Error>> + Send {
        T::account(self, address, deadline)
    }

    #[inline]
    fn broadcast(
        &self,
        tx_bytes: Vec<u8>,
        deadline: Deadline,
    ) -> impl Future<Output = Result<TxOutcome, Error>> + Send {
        T::broadcast(self, tx_bytes, deadline)
    }
}

/// [`Gateway`] backed by a node's gRPC endpoint.
#[derive(Clone)]
#[must_use]
pub struct NodeGateway {
    query_auth: QueryAuth,
    broadcast_tx: BroadcastTx,
}

impl NodeGateway {
    pub fn new(client: &node::Client) -> Self {
        Self {
            query_auth: client.clone().query_auth(),
            broadcast_tx: client.clone().broadcast_tx(),
        }
    }
}

impl Gateway for NodeGateway {
    async fn account(
        &self,
        address: &AccountId,
        deadline: Deadline,
    ) -> Result<AccountState, Error> {
        let mut query_auth = self.query_auth.clone();

        deadline
            .bound("account information", async move {
                query_auth
                    .account(address)
                    .await
                    .map(
                        |BaseAccount {
                             account_number,
                             sequence,
                             ..
                         }| AccountState {
                            account_number,
                            sequence,
                        },
                    )
                    .map_err(Error::transport)
            })
            .await
    }

    async fn broadcast(
        &self,
        tx_bytes: Vec<u8>,
        deadline: Deadline,
    ) -> Result<TxOutcome, Error> {
        let mut broadcast_tx = self.broadcast_tx.clone();

        deadline
            .bound("transaction broadcast", async move {
                broadcast_tx
                    .sync(tx_bytes)
                    .await
                    .map(TxOutcome::from)
                    .map_err(Error::transport)
            })
            .await
    }
}
