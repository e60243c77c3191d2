use anyhow::{anyhow, Context as _};
use cosmrs::{tx::Body as TxBody, AccountId};

use chain_ops::{signer::Signer, tx};

use crate::{Deadline, Error, Gateway, SendInstruction, TxMetadata, TxOutcome};

macro_rules! log {
    ($macro:ident!($($body:tt)+)) => {
        ::tracing::$macro!(
            target: "submitter",
            $($body)+
        );
    };
}

/// Turns a batch of instructions into exactly one broadcast transaction.
///
/// Owns the service's signing key for its whole lifetime. Account counters
/// are fetched from the chain on every submission and never cached.
#[must_use]
pub struct Submitter<G> {
    signer: Signer,
    gateway: G,
}

impl<G> Submitter<G>
where
    G: Gateway,
{
    #[inline]
    pub const fn new(signer: Signer, gateway: G) -> Self {
        Self { signer, gateway }
    }

    #[must_use]
    #[inline]
    pub const fn sender(&self) -> &AccountId {
        self.signer.account_id()
    }

    /// Makes a single attempt at submitting `instructions` as one
    /// transaction.
    ///
    /// A response from the chain is returned as an outcome whatever its
    /// result code. Errors are reserved for local build, signing and
    /// encoding failures, transport failures and deadline exhaustion.
    pub async fn submit(
        &self,
        instructions: &[SendInstruction],
        metadata: &TxMetadata,
        deadline: Deadline,
    ) -> Result<TxOutcome, Error> {
        deadline.check()?;

        let body = Self::build(instructions, metadata)?;

        let account = self
            .gateway
            .account(self.signer.account_id(), deadline)
            .await?;

        log!(debug!(
            account_number = account.account_number,
            sequence = account.sequence,
            "Fetched account state.",
        ));

        let tx_bytes = self
            .signer
            .sign(&body, metadata.fee(), account)
            .map_err(Error::signing)?
            .to_bytes()
            .map_err(|error| anyhow!(error))
            .context(
                "Failed to encode signed transaction in binary Protobuf \
                format!",
            )
            .map_err(Error::encoding)?;

        deadline.check()?;

        let outcome = self.gateway.broadcast(tx_bytes, deadline).await?;

        if outcome.is_ok() {
            log!(info!(
                count = instructions.len(),
                hash = %outcome.hash,
                "Transaction broadcast successful.",
            ));
        } else {
            log!(warn!(
                count = instructions.len(),
                hash = %outcome.hash,
                code = outcome.code,
                log = %outcome.raw_log,
                "Transaction submitted with non-zero code!",
            ));
        }

        Ok(outcome)
    }

    fn build(
        instructions: &[SendInstruction],
        metadata: &TxMetadata,
    ) -> Result<TxBody, Error> {
        instructions
            .iter()
            .map(SendInstruction::to_message)
            .collect::<anyhow::Result<Vec<_>>>()
            .map(|messages| tx::body(messages, metadata.memo().to_owned()))
            .map_err(Error::build)
    }
}
