use anyhow::{anyhow, Context as _, Result};
pub use cosmrs::Gas;
use cosmrs::{
    tendermint::chain::Id as ChainId,
    tx::{
        AccountNumber, Body as TxBody, Fee, Raw, SequenceNumber, SignDoc,
        SignerInfo,
    },
    AccountId,
};

use crate::key::{Public as PublicKey, Signing as SigningKey};

/// Replay protection counters of the signing account, as reported by the
/// chain at the time of signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountState {
    pub account_number: AccountNumber,
    pub sequence: SequenceNumber,
}

/// Single-signer, direct sign mode transaction signer.
///
/// Holds no account counters; every call to [`Signer::sign`] is given the
/// freshly fetched [`AccountState`].
#[must_use]
pub struct Signer {
    signing_key: SigningKey,
    public_key: PublicKey,
    account_id: AccountId,
    chain_id: ChainId,
}

impl Signer {
    pub fn new(
        signing_key: SigningKey,
        chain_id: ChainId,
        account_prefix: &str,
    ) -> Result<Self> {
        let public_key = signing_key.public_key();

        let account_id = public_key
            .account_id(account_prefix)
            .map_err(|error| anyhow!(error))
            .context("Failed to derive account ID!")?;

        Ok(Self {
            signing_key,
            public_key,
            account_id,
            chain_id,
        })
    }

    #[must_use]
    #[inline]
    pub const fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    #[must_use]
    #[inline]
    pub const fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    pub fn sign(
        &self,
        body: &TxBody,
        fee: Fee,
        AccountState {
            account_number,
            sequence,
        }: AccountState,
    ) -> Result<Raw> {
        SignDoc::new(
            body,
            &SignerInfo::single_direct(Some(self.public_key), sequence)
                .auth_info(fee),
            &self.chain_id,
            account_number,
        )
        .map_err(|error| anyhow!(error))
        .context("Failed to construct `cosmrs`'s `SignDoc` structure!")?
        .sign(&self.signing_key)
        .map_err(|error| anyhow!(error))
        .context("Failed to sign transaction document!")
    }
}
