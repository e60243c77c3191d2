use std::time::Duration;

use anyhow::{anyhow, Context as _, Result};
use cosmrs::{tendermint::chain::Id as ChainId, Coin, Gas};
use zeroize::Zeroizing;

use environment::ReadFromVar as _;
use faucet::TxMetadata;

pub(crate) struct Configuration {
    pub node_grpc_uri: String,
    pub mnemonic: Zeroizing<String>,
    pub chain_id: ChainId,
    pub account_prefix: String,
    pub amount_send: Coin,
    pub metadata: TxMetadata,
    pub batch_window: Duration,
    pub tx_timeout: Duration,
}

impl Configuration {
    const DEFAULT_BATCH_WINDOW_SECONDS: u64 = 5;

    const DEFAULT_TX_TIMEOUT_SECONDS: u64 = 5;

    pub fn read_from_env() -> Result<Self> {
        let node_grpc_uri = String::read_from_var("NODE_GRPC_URI")
            .context("Failed to read node's gRPC URI!")?;

        let mnemonic = String::read_from_var("SIGNING_KEY_MNEMONIC")
            .map(Zeroizing::new)
            .context("Failed to read signing key's mnemonic!")?;

        let chain_id = String::read_from_var("CHAIN_ID")
            .context("Failed to read chain ID!")?
            .parse()
            .map_err(|error| anyhow!("{error}"))
            .context("Failed to parse chain ID!")?;

        let account_prefix = String::read_from_var("ACCOUNT_PREFIX")
            .context("Failed to read account prefix!")?;

        let denom = String::read_from_var("DENOM")
            .context("Failed to read sent denomination!")?;

        let amount_send = u128::read_from_var("AMOUNT_SEND")
            .context("Failed to read sent amount!")
            .and_then(|amount| Self::coin(amount, &denom))?;

        let fee_amount = u128::read_from_var("FEE_AMOUNT")
            .context("Failed to read fee amount!")
            .and_then(|amount| Self::coin(amount, &denom))?;

        let gas_limit = Gas::read_from_var("GAS_LIMIT")
            .context("Failed to read gas limit!")?;

        let memo = String::read_from_var_or("MEMO", String::new())
            .context("Failed to read transaction memo!")?;

        let batch_window = u64::read_from_var_or(
            "BATCH_WINDOW_SECONDS",
            Self::DEFAULT_BATCH_WINDOW_SECONDS,
        )
        .map(Duration::from_secs)
        .context("Failed to read batch window duration!")?;

        let tx_timeout = u64::read_from_var_or(
            "TX_TIMEOUT_SECONDS",
            Self::DEFAULT_TX_TIMEOUT_SECONDS,
        )
        .map(Duration::from_secs)
        .context("Failed to read transaction timeout duration!")?;

        if batch_window.is_zero() {
            return Err(anyhow!("Batch window duration can't be zero!"));
        }

        Ok(Self {
            node_grpc_uri,
            mnemonic,
            chain_id,
            account_prefix,
            amount_send,
            metadata: TxMetadata::new(memo, gas_limit, fee_amount),
            batch_window,
            tx_timeout,
        })
    }

    fn coin(amount: u128, denom: &str) -> Result<Coin> {
        Coin::new(amount, denom)
            .map_err(|error| anyhow!(error))
            .with_context(|| format!("Invalid amount or denomination {denom:?}!"))
    }
}
