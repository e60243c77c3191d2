use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex, PoisonError,
    },
    time::Duration,
};

use anyhow::anyhow;
use cosmrs::{bank::MsgSend, tx::Msg as _, AccountId, Coin, Tx};
use tokio::{sync::Semaphore, time::sleep};

use chain_ops::{
    key::Signing as SigningKey,
    signer::{AccountState, Signer},
};

use crate::{
    Deadline, Error, Gateway, SendInstruction, Submitter, TxMetadata,
    TxOutcome,
};

pub(crate) const PREFIX: &str = "know";

pub(crate) const DENOM: &str = "know";

pub(crate) const MEMO: &str = "Sent from tests";

pub(crate) const GAS_LIMIT: u64 = 200_000;

pub(crate) const ACCOUNT_NUMBER: u64 = 7;

pub(crate) const ACCOUNT_SEQUENCE: u64 = 3;

enum Response {
    Code { code: u32, raw_log: &'static str },
    TransportFailure,
}

/// In-memory gateway recording every remote call.
pub(crate) struct MockGateway {
    response: Response,
    account_failure: bool,
    account_delay: Option<Duration>,
    broadcast_delay: Option<Duration>,
    gate: Option<Arc<Semaphore>>,
    account_calls: AtomicUsize,
    broadcast_attempts: AtomicUsize,
    broadcasts: Mutex<Vec<Vec<u8>>>,
}

impl MockGateway {
    pub(crate) fn accepting() -> Self {
        Self::responding(0, "")
    }

    pub(crate) fn responding(code: u32, raw_log: &'static str) -> Self {
        Self::new(Response::Code { code, raw_log })
    }

    pub(crate) fn failing_broadcast() -> Self {
        Self::new(Response::TransportFailure)
    }

    fn new(response: Response) -> Self {
        Self {
            response,
            account_failure: false,
            account_delay: None,
            broadcast_delay: None,
            gate: None,
            account_calls: AtomicUsize::new(0),
            broadcast_attempts: AtomicUsize::new(0),
            broadcasts: Mutex::new(vec![]),
        }
    }

    /// Accepts broadcasts but fails every account lookup.
    pub(crate) fn failing_account() -> Self {
        Self {
            account_failure: true,
            ..Self::accepting()
        }
    }

    pub(crate) fn with_account_delay(mut self, delay: Duration) -> Self {
        self.account_delay = Some(delay);

        self
    }

    pub(crate) fn with_broadcast_delay(mut self, delay: Duration) -> Self {
        self.broadcast_delay = Some(delay);

        self
    }

    /// Makes every broadcast wait for a permit on `gate`.
    pub(crate) fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);

        self
    }

    pub(crate) fn account_calls(&self) -> usize {
        self.account_calls.load(Ordering::Acquire)
    }

    pub(crate) fn broadcast_attempts(&self) -> usize {
        self.broadcast_attempts.load(Ordering::Acquire)
    }

    pub(crate) fn broadcasts(&self) -> Vec<Vec<u8>> {
        self.broadcasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Gateway for MockGateway {
    async fn account(
        &self,
        _: &AccountId,
        deadline: Deadline,
    ) -> Result<AccountState, Error> {
        self.account_calls.fetch_add(1, Ordering::AcqRel);

        deadline
            .bound("account information", async {
                if let Some(delay) = self.account_delay {
                    sleep(delay).await;
                }

                if self.account_failure {
                    Err(Error::transport(anyhow!("Connection reset!")))
                } else {
                    Ok(AccountState {
                        account_number: ACCOUNT_NUMBER,
                        sequence: ACCOUNT_SEQUENCE,
                    })
                }
            })
            .await
    }

    async fn broadcast(
        &self,
        tx_bytes: Vec<u8>,
        deadline: Deadline,
    ) -> Result<TxOutcome, Error> {
        let attempt = self.broadcast_attempts.fetch_add(1, Ordering::AcqRel);

        deadline
            .bound("transaction broadcast", async {
                if let Some(gate) = &self.gate {
                    gate.acquire().await.map_err(|error| {
                        Error::transport(anyhow!(error))
                    })?
                    .forget();
                }

                if let Some(delay) = self.broadcast_delay {
                    sleep(delay).await;
                }

                match self.response {
                    Response::Code { code, raw_log } => {
                        self.broadcasts
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .push(tx_bytes);

                        Ok(outcome(&format!("{attempt:064X}"), code, raw_log))
                    },
                    Response::TransportFailure => {
                        Err(Error::transport(anyhow!("Connection refused!")))
                    },
                }
            })
            .await
    }
}

pub(crate) fn outcome(hash: &str, code: u32, raw_log: &str) -> TxOutcome {
    TxOutcome {
        hash: hash.into(),
        code,
        raw_log: raw_log.into(),
        gas_wanted: i64::try_from(GAS_LIMIT).unwrap_or(i64::MAX),
        gas_used: 0,
    }
}

pub(crate) fn submitter<G>(gateway: G) -> Submitter<G>
where
    G: Gateway,
{
    Submitter::new(
        Signer::new(
            SigningKey::from_slice(&[7; 32]).unwrap(),
            "faucet-1".parse().unwrap(),
            PREFIX,
        )
        .unwrap(),
        gateway,
    )
}

pub(crate) fn address(seed: u8) -> AccountId {
    AccountId::new(PREFIX, &[seed; 20]).unwrap()
}

pub(crate) fn amount() -> Coin {
    Coin::new(10, DENOM).unwrap()
}

pub(crate) fn instruction(from: &AccountId, to: u8) -> SendInstruction {
    SendInstruction::new(from.clone(), address(to), amount())
}

pub(crate) fn metadata() -> TxMetadata {
    TxMetadata::new(MEMO.into(), GAS_LIMIT, Coin::new(5_000, DENOM).unwrap())
}

/// Recipients of the bank messages carried by an encoded transaction, in
/// message order.
pub(crate) fn recipients(tx_bytes: &[u8]) -> Vec<AccountId> {
    Tx::from_bytes(tx_bytes)
        .unwrap()
        .body
        .messages
        .iter()
        .map(|message| MsgSend::from_any(message).unwrap().to_address)
        .collect()
}
