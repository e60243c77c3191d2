use std::{sync::Arc, time::Duration};

use cosmrs::{tx::Fee, Coin, Gas};
use tokio::{
    select,
    sync::watch,
    time::{interval_at, Instant, MissedTickBehavior},
};

use crate::{Collector, Deadline, FlushReport, Gateway};

macro_rules! log {
    ($macro:ident!($($body:tt)+)) => {
        ::tracing::$macro!(
            target: "trigger",
            $($body)+
        );
    };
}

/// Transaction parameters supplied together with each trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct TxMetadata {
    memo: String,
    gas_limit: Gas,
    fee_amount: Coin,
}

impl TxMetadata {
    #[inline]
    pub const fn new(memo: String, gas_limit: Gas, fee_amount: Coin) -> Self {
        Self {
            memo,
            gas_limit,
            fee_amount,
        }
    }

    #[must_use]
    #[inline]
    pub fn memo(&self) -> &str {
        &self.memo
    }

    #[must_use]
    #[inline]
    pub const fn fee_amount(&self) -> &Coin {
        &self.fee_amount
    }

    pub(crate) fn fee(&self) -> Fee {
        Fee::from_amount_and_gas(self.fee_amount.clone(), self.gas_limit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct BatchTrigger {
    pub deadline: Deadline,
    pub metadata: TxMetadata,
}

/// Periodic source of batch triggers.
#[derive(Debug, Clone)]
#[must_use]
pub struct Schedule {
    batch_window: Duration,
    tx_timeout: Duration,
    metadata: TxMetadata,
}

impl Schedule {
    #[inline]
    pub const fn new(
        batch_window: Duration,
        tx_timeout: Duration,
        metadata: TxMetadata,
    ) -> Self {
        Self {
            batch_window,
            tx_timeout,
            metadata,
        }
    }

    pub fn trigger(&self) -> BatchTrigger {
        BatchTrigger {
            deadline: Deadline::after(self.tx_timeout),
            metadata: self.metadata.clone(),
        }
    }

    /// Flushes `collector` once per batch window until `shutdown` changes or
    /// its sender is dropped.
    ///
    /// Each flush is awaited before the next tick is taken; ticks missed in
    /// the meantime are postponed rather than fired in a burst. Shutdown is
    /// only observed between flushes, so a flush in progress always runs to
    /// completion and its subscribers are notified.
    pub async fn run<G>(
        self,
        collector: Arc<Collector<G>>,
        mut shutdown: watch::Receiver<bool>,
    ) where
        G: Gateway,
    {
        let mut interval =
            interval_at(Instant::now() + self.batch_window, self.batch_window);

        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        log!(info!(
            batch_window = ?self.batch_window,
            tx_timeout = ?self.tx_timeout,
            "Starting periodic batch trigger.",
        ));

        loop {
            select! {
                biased;
                _ = shutdown.changed() => break,
                _ = interval.tick() => {},
            }

            if let FlushReport::Submitted { count, .. } =
                collector.flush(self.trigger()).await
            {
                log!(debug!(count, "Periodic flush finished."));
            }
        }

        log!(info!("Periodic batch trigger stopped."));
    }
}
