use std::sync::Arc;

use cosmrs::{AccountId, Coin};

use crate::{
    subscription, BatchTrigger, Collector, FlushReport, Gateway,
    SendInstruction, Subscriber,
};

/// Entry point for inbound fund requests.
///
/// Every request sends the same configured amount from the collector's
/// sender account. Recipients are expected to be validated already.
#[must_use]
pub struct Faucet<G> {
    collector: Arc<Collector<G>>,
    amount: Coin,
}

impl<G> Clone for Faucet<G> {
    fn clone(&self) -> Self {
        Self {
            collector: self.collector.clone(),
            amount: self.amount.clone(),
        }
    }
}

impl<G> Faucet<G>
where
    G: Gateway,
{
    #[inline]
    pub const fn new(collector: Arc<Collector<G>>, amount: Coin) -> Self {
        Self { collector, amount }
    }

    #[must_use]
    #[inline]
    pub const fn collector(&self) -> &Arc<Collector<G>> {
        &self.collector
    }

    /// Queues a transfer to `to_address` without waiting for its outcome.
    pub fn send(&self, to_address: AccountId) {
        self.collector.enqueue(self.instruction(to_address), None);
    }

    /// Queues a transfer to `to_address` and returns a handle resolving to
    /// the outcome of the transaction it ends up in.
    pub fn subscribe(&self, to_address: AccountId) -> Subscriber {
        let (subscription, subscriber) = subscription();

        self.collector
            .enqueue(self.instruction(to_address), Some(subscription));

        subscriber
    }

    /// Manual trigger, for use outside of the periodic schedule.
    pub async fn flush(&self, trigger: BatchTrigger) -> FlushReport {
        self.collector.flush(trigger).await
    }

    fn instruction(&self, to_address: AccountId) -> SendInstruction {
        SendInstruction::new(
            self.collector.sender().clone(),
            to_address,
            self.amount.clone(),
        )
    }
}
