use std::{
    mem,
    sync::{Mutex, PoisonError},
};

use cosmrs::AccountId;

use crate::{
    notifier, BatchTrigger, Delivery, Gateway, SendInstruction, Submitter,
    Subscription,
};

macro_rules! log {
    ($macro:ident!($($body:tt)+)) => {
        ::tracing::$macro!(
            target: "collector",
            $($body)+
        );
    };
}

#[derive(Default)]
struct PendingBatch {
    instructions: Vec<SendInstruction>,
    subscriptions: Vec<Subscription>,
}

/// Result of a single [`Collector::flush`].
#[derive(Debug)]
#[must_use]
pub enum FlushReport {
    /// Nothing was pending, so no transaction was built.
    Empty,
    Submitted { count: usize, delivery: Delivery },
}

/// Accumulates fund requests and flushes them as one transaction per
/// trigger.
///
/// [`enqueue`](Self::enqueue) only ever takes a short, synchronous lock on
/// the pending batch and never waits on the network. Flushes are serialized
/// by the submitter lock: the pending batch is swapped for an empty one
/// while that lock is held, so every request lands either entirely in the
/// batch being flushed or entirely in the next one.
#[must_use]
pub struct Collector<G> {
    pending: Mutex<PendingBatch>,
    submitter: tokio::sync::Mutex<Submitter<G>>,
    sender: AccountId,
}

impl<G> Collector<G>
where
    G: Gateway,
{
    pub fn new(submitter: Submitter<G>) -> Self {
        Self {
            pending: Mutex::default(),
            sender: submitter.sender().clone(),
            submitter: tokio::sync::Mutex::new(submitter),
        }
    }

    /// Address of the account funds are sent from.
    #[must_use]
    #[inline]
    pub const fn sender(&self) -> &AccountId {
        &self.sender
    }

    pub fn enqueue(
        &self,
        instruction: SendInstruction,
        subscription: Option<Subscription>,
    ) {
        log!(info!(
            address = %instruction.to_address(),
            subscribed = subscription.is_some(),
            "Registered fund request.",
        ));

        let mut pending = self.lock_pending();

        pending.instructions.push(instruction);

        if let Some(subscription) = subscription {
            pending.subscriptions.push(subscription);
        }
    }

    /// Number of requests waiting for the next flush.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.lock_pending().instructions.len()
    }

    /// Submits everything enqueued so far as a single transaction and
    /// notifies the batch's subscribers.
    ///
    /// An empty batch returns [`FlushReport::Empty`] without touching the
    /// chain. Otherwise the batch is consumed whatever the result: failed
    /// instructions are neither retried nor re-enqueued, and every
    /// subscriber of the batch receives the same delivery.
    pub async fn flush(
        &self,
        BatchTrigger { deadline, metadata }: BatchTrigger,
    ) -> FlushReport {
        let submitter = self.submitter.lock().await;

        let PendingBatch {
            instructions,
            subscriptions,
        } = {
            let mut pending = self.lock_pending();

            if pending.instructions.is_empty() {
                drop(pending);

                log!(debug!(
                    "Ignoring transaction trigger, no message to submit."
                ));

                return FlushReport::Empty;
            }

            mem::take(&mut *pending)
        };

        let count = instructions.len();

        log!(info!(
            count,
            subscribers = subscriptions.len(),
            remaining = ?deadline.remaining(),
            "Triggering new transaction.",
        ));

        let delivery =
            submitter.submit(&instructions, &metadata, deadline).await;

        drop(submitter);

        match &delivery {
            Ok(outcome) => {
                log!(info!(
                    count,
                    hash = %outcome.hash,
                    code = outcome.code,
                    "Batch submitted.",
                ));
            },
            Err(error) if error.is_deadline_exceeded() => {
                log!(warn!(count, "Deadline exceeded, batch discarded!"));
            },
            Err(error) => {
                log!(error!(
                    count,
                    error = %error,
                    "Could not submit transaction!",
                ));
            },
        }

        let fan_out = notifier::fan_out(Some(&delivery), subscriptions);

        log!(debug!(
            delivered = fan_out.delivered,
            abandoned = fan_out.abandoned,
            closed = fan_out.closed,
            "Notified subscribers.",
        ));

        FlushReport::Submitted { count, delivery }
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, PendingBatch> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
