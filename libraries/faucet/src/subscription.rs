use thiserror::Error;
use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::Delivery;

/// Creates a connected subscription pair.
///
/// The [`Subscription`] half is handed to the collector together with the
/// request, the [`Subscriber`] half stays with the requester.
pub fn subscription() -> (Subscription, Subscriber) {
    let (sender, receiver) = oneshot::channel();

    (Subscription { sender }, Subscriber { receiver })
}

/// Registration side of a one-shot notification.
///
/// Consumed by the first delivery. Dropping it without delivering closes
/// the subscription without a value.
#[must_use]
pub struct Subscription {
    sender: oneshot::Sender<Delivery>,
}

impl Subscription {
    /// Delivers `delivery` without waiting for the subscriber.
    ///
    /// Returns `false` when the subscriber has already gone away, in which
    /// case the value is dropped along with the channel.
    pub(crate) fn deliver(self, delivery: Delivery) -> bool {
        self.sender.send(delivery).is_ok()
    }
}

/// Read side of a one-shot notification.
#[must_use]
pub struct Subscriber {
    receiver: oneshot::Receiver<Delivery>,
}

impl Subscriber {
    /// Waits for the outcome of the batch this request was flushed with.
    pub async fn outcome(self) -> Result<Delivery, Closed> {
        self.receiver.await.map_err(|_| Closed)
    }

    /// Returns `Ok(None)` while the batch is still pending.
    pub fn try_outcome(&mut self) -> Result<Option<Delivery>, Closed> {
        match self.receiver.try_recv() {
            Ok(delivery) => Ok(Some(delivery)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Closed) => Err(Closed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Subscription closed without a transaction outcome!")]
pub struct Closed;
