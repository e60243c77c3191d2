use crate::{Delivery, Subscription};

macro_rules! log {
    ($macro:ident!($($body:tt)+)) => {
        ::tracing::$macro!(
            target: "notifier",
            $($body)+
        );
    };
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FanOut {
    pub delivered: usize,
    pub abandoned: usize,
    pub closed: usize,
}

/// Hands one copy of `delivery` to each subscription and releases all of
/// them.
///
/// Sending on a one-shot channel never waits for the receiving side, so an
/// abandoned subscriber neither stalls the caller nor holds back the other
/// subscribers; its copy is dropped together with the channel. Without a
/// delivery the subscriptions are closed empty.
pub(crate) fn fan_out(
    delivery: Option<&Delivery>,
    subscriptions: Vec<Subscription>,
) -> FanOut {
    let mut fan_out = FanOut::default();

    let Some(delivery) = delivery else {
        fan_out.closed = subscriptions.len();

        drop(subscriptions);

        return fan_out;
    };

    for subscription in subscriptions {
        if subscription.deliver(delivery.clone()) {
            fan_out.delivered += 1;
        } else {
            fan_out.abandoned += 1;
        }
    }

    if fan_out.abandoned != 0 {
        log!(debug!(
            abandoned = fan_out.abandoned,
            "Some subscribers went away before the outcome was delivered.",
        ));
    }

    fan_out
}
