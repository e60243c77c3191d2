//! Request batching and transaction submission pipeline of the faucet.
//!
//! Fund requests are accumulated by the [`Collector`] and flushed, one
//! transaction per trigger, through the [`Submitter`]. The outcome of each
//! transaction is fanned out to every requester that holds a
//! [`Subscriber`] for the flushed batch.

pub use self::{
    collector::{Collector, FlushReport},
    deadline::Deadline,
    error::Error,
    faucet::Faucet,
    gateway::{Gateway, NodeGateway},
    instruction::SendInstruction,
    outcome::{Delivery, TxOutcome},
    submitter::Submitter,
    subscription::{subscription, Closed, Subscriber, Subscription},
    trigger::{BatchTrigger, Schedule, TxMetadata},
};

mod collector;
mod deadline;
mod error;
mod faucet;
mod gateway;
mod instruction;
mod notifier;
mod outcome;
mod submitter;
mod subscription;
mod trigger;

#[cfg(test)]
mod testing;
