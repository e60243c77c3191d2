use std::{convert::identity, sync::Arc};

use anyhow::{Context as _, Result};
use tokio::{
    io::{stdin, BufReader},
    runtime::Builder,
    signal::ctrl_c,
    sync::watch,
    task::JoinSet,
};
use tracing::{error, info};

use chain_ops::{key, node, signer::Signer};
use faucet::{Collector, Faucet, FlushReport, NodeGateway, Schedule, Submitter};

use self::config::Configuration;

mod config;
mod intake;

fn main() -> Result<()> {
    log::init().context("Failed to initialize logging!")?;

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build asynchronous runtime!")?;

    let result = runtime.block_on(run());

    // Standard input is read on a blocking thread which doesn't observe
    // cancellation.
    runtime.shutdown_background();

    result
}

async fn run() -> Result<()> {
    let Configuration {
        node_grpc_uri,
        mnemonic,
        chain_id,
        account_prefix,
        amount_send,
        metadata,
        batch_window,
        tx_timeout,
    } = Configuration::read_from_env()
        .context("Failed to load service configuration!")?;

    let node_client = node::Client::connect(&node_grpc_uri)
        .await
        .context("Failed to connect to node!")?;

    let signer = Signer::new(
        key::derive_from_mnemonic(&mnemonic, "")
            .context("Failed to derive signing key from mnemonic!")?,
        chain_id,
        &account_prefix,
    )
    .context("Failed to construct transaction signer!")?;

    drop(mnemonic);

    info!(
        address = %signer.account_id(),
        chain_id = %signer.chain_id(),
        amount = %amount_send,
        "Faucet configured.",
    );

    let collector = Arc::new(Collector::new(Submitter::new(
        signer,
        NodeGateway::new(&node_client),
    )));

    let schedule = Schedule::new(batch_window, tx_timeout, metadata);

    let (shutdown, shutdown_signal) = watch::channel(false);

    let signal = tokio::spawn(async move {
        let result = ctrl_c()
            .await
            .context("Failed to listen for shutdown signal!");

        info!("Shutting down.");

        shutdown.send_replace(true);

        result
    });

    let trigger = tokio::spawn(
        schedule
            .clone()
            .run(collector.clone(), shutdown_signal.clone()),
    );

    let faucet = Faucet::new(collector.clone(), amount_send);

    let mut reports = JoinSet::new();

    let result = match intake::run(
        BufReader::new(stdin()),
        &faucet,
        &schedule,
        &account_prefix,
        &mut reports,
        shutdown_signal,
    )
    .await
    {
        Ok(()) => signal
            .await
            .context("Shutdown signal listener panicked!")
            .and_then(identity),
        Err(error) => {
            signal.abort();

            Err(error)
        },
    };

    if let Err(error) = trigger.await {
        error!(?error, "Periodic trigger panicked!");
    }

    if let FlushReport::Submitted { count, .. } =
        collector.flush(schedule.trigger()).await
    {
        info!(count, "Flushed remaining requests before shutdown.");
    }

    while let Some(report) = reports.join_next().await {
        if let Err(error) = report {
            error!(?error, "Outcome reporting task failed!");
        }
    }

    result
}
