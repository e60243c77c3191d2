use anyhow::{anyhow, bail, Context as _, Result};
use cosmrs::AccountId;
use serde::Serialize;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt as _},
    select,
    sync::watch,
    task::JoinSet,
};

use faucet::{Faucet, FlushReport, Gateway, Schedule, Subscriber, TxOutcome};

macro_rules! log {
    ($macro:ident!($($body:tt)+)) => {
        ::tracing::$macro!(
            target: "intake",
            $($body)+
        );
    };
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Send(AccountId),
    Subscribe(AccountId),
    Flush,
}

impl Command {
    /// Parses one intake line.
    ///
    /// `send <address>` queues without notification, `subscribe <address>`
    /// or a bare address queues and reports the outcome, `flush` triggers a
    /// submission right away. Blank lines yield `None`.
    fn parse(line: &str, account_prefix: &str) -> Result<Option<Self>> {
        let mut words = line.split_whitespace();

        let Some(first) = words.next() else {
            return Ok(None);
        };

        let command = match (first, words.next()) {
            ("flush", None) => Self::Flush,
            ("send", Some(address)) => {
                Self::Send(parse_recipient(address, account_prefix)?)
            },
            ("subscribe", Some(address)) => {
                Self::Subscribe(parse_recipient(address, account_prefix)?)
            },
            (address, None) => {
                Self::Subscribe(parse_recipient(address, account_prefix)?)
            },
            _ => bail!("Unrecognized command {line:?}!"),
        };

        if words.next().is_some() {
            bail!("Unexpected trailing arguments in {line:?}!");
        }

        Ok(Some(command))
    }
}

fn parse_recipient(address: &str, account_prefix: &str) -> Result<AccountId> {
    let account_id: AccountId = address
        .parse()
        .map_err(|error: cosmrs::ErrorReport| anyhow!(error))
        .with_context(|| format!("Malformed address {address:?}!"))?;

    if account_id.prefix() == account_prefix {
        Ok(account_id)
    } else {
        Err(anyhow!(
            "Address {address:?} doesn't have the expected {account_prefix:?} \
            prefix!",
        ))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Response<'r> {
    address: &'r str,
    tx: Option<&'r TxOutcome>,
    error: Option<String>,
}

/// Reads fund requests from `input` until it is closed or `shutdown`
/// changes.
///
/// Every subscribed request spawns a reporting task into `reports`. Those
/// tasks only finish once their batch is flushed, so the caller is expected
/// to drain the set after the final flush.
pub(crate) async fn run<R, G>(
    input: R,
    faucet: &Faucet<G>,
    schedule: &Schedule,
    account_prefix: &str,
    reports: &mut JoinSet<Option<String>>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    G: Gateway,
{
    let mut lines = input.lines();

    loop {
        let line = select! {
            biased;
            _ = shutdown.changed() => {
                log!(info!("Stopped reading fund requests."));

                break;
            },
            line = lines.next_line() => {
                line.context("Failed to read fund requests!")?
            },
        };

        let Some(line) = line else {
            log!(info!("Fund request input closed."));

            break;
        };

        while reports.try_join_next().is_some() {}

        match Command::parse(&line, account_prefix) {
            Ok(None) => {},
            Ok(Some(Command::Send(address))) => faucet.send(address),
            Ok(Some(Command::Subscribe(address))) => {
                reports.spawn(report(
                    address.to_string(),
                    faucet.subscribe(address),
                ));
            },
            Ok(Some(Command::Flush)) => {
                if let FlushReport::Empty = faucet.flush(schedule.trigger()).await
                {
                    log!(info!("No message to submit."));
                }
            },
            Err(error) => {
                log!(warn!(?error, "Rejected fund request!"));
            },
        }
    }

    Ok(())
}

/// Waits for the outcome of a subscribed request and prints it as one JSON
/// line, which is also returned.
async fn report(address: String, subscriber: Subscriber) -> Option<String> {
    let (tx, error) = match subscriber.outcome().await {
        Ok(Ok(outcome)) => (Some(outcome), None),
        Ok(Err(error)) => (None, Some(error.to_string())),
        Err(error) => (None, Some(error.to_string())),
    };

    let response = Response {
        address: &address,
        tx: tx.as_ref(),
        error,
    };

    match serde_json_wasm::to_string(&response) {
        Ok(response) => {
            println!("{response}");

            Some(response)
        },
        Err(error) => {
            log!(error!(?error, "Failed to serialize outcome!"));

            None
        },
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use cosmrs::{AccountId, Coin};
    use tokio::{
        io::{duplex, BufReader},
        sync::watch,
        task::JoinSet,
    };

    use chain_ops::{
        key::Signing as SigningKey,
        signer::{AccountState, Signer},
    };
    use faucet::{
        Collector, Deadline, Error, Faucet, FlushReport, Gateway, Schedule,
        Submitter, TxMetadata, TxOutcome,
    };

    use super::Command;

    struct AcceptingGateway;

    impl Gateway for AcceptingGateway {
        async fn account(
            &self,
            _: &AccountId,
            _: Deadline,
        ) -> Result<AccountState, Error> {
            Ok(AccountState {
                account_number: 1,
                sequence: 0,
            })
        }

        async fn broadcast(
            &self,
            _: Vec<u8>,
            _: Deadline,
        ) -> Result<TxOutcome, Error> {
            Ok(TxOutcome {
                hash: "A1B2".into(),
                code: 0,
                raw_log: String::new(),
                gas_wanted: 200_000,
                gas_used: 0,
            })
        }
    }

    fn accepting_faucet() -> Faucet<AcceptingGateway> {
        let signer = Signer::new(
            SigningKey::from_slice(&[7; 32]).unwrap(),
            "faucet-1".parse().unwrap(),
            "know",
        )
        .unwrap();

        Faucet::new(
            Arc::new(Collector::new(Submitter::new(signer, AcceptingGateway))),
            Coin::new(10, "know").unwrap(),
        )
    }

    fn schedule() -> Schedule {
        Schedule::new(
            Duration::from_secs(5),
            Duration::from_secs(5),
            TxMetadata::new(
                String::new(),
                200_000,
                Coin::new(5_000, "know").unwrap(),
            ),
        )
    }

    fn address(prefix: &str) -> AccountId {
        AccountId::new(prefix, &[3; 20]).unwrap()
    }

    #[test]
    fn parses_commands() {
        let address = address("know");

        assert_eq!(
            Command::parse(&format!("send {address}"), "know").unwrap(),
            Some(Command::Send(address.clone()))
        );

        assert_eq!(
            Command::parse(&format!("subscribe {address}"), "know").unwrap(),
            Some(Command::Subscribe(address.clone()))
        );

        assert_eq!(
            Command::parse(&format!("  {address}  "), "know").unwrap(),
            Some(Command::Subscribe(address))
        );

        assert_eq!(
            Command::parse("flush", "know").unwrap(),
            Some(Command::Flush)
        );

        assert_eq!(Command::parse("   ", "know").unwrap(), None);
    }

    #[test]
    fn rejects_foreign_prefix() {
        assert!(
            Command::parse(&address("cosmos").to_string(), "know").is_err()
        );
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(Command::parse("send", "know").is_err());
        assert!(Command::parse("not-an-address", "know").is_err());
        assert!(Command::parse("flush now", "know").is_err());

        assert!(Command::parse(
            &format!("send {} extra", address("know")),
            "know",
        )
        .is_err());
    }

    #[tokio::test]
    async fn reports_finish_after_final_flush() {
        let faucet = accepting_faucet();

        let schedule = schedule();

        let (_shutdown, shutdown_signal) = watch::channel(false);

        let mut reports = JoinSet::new();

        let input = format!(
            "subscribe {}\nsend {}\n\nbogus\n",
            address("know"),
            AccountId::new("know", &[4; 20]).unwrap(),
        );

        super::run(
            input.as_bytes(),
            &faucet,
            &schedule,
            "know",
            &mut reports,
            shutdown_signal,
        )
        .await
        .unwrap();

        assert_eq!(faucet.collector().pending(), 2);
        assert_eq!(reports.len(), 1);

        assert!(matches!(
            faucet.flush(schedule.trigger()).await,
            FlushReport::Submitted { count: 2, .. }
        ));

        let lines = reports.join_all().await;

        assert_eq!(lines.len(), 1);

        let line = lines[0].as_deref().unwrap();

        assert!(line.contains(&address("know").to_string()));
        assert!(line.contains(r#""hash":"A1B2""#));
        assert!(line.contains(r#""code":0"#));
    }

    #[tokio::test]
    async fn stops_reading_on_shutdown() {
        let faucet = accepting_faucet();

        let (shutdown, shutdown_signal) = watch::channel(false);

        let (_writer, reader) = duplex(64);

        let mut reports = JoinSet::new();

        shutdown.send_replace(true);

        super::run(
            BufReader::new(reader),
            &faucet,
            &schedule(),
            "know",
            &mut reports,
            shutdown_signal,
        )
        .await
        .unwrap();

        assert!(reports.is_empty());
        assert_eq!(faucet.collector().pending(), 0);
    }
}
