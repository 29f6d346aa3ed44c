use log::LevelFilter;
use serde::Deserialize;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    sync::mpsc,
};
use vietqr::{
    dispatcher::{Dispatcher, Merchant},
    reference::ReferenceMode,
};

fn default_log_level() -> String {
    String::from("info")
}

#[derive(Debug, Deserialize)]
pub struct Conf {
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default)]
    reference: ReferenceMode,
    merchant: Option<Merchant>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config: Conf = config::Config::builder()
        .add_source(config::File::with_name("./config.toml").required(false))
        .add_source(config::Environment::with_prefix("VIETQR").separator("__"))
        .build()?
        .try_deserialize()?;

    let level: LevelFilter = config
        .log_level
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid log_level {:?}", config.log_level))?;

    simple_logger::SimpleLogger::new()
        .with_level(level)
        .init()
        .map_err(anyhow::Error::msg)?;

    match &config.merchant {
        Some(m) => log::info!("default merchant account {} at {}", m.account_number, m.bank),
        None => log::info!("no default merchant, requests must name an account"),
    }

    let dispatcher = Dispatcher::new(config.merchant, config.reference.source());

    let (tx, mut rx) = mpsc::channel::<String>(100);

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    log::error!("error reading stdin: {e:?}");
                    break;
                }
            }
        }
    });

    let mut stdout = tokio::io::stdout();

    while let Some(line) = rx.recv().await {
        if line.trim().is_empty() {
            continue;
        }

        let response = dispatcher.on_message(&line);

        stdout.write_all(response.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    log::info!("input closed, shutting down");

    Ok(())
}
