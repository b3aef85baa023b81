use std::future::Future;

use clap::Parser;
use colored::Colorize;
use tokio::sync::watch;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use tickmove::cli::args::Cli;
use tickmove::cli::commands::{self, Services};
use tickmove::config::DialoguerSetup;
use tickmove::error::EXIT_OK;
use tickmove::output::format_summary;
use tickmove::secrets::KeyringStore;
use tickmove::store::KeepConnector;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    let shutdown = listen_for_interrupt().await;

    let connector = KeepConnector::new();
    let secrets = KeyringStore::new();
    let setup = DialoguerSetup::new();
    let services = Services {
        connector: &connector,
        secrets: &secrets,
        setup: &setup,
    };

    let code = match commands::sync(&cli, services, shutdown).await {
        Ok(summary) => {
            println!("{}", format_summary(&summary));
            EXIT_OK
        },
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            e.exit_code()
        },
    };
    std::process::exit(code);
}

fn init_tracing(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tickmove={}", cli.log_level())));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Install the Ctrl-C handler now, before any prompt or network call, and
/// return a future that resolves on the first interrupt.
///
/// If the handler cannot be installed the returned future never resolves.
async fn listen_for_interrupt() -> impl Future<Output = ()> {
    let (tx, mut rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = tx.send(true);
            },
            Err(e) => tracing::warn!(error = %e, "could not listen for Ctrl-C"),
        }
    });
    // Let the listener register its handler before startup begins.
    tokio::task::yield_now().await;

    async move {
        if rx.wait_for(|interrupted| *interrupted).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
