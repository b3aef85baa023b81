//! Sync command implementation.
//!
//! Gets from command-line flags to a running loop: first-run setup or
//! config load, authentication, snapshot restore, validation, then the
//! runner. The shutdown future is watched from the start, so an interrupt
//! during startup ends the command cleanly too.

use std::future::Future;
use std::time::Duration;

use colored::Colorize;

use crate::cli::args::Cli;
use crate::config::validate::check_interval;
use crate::config::{build_from_interactive_input, Configuration, Paths, SetupProvider};
use crate::error::MoverError;
use crate::output::format_loaded;
use crate::secrets::SecretStore;
use crate::snapshot;
use crate::store::{Connector, NoteStore};
use crate::sync::{RunSummary, Runner, RunnerOptions, StopReason};

/// External collaborators the sync command depends on.
pub struct Services<'a, C> {
    pub connector: &'a C,
    pub secrets: &'a dyn SecretStore,
    pub setup: &'a dyn SetupProvider,
}

/// Execute the sync loop until `shutdown` resolves.
///
/// # Errors
///
/// Configuration, validation and authentication problems are returned
/// before the loop starts, and so is a network failure during the first
/// fetch. Afterwards only non-transient errors end it.
pub async fn sync<C, F>(
    cli: &Cli,
    services: Services<'_, C>,
    shutdown: F,
) -> Result<RunSummary, MoverError>
where
    C: Connector,
    F: Future<Output = ()>,
{
    let paths = Paths::resolve(cli.config.as_deref(), cli.snapshot.as_deref())?;
    sync_with_paths(cli, &paths, &services, shutdown).await
}

async fn sync_with_paths<C, F>(
    cli: &Cli,
    paths: &Paths,
    services: &Services<'_, C>,
    shutdown: F,
) -> Result<RunSummary, MoverError>
where
    C: Connector,
    F: Future<Output = ()>,
{
    let interval = cli.interval_ms.map(Duration::from_millis);
    if let Some(interval) = interval {
        check_interval(interval)?;
    }

    tokio::pin!(shutdown);
    let started = tokio::select! {
        biased;
        () = &mut shutdown => Err(MoverError::Interrupted("startup".to_string())),
        started = start(paths, services, interval) => started,
    };
    let (config, store) = match started {
        Ok(started) => started,
        Err(MoverError::Interrupted(stage)) => {
            tracing::info!(%stage, "interrupted before the first cycle");
            return Ok(RunSummary {
                cycles: 0,
                moved: 0,
                reason: StopReason::Interrupted,
            });
        },
        Err(e) => return Err(e),
    };

    println!("{}", format_loaded(&config));

    let mut options = RunnerOptions::from_config(&config, Some(paths.snapshot_file.clone()));
    if cli.once {
        options.max_cycles = Some(1);
    }

    let mut runner = Runner::new(store, options);
    runner.run(shutdown).await
}

/// First-run setup or config load, ending with a validated configuration
/// and a store holding current notes.
async fn start<C: Connector>(
    paths: &Paths,
    services: &Services<'_, C>,
    interval: Option<Duration>,
) -> Result<(Configuration, C::Store), MoverError> {
    if !paths.is_first_run() {
        if paths.explicit_config {
            tracing::info!(path = %paths.config_file.display(), "using config file");
        }
        return load_and_connect(paths, services.connector, services.secrets, interval).await;
    }

    println!(
        "{} {} not found, starting setup",
        "First run:".cyan().bold(),
        paths.config_file.display()
    );
    let (mut config, store) =
        build_from_interactive_input(services.setup, services.connector, services.secrets, paths)
            .await?;
    if let Some(interval) = interval {
        config.poll_interval = interval;
    }
    Ok((config, store))
}

/// Load an existing configuration and bring the note store up to date.
///
/// The file and local fields are validated before any network call. The
/// snapshot, if usable, saves a full fetch. A failed first fetch is not
/// retried: list names can only be checked against current notes.
async fn load_and_connect<C: Connector>(
    paths: &Paths,
    connector: &C,
    secrets: &dyn SecretStore,
    interval: Option<Duration>,
) -> Result<(Configuration, C::Store), MoverError> {
    let mut config = Configuration::load(&paths.config_file, secrets)?;
    if let Some(interval) = interval {
        config.poll_interval = interval;
    }
    config.validate_local()?;

    let mut store = connector.connect(&config.username, &config.secret).await?;

    match snapshot::read(&paths.snapshot_file) {
        Ok(Some(bytes)) => match store.restore_state(&bytes) {
            Ok(()) => tracing::debug!("resumed from snapshot"),
            Err(e) => tracing::warn!(error = %e, "snapshot unusable, fetching all notes"),
        },
        Ok(None) => tracing::info!("no snapshot, fetching all notes"),
        Err(e) => tracing::warn!(error = %e, "could not read snapshot, fetching all notes"),
    }

    store.refresh().await?;
    config.validate(&store)?;
    Ok((config, store))
}
