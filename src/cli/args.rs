use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Parser, Debug)]
#[command(name = "tickmove")]
#[command(about = "Move ticked items from low priority Google Keep lists to their primary lists")]
#[command(long_about = "tickmove - keep your shopping lists in order

Watches one or more \"low priority\" checklists in Google Keep. Whenever an
item is ticked there, it is removed and added, unticked, to the top of the
matching primary list.

FIRST RUN:
  Without a config.json in the working directory, tickmove asks for your
  Google account, a master token and the list names, checks them against
  Keep, stores the token in the system keyring and writes config.json.

QUICK START:
  tickmove                       Use ./config.json (run setup if missing)
  tickmove -c ~/keep/home.json   Use another config file
  tickmove --once                Run a single cycle and exit

Set RUST_LOG (e.g. RUST_LOG=tickmove=debug) or pass -v for more detail.")]
#[command(version)]
pub struct Cli {
    /// Config file to use instead of ./config.json
    ///
    /// When given, the file must already exist; first-run setup only
    /// happens for the default location.
    #[arg(short, long, value_name = "PATH", env = "TICKMOVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Snapshot file [default: keep_notes.json next to the config file]
    #[arg(long, value_name = "PATH")]
    pub snapshot: Option<PathBuf>,

    /// Override the poll interval from the config file, in milliseconds
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Run a single cycle, push the changes, and exit
    #[arg(long)]
    pub once: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Default log filter for the chosen verbosity.
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
