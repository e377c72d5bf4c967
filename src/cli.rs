use std::path::PathBuf;

mod account;
mod check;
mod init;
mod rooms;
mod session;
mod status;
mod terminal;

use anyhow::Context as _;
use clap::ArgAction;
use roombook::{BookingWorkflow, Config, Fixture};
use tracing::instrument;

/// Default location of the configuration file.
const CONFIG_PATH: &str = ".roombook/config.toml";

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Seed fixture (YAML, or JSON with a .json extension).
    ///
    /// Defaults to the built-in demo catalog.
    #[arg(short, long, value_name = "PATH", global = true)]
    fixture: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long, value_name = "PATH", default_value = CONFIG_PATH, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let sources = Sources {
            fixture: self.fixture,
            config: self.config,
        };

        self.command
            .unwrap_or_else(|| Command::Status(status::Command::default()))
            .run(&sources)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show room, booking and request counts (default)
    Status(status::Command),

    /// List the room catalog
    Rooms(rooms::Command),

    /// Check whether a slot can be booked without approval
    ///
    /// Exits with status 2 when the slot needs administrator approval.
    Check(check::Command),

    /// Write a default configuration file
    Init(init::Command),

    /// Manage login accounts
    #[command(subcommand)]
    Account(account::Command),

    /// Log in and work through the booking dashboards
    ///
    /// Changes live in memory and are discarded on exit.
    Session(session::Command),
}

impl Command {
    fn run(self, sources: &Sources) -> anyhow::Result<()> {
        match self {
            Self::Status(command) => command.run(sources)?,
            Self::Rooms(command) => command.run(sources)?,
            Self::Check(command) => command.run(sources)?,
            Self::Init(command) => command.run(&sources.config)?,
            Self::Account(command) => command.run()?,
            Self::Session(command) => command.run(sources)?,
        }
        Ok(())
    }
}

/// Where the session state comes from.
#[derive(Debug, Clone)]
pub struct Sources {
    fixture: Option<PathBuf>,
    config: PathBuf,
}

impl Sources {
    /// Loads the configuration, falling back to defaults if the file is
    /// missing.
    fn config(&self) -> anyhow::Result<Config> {
        Config::load_or_default(&self.config).map_err(|e| anyhow::anyhow!(e))
    }

    /// Builds a workflow from the fixture and configuration.
    #[instrument(level = "debug", skip(self))]
    fn workflow(&self) -> anyhow::Result<BookingWorkflow> {
        let config = self.config()?;
        let fixture = match &self.fixture {
            Some(path) => Fixture::load(path)?,
            None => Fixture::demo(),
        };

        fixture
            .into_workflow(&config)
            .with_context(|| format!("invalid fixture {}", self.fixture_label()))
    }

    fn fixture_label(&self) -> String {
        self.fixture
            .as_deref()
            .map_or_else(|| "(built-in demo)".to_string(), |p| p.display().to_string())
    }
}

/// Parses a calendar date written `YYYY-MM-DD`.
fn parse_date(s: &str) -> Result<chrono::NaiveDate, String> {
    chrono::NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{s}' (expected YYYY-MM-DD): {e}"))
}

/// Parses a wall-clock time written `HH:MM`.
fn parse_time(s: &str) -> Result<chrono::NaiveTime, String> {
    roombook::domain::slot::parse_time(s)
        .map_err(|e| format!("invalid time '{s}' (expected HH:MM): {e}"))
}
