use std::path::PathBuf;

mod matrix;
mod status;
mod terminal;
mod uncovered;

use clap::ArgAction;
use matrix::Matrix;
use status::Status;
use tracemat::ExtractOptions;
use uncovered::Uncovered;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the XMI model document
    model: PathBuf,

    /// Name of the marker class whose instances are requirements
    #[arg(long, value_name = "NAME", default_value = "Exigence", global = true)]
    marker: String,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let options = ExtractOptions {
            marker: self.marker,
        };

        self.command
            .unwrap_or_else(|| Command::Status(Status::default()))
            .run(self.model, &options)
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
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show element counts and dependency coverage (default)
    Status(Status),

    /// Show the traceability matrix of retained dependencies
    Matrix(Matrix),

    /// List elements that participate in no dependency
    Uncovered(Uncovered),
}

impl Command {
    fn run(self, model: PathBuf, options: &ExtractOptions) -> anyhow::Result<()> {
        match self {
            Self::Status(command) => command.run(&model, options)?,
            Self::Matrix(command) => command.run(&model, options)?,
            Self::Uncovered(command) => command.run(&model, options)?,
        }
        Ok(())
    }
}
