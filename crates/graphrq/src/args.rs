use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;
use graphrq_server::{Config, GraphDefinition};
use tracing::Subscriber;
use tracing_subscriber::{registry::LookupSpan, Layer};

mod log;

pub(crate) use log::{LogLevel, LogStyle};

pub(crate) type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

#[derive(Debug, Parser)]
#[command(name = "GraphRQ", version)]
/// GraphQL API over requirements, users and tests
pub(crate) struct Args {
    /// IP address on which the server will listen for incoming connections. Defaults to 127.0.0.1:4000.
    #[arg(short, long)]
    pub listen_address: Option<SocketAddr>,
    /// Path to the TOML configuration file
    #[arg(long, short, env = "GRAPHRQ_CONFIG_PATH", default_value = "./graphrq.toml")]
    pub config: PathBuf,
    /// Path to the GraphQL SDL. Defaults to the bundled requirements schema.
    #[arg(long, short, env = "GRAPHRQ_SCHEMA_PATH")]
    pub schema: Option<PathBuf>,
    /// Path to a JSON document the root fields are resolved from
    #[arg(long, env = "GRAPHRQ_SEED_PATH")]
    pub seed: Option<PathBuf>,
    /// Set the logging level
    #[arg(long = "log", env = "GRAPHRQ_LOG")]
    pub log_level: Option<LogLevel>,
    /// Set the style of log output
    #[arg(long, env = "GRAPHRQ_LOG_STYLE", default_value_t = LogStyle::Text)]
    pub log_style: LogStyle,
    /// Print the schema with every directive applied and exit
    #[arg(long)]
    pub print_schema: bool,
}

pub(crate) fn parse() -> Args {
    Args::parse()
}

impl Args {
    pub fn config(&self) -> anyhow::Result<Config> {
        Ok(Config::load(&self.config)?)
    }

    pub fn graph(&self) -> anyhow::Result<GraphDefinition> {
        Ok(GraphDefinition::load(self.schema.as_deref(), self.seed.as_deref())?)
    }

    pub fn log_format<S>(&self) -> BoxedLayer<S>
    where
        S: Subscriber + for<'span> LookupSpan<'span> + Send + Sync,
    {
        let layer = tracing_subscriber::fmt::layer();

        match self.log_style {
            // for interactive terminals we provide colored output
            LogStyle::Text if atty::is(atty::Stream::Stdout) => layer.with_ansi(true).boxed(),
            LogStyle::Text => layer.with_ansi(false).boxed(),
            LogStyle::Json => layer.json().boxed(),
        }
    }
}
