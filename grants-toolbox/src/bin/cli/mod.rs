mod proposals;
mod rounds;

use color_eyre::{
    eyre::{bail, eyre},
    Report,
};
use grants_toolbox::config::{Config, SourceConfig};
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
};
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub struct Cli {
    /// Show debug logs on stderr
    #[structopt(long, short, global = true)]
    verbose: bool,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub enum Command {
    /// Inspect funding rounds
    Rounds(rounds::Rounds),
    /// Inspect the proposals submitted to a round
    Proposals(proposals::Proposals),
}

impl Cli {
    pub fn init_logging(&self) -> Result<(), Report> {
        let default_level = if self.verbose { "debug" } else { "info" };
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_level))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init()
            .map_err(|e| eyre!("could not install the logger: {}", e))
    }

    pub async fn exec(self) -> Result<(), Report> {
        match self.command {
            Command::Rounds(rounds) => rounds.exec().await,
            Command::Proposals(proposals) => proposals.exec().await,
        }
    }
}

/// Options shared by every command reading rounds.
#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub struct Common {
    /// JSON or YAML configuration file
    #[structopt(long)]
    config: Option<PathBuf>,

    /// Base url of the grants API
    #[structopt(long, env = "GRANTS_API_URL")]
    api_url: Option<Url>,

    /// JSON export of the rounds, read instead of the API
    #[structopt(long)]
    rounds_file: Option<PathBuf>,

    /// Request timeout when talking to the API
    #[structopt(long)]
    timeout_secs: Option<u64>,

    /// Write to this file instead of stdout
    #[structopt(long, short)]
    output: Option<PathBuf>,
}

impl Common {
    /// Configuration file values, overridden by command line flags.
    ///
    /// A source picked on the command line replaces the one from the file:
    /// `--api-url` drops the file's `rounds_file` and `--rounds-file` wins over
    /// its `api_url`. Passing both flags is an error.
    pub fn config(&self) -> Result<Config, Report> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        match (&self.api_url, &self.rounds_file) {
            (Some(_), Some(_)) => {
                bail!("--api-url and --rounds-file cannot be used together")
            }
            (Some(api_url), None) => {
                config.api_url = Some(api_url.clone());
                config.rounds_file = None;
            }
            (None, Some(rounds_file)) => config.rounds_file = Some(rounds_file.clone()),
            (None, None) => {}
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.timeout_secs = timeout_secs;
        }
        Ok(config)
    }

    pub fn source(&self) -> Result<(Config, SourceConfig), Report> {
        let config = self.config()?;
        let source = config.source()?;
        Ok((config, source))
    }

    pub fn open_output(&self) -> Result<Box<dyn Write>, Report> {
        Ok(match &self.output {
            Some(path) => Box::new(BufWriter::new(File::create(path)?)),
            None => Box::new(io::stdout()),
        })
    }
}
