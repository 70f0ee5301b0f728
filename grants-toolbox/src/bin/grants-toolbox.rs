mod cli;

use color_eyre::Report;
use structopt::StructOpt;

#[tokio::main]
async fn main() -> Result<(), Report> {
    color_eyre::install()?;
    let cli = cli::Cli::from_args();
    cli.init_logging()?;
    cli.exec().await
}
