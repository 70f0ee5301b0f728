use super::Common;
use chrono::{DateTime, Utc};
use color_eyre::{eyre::bail, Report};
use grants_lib::{RoundFetcher, RoundId, RoundSource, RoundsState};
use grants_toolbox::{
    render::{render_round, render_rounds, OutputFormat},
    source::open_source,
};
use std::io::Write;
use structopt::StructOpt;
use tracing::{debug, info};

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub enum Rounds {
    /// List rounds, grouped into active and past rounds
    List(List),
    /// Show a single round
    Show(Show),
}

impl Rounds {
    pub async fn exec(self) -> Result<(), Report> {
        match self {
            Rounds::List(list) => list.exec().await,
            Rounds::Show(show) => show.exec().await,
        }
    }
}

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub struct List {
    #[structopt(flatten)]
    common: Common,

    /// Output format: text, json or csv
    #[structopt(long, default_value)]
    format: OutputFormat,

    /// Classify rounds at this instant (RFC 3339) instead of now
    #[structopt(long, parse(try_from_str = parse_instant))]
    at: Option<DateTime<Utc>>,
}

impl List {
    pub async fn exec(self) -> Result<(), Report> {
        let Self { common, format, at } = self;
        let (config, source) = common.source()?;
        let fetcher = RoundFetcher::new(open_source(&source)?);

        let mut handle = fetcher.mount();
        let state = handle
            .observe(|state| {
                if state.is_loading() {
                    info!("loading rounds...");
                }
            })
            .await;

        // sampled once, after the rounds arrived
        let now = at.unwrap_or_else(Utc::now);
        debug!("classifying rounds at {}", now);

        let mut output = common.open_output()?;
        render_rounds(&mut output, &state, now, format, config.intro.as_deref())?;
        output.flush()?;

        if let RoundsState::Failed(failure) = state {
            bail!(failure);
        }
        Ok(())
    }
}

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub struct Show {
    #[structopt(flatten)]
    common: Common,

    /// Round identifier
    id: RoundId,

    /// Output format: text, json or csv
    #[structopt(long, default_value)]
    format: OutputFormat,

    /// Report the round status at this instant (RFC 3339) instead of now
    #[structopt(long, parse(try_from_str = parse_instant))]
    at: Option<DateTime<Utc>>,
}

impl Show {
    pub async fn exec(self) -> Result<(), Report> {
        let Self {
            common,
            id,
            format,
            at,
        } = self;
        let (_config, source) = common.source()?;
        let source = open_source(&source)?;

        let round = match source.fetch_round(id).await? {
            Some(round) => round,
            None => bail!("round {} not found", id),
        };

        let now = at.unwrap_or_else(Utc::now);
        let mut output = common.open_output()?;
        render_round(&mut output, &round, now, format)?;
        output.flush()?;
        Ok(())
    }
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|instant| instant.with_timezone(&Utc))
}
