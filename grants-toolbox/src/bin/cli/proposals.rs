use super::Common;
use color_eyre::{eyre::bail, Report};
use grants_lib::{ProposalId, RoundId, RoundSource};
use grants_toolbox::{
    render::{render_proposal, OutputFormat},
    source::open_source,
};
use std::io::Write;
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub enum Proposals {
    /// Show a single proposal of a round
    Show(Show),
}

impl Proposals {
    pub async fn exec(self) -> Result<(), Report> {
        match self {
            Proposals::Show(show) => show.exec().await,
        }
    }
}

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub struct Show {
    #[structopt(flatten)]
    common: Common,

    /// Identifier of the round the proposal was submitted to
    round_id: RoundId,

    /// Proposal identifier
    proposal_id: ProposalId,

    /// Output format: text, json or csv
    #[structopt(long, default_value)]
    format: OutputFormat,
}

impl Show {
    pub async fn exec(self) -> Result<(), Report> {
        let Self {
            common,
            round_id,
            proposal_id,
            format,
        } = self;
        let (_config, source) = common.source()?;
        let source = open_source(&source)?;

        let round = match source.fetch_round(round_id).await? {
            Some(round) => round,
            None => bail!("round {} not found", round_id),
        };
        let proposal = match round.proposal(proposal_id) {
            Some(proposal) => proposal,
            None => bail!("proposal {} not found in round {}", proposal_id, round_id),
        };

        let mut output = common.open_output()?;
        render_proposal(&mut output, &round, &proposal, format)?;
        output.flush()?;
        Ok(())
    }
}
