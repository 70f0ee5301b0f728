use chrono::{DateTime, SecondsFormat, Utc};
use grants_lib::{
    is_active, Classification, Proposal, ProposalId, Round, RoundId, RoundsState,
    ACTIVE_ROUNDS_LABEL, NO_ROUNDS_MESSAGE, PAST_ROUNDS_LABEL,
};
use serde::Serialize;
use std::{fmt, io::Write, str::FromStr};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("unknown output format {0:?}, expected one of text, json, csv")]
    UnknownFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Text
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_ref() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        })
    }
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Listing<'a> {
    Loading,
    Empty,
    Ready(&'a Classification),
    Failed { error: String },
}

#[derive(Serialize)]
struct RoundRecord<'a> {
    section: &'static str,
    id: RoundId,
    voting_end: DateTime<Utc>,
    title: Option<&'a str>,
}

/// Writes the rounds listing for `state`, classifying ready rounds at `now`.
pub fn render_rounds<W: Write>(
    mut writer: W,
    state: &RoundsState,
    now: DateTime<Utc>,
    format: OutputFormat,
    intro: Option<&str>,
) -> Result<(), Error> {
    let classification = state.classify(now);
    match format {
        OutputFormat::Text => {
            if let Some(intro) = intro {
                writeln!(writer, "{}\n", intro)?;
            }
            match (state, &classification) {
                (_, Some(classification)) => write_sections(&mut writer, classification)?,
                (RoundsState::Empty, None) => writeln!(writer, "{}", NO_ROUNDS_MESSAGE)?,
                (state, None) => writeln!(writer, "{}", state)?,
            }
        }
        OutputFormat::Json => {
            let listing = match (state, &classification) {
                (_, Some(classification)) => Listing::Ready(classification),
                (RoundsState::Failed(failure), None) => Listing::Failed {
                    error: failure.to_string(),
                },
                (RoundsState::Empty, None) => Listing::Empty,
                (_, None) => Listing::Loading,
            };
            serde_json::to_writer_pretty(&mut writer, &listing)?;
            writeln!(writer)?;
        }
        OutputFormat::Csv => {
            let mut csv_writer = csv::Writer::from_writer(writer);
            match &classification {
                Some(classification) => {
                    for section in classification.sections() {
                        for round in section.rounds {
                            csv_writer.serialize(RoundRecord {
                                section: section.label,
                                id: round.id,
                                voting_end: round.voting_end,
                                title: round.title(),
                            })?;
                        }
                    }
                }
                None => csv_writer.write_record(["section", "id", "voting_end", "title"])?,
            }
            csv_writer.flush()?;
        }
    }
    Ok(())
}

fn write_sections<W: Write>(writer: &mut W, classification: &Classification) -> Result<(), Error> {
    for (i, section) in classification.sections().into_iter().enumerate() {
        if i > 0 {
            writeln!(writer)?;
        }
        writeln!(writer, "{}", section.label)?;
        for round in section.rounds {
            writeln!(
                writer,
                "  #{:<6} {:<40} voting ends {}",
                round.id,
                round.title().unwrap_or("(untitled)"),
                timestamp(round.voting_end)
            )?;
        }
    }
    Ok(())
}

/// Details of a single round, as seen at `now`.
pub fn render_round<W: Write>(
    mut writer: W,
    round: &Round,
    now: DateTime<Utc>,
    format: OutputFormat,
) -> Result<(), Error> {
    let status = if is_active(round, now) {
        "active"
    } else {
        "past"
    };
    match format {
        OutputFormat::Text => {
            writeln!(
                writer,
                "Round #{}: {}",
                round.id,
                round.title().unwrap_or("(untitled)")
            )?;
            writeln!(writer, "  status:         {}", status)?;
            if let Some(start) = round.proposal_start() {
                writeln!(writer, "  proposals open: {}", timestamp(start))?;
            }
            if let Some(end) = round.proposal_end() {
                writeln!(writer, "  proposals end:  {}", timestamp(end))?;
            }
            if let Some(start) = round.voting_start() {
                writeln!(writer, "  voting starts:  {}", timestamp(start))?;
            }
            writeln!(writer, "  voting ends:    {}", timestamp(round.voting_end))?;
            let proposals = round.proposals();
            if proposals.is_empty() {
                writeln!(writer, "  proposals:      none")?;
            } else {
                writeln!(writer, "  proposals:")?;
                for proposal in &proposals {
                    writeln!(
                        writer,
                        "    #{:<6} {}",
                        proposal.id,
                        proposal.title.as_deref().unwrap_or("(untitled)")
                    )?;
                }
            }
        }
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct RoundDetail<'a> {
                status: &'static str,
                #[serde(flatten)]
                round: &'a Round,
            }
            serde_json::to_writer_pretty(&mut writer, &RoundDetail { status, round })?;
            writeln!(writer)?;
        }
        OutputFormat::Csv => {
            let mut csv_writer = csv::Writer::from_writer(writer);
            let section = if is_active(round, now) {
                ACTIVE_ROUNDS_LABEL
            } else {
                PAST_ROUNDS_LABEL
            };
            csv_writer.serialize(RoundRecord {
                section,
                id: round.id,
                voting_end: round.voting_end,
                title: round.title(),
            })?;
            csv_writer.flush()?;
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct ProposalRecord<'a> {
    round_id: RoundId,
    id: ProposalId,
    title: Option<&'a str>,
}

/// Details of a single proposal submitted to `round`.
pub fn render_proposal<W: Write>(
    mut writer: W,
    round: &Round,
    proposal: &Proposal,
    format: OutputFormat,
) -> Result<(), Error> {
    match format {
        OutputFormat::Text => {
            writeln!(
                writer,
                "Proposal #{}: {}",
                proposal.id,
                proposal.title.as_deref().unwrap_or("(untitled)")
            )?;
            writeln!(
                writer,
                "  round:          #{} {}",
                round.id,
                round.title().unwrap_or("(untitled)")
            )?;
            for (key, value) in &proposal.payload {
                let label = format!("{}:", key);
                match value {
                    serde_json::Value::String(s) => writeln!(writer, "  {:<15} {}", label, s)?,
                    value => writeln!(writer, "  {:<15} {}", label, value)?,
                }
            }
        }
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ProposalDetail<'a> {
                round_id: RoundId,
                #[serde(flatten)]
                proposal: &'a Proposal,
            }
            serde_json::to_writer_pretty(
                &mut writer,
                &ProposalDetail {
                    round_id: round.id,
                    proposal,
                },
            )?;
            writeln!(writer)?;
        }
        OutputFormat::Csv => {
            let mut csv_writer = csv::Writer::from_writer(writer);
            csv_writer.serialize(ProposalRecord {
                round_id: round.id,
                id: proposal.id,
                title: proposal.title.as_deref(),
            })?;
            csv_writer.flush()?;
        }
    }
    Ok(())
}

fn timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}
