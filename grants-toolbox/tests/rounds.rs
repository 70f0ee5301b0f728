use chrono::{DateTime, TimeZone, Utc};
use grants_lib::{Round, RoundFetcher, RoundSource, RoundsState, StaticRoundSource};
use grants_toolbox::{
    config::SourceConfig,
    render::{render_proposal, render_round, render_rounds, OutputFormat},
    source::open_source,
};
use proptest::prelude::*;
use std::{path::PathBuf, sync::Arc};
use test_strategy::proptest;

fn rounds_file() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("resources/testing/rounds.json")
}

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 15, 0, 0).unwrap()
}

async fn settled_state() -> RoundsState {
    let source = open_source(&SourceConfig::File(rounds_file())).unwrap();
    let mut handle = RoundFetcher::new(source).mount();
    handle.settled().await
}

#[tokio::test]
async fn test_rounds_file_listing() {
    let state = settled_state().await;
    assert_eq!(state.rounds().map(<[Round]>::len), Some(3));

    let mut out = Vec::new();
    render_rounds(&mut out, &state, at(2022, 11, 11), OutputFormat::Csv, None).unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "section,id,voting_end,title\n\
         Active Rounds,3,2022-12-13T15:00:00Z,Round 3\n\
         Past Rounds,1,2022-10-14T15:00:00Z,Round 1\n\
         Past Rounds,2,2022-11-11T15:00:00Z,Round 2\n"
    );
}

#[tokio::test]
async fn test_every_round_over() {
    let state = settled_state().await;

    let classification = state.classify(at(2023, 1, 1)).unwrap();
    assert!(classification.active.is_empty());
    assert_eq!(
        classification
            .past
            .iter()
            .map(|round| round.id.value())
            .collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
}

#[tokio::test]
async fn test_round_proposals_from_file() {
    let source = open_source(&SourceConfig::File(rounds_file())).unwrap();
    let round = source.fetch_round(3.into()).await.unwrap().unwrap();

    let mut out = Vec::new();
    render_round(&mut out, &round, at(2022, 12, 1), OutputFormat::Text).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("  voting ends:    2022-12-13T15:00:00Z\n"));
    assert!(text.ends_with(
        "  proposals:\n    #1      Subgraph for round payouts\n    #2      Grants dashboard translations\n"
    ));

    let proposal = round.proposal(2.into()).unwrap();
    let mut out = Vec::new();
    render_proposal(&mut out, &round, &proposal, OutputFormat::Csv).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "round_id,id,title\n3,2,Grants dashboard translations\n"
    );
    assert!(round.proposal(9.into()).is_none());
}

#[tokio::test]
async fn test_empty_rounds_file() {
    let source = Arc::new(StaticRoundSource::from_json_slice(b"[]").unwrap());
    let mut handle = RoundFetcher::new(source).mount();
    let state = handle.settled().await;

    let mut out = Vec::new();
    render_rounds(&mut out, &state, Utc::now(), OutputFormat::Text, None).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "No rounds created yet...\n");
}

#[proptest]
fn test_csv_has_a_record_per_round(rounds: Vec<Round>, #[strategy(0..4_102_444_800i64)] now: i64) {
    let now = Utc.timestamp_opt(now, 0).unwrap();
    let n_rounds = rounds.len();
    let state = RoundsState::from_rounds(rounds);

    let mut out = Vec::new();
    render_rounds(&mut out, &state, now, OutputFormat::Csv, None).unwrap();

    let mut reader = csv::Reader::from_reader(out.as_slice());
    prop_assert_eq!(reader.records().count(), n_rounds);
}
