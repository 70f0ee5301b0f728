use crate::proposal::{Proposal, ProposalId};
use chrono::{DateTime, TimeZone, Utc};
use serde::{de::Error, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::{fmt, num::ParseIntError, str::FromStr};

/// Fields of a round the client does not interpret (title, funding pool,
/// proposal list, ...). They are kept verbatim and written back out as-is.
pub type Payload = Map<String, Value>;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct RoundId(u64);

impl RoundId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for RoundId {
    fn from(from: u64) -> Self {
        Self(from)
    }
}

impl FromStr for RoundId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for RoundId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        id_from_number_or_string(deserializer, "round").map(Self)
    }
}

// indexers disagree on whether ids are numbers or numeric strings
pub(crate) fn id_from_number_or_string<'de, D>(deserializer: D, kind: &str) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdInput {
        Int(u64),
        String(String),
    }

    match IdInput::deserialize(deserializer)? {
        IdInput::Int(id) => Ok(id),
        IdInput::String(id) => id
            .trim()
            .parse()
            .map_err(|e| D::Error::custom(format!("invalid {} id {:?}: {}", kind, id, e))),
    }
}

/// Keys the round itself owns; they never live in the payload.
const RESERVED_KEYS: &[&str] = &["id", "voting_end", "votingEnd"];

/// A time-boxed funding cycle, as delivered by the rounds API.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Round {
    pub id: RoundId,
    #[serde(alias = "votingEnd")]
    #[serde(deserialize_with = "timestamp_from_rfc3339_or_epoch_millis")]
    pub voting_end: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: Payload,
}

impl Round {
    pub fn new(id: RoundId, voting_end: DateTime<Utc>) -> Self {
        Self {
            id,
            voting_end,
            payload: Payload::new(),
        }
    }

    /// Adds a payload field. `id` and `voting_end` are owned by the round and
    /// are ignored here, so they are never written twice.
    pub fn with_field<V: Into<Value>>(mut self, key: &str, value: V) -> Self {
        if !RESERVED_KEYS.contains(&key) {
            self.payload.insert(key.to_string(), value.into());
        }
        self
    }

    /// Proposals listed in the payload. Entries without a usable id are skipped.
    pub fn proposals(&self) -> Vec<Proposal> {
        self.payload
            .get("proposals")
            .and_then(Value::as_array)
            .map(|proposals| {
                proposals
                    .iter()
                    .filter_map(|proposal| Proposal::deserialize(proposal).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn proposal(&self, id: ProposalId) -> Option<Proposal> {
        self.proposals()
            .into_iter()
            .find(|proposal| proposal.id == id)
    }

    pub fn title(&self) -> Option<&str> {
        self.payload.get("title").and_then(Value::as_str)
    }

    pub fn voting_start(&self) -> Option<DateTime<Utc>> {
        self.payload_timestamp(&["voting_start", "votingStart"])
    }

    pub fn proposal_start(&self) -> Option<DateTime<Utc>> {
        self.payload_timestamp(&["proposal_start", "proposalStart"])
    }

    pub fn proposal_end(&self) -> Option<DateTime<Utc>> {
        self.payload_timestamp(&["proposal_end", "proposalEnd"])
    }

    fn payload_timestamp(&self, keys: &[&str]) -> Option<DateTime<Utc>> {
        keys.iter()
            .find_map(|key| self.payload.get(*key))
            .and_then(|value| TimestampInput::deserialize(value).ok())
            .and_then(|input| input.into_datetime().ok())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TimestampInput {
    /// Milliseconds since the unix epoch, as javascript clients send them
    EpochMillis(i64),
    Rfc3339(String),
}

impl TimestampInput {
    fn into_datetime(self) -> Result<DateTime<Utc>, String> {
        match self {
            TimestampInput::EpochMillis(millis) => Utc
                .timestamp_millis_opt(millis)
                .single()
                .ok_or_else(|| format!("epoch milliseconds out of range: {}", millis)),
            TimestampInput::Rfc3339(s) => DateTime::parse_from_rfc3339(&s)
                .map(|ts| ts.with_timezone(&Utc))
                .map_err(|e| format!("invalid rfc3339 timestamp {:?}: {}", s, e)),
        }
    }
}

fn timestamp_from_rfc3339_or_epoch_millis<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    TimestampInput::deserialize(deserializer)?
        .into_datetime()
        .map_err(D::Error::custom)
}

#[cfg(any(test, feature = "proptest"))]
mod arbitrary {
    use super::*;
    use proptest::prelude::*;

    /// Upper bound for generated voting ends, 2100-01-01T00:00:00Z.
    const MAX_VOTING_END: i64 = 4_102_444_800;

    impl Arbitrary for RoundId {
        type Parameters = ();
        type Strategy = BoxedStrategy<RoundId>;

        fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
            any::<u64>().prop_map(RoundId).boxed()
        }
    }

    impl Arbitrary for Round {
        type Parameters = ();
        type Strategy = BoxedStrategy<Round>;

        fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
            (
                any::<RoundId>(),
                0..MAX_VOTING_END,
                proptest::option::of("[A-Za-z0-9 ]{1,32}"),
            )
                .prop_map(|(id, voting_end, title)| {
                    let voting_end = Utc
                        .timestamp_opt(voting_end, 0)
                        .single()
                        .expect("every generated second is in range");
                    let round = Round::new(id, voting_end);
                    match title {
                        Some(title) => round.with_field("title", title),
                        None => round,
                    }
                })
                .boxed()
        }
    }
}
