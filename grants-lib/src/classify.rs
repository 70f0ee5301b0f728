use crate::round::Round;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const ACTIVE_ROUNDS_LABEL: &str = "Active Rounds";
pub const PAST_ROUNDS_LABEL: &str = "Past Rounds";

/// A round is active while its voting end is strictly in the future.
/// A round whose voting ends exactly at `now` is already past.
#[inline]
pub fn is_active(round: &Round, now: DateTime<Utc>) -> bool {
    round.voting_end > now
}

/// Rounds split around a single reference instant.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Classification {
    #[serde(rename = "evaluated_at")]
    pub now: DateTime<Utc>,
    pub active: Vec<Round>,
    pub past: Vec<Round>,
}

/// One labeled, non-empty group of rounds ready to be displayed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Section<'a> {
    pub label: &'static str,
    pub rounds: &'a [Round],
}

impl Classification {
    pub fn len(&self) -> usize {
        self.active.len() + self.past.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.past.is_empty()
    }

    /// Active rounds first, then past rounds. Empty groups are left out.
    pub fn sections(&self) -> Vec<Section<'_>> {
        [
            (ACTIVE_ROUNDS_LABEL, self.active.as_slice()),
            (PAST_ROUNDS_LABEL, self.past.as_slice()),
        ]
        .into_iter()
        .filter(|(_, rounds)| !rounds.is_empty())
        .map(|(label, rounds)| Section { label, rounds })
        .collect()
    }
}

/// Stable partition of `rounds` into active and past rounds.
///
/// Every round lands in exactly one bucket and keeps its relative order.
/// `now` is taken as given and never re-sampled, so the boundary is the same
/// for every round of a single call.
pub fn classify<I>(rounds: I, now: DateTime<Utc>) -> Classification
where
    I: IntoIterator<Item = Round>,
{
    let (active, past) = rounds
        .into_iter()
        .partition(|round| is_active(round, now));
    Classification { now, active, past }
}

/// Same as [`classify`], sampling the wall clock exactly once.
pub fn classify_now<I>(rounds: I) -> Classification
where
    I: IntoIterator<Item = Round>,
{
    classify(rounds, Utc::now())
}
