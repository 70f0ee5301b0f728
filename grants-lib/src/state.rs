use crate::{
    classify::{classify, Classification},
    error::{Error, RetrievalFailure},
    round::Round,
};
use chrono::{DateTime, Utc};
use std::fmt;

pub const NO_ROUNDS_MESSAGE: &str = "No rounds created yet...";

/// A collection of rounds that is known to hold at least one round.
#[derive(Clone, Debug, PartialEq)]
pub struct ReadyRounds(Vec<Round>);

impl ReadyRounds {
    pub fn new(rounds: Vec<Round>) -> Option<Self> {
        if rounds.is_empty() {
            None
        } else {
            Some(Self(rounds))
        }
    }

    pub fn as_slice(&self) -> &[Round] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// What the presentation layer can observe about the rounds collection.
/// Exactly one variant holds at any time.
#[derive(Clone, Debug, Default)]
pub enum RoundsState {
    /// Fetch in flight, no data yet.
    #[default]
    Loading,
    /// Fetch completed without any round.
    Empty,
    /// Fetch completed with one or more rounds.
    Ready(ReadyRounds),
    /// The rounds could not be retrieved.
    Failed(RetrievalFailure),
}

impl RoundsState {
    pub fn from_rounds(rounds: Vec<Round>) -> Self {
        ReadyRounds::new(rounds).map_or(RoundsState::Empty, RoundsState::Ready)
    }

    pub fn from_fetch(result: Result<Vec<Round>, Error>) -> Self {
        match result {
            Ok(rounds) => Self::from_rounds(rounds),
            Err(error) => RoundsState::Failed(error.into()),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, RoundsState::Loading)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RoundsState::Empty)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, RoundsState::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RoundsState::Failed(_))
    }

    pub fn rounds(&self) -> Option<&[Round]> {
        match self {
            RoundsState::Ready(rounds) => Some(rounds.as_slice()),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&RetrievalFailure> {
        match self {
            RoundsState::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Only a ready collection gets classified.
    pub fn classify(&self, now: DateTime<Utc>) -> Option<Classification> {
        self.rounds()
            .map(|rounds| classify(rounds.iter().cloned(), now))
    }
}

impl fmt::Display for RoundsState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundsState::Loading => write!(f, "loading rounds"),
            RoundsState::Empty => write!(f, "{}", NO_ROUNDS_MESSAGE),
            RoundsState::Ready(rounds) => write!(f, "{} round(s)", rounds.len()),
            RoundsState::Failed(failure) => write!(f, "{}", failure),
        }
    }
}
