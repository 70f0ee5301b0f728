use crate::round::{id_from_number_or_string, Payload};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, num::ParseIntError, str::FromStr};

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct ProposalId(u64);

impl ProposalId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for ProposalId {
    fn from(from: u64) -> Self {
        Self(from)
    }
}

impl FromStr for ProposalId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for ProposalId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        id_from_number_or_string(deserializer, "proposal").map(Self)
    }
}

/// A funding request submitted to a round, as listed in the round payload.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Proposal {
    pub id: ProposalId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub payload: Payload,
}
