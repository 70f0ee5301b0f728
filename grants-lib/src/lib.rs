pub mod classify;
mod error;
pub mod fetcher;
pub mod http;
pub mod proposal;
pub mod round;
pub mod source;
pub mod state;

pub use classify::{
    classify, classify_now, is_active, Classification, Section, ACTIVE_ROUNDS_LABEL,
    PAST_ROUNDS_LABEL,
};
pub use error::{Error, RetrievalFailure};
pub use fetcher::{FetchHandle, RoundFetcher};
pub use http::HttpRoundSource;
pub use proposal::{Proposal, ProposalId};
pub use round::{Payload, Round, RoundId};
pub use source::{RoundSource, StaticRoundSource};
pub use state::{ReadyRounds, RoundsState, NO_ROUNDS_MESSAGE};
