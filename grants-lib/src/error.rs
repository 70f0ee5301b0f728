use reqwest::StatusCode;
use std::sync::Arc;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("request to {url} failed with status {status}")]
    Status { url: Url, status: StatusCode },

    #[error("invalid rounds payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    InvalidUrl(#[from] url::ParseError),

    #[error("rounds fetch did not complete: {0}")]
    Task(String),
}

/// The fetch collaborator could not produce a collection of rounds.
///
/// Shared so that the collection state can be cloned out to every subscriber.
#[derive(Clone, Debug, thiserror::Error)]
#[error("could not retrieve rounds: {0}")]
pub struct RetrievalFailure(Arc<Error>);

impl RetrievalFailure {
    pub fn error(&self) -> &Error {
        &self.0
    }
}

impl From<Error> for RetrievalFailure {
    fn from(error: Error) -> Self {
        Self(Arc::new(error))
    }
}
