use crate::{
    error::Error,
    round::{Round, RoundId},
};
use async_trait::async_trait;
use std::sync::Arc;

/// Anything able to produce the collection of rounds: an API, an indexer,
/// a file loaded up front.
#[async_trait]
pub trait RoundSource: Send + Sync {
    async fn fetch_rounds(&self) -> Result<Vec<Round>, Error>;

    async fn fetch_round(&self, id: RoundId) -> Result<Option<Round>, Error> {
        Ok(self
            .fetch_rounds()
            .await?
            .into_iter()
            .find(|round| round.id == id))
    }
}

#[async_trait]
impl<S: RoundSource + ?Sized> RoundSource for Arc<S> {
    async fn fetch_rounds(&self) -> Result<Vec<Round>, Error> {
        (**self).fetch_rounds().await
    }

    async fn fetch_round(&self, id: RoundId) -> Result<Option<Round>, Error> {
        (**self).fetch_round(id).await
    }
}

/// Serves a fixed collection, e.g. rounds exported to a JSON file.
#[derive(Clone, Debug, Default)]
pub struct StaticRoundSource {
    rounds: Vec<Round>,
}

impl StaticRoundSource {
    pub fn new(rounds: Vec<Round>) -> Self {
        Self { rounds }
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, Error> {
        Ok(Self::new(serde_json::from_slice(bytes)?))
    }
}

#[async_trait]
impl RoundSource for StaticRoundSource {
    async fn fetch_rounds(&self) -> Result<Vec<Round>, Error> {
        Ok(self.rounds.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_fetch_round_by_id() {
        let now = Utc::now();
        let source = StaticRoundSource::new(vec![
            Round::new(1.into(), now).with_field("title", "first"),
            Round::new(2.into(), now).with_field("title", "second"),
        ]);

        let round = source.fetch_round(2.into()).await.unwrap().unwrap();
        assert_eq!(round.title(), Some("second"));
        assert!(source.fetch_round(3.into()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_from_json_slice() {
        let source = StaticRoundSource::from_json_slice(
            br#"[{"id": 3, "voting_end": "2022-10-14T15:00:00Z", "title": "Round 3"}]"#,
        )
        .unwrap();
        let shared: Arc<dyn RoundSource> = Arc::new(source);

        let rounds = shared.fetch_rounds().await.unwrap();
        assert_eq!(rounds.len(), 1);
        assert_eq!(rounds[0].title(), Some("Round 3"));

        assert!(matches!(
            StaticRoundSource::from_json_slice(b"{}"),
            Err(Error::Decode(_))
        ));
    }
}
