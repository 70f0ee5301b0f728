use crate::{
    error::Error,
    round::{Round, RoundId},
    source::RoundSource,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Reads rounds from the grants API.
///
/// `GET {base}/rounds` answers with a JSON array of rounds and
/// `GET {base}/rounds/{id}` with a single one.
#[derive(Clone, Debug)]
pub struct HttpRoundSource {
    client: Client,
    base_url: Url,
}

impl HttpRoundSource {
    pub fn new(base_url: Url) -> Result<Self, Error> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: Url, timeout: Duration) -> Result<Self, Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// Uses a preconfigured client, e.g. one with custom proxy settings.
    pub fn with_client(base_url: Url, client: Client) -> Self {
        Self {
            client,
            base_url: with_trailing_slash(base_url),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn rounds_url(&self) -> Result<Url, Error> {
        Ok(self.base_url.join("rounds")?)
    }

    pub fn round_url(&self, id: RoundId) -> Result<Url, Error> {
        Ok(self.base_url.join(&format!("rounds/{}", id))?)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, Error> {
        debug!("GET {}", url);
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Error::Status { url, status });
        }
        let body = response.bytes().await?;
        Ok(Some(serde_json::from_slice(&body)?))
    }
}

#[async_trait]
impl RoundSource for HttpRoundSource {
    async fn fetch_rounds(&self) -> Result<Vec<Round>, Error> {
        let url = self.rounds_url()?;
        match self.get(url.clone()).await? {
            Some(rounds) => Ok(rounds),
            None => Err(Error::Status {
                url,
                status: StatusCode::NOT_FOUND,
            }),
        }
    }

    async fn fetch_round(&self, id: RoundId) -> Result<Option<Round>, Error> {
        self.get(self.round_url(id)?).await
    }
}

// `Url::join` replaces the last path segment unless the base ends with a slash
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        task::JoinHandle,
    };

    /// Answers a single request with `status` and `body`, and hands back the
    /// request line it received.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (HttpRoundSource, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            // the client may already have hung up
            let _ = stream.shutdown().await;
            String::from_utf8_lossy(&request)
                .lines()
                .next()
                .unwrap_or_default()
                .to_string()
        });

        let client = Client::builder().no_proxy().build().unwrap();
        let base_url = format!("http://{}/api", addr).parse().unwrap();
        (HttpRoundSource::with_client(base_url, client), server)
    }

    #[tokio::test]
    async fn test_fetch_rounds() {
        let (source, server) = serve_once(
            "200 OK",
            r#"[{"id": 1, "title": "Round 1", "voting_end": "2022-10-14T15:00:00.000Z"}]"#,
        )
        .await;

        let rounds = source.fetch_rounds().await.unwrap();

        assert_eq!(server.await.unwrap(), "GET /api/rounds HTTP/1.1");
        assert_eq!(rounds.len(), 1);
        assert_eq!(rounds[0].id, RoundId::from(1));
        assert_eq!(rounds[0].title(), Some("Round 1"));
    }

    #[tokio::test]
    async fn test_fetch_single_round() {
        let (source, server) =
            serve_once("200 OK", r#"{"id": "7", "votingEnd": 1670943600000}"#).await;

        let round = source.fetch_round(7.into()).await.unwrap().unwrap();

        assert_eq!(server.await.unwrap(), "GET /api/rounds/7 HTTP/1.1");
        assert_eq!(round.id, RoundId::from(7));
        assert_eq!(round.voting_end.to_rfc3339(), "2022-12-13T15:00:00+00:00");
    }

    #[tokio::test]
    async fn test_missing_round_is_none() {
        let (source, server) = serve_once("404 Not Found", r#"{"error": "not found"}"#).await;

        assert!(source.fetch_round(99.into()).await.unwrap().is_none());
        assert_eq!(server.await.unwrap(), "GET /api/rounds/99 HTTP/1.1");
    }

    #[tokio::test]
    async fn test_missing_rounds_endpoint_is_an_error() {
        let (source, _server) = serve_once("404 Not Found", "").await;

        let error = source.fetch_rounds().await.unwrap_err();
        assert!(matches!(
            error,
            Error::Status { status, .. } if status == StatusCode::NOT_FOUND
        ));
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let (source, _server) = serve_once("500 Internal Server Error", "").await;

        match source.fetch_rounds().await.unwrap_err() {
            Error::Status { url, status } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(url.path(), "/api/rounds");
            }
            error => panic!("unexpected error: {}", error),
        }
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let (source, _server) = serve_once("200 OK", r#"{"rounds": "#).await;

        assert!(matches!(
            source.fetch_rounds().await.unwrap_err(),
            Error::Decode(_)
        ));
    }

    #[test]
    fn test_endpoint_urls() {
        let source =
            HttpRoundSource::new("https://grants.example.org/api/v1".parse().unwrap()).unwrap();

        assert_eq!(source.base_url().as_str(), "https://grants.example.org/api/v1/");
        assert_eq!(
            source.rounds_url().unwrap().as_str(),
            "https://grants.example.org/api/v1/rounds"
        );
        assert_eq!(
            source.round_url(12.into()).unwrap().as_str(),
            "https://grants.example.org/api/v1/rounds/12"
        );
    }

    #[test]
    fn test_root_base_url() {
        let source = HttpRoundSource::with_timeout(
            "http://localhost:3000".parse().unwrap(),
            Duration::from_secs(1),
        )
        .unwrap();

        assert_eq!(
            source.rounds_url().unwrap().as_str(),
            "http://localhost:3000/rounds"
        );
    }
}
