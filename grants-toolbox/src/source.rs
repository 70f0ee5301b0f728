use crate::config::SourceConfig;
use grants_lib::{HttpRoundSource, RoundSource, StaticRoundSource};
use std::{path::PathBuf, sync::Arc};
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not read rounds file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Rounds(#[from] grants_lib::Error),
}

pub fn open_source(config: &SourceConfig) -> Result<Arc<dyn RoundSource>, Error> {
    Ok(match config {
        SourceConfig::Api { url, timeout } => {
            info!("reading rounds from {}", url);
            Arc::new(HttpRoundSource::with_timeout(url.clone(), *timeout)?)
        }
        SourceConfig::File(path) => {
            info!("reading rounds from {}", path.display());
            let bytes = std::fs::read(path).map_err(|source| Error::Read {
                path: path.clone(),
                source,
            })?;
            Arc::new(StaticRoundSource::from_json_slice(&bytes)?)
        }
    })
}
