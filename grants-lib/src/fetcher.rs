//! Single-shot retrieval of the rounds collection.
//!
//! Mounting a [`RoundFetcher`] publishes [`RoundsState::Loading`] right away and
//! resolves it in the background. The presentation layer either polls the
//! current state, holds a [`watch::Receiver`] to re-render on change, or hands
//! a callback to [`FetchHandle::observe`].

use crate::{error::Error, source::RoundSource, state::RoundsState};
use std::sync::Arc;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, warn};

pub struct RoundFetcher<S: ?Sized> {
    source: Arc<S>,
}

impl<S: ?Sized> Clone for RoundFetcher<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

impl<S> RoundFetcher<S>
where
    S: RoundSource + ?Sized + 'static,
{
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    /// Starts one fetch. Must be called from within a tokio runtime.
    ///
    /// No retries: a failed fetch settles as [`RoundsState::Failed`].
    pub fn mount(&self) -> FetchHandle {
        let (sender, receiver) = watch::channel(RoundsState::Loading);
        let source = Arc::clone(&self.source);

        let task = tokio::spawn(async move {
            debug!("fetching rounds");
            let state = RoundsState::from_fetch(source.fetch_rounds().await);
            match &state {
                RoundsState::Failed(failure) => warn!("{}", failure),
                state => debug!("rounds fetched: {}", state),
            }
            if sender.send(state).is_err() {
                debug!("no view left to update, discarding fetched rounds");
            }
        });

        FetchHandle { receiver, task }
    }
}

/// The mounted side of a fetch. Dropping it tears the fetch down: a result
/// that has not arrived yet is never published.
pub struct FetchHandle {
    receiver: watch::Receiver<RoundsState>,
    task: JoinHandle<()>,
}

impl FetchHandle {
    pub fn state(&self) -> RoundsState {
        self.receiver.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RoundsState> {
        self.receiver.clone()
    }

    /// Calls `on_change` with the current state and then with every new state
    /// until the fetch settles. Returns the settled state.
    pub async fn observe<F>(&mut self, mut on_change: F) -> RoundsState
    where
        F: FnMut(&RoundsState),
    {
        loop {
            let state = self.receiver.borrow_and_update().clone();
            on_change(&state);
            if !state.is_loading() {
                return state;
            }
            if self.receiver.changed().await.is_err() {
                // the task went away without publishing anything
                let state = RoundsState::Failed(
                    Error::Task("fetch ended without producing rounds".to_string()).into(),
                );
                on_change(&state);
                return state;
            }
        }
    }

    pub async fn settled(&mut self) -> RoundsState {
        self.observe(|_| {}).await
    }

    pub fn unmount(self) {}
}

impl Drop for FetchHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
