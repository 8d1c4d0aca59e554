use crate::app::App;
use crate::feed_handling::FeedMessage;
use crate::state::FeedStatus;
use dispatch_feed::{ConsoleFeed, RetryConfig, fetch_with_retry};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

impl App {
    /// Start (or restart) loading from the call source
    ///
    /// Any previous feed task is cancelled first, which also releases its
    /// push-event connection. Messages from the new task arrive on a fresh
    /// channel, so nothing from the old task is applied after this call.
    pub fn spawn_feed(&mut self) {
        self.feed_cancel.cancel();
        let cancel = self.cancel_token.child_token();
        self.feed_cancel = cancel.clone();

        let (tx, rx) = mpsc::unbounded_channel();
        self.feed_rx = Some(rx);
        self.state_mut().feed_status = FeedStatus::Loading;

        let feed = Arc::clone(&self.feed);
        let retry = self.retry.clone();
        tokio::spawn(run_feed(feed, retry, cancel, tx));
    }
}

/// Load every call, then hold the push-event subscription until it ends
///
/// The subscription is opened only after the initial fetch succeeded.
pub(crate) async fn run_feed(
    feed: Arc<dyn ConsoleFeed>, retry: RetryConfig, cancel: CancellationToken, tx: mpsc::UnboundedSender<FeedMessage>,
) {
    let loaded = tokio::select! {
        _ = cancel.cancelled() => return,
        result = fetch_with_retry(feed.as_ref(), &retry) => result,
    };

    match loaded {
        Ok(calls) => {
            if tx.send(FeedMessage::Loaded(calls)).is_err() {
                return;
            }
        }
        Err(e) => {
            let _ = tx.send(FeedMessage::LoadFailed(e));
            return;
        }
    }

    let mut events = match feed.subscribe(cancel.clone()).await {
        Ok(events) => events,
        Err(e) => {
            if !cancel.is_cancelled() {
                let _ = tx.send(FeedMessage::Disconnected(Some(e)));
            }
            return;
        }
    };
    if tx.send(FeedMessage::Subscribed).is_err() {
        return;
    }

    while let Some(item) = events.next().await {
        match item {
            Ok(event) => {
                if tx.send(FeedMessage::Event(event)).is_err() {
                    return;
                }
            }
            Err(e) => {
                let _ = tx.send(FeedMessage::Disconnected(Some(e)));
                return;
            }
        }
    }

    if !cancel.is_cancelled() {
        let _ = tx.send(FeedMessage::Disconnected(None));
    }
    tracing::debug!(source = %feed.describe(), "feed task finished");
}
