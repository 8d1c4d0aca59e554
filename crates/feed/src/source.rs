use futures::stream::Stream;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

use dispatch_core::{Call, FeedEvent, Result};

/// Live events from a subscription
///
/// An `Err` item is a transport failure and is always the last item. The
/// stream also ends, without an error, when the subscription is cancelled or
/// the source has nothing more to send.
pub type FeedStream = Pin<Box<dyn Stream<Item = Result<FeedEvent>> + Send>>;

/// Where calls come from: a one-shot full fetch plus a push-event subscription
#[async_trait::async_trait]
pub trait CallFeed: Send + Sync {
    /// Retrieve every known call, in display order
    async fn fetch_all(&self) -> Result<Vec<Call>>;

    /// Open the push-event connection
    ///
    /// The connection is held until `cancel` fires or the returned stream is
    /// dropped.
    async fn subscribe(&self, cancel: CancellationToken) -> Result<FeedStream>;

    /// Short description for status lines and logs
    fn describe(&self) -> String;
}
