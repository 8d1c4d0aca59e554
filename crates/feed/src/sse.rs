//! Server-sent events decoding for the push-event source.

use eventsource_stream::Eventsource;
use futures::{StreamExt, stream::Stream};
use tokio_util::sync::CancellationToken;

use crate::source::FeedStream;
use dispatch_core::logging::truncate_for_log;
use dispatch_core::{Error, FeedEvent};

/// Turn a raw `text/event-stream` body into feed events
///
/// Keepalive comments and empty frames are skipped. Frames whose `data` is not
/// a known event are dropped and logged; they never end the stream. A read
/// error from the underlying body is yielded once as [`Error::Transport`] and
/// closes the stream.
pub fn decode_events<S, B, E>(body: S, cancel: CancellationToken) -> FeedStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let stream = async_stream::stream! {
        let frames = body.eventsource();
        tokio::pin!(frames);

        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("event stream cancelled");
                    break;
                }
                next = frames.next() => next,
            };

            match next {
                Some(Ok(frame)) => {
                    if frame.data.trim().is_empty() {
                        continue;
                    }
                    match FeedEvent::parse(&frame.data) {
                        Ok(event) => yield Ok(event),
                        Err(e) => {
                            tracing::debug!(
                                error = %e,
                                payload = %truncate_for_log(&frame.data, 200),
                                "dropping malformed feed event"
                            );
                        }
                    }
                }
                Some(Err(e)) => {
                    yield Err(Error::Transport(format!("event stream error: {}", e)));
                    break;
                }
                None => {
                    tracing::debug!("event stream closed by server");
                    break;
                }
            }
        }
    };

    Box::pin(stream)
}
