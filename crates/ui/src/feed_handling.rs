mod spawn;

use crate::app::App;
use crate::state::FeedStatus;
use dispatch_core::{Call, Error, FeedEvent};

/// What the feed task reports to the event loop, in order
#[derive(Debug)]
pub enum FeedMessage {
    /// Initial fetch succeeded
    Loaded(Vec<Call>),
    /// Initial fetch failed for good (retries exhausted or invalid data)
    LoadFailed(Error),
    /// Push-event connection is open
    Subscribed,
    Event(FeedEvent),
    /// Push-event connection is gone; `None` when the source simply finished
    Disconnected(Option<Error>),
}

impl App {
    /// Handle one message from the feed task
    ///
    /// Returns whether anything visible changed.
    pub fn handle_feed_message(&mut self, message: FeedMessage) -> bool {
        match message {
            FeedMessage::Loaded(calls) => {
                let count = calls.len();
                match self.state_mut().store.initialize(calls) {
                    Ok(()) => {
                        tracing::info!(count, "calls loaded");
                        self.state_mut().feed_status = FeedStatus::Connecting;
                        if self.state().is_drawer_open() && self.state().open_call().is_none() {
                            self.state_mut().close();
                        }
                        self.sync_reveal();
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "rejected loaded calls");
                        self.feed_cancel.cancel();
                        self.state_mut().feed_status = FeedStatus::Failed(e.to_string());
                    }
                }
                true
            }
            FeedMessage::LoadFailed(e) => {
                self.state_mut().feed_status = FeedStatus::Failed(e.to_string());
                true
            }
            FeedMessage::Subscribed => {
                self.state_mut().feed_status = FeedStatus::Live;
                true
            }
            FeedMessage::Event(event) => {
                let applied = self.state_mut().store.apply(event);
                if !applied.changed() {
                    return false;
                }
                if self.state().is_drawer_open() {
                    self.sync_reveal();
                }
                true
            }
            FeedMessage::Disconnected(Some(e)) => {
                tracing::warn!(error = %e, "live updates lost");
                self.state_mut().feed_status = FeedStatus::Offline(e.to_string());
                true
            }
            FeedMessage::Disconnected(None) => {
                tracing::info!("call source finished");
                self.state_mut().feed_status = FeedStatus::Closed;
                true
            }
        }
    }
}
