mod event_loop;
mod keybinds;
mod rendering;
mod reveal;

pub use event_loop::run;
pub use rendering::render_console;

use crate::feed_handling::FeedMessage;
use crate::state::ConsoleState;
use dispatch_core::{Config, RevealTick, RevealTicker};
use dispatch_feed::{ConsoleFeed, RetryConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Interactive dispatch console
///
/// Owns the console state and the channels feeding it. The call store and the
/// reveal cursor are only touched from the event loop; the feed task and the
/// reveal ticker run on their own and talk to it over channels.
pub struct App {
    state: ConsoleState,
    pub(crate) feed: Arc<dyn ConsoleFeed>,
    pub(crate) retry: RetryConfig,
    reveal_interval: Duration,
    input_poll: Duration,
    pub should_exit: bool,
    /// Cancelled when the console exits; parent of every feed task token
    pub cancel_token: CancellationToken,
    pub(crate) feed_cancel: CancellationToken,
    pub(crate) feed_rx: Option<mpsc::UnboundedReceiver<FeedMessage>>,
    pub(crate) reveal_tx: mpsc::UnboundedSender<RevealTick>,
    pub(crate) reveal_rx: mpsc::UnboundedReceiver<RevealTick>,
    pub(crate) ticker: Option<RevealTicker>,
}

impl App {
    pub fn new(feed: Arc<dyn ConsoleFeed>, config: &Config) -> Self {
        let (reveal_tx, reveal_rx) = mpsc::unbounded_channel();
        let cancel_token = CancellationToken::new();

        Self {
            state: ConsoleState::new(feed.describe()),
            feed,
            retry: RetryConfig::from_config(&config.feed),
            reveal_interval: config.console.reveal_interval(),
            input_poll: config.console.input_poll(),
            should_exit: false,
            feed_cancel: cancel_token.child_token(),
            cancel_token,
            feed_rx: None,
            reveal_tx,
            reveal_rx,
            ticker: None,
        }
    }

    pub fn state(&self) -> &ConsoleState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ConsoleState {
        &mut self.state
    }

    pub fn reveal_interval(&self) -> Duration {
        self.reveal_interval
    }

    pub fn input_poll(&self) -> Duration {
        self.input_poll
    }

    /// Whether a reveal ticker is currently running
    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(|ticker| !ticker.is_cancelled())
    }

    /// Stop the feed task and the ticker
    pub fn shutdown(&mut self) {
        self.cancel_token.cancel();
        self.ticker = None;
        self.feed_rx = None;
    }
}
