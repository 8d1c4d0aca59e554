pub mod call;
pub mod config;
pub mod error;
pub mod event;
pub mod logging;
pub mod reveal;
pub mod store;

pub use call::{Call, Pin, Priority, Sender, TranscriptMessage};
pub use config::{Config, ConsoleConfig, FeedConfig};
pub use error::{Error, Result, ValidationError};
pub use event::{FeedEvent, TranscriptUpdate};
pub use reveal::{DEFAULT_REVEAL_INTERVAL, RevealTick, RevealTicker, RevealTransition, TranscriptRevealer};
pub use store::{Applied, CallStore, Snapshot};
