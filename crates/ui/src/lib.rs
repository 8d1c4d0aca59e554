pub mod app;
pub mod components;
pub mod event_handler;
pub mod feed_handling;
pub mod layout;
pub mod state;
pub mod theme;

pub use app::{App, render_console, run};
pub use event_handler::{EventHandler, KeyAction};
pub use feed_handling::FeedMessage;
pub use layout::{ConsoleLayout, LayoutMode};
pub use state::{ConsoleState, FeedStatus};
pub use theme::Theme;
