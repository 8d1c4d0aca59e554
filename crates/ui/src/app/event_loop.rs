use super::App;
use crate::event_handler::EventHandler;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::Result;
use std::panic;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

/// Run the console until the user quits
///
/// Takes over the terminal, starts the feed task and then multiplexes
/// terminal input, feed messages and reveal ticks on one loop.
pub async fn run(app: &mut App) -> Result<()> {
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let backend = CrosstermBackend::new(std::io::stdout());
        if let Ok(mut terminal) = Terminal::new(backend) {
            let _ = terminal.show_cursor();
        }
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    app.spawn_feed();
    terminal.clear()?;
    app.draw(&mut terminal)?;

    let input_poll = app.input_poll();
    while !app.should_exit {
        let tui_poll = async {
            tokio::time::sleep(input_poll).await;
            EventHandler::read(Duration::ZERO)
        };

        tokio::select! {
            maybe_event = tui_poll => {
                if let Some(event) = maybe_event? && app.handle_event(event) {
                    app.draw(&mut terminal)?;
                }
            }
            maybe_feed = recv_or_pending(app.feed_rx.as_mut()) => {
                match maybe_feed {
                    Some(message) => {
                        if app.handle_feed_message(message) {
                            app.draw(&mut terminal)?;
                        }
                    }
                    None => app.feed_rx = None,
                }
            }
            Some(tick) = app.reveal_rx.recv() => {
                if app.handle_reveal_tick(tick) {
                    app.draw(&mut terminal)?;
                }
            }
        }
    }

    app.shutdown();

    terminal.show_cursor()?;
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;

    Ok(())
}

/// Receive from an optional channel; pending forever when there is none
async fn recv_or_pending<T>(rx: Option<&mut UnboundedReceiver<T>>) -> Option<T> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
