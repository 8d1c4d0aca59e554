use super::App;
use dispatch_core::{RevealTick, RevealTicker, RevealTransition};

impl App {
    /// Bring the reveal cursor and its ticker in line with the open call
    ///
    /// A switch or a prefix replacement restarts the ticker from scratch.
    /// Plain growth keeps a running ticker, so new messages are revealed at
    /// the same pace as the ones already queued.
    pub(crate) fn sync_reveal(&mut self) {
        let Some(transition) = self.state_mut().observe_open_call() else {
            self.stop_ticker();
            return;
        };
        let Some(call_id) = self.state().open_call_id().map(str::to_string) else {
            return;
        };
        let revealing = self.state().is_revealing();

        match transition {
            RevealTransition::Switched | RevealTransition::PrefixReplaced => {
                self.stop_ticker();
                if revealing {
                    self.start_ticker(call_id);
                }
            }
            RevealTransition::Observed => {
                if !revealing {
                    self.stop_ticker();
                } else if !self.ticker.as_ref().is_some_and(|ticker| ticker.call_id() == call_id) {
                    self.start_ticker(call_id);
                }
            }
        }
    }

    /// Advance the cursor by one message; returns whether it moved
    ///
    /// Ticks from a ticker that has since been replaced, or for a call that is
    /// no longer open, are ignored.
    pub fn handle_reveal_tick(&mut self, tick: RevealTick) -> bool {
        let current = self.ticker.as_ref().is_some_and(|ticker| ticker.call_id() == tick.call_id);
        if !current || !self.state().revealer.is_tracking(&tick.call_id) {
            tracing::trace!(call_id = %tick.call_id, "ignoring stale reveal tick");
            return false;
        }
        let Some(len) = self.state().open_transcript_len() else {
            return false;
        };

        let moved = self.state_mut().revealer.tick(len);
        if !self.state().revealer.is_revealing(len) {
            self.stop_ticker();
        }
        moved
    }

    fn start_ticker(&mut self, call_id: String) {
        tracing::trace!(call_id = %call_id, "reveal ticker started");
        self.ticker = Some(RevealTicker::spawn(call_id, self.reveal_interval(), self.reveal_tx.clone()));
    }

    pub(crate) fn stop_ticker(&mut self) {
        self.ticker = None;
    }
}
