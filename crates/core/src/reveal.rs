//! Staggered transcript reveal for the open call.
//!
//! [`TranscriptRevealer`] owns the reveal cursor: how many messages of the
//! tracked call's transcript are on screen. It is a plain state machine that
//! is fed observations of the transcript and ticks of a timer.
//! [`RevealTicker`] is that timer: a cancellable periodic tokio task that
//! emits [`RevealTick`]s for a single call.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::call::{Sender, TranscriptMessage};

/// Default pause between two revealed messages
pub const DEFAULT_REVEAL_INTERVAL: Duration = Duration::from_millis(320);

/// What an observation did to the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealTransition {
    /// A different call is now tracked; everything is shown at once
    Switched,
    /// A single caller line was replaced by a canonical transcript led by the
    /// AI intro; the reveal restarts from the first message
    PrefixReplaced,
    /// Same call; the cursor stays where it is and ticks catch it up
    Observed,
}

/// Reveal cursor for one open call
#[derive(Debug, Clone, Default)]
pub struct TranscriptRevealer {
    visible_count: usize,
    tracked_call_id: Option<String>,
    previous_len: usize,
}

impl TranscriptRevealer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current transcript of the observed call
    ///
    /// The prefix-replacement check only recognises the case where exactly one
    /// message was recorded and shown; a replacement of a longer transcript is
    /// treated as normal growth.
    pub fn observe(&mut self, call_id: &str, transcript: &[TranscriptMessage]) -> RevealTransition {
        let len = transcript.len();

        if self.tracked_call_id.as_deref() != Some(call_id) {
            self.tracked_call_id = Some(call_id.to_string());
            self.previous_len = len;
            self.visible_count = len;
            return RevealTransition::Switched;
        }

        let replaced_prefix = len >= 2
            && transcript.first().map(|message| message.sender) == Some(Sender::Ai)
            && self.visible_count == 1
            && self.previous_len == 1;

        self.previous_len = len;
        self.visible_count = self.visible_count.min(len);

        if replaced_prefix {
            self.visible_count = 0;
            RevealTransition::PrefixReplaced
        } else {
            RevealTransition::Observed
        }
    }

    /// Advance the cursor by one message, returning whether it moved
    pub fn tick(&mut self, transcript_len: usize) -> bool {
        if self.visible_count >= transcript_len {
            self.visible_count = transcript_len;
            return false;
        }
        self.visible_count += 1;
        true
    }

    /// Whether messages are still waiting to be shown
    pub fn is_revealing(&self, transcript_len: usize) -> bool {
        self.tracked_call_id.is_some() && self.visible_count < transcript_len
    }

    /// The part of the transcript currently on screen
    pub fn visible_prefix<'a>(&self, transcript: &'a [TranscriptMessage]) -> &'a [TranscriptMessage] {
        &transcript[..self.visible_count.min(transcript.len())]
    }

    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    pub fn tracked_call_id(&self) -> Option<&str> {
        self.tracked_call_id.as_deref()
    }

    pub fn is_tracking(&self, call_id: &str) -> bool {
        self.tracked_call_id.as_deref() == Some(call_id)
    }

    /// Forget the tracked call (drawer closed)
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// One timer tick, addressed to the call the ticker was started for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealTick {
    pub call_id: String,
}

/// Periodic tick source scoped to one call
///
/// The first tick fires one `period` after spawning. The task stops when the
/// ticker is cancelled or dropped, or when the receiving side goes away.
#[derive(Debug)]
pub struct RevealTicker {
    call_id: String,
    cancel: CancellationToken,
}

impl RevealTicker {
    /// Start ticking for `call_id` on the current tokio runtime
    pub fn spawn(call_id: impl Into<String>, period: Duration, tx: mpsc::UnboundedSender<RevealTick>) -> Self {
        let call_id = call_id.into();
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let tick = RevealTick { call_id: call_id.clone() };

        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        if tx.send(tick.clone()).is_err() {
                            break;
                        }
                    }
                }
            }
            tracing::trace!(call_id = %tick.call_id, "reveal ticker stopped");
        });

        Self { call_id, cancel }
    }

    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for RevealTicker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ai(text: &str) -> TranscriptMessage {
        TranscriptMessage::ai(text, "10:00")
    }

    fn caller(text: &str) -> TranscriptMessage {
        TranscriptMessage::caller(text, "10:00")
    }

    #[test]
    fn test_initial_state() {
        let revealer = TranscriptRevealer::new();
        assert_eq!(revealer.visible_count(), 0);
        assert!(revealer.tracked_call_id().is_none());
        assert!(!revealer.is_revealing(3));
    }

    #[test]
    fn test_switch_shows_full_transcript() {
        let mut revealer = TranscriptRevealer::new();
        let transcript = vec![ai("911"), caller("help"), ai("where?")];

        assert_eq!(revealer.observe("c1", &transcript), RevealTransition::Switched);
        assert_eq!(revealer.visible_count(), 3);
        assert_eq!(revealer.visible_prefix(&transcript).len(), 3);

        assert_eq!(revealer.observe("c2", &transcript[..1]), RevealTransition::Switched);
        assert_eq!(revealer.visible_count(), 1);
        assert!(revealer.is_tracking("c2"));
    }

    #[test]
    fn test_growth_is_revealed_one_tick_at_a_time() {
        let mut revealer = TranscriptRevealer::new();
        let mut transcript = vec![ai("911")];
        revealer.observe("c1", &transcript);

        transcript.push(caller("help"));
        transcript.push(ai("where?"));
        assert_eq!(revealer.observe("c1", &transcript), RevealTransition::Observed);
        assert_eq!(revealer.visible_count(), 1);
        assert!(revealer.is_revealing(transcript.len()));

        assert!(revealer.tick(transcript.len()));
        assert_eq!(revealer.visible_count(), 2);
        assert!(revealer.tick(transcript.len()));
        assert_eq!(revealer.visible_count(), 3);
        assert!(!revealer.tick(transcript.len()));
        assert_eq!(revealer.visible_count(), 3);
        assert!(!revealer.is_revealing(transcript.len()));
    }

    #[test]
    fn test_growth_during_reveal_extends_target() {
        let mut revealer = TranscriptRevealer::new();
        let mut transcript = vec![ai("a")];
        revealer.observe("c1", &transcript);

        transcript.push(caller("b"));
        revealer.observe("c1", &transcript);
        revealer.tick(transcript.len());

        transcript.push(ai("c"));
        transcript.push(caller("d"));
        revealer.observe("c1", &transcript);
        assert_eq!(revealer.visible_count(), 2);

        let mut history = vec![revealer.visible_count()];
        while revealer.tick(transcript.len()) {
            history.push(revealer.visible_count());
        }
        assert_eq!(history, vec![2, 3, 4]);
    }

    #[test]
    fn test_cursor_is_monotonic_and_bounded() {
        let mut revealer = TranscriptRevealer::new();
        let mut transcript = vec![ai("0")];
        revealer.observe("c1", &transcript);

        let mut last = revealer.visible_count();
        for i in 1..20 {
            if i % 3 == 0 {
                transcript.push(caller("more"));
                revealer.observe("c1", &transcript);
            }
            revealer.tick(transcript.len());
            assert!(revealer.visible_count() >= last);
            assert!(revealer.visible_count() <= transcript.len());
            last = revealer.visible_count();
        }
    }

    #[test]
    fn test_prefix_replacement_restarts_reveal() {
        let mut revealer = TranscriptRevealer::new();
        revealer.observe("c1", &[caller("help")]);
        assert_eq!(revealer.visible_count(), 1);

        let canonical = vec![ai("911, what is your emergency?"), caller("help")];
        assert_eq!(revealer.observe("c1", &canonical), RevealTransition::PrefixReplaced);
        assert_eq!(revealer.visible_count(), 0);
        assert!(revealer.visible_prefix(&canonical).is_empty());

        revealer.tick(canonical.len());
        let shown = revealer.visible_prefix(&canonical);
        assert_eq!(shown.len(), 1);
        assert!(shown[0].is_ai());
    }

    #[test]
    fn test_prefix_replacement_needs_ai_first() {
        let mut revealer = TranscriptRevealer::new();
        revealer.observe("c1", &[caller("help")]);

        let grown = vec![caller("help"), ai("stay calm")];
        assert_eq!(revealer.observe("c1", &grown), RevealTransition::Observed);
        assert_eq!(revealer.visible_count(), 1);
    }

    #[test]
    fn test_prefix_replacement_ignored_for_longer_history() {
        let mut revealer = TranscriptRevealer::new();
        revealer.observe("c1", &[caller("a"), caller("b")]);

        let replaced = vec![ai("intro"), caller("a"), caller("b")];
        assert_eq!(revealer.observe("c1", &replaced), RevealTransition::Observed);
        assert_eq!(revealer.visible_count(), 2);
    }

    #[test]
    fn test_shrink_clamps_cursor() {
        let mut revealer = TranscriptRevealer::new();
        let transcript = vec![ai("a"), caller("b"), ai("c")];
        revealer.observe("c1", &transcript);

        revealer.observe("c1", &transcript[..1]);
        assert_eq!(revealer.visible_count(), 1);
        assert_eq!(revealer.visible_prefix(&transcript[..1]).len(), 1);
    }

    #[test]
    fn test_visible_prefix_never_overruns() {
        let mut revealer = TranscriptRevealer::new();
        revealer.observe("c1", &[ai("a"), caller("b")]);
        assert_eq!(revealer.visible_prefix(&[]).len(), 0);
    }

    #[test]
    fn test_reset_forgets_call() {
        let mut revealer = TranscriptRevealer::new();
        revealer.observe("c1", &[ai("a")]);
        revealer.reset();
        assert!(revealer.tracked_call_id().is_none());
        assert_eq!(revealer.observe("c1", &[ai("a")]), RevealTransition::Switched);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_paces_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let start = tokio::time::Instant::now();
        let _ticker = RevealTicker::spawn("c1", DEFAULT_REVEAL_INTERVAL, tx);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.call_id, "c1");
        assert!(start.elapsed() >= DEFAULT_REVEAL_INTERVAL);

        rx.recv().await.unwrap();
        assert!(start.elapsed() >= DEFAULT_REVEAL_INTERVAL * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_stops_when_cancelled() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let ticker = RevealTicker::spawn("c1", Duration::from_millis(50), tx);
        rx.recv().await.unwrap();

        ticker.cancel();
        assert!(ticker.is_cancelled());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_stops_when_dropped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let ticker = RevealTicker::spawn("c1", Duration::from_millis(50), tx);
        drop(ticker);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_drive_revealer_to_completion() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut revealer = TranscriptRevealer::new();
        revealer.observe("c1", &[caller("help")]);

        let canonical = vec![ai("911"), caller("help"), ai("where are you?")];
        revealer.observe("c1", &canonical);
        let ticker = RevealTicker::spawn("c1", DEFAULT_REVEAL_INTERVAL, tx);

        while revealer.is_revealing(canonical.len()) {
            let tick = rx.recv().await.unwrap();
            assert!(revealer.is_tracking(&tick.call_id));
            revealer.tick(canonical.len());
        }
        ticker.cancel();
        assert_eq!(revealer.visible_count(), 3);
    }
}
