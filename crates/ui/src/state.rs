use dispatch_core::{Call, CallStore, Priority, RevealTransition, Snapshot, TranscriptMessage, TranscriptRevealer};

/// Where the console stands with its call source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    /// Initial fetch in flight (including retries)
    Loading,
    /// Calls loaded, push-event connection being opened
    Connecting,
    /// Receiving live events
    Live,
    /// The source finished sending events
    Closed,
    /// Live updates lost after loading
    Offline(String),
    /// Initial load failed; the list is not trustworthy
    Failed(String),
}

impl FeedStatus {
    pub fn label(&self) -> &'static str {
        match self {
            FeedStatus::Loading => "loading",
            FeedStatus::Connecting => "connecting",
            FeedStatus::Live => "live",
            FeedStatus::Closed => "ended",
            FeedStatus::Offline(_) => "offline",
            FeedStatus::Failed(_) => "load failed",
        }
    }

    /// Whether `r` should reload from the source
    pub fn can_retry(&self) -> bool {
        matches!(self, FeedStatus::Failed(_) | FeedStatus::Offline(_) | FeedStatus::Closed)
    }
}

/// Everything the console renders
#[derive(Debug)]
pub struct ConsoleState {
    pub store: CallStore,
    pub revealer: TranscriptRevealer,
    pub feed_status: FeedStatus,
    /// Description of the call source, shown in the header
    pub source: String,
    selected: Option<String>,
    open_call: Option<String>,
}

impl ConsoleState {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            store: CallStore::new(),
            revealer: TranscriptRevealer::new(),
            feed_status: FeedStatus::Loading,
            source: source.into(),
            selected: None,
            open_call: None,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    /// Row of the selected call
    ///
    /// Selection follows the call, not the row, so a call created above it
    /// does not move the highlight onto a different call.
    pub fn selected_index(&self) -> Option<usize> {
        if self.store.is_empty() {
            return None;
        }
        let snapshot = self.store.snapshot();
        Some(self.selected.as_deref().and_then(|id| snapshot.position(id)).unwrap_or(0))
    }

    pub fn selected_call(&self) -> Option<&Call> {
        let id = self.selected_id()?;
        self.store.get(&id)
    }

    fn selected_id(&self) -> Option<String> {
        let index = self.selected_index()?;
        self.store.snapshot().calls().get(index).map(|call| call.id.clone())
    }

    fn select_index(&mut self, index: usize) {
        let snapshot = self.store.snapshot();
        if let Some(call) = snapshot.calls().get(index) {
            self.selected = Some(call.id.clone());
        }
    }

    pub fn select_next(&mut self) {
        if let Some(index) = self.selected_index() {
            self.select_index((index + 1).min(self.store.len() - 1));
        }
    }

    pub fn select_previous(&mut self) {
        if let Some(index) = self.selected_index() {
            self.select_index(index.saturating_sub(1));
        }
    }

    pub fn select_first(&mut self) {
        self.select_index(0);
    }

    pub fn select_last(&mut self) {
        self.select_index(self.store.len().saturating_sub(1));
    }

    /// Open the drawer on a call; the reveal cursor is resynced by the caller
    pub fn open(&mut self, call_id: impl Into<String>) {
        let call_id = call_id.into();
        self.selected = Some(call_id.clone());
        self.open_call = Some(call_id);
    }

    pub fn close(&mut self) {
        self.open_call = None;
        self.revealer.reset();
    }

    pub fn is_drawer_open(&self) -> bool {
        self.open_call.is_some()
    }

    pub fn open_call_id(&self) -> Option<&str> {
        self.open_call.as_deref()
    }

    pub fn open_call(&self) -> Option<&Call> {
        self.store.get(self.open_call.as_deref()?)
    }

    /// Feed the open call's current transcript to the reveal cursor
    pub fn observe_open_call(&mut self) -> Option<RevealTransition> {
        let call_id = self.open_call.as_deref()?;
        let call = self.store.get(call_id)?;
        Some(self.revealer.observe(&call.id, &call.transcript))
    }

    /// Transcript length of the open call, if any
    pub fn open_transcript_len(&self) -> Option<usize> {
        self.open_call().map(|call| call.transcript.len())
    }

    /// Whether the open call still has messages waiting to be revealed
    pub fn is_revealing(&self) -> bool {
        self.open_transcript_len().is_some_and(|len| self.revealer.is_revealing(len))
    }

    /// Messages of the open call that are on screen
    pub fn visible_transcript(&self) -> &[TranscriptMessage] {
        match self.open_call() {
            Some(call) if self.revealer.is_tracking(&call.id) => self.revealer.visible_prefix(&call.transcript),
            _ => &[],
        }
    }

    /// Calls per priority, in priority order
    pub fn priority_counts(&self) -> [(Priority, usize); 4] {
        let mut counts = [(Priority::P1, 0), (Priority::P2, 0), (Priority::P3, 0), (Priority::P4, 0)];
        for call in self.store.snapshot().iter() {
            if let Some(entry) = counts.iter_mut().find(|(priority, _)| *priority == call.priority) {
                entry.1 += 1;
            }
        }
        counts
    }

    /// Calls the AI agent is still talking to
    pub fn ai_handling_count(&self) -> usize {
        self.store.snapshot().iter().filter(|call| call.ai_handling).count()
    }
}
