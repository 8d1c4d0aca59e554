//! Client-side call collection.
//!
//! [`CallStore`] is the single source of truth for the console. Every
//! mutation goes through one of the `apply_*` operations, and each operation is
//! one discrete step: the collection lives behind an [`Arc`] that is
//! copied-on-write, so a [`Snapshot`] taken before or after an event never
//! shows half of it.
//!
//! The store never fails on live events. Events that reference an unknown call,
//! or that arrive before the transcript they extend, are no-ops reported through
//! [`Applied`].

use std::sync::Arc;

use crate::call::{Call, Priority, TranscriptMessage, clamp_confidence};
use crate::error::Result;
use crate::event::{FeedEvent, TranscriptUpdate};

/// Outcome of applying one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// A new call was inserted at the front
    Inserted,
    /// An existing call changed
    Updated,
    /// The event was valid but had no effect on the collection
    Unchanged,
    /// The event was discarded: a message for a transcript that has not
    /// started yet, or a creation without an id
    Dropped,
    /// The event references a call that is not in the store
    UnknownCall,
}

impl Applied {
    /// Whether the snapshot changed
    pub fn changed(&self) -> bool {
        matches!(self, Applied::Inserted | Applied::Updated)
    }
}

/// Read-only, point-in-time view of the collection
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    calls: Arc<Vec<Call>>,
    version: u64,
}

impl Snapshot {
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn get(&self, id: &str) -> Option<&Call> {
        self.calls.iter().find(|call| call.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.calls.iter().position(|call| call.id == id)
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Monotonic counter, bumped on every change
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Call> {
        self.calls.iter()
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.calls == other.calls
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Call;
    type IntoIter = std::slice::Iter<'a, Call>;

    fn into_iter(self) -> Self::IntoIter {
        self.calls.iter()
    }
}

/// Session-lifetime collection of calls, newest first
#[derive(Debug, Default)]
pub struct CallStore {
    calls: Arc<Vec<Call>>,
    version: u64,
}

impl CallStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the collection with the result of a full fetch
    ///
    /// Fails without touching the current collection if any record is invalid.
    /// Records repeating an earlier id are merged into the first occurrence.
    pub fn initialize(&mut self, calls: Vec<Call>) -> Result<()> {
        for (position, call) in calls.iter().enumerate() {
            call.validate(position)?;
        }

        let mut merged: Vec<Call> = Vec::with_capacity(calls.len());
        for call in calls {
            match merged.iter_mut().find(|existing| existing.id == call.id) {
                Some(existing) => merge_call(existing, call),
                None => merged.push(call),
            }
        }

        tracing::debug!(count = merged.len(), "call store initialized");
        self.calls = Arc::new(merged);
        self.version += 1;
        Ok(())
    }

    /// Route a feed event to its operation
    pub fn apply(&mut self, event: FeedEvent) -> Applied {
        let kind = event.kind();
        let call_id = event.call_id().to_string();

        let outcome = match event {
            FeedEvent::CallCreated { call } => self.apply_call_created(call),
            FeedEvent::NewMessage { call_id, message } => self.apply_new_message(&call_id, message),
            FeedEvent::TranscriptUpdate(update) => self.apply_transcript_update(update),
            FeedEvent::SummaryUpdate { call_id, summary } => self.apply_summary_update(&call_id, summary),
        };

        tracing::debug!(event = kind, call_id = %call_id, outcome = ?outcome, version = self.version, "feed event applied");
        outcome
    }

    /// Insert a new call at the front, or merge a repeated announcement in place
    pub fn apply_call_created(&mut self, call: Call) -> Applied {
        if call.id.trim().is_empty() {
            return Applied::Dropped;
        }

        match self.calls.iter().position(|existing| existing.id == call.id) {
            Some(index) => {
                let mut merged = self.calls[index].clone();
                merge_call(&mut merged, call);
                if merged == self.calls[index] {
                    return Applied::Unchanged;
                }
                self.commit(|calls| calls[index] = merged);
                Applied::Updated
            }
            None => {
                self.commit(|calls| calls.insert(0, call));
                Applied::Inserted
            }
        }
    }

    /// Append one message, but only once the call's transcript has started
    ///
    /// An empty transcript means the canonical opening line has not arrived
    /// through a transcript update yet; appending now would put the caller's
    /// line in the slot reserved for it.
    pub fn apply_new_message(&mut self, call_id: &str, message: TranscriptMessage) -> Applied {
        let Some(index) = self.index_of(call_id) else {
            return Applied::UnknownCall;
        };
        if self.calls[index].transcript.is_empty() {
            return Applied::Dropped;
        }

        self.commit(|calls| calls[index].transcript.push(message));
        Applied::Updated
    }

    /// Replace the transcript wholesale and patch the fields present in the update
    pub fn apply_transcript_update(&mut self, update: TranscriptUpdate) -> Applied {
        let Some(index) = self.index_of(&update.call_id) else {
            return Applied::UnknownCall;
        };

        let mut call = self.calls[index].clone();
        call.transcript = update.transcript;
        call.status = update.status;
        call.ai_handling = update.ai_handling;
        if let Some(priority) = update.priority {
            call.priority = priority;
        }
        if let Some(incident_type) = update.incident_type {
            call.incident_type = incident_type;
        }
        if let Some(location_label) = update.location_label {
            call.location_label = location_label;
        }
        if let Some(pin) = update.pin {
            call.pin = pin;
        }
        if let Some(confidence) = update.confidence {
            call.confidence = clamp_confidence(confidence);
        }

        if call == self.calls[index] {
            return Applied::Unchanged;
        }
        self.commit(|calls| calls[index] = call);
        Applied::Updated
    }

    pub fn apply_summary_update(&mut self, call_id: &str, summary: String) -> Applied {
        let Some(index) = self.index_of(call_id) else {
            return Applied::UnknownCall;
        };
        if self.calls[index].summary == summary {
            return Applied::Unchanged;
        }

        self.commit(|calls| calls[index].summary = summary);
        Applied::Updated
    }

    /// Current collection; cheap to clone, never affected by later events
    pub fn snapshot(&self) -> Snapshot {
        Snapshot { calls: Arc::clone(&self.calls), version: self.version }
    }

    pub fn get(&self, id: &str) -> Option<&Call> {
        self.calls.iter().find(|call| call.id == id)
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.calls.iter().position(|call| call.id == id)
    }

    /// Mutate a private copy when a snapshot is still shared, then publish it
    fn commit(&mut self, mutate: impl FnOnce(&mut Vec<Call>)) {
        mutate(Arc::make_mut(&mut self.calls));
        self.version += 1;
    }
}

/// Merge a repeated creation into an existing record
///
/// Descriptive fields take the incoming values, except where the incoming
/// record still carries a creation-stub default (P4, empty string, zero
/// confidence, unset pin): those fields may have been refined by later
/// updates and keep their current value. The transcript is only replaced by
/// a longer one, so a retried stub never truncates a live conversation.
/// Applying the same record twice yields the same result as applying it once.
fn merge_call(existing: &mut Call, mut incoming: Call) {
    if incoming.transcript.len() <= existing.transcript.len() {
        incoming.transcript = std::mem::take(&mut existing.transcript);
    }
    if incoming.priority == Priority::default() {
        incoming.priority = existing.priority;
    }
    if incoming.confidence == 0 {
        incoming.confidence = existing.confidence;
    }
    if !incoming.pin.is_placed() {
        incoming.pin = existing.pin;
    }
    for (current, next) in [
        (&mut existing.incident_type, &mut incoming.incident_type),
        (&mut existing.incident_icon, &mut incoming.incident_icon),
        (&mut existing.location_label, &mut incoming.location_label),
        (&mut existing.address, &mut incoming.address),
        (&mut existing.city, &mut incoming.city),
        (&mut existing.summary, &mut incoming.summary),
    ] {
        if next.is_empty() {
            *next = std::mem::take(current);
        }
    }
    if incoming.key_facts.is_empty() {
        incoming.key_facts = std::mem::take(&mut existing.key_facts);
    }
    *existing = incoming;
}
