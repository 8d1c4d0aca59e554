use serde::{Deserialize, Serialize};

use crate::call::{Call, Pin, Priority, TranscriptMessage};
use crate::error::{Error, Result};

/// State-change notification pushed by the backend event stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedEvent {
    /// A new call appeared (or a retry of the same announcement)
    CallCreated { call: Call },
    /// One utterance to append to a call's transcript
    NewMessage { call_id: String, message: TranscriptMessage },
    /// Canonical transcript plus status patch for a call
    TranscriptUpdate(TranscriptUpdate),
    /// Incident summary generated after the call ended
    SummaryUpdate { call_id: String, summary: String },
}

impl FeedEvent {
    /// Decode one event payload (the `data:` field of an SSE frame)
    pub fn parse(payload: &str) -> Result<Self> {
        serde_json::from_str(payload).map_err(|e| Error::Parse(format!("invalid feed event: {}", e)))
    }

    /// Identifier of the call this event touches
    pub fn call_id(&self) -> &str {
        match self {
            FeedEvent::CallCreated { call } => &call.id,
            FeedEvent::NewMessage { call_id, .. } => call_id,
            FeedEvent::TranscriptUpdate(update) => &update.call_id,
            FeedEvent::SummaryUpdate { call_id, .. } => call_id,
        }
    }

    /// Wire discriminator, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            FeedEvent::CallCreated { .. } => "call_created",
            FeedEvent::NewMessage { .. } => "new_message",
            FeedEvent::TranscriptUpdate(_) => "transcript_update",
            FeedEvent::SummaryUpdate { .. } => "summary_update",
        }
    }
}

/// Full transcript replacement with a partial field patch
///
/// `None` means the key was absent from the payload and the stored value is
/// left alone. `Some("")` is a real value and is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptUpdate {
    #[serde(rename = "call_id")]
    pub call_id: String,
    pub transcript: Vec<TranscriptMessage>,
    pub status: String,
    pub ai_handling: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin: Option<Pin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl TranscriptUpdate {
    pub fn new(
        call_id: impl Into<String>, transcript: Vec<TranscriptMessage>, status: impl Into<String>, ai_handling: bool,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            transcript,
            status: status.into(),
            ai_handling,
            priority: None,
            incident_type: None,
            location_label: None,
            pin: None,
            confidence: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_incident_type(mut self, incident_type: impl Into<String>) -> Self {
        self.incident_type = Some(incident_type.into());
        self
    }

    pub fn with_location_label(mut self, label: impl Into<String>) -> Self {
        self.location_label = Some(label.into());
        self
    }

    pub fn with_pin(mut self, pin: Pin) -> Self {
        self.pin = Some(pin);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

impl From<TranscriptUpdate> for FeedEvent {
    fn from(update: TranscriptUpdate) -> Self {
        FeedEvent::TranscriptUpdate(update)
    }
}
