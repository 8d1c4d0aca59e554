use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// Call priority, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    P1,
    P2,
    P3,
    #[default]
    P4,
}

impl Priority {
    pub const VALUES: &[Priority] = &[Priority::P1, Priority::P2, Priority::P3, Priority::P4];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::P1 => "P1",
            Priority::P2 => "P2",
            Priority::P3 => "P3",
            Priority::P4 => "P4",
        }
    }

    /// Short human label for list rows
    pub fn label(&self) -> &'static str {
        match self {
            Priority::P1 => "critical",
            Priority::P2 => "urgent",
            Priority::P3 => "standard",
            Priority::P4 => "low",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who spoke a transcript line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Caller,
    Ai,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::Caller => "caller",
            Sender::Ai => "ai",
        }
    }
}

/// One utterance in a call transcript
///
/// Messages have no key of their own; a message is identified by its index in
/// the owning call's transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptMessage {
    pub sender: Sender,
    pub text: String,
    /// Display-formatted timestamp, e.g. `14:02`
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller_name: Option<String>,
}

impl TranscriptMessage {
    pub fn new(sender: Sender, text: impl Into<String>, time: impl Into<String>) -> Self {
        Self { sender, text: text.into(), time: time.into(), caller_name: None }
    }

    pub fn caller(text: impl Into<String>, time: impl Into<String>) -> Self {
        Self::new(Sender::Caller, text, time)
    }

    pub fn ai(text: impl Into<String>, time: impl Into<String>) -> Self {
        Self::new(Sender::Ai, text, time)
    }

    pub fn with_caller_name(mut self, name: impl Into<String>) -> Self {
        self.caller_name = Some(name.into());
        self
    }

    pub fn is_ai(&self) -> bool {
        self.sender == Sender::Ai
    }
}

/// Geographic position of a call
///
/// `(0, 0)` is the backend's "not located yet" marker and is never plotted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pin {
    pub lat: f64,
    pub lng: f64,
}

impl Pin {
    pub const UNSET: Pin = Pin { lat: 0.0, lng: 0.0 };

    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_placed(&self) -> bool {
        *self != Self::UNSET
    }
}

impl std::fmt::Display for Pin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lng)
    }
}

/// A tracked incident and its live transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Call {
    pub id: String,
    pub priority: Priority,
    pub status: String,
    pub transcript: Vec<TranscriptMessage>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ai_handling: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub number_masked: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub incident_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub incident_icon: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status_detail: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location_label: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(default, deserialize_with = "de_confidence")]
    pub confidence: u8,
    #[serde(default = "default_in_service_area", deserialize_with = "de_in_service_area")]
    pub in_service_area: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub key_facts: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub elapsed: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pin: Pin,
}

fn default_in_service_area() -> bool {
    true
}

/// The backend sends `null` for fields it has not filled in yet
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn de_in_service_area<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_else(default_in_service_area))
}

/// Confidence is a percentage; anything outside 0..=100 is clamped
fn de_confidence<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw.map(clamp_confidence).unwrap_or(0))
}

pub(crate) fn clamp_confidence(raw: f64) -> u8 {
    if raw.is_nan() { 0 } else { raw.round().clamp(0.0, 100.0) as u8 }
}

impl Call {
    /// Minimal call as the backend announces it on first contact
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            priority: Priority::default(),
            status: "AI handling".to_string(),
            transcript: Vec::new(),
            ai_handling: true,
            number_masked: "Unknown".to_string(),
            incident_type: String::new(),
            incident_icon: String::new(),
            status_detail: String::new(),
            location_label: String::new(),
            address: String::new(),
            city: String::new(),
            confidence: 0,
            in_service_area: true,
            summary: String::new(),
            key_facts: Vec::new(),
            elapsed: "00:00".to_string(),
            pin: Pin::UNSET,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_transcript(mut self, transcript: Vec<TranscriptMessage>) -> Self {
        self.transcript = transcript;
        self
    }

    pub fn with_incident_type(mut self, incident_type: impl Into<String>) -> Self {
        self.incident_type = incident_type.into();
        self
    }

    pub fn with_location(mut self, label: impl Into<String>, pin: Pin) -> Self {
        self.location_label = label.into();
        self.pin = pin;
        self
    }

    /// Best human-readable location, falling back through label and address
    pub fn location(&self) -> &str {
        if !self.location_label.is_empty() {
            &self.location_label
        } else if !self.address.is_empty() {
            &self.address
        } else {
            "Locating…"
        }
    }

    /// Check the invariants serde cannot express
    pub fn validate(&self, position: usize) -> std::result::Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::EmptyId { position });
        }
        Ok(())
    }

    /// Decode the full-fetch payload (a JSON array of calls)
    ///
    /// Any record missing a required field fails the whole decode.
    pub fn decode_list(json: &str) -> Result<Vec<Call>> {
        let calls: Vec<Call> = serde_json::from_str(json).map_err(ValidationError::from)?;
        for (position, call) in calls.iter().enumerate() {
            call.validate(position)?;
        }
        Ok(calls)
    }
}
