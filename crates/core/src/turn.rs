//! Turn input and outcome types

use serde::{Deserialize, Serialize};

use crate::event::Event;

/// Input to a single turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnInput {
    pub call_id: String,
    pub company_id: String,
    pub turn_index: u32,
    /// Raw caller utterance as transcribed upstream
    pub raw_text: String,
}

/// Which surface produced the spoken response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MatchSource {
    #[default]
    Discovery,
    Greeting,
    BookingHandoff,
}

impl MatchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchSource::Discovery => "discovery",
            MatchSource::Greeting => "greeting",
            MatchSource::BookingHandoff => "booking-handoff",
        }
    }
}

/// Outcome of a single turn
///
/// At most one of `response_text`/`audio_url` is non-empty when the
/// outcome speaks; both are `None` only for an explicit silent turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    pub match_source: MatchSource,
    /// Audit events emitted during the turn, in order
    pub events: Vec<Event>,
}

impl TurnOutcome {
    /// A spoken text outcome
    pub fn text(response: impl Into<String>, source: MatchSource) -> Self {
        Self {
            response_text: Some(response.into()),
            audio_url: None,
            match_source: source,
            events: Vec::new(),
        }
    }

    /// A pre-recorded audio outcome
    pub fn audio(url: impl Into<String>, source: MatchSource) -> Self {
        Self {
            response_text: None,
            audio_url: Some(url.into()),
            match_source: source,
            events: Vec::new(),
        }
    }

    /// An explicit silent turn
    pub fn silent() -> Self {
        Self {
            response_text: None,
            audio_url: None,
            match_source: MatchSource::Discovery,
            events: Vec::new(),
        }
    }

    /// Whether this outcome speaks anything
    pub fn speaks(&self) -> bool {
        self.response_text.as_deref().is_some_and(|t| !t.is_empty())
            || self.audio_url.as_deref().is_some_and(|u| !u.is_empty())
    }
}
