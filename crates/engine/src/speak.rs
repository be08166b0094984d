//! Speech provenance gate ("no UI, no speak")
//!
//! Every candidate spoken string is submitted with a claimed source
//! path. The gate resolves primary -> configured fallback -> emergency
//! fallback -> last-resort ack, produces exactly one provenance record
//! for what is finally spoken, and a critical blocked event for any
//! unmapped candidate along the way.

use frontdesk_config::CompanyConfig;
use frontdesk_core::{Event, EventSeverity, EventType, MatchSource};

/// Spoken when even the emergency fallback is unmapped
pub const LAST_RESORT_ACK: &str = "One moment please.";

/// A candidate response awaiting admission
#[derive(Debug, Clone)]
pub struct Candidate {
    pub text: Option<String>,
    pub audio_url: Option<String>,
    /// Which subsystem produced it, e.g. `trigger:ac_not_cooling`
    pub source_id: String,
    /// Claimed UI path
    pub primary_path: String,
    /// Configured fallback path, e.g. an LLM card's fallback text
    pub fallback_path: Option<String>,
    /// Whether the text literally came from the claimed path
    /// (false for validated LLM output spoken under that path)
    pub is_from_ui_config: bool,
    pub match_source: MatchSource,
}

impl Candidate {
    /// A UI-owned text candidate
    pub fn ui_text(
        text: impl Into<String>,
        source_id: impl Into<String>,
        primary_path: impl Into<String>,
        match_source: MatchSource,
    ) -> Self {
        Self {
            text: Some(text.into()),
            audio_url: None,
            source_id: source_id.into(),
            primary_path: primary_path.into(),
            fallback_path: None,
            is_from_ui_config: true,
            match_source,
        }
    }

    pub fn with_audio(mut self, audio_url: Option<String>) -> Self {
        self.audio_url = audio_url;
        self
    }

    pub fn with_fallback_path(mut self, path: impl Into<String>) -> Self {
        self.fallback_path = Some(path.into());
        self
    }
}

/// What the gate admitted for speaking
#[derive(Debug)]
pub struct Admitted {
    pub text: Option<String>,
    pub audio_url: Option<String>,
    pub match_source: MatchSource,
    /// The single provenance event for the spoken string
    pub provenance: Event,
    /// Blocked events for unmapped candidates, emitted before provenance
    pub blocked: Vec<Event>,
}

/// The provenance gate
pub struct SpeakGate;

impl SpeakGate {
    /// Admit a candidate, resolving down the fallback chain.
    pub fn admit(config: &CompanyConfig, candidate: Candidate) -> Admitted {
        let mut blocked = Vec::new();

        // Primary: claimed path must resolve to a non-empty line
        if config.resolve_path(&candidate.primary_path).is_some() {
            let provenance = provenance_event(
                &candidate.source_id,
                &candidate.primary_path,
                candidate.text.as_deref(),
                candidate.audio_url.as_deref(),
                "primary",
                candidate.is_from_ui_config,
            );
            return Admitted {
                text: candidate.text,
                audio_url: candidate.audio_url,
                match_source: candidate.match_source,
                provenance,
                blocked,
            };
        }

        // Configured fallback: speak the resolved line itself
        if let Some(fallback_path) = candidate.fallback_path.as_deref() {
            if let Some(line) = config.resolve_path(fallback_path) {
                let provenance = provenance_event(
                    &candidate.source_id,
                    fallback_path,
                    line.text.as_deref(),
                    line.audio_url.as_deref(),
                    "fallback",
                    true,
                );
                return Admitted {
                    text: line.text,
                    audio_url: line.audio_url,
                    match_source: candidate.match_source,
                    provenance,
                    blocked,
                };
            }
        }

        // Unmapped: block the candidate, substitute the emergency line
        blocked.push(blocked_event(&candidate, "unmapped-primary-and-fallback"));

        let emergency_path = CompanyConfig::EMERGENCY_FALLBACK_PATH;
        if let Some(line) = config.resolve_path(emergency_path) {
            let provenance = provenance_event(
                &candidate.source_id,
                emergency_path,
                line.text.as_deref(),
                line.audio_url.as_deref(),
                "emergency",
                true,
            );
            return Admitted {
                text: line.text,
                audio_url: line.audio_url,
                match_source: candidate.match_source,
                provenance,
                blocked,
            };
        }

        // Even the emergency line is unmapped: minimal acknowledgment,
        // still anchored on the emergency path for the audit trail
        blocked.push(
            Event::new(EventType::SpokenTextUnmappedBlocked)
                .with_severity(EventSeverity::Critical)
                .field("sourceId", "speak-gate")
                .field("uiPath", emergency_path)
                .field("reason", "emergency-fallback-unmapped"),
        );
        let provenance = provenance_event(
            &candidate.source_id,
            emergency_path,
            Some(LAST_RESORT_ACK),
            None,
            "last-resort-ack",
            false,
        );
        Admitted {
            text: Some(LAST_RESORT_ACK.to_string()),
            audio_url: None,
            match_source: candidate.match_source,
            provenance,
            blocked,
        }
    }

    /// Admission when no configuration could be loaded at all.
    ///
    /// Nothing is resolvable, so the minimal acknowledgment is spoken,
    /// anchored on the emergency-fallback path, with a critical blocked
    /// event recording why. Every spoken byte stays auditable even on a
    /// turn this degraded.
    pub fn admit_without_config(source_id: &str, reason: &str) -> Admitted {
        let emergency_path = CompanyConfig::EMERGENCY_FALLBACK_PATH;
        let blocked = vec![Event::new(EventType::SpokenTextUnmappedBlocked)
            .with_severity(EventSeverity::Critical)
            .field("sourceId", source_id)
            .field("uiPath", emergency_path)
            .field("textPreview", LAST_RESORT_ACK)
            .field("reason", reason)];
        let provenance = provenance_event(
            source_id,
            emergency_path,
            Some(LAST_RESORT_ACK),
            None,
            "last-resort-ack",
            false,
        );
        Admitted {
            text: Some(LAST_RESORT_ACK.to_string()),
            audio_url: None,
            match_source: MatchSource::Discovery,
            provenance,
            blocked,
        }
    }
}

fn provenance_event(
    source_id: &str,
    ui_path: &str,
    text: Option<&str>,
    audio_url: Option<&str>,
    reason: &str,
    is_from_ui_config: bool,
) -> Event {
    let tab = ui_path.split('.').next().unwrap_or("");
    let preview: String = text.unwrap_or("").chars().take(80).collect();
    Event::new(EventType::SpeakProvenance)
        .field("sourceId", source_id)
        .field("uiPath", ui_path)
        .field("configPath", ui_path)
        .field("tab", tab)
        .field("textPreview", preview)
        .field("audioURL", audio_url.unwrap_or(""))
        .field("reason", reason)
        .field("isFromUiConfig", is_from_ui_config)
}

fn blocked_event(candidate: &Candidate, reason: &str) -> Event {
    Event::new(EventType::SpokenTextUnmappedBlocked)
        .with_severity(EventSeverity::Critical)
        .field("sourceId", candidate.source_id.clone())
        .field("uiPath", candidate.primary_path.clone())
        .field(
            "textPreview",
            candidate
                .text
                .as_deref()
                .unwrap_or("")
                .chars()
                .take(80)
                .collect::<String>(),
        )
        .field("reason", reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapped_candidate_passes() {
        let config = CompanyConfig::bare("acme");
        let candidate = Candidate::ui_text(
            "Okay. One moment.",
            "behavior",
            "behavior.ackWord",
            MatchSource::Discovery,
        );
        let admitted = SpeakGate::admit(&config, candidate);
        assert_eq!(admitted.text.as_deref(), Some("Okay. One moment."));
        assert!(admitted.blocked.is_empty());
        assert_eq!(
            admitted.provenance.payload.get("uiPath").and_then(|v| v.as_str()),
            Some("behavior.ackWord")
        );
        assert_eq!(
            admitted
                .provenance
                .payload
                .get("isFromUiConfig")
                .and_then(|v| v.as_bool()),
            Some(true)
        );
    }

    #[test]
    fn test_unmapped_candidate_blocked_to_emergency() {
        let config = CompanyConfig::bare("acme");
        let candidate = Candidate::ui_text(
            "made up text",
            "mystery",
            "no.such.path",
            MatchSource::Discovery,
        );
        let admitted = SpeakGate::admit(&config, candidate);
        assert_eq!(
            admitted.text.as_deref(),
            Some(config.playbook.emergency_fallback.as_str())
        );
        assert_eq!(admitted.blocked.len(), 1);
        assert_eq!(
            admitted.blocked[0].event_type,
            EventType::SpokenTextUnmappedBlocked
        );
        assert_eq!(admitted.blocked[0].severity, EventSeverity::Critical);
        assert_eq!(
            admitted.provenance.payload.get("uiPath").and_then(|v| v.as_str()),
            Some(CompanyConfig::EMERGENCY_FALLBACK_PATH)
        );
    }

    #[test]
    fn test_configured_fallback_path_used() {
        let config = CompanyConfig::bare("acme");
        let candidate = Candidate::ui_text(
            "whatever",
            "trigger:x",
            "no.such.path",
            MatchSource::Discovery,
        )
        .with_fallback_path("discovery.playbook.fallback.noMatchAnswer");
        let admitted = SpeakGate::admit(&config, candidate);
        assert_eq!(
            admitted.text.as_deref(),
            Some(config.playbook.no_match_answer.as_str())
        );
        assert!(admitted.blocked.is_empty());
        assert_eq!(
            admitted.provenance.payload.get("reason").and_then(|v| v.as_str()),
            Some("fallback")
        );
    }

    #[test]
    fn test_last_resort_ack_when_emergency_unmapped() {
        let mut config = CompanyConfig::bare("acme");
        config.playbook.emergency_fallback = String::new();
        let candidate = Candidate::ui_text(
            "made up",
            "mystery",
            "no.such.path",
            MatchSource::Discovery,
        );
        let admitted = SpeakGate::admit(&config, candidate);
        assert_eq!(admitted.text.as_deref(), Some(LAST_RESORT_ACK));
        assert_eq!(admitted.blocked.len(), 2);
        // Even here the provenance stays anchored on the emergency path
        assert_eq!(
            admitted.provenance.payload.get("uiPath").and_then(|v| v.as_str()),
            Some(CompanyConfig::EMERGENCY_FALLBACK_PATH)
        );
    }

    #[test]
    fn test_admit_without_config_keeps_provenance() {
        let admitted = SpeakGate::admit_without_config("config-load", "config-unavailable");
        assert_eq!(admitted.text.as_deref(), Some(LAST_RESORT_ACK));
        assert_eq!(admitted.blocked.len(), 1);
        assert_eq!(
            admitted.blocked[0].event_type,
            EventType::SpokenTextUnmappedBlocked
        );
        assert_eq!(admitted.blocked[0].severity, EventSeverity::Critical);
        assert_eq!(
            admitted.blocked[0].payload.get("reason").and_then(|v| v.as_str()),
            Some("config-unavailable")
        );
        assert_eq!(
            admitted.provenance.payload.get("uiPath").and_then(|v| v.as_str()),
            Some(CompanyConfig::EMERGENCY_FALLBACK_PATH)
        );
        assert_eq!(
            admitted.provenance.payload.get("isFromUiConfig").and_then(|v| v.as_bool()),
            Some(false)
        );
    }
}
