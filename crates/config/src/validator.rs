//! Load-time validation of company bundles
//!
//! Runs when a bundle is loaded and produces a startup report. Soft
//! violations are logged and tolerated; critical ones (a bundle that
//! could go silent) fail the load.

use crate::company::CompanyConfig;
use crate::triggers::AnswerPayload;

/// Severity of one finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    /// Informational; logged only
    Warning,
    /// Likely misconfiguration; logged prominently
    Error,
    /// Fails the load
    Critical,
}

/// One validation finding
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub severity: ValidationSeverity,
    /// Config section, e.g. `triggers`
    pub source: String,
    /// Offending field or rule id
    pub field: Option<String>,
    pub message: String,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let field = self.field.as_deref().unwrap_or("(root)");
        write!(
            f,
            "[{:?}] {}/{}: {}",
            self.severity, self.source, field, self.message
        )
    }
}

/// Aggregate result of validating one bundle
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub company_id: String,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new(company_id: impl Into<String>) -> Self {
        Self {
            company_id: company_id.into(),
            issues: Vec::new(),
        }
    }

    fn push(
        &mut self,
        severity: ValidationSeverity,
        source: &str,
        field: Option<String>,
        message: impl Into<String>,
    ) {
        self.issues.push(ValidationIssue {
            severity,
            source: source.to_string(),
            field,
            message: message.into(),
        });
    }

    /// No critical findings
    pub fn is_ok(&self) -> bool {
        self.critical_count() == 0
    }

    pub fn critical_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == ValidationSeverity::Critical)
            .count()
    }

    /// Emit the startup report through tracing
    pub fn log(&self) {
        let warnings = self
            .issues
            .iter()
            .filter(|i| i.severity == ValidationSeverity::Warning)
            .count();
        let errors = self
            .issues
            .iter()
            .filter(|i| i.severity == ValidationSeverity::Error)
            .count();
        tracing::info!(
            company_id = %self.company_id,
            critical = self.critical_count(),
            errors,
            warnings,
            "Configuration validation report"
        );
        for issue in &self.issues {
            match issue.severity {
                ValidationSeverity::Critical => tracing::error!(company_id = %self.company_id, "{issue}"),
                ValidationSeverity::Error => tracing::warn!(company_id = %self.company_id, "{issue}"),
                ValidationSeverity::Warning => tracing::debug!(company_id = %self.company_id, "{issue}"),
            }
        }
    }
}

/// Bundle validator
#[derive(Default)]
pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, config: &CompanyConfig) -> ValidationReport {
        let mut report = ValidationReport::new(&config.company_id);

        self.check_triggers(config, &mut report);
        self.check_greetings(config, &mut report);
        self.check_clarifiers(config, &mut report);
        self.check_vocabulary(config, &mut report);
        self.check_patterns(config, &mut report);
        self.check_fallbacks(config, &mut report);

        report
    }

    fn check_triggers(&self, config: &CompanyConfig, report: &mut ValidationReport) {
        let mut seen = std::collections::HashSet::new();
        for card in &config.triggers {
            if !seen.insert(card.id.as_str()) {
                report.push(
                    ValidationSeverity::Error,
                    "triggers",
                    Some(card.id.clone()),
                    "duplicate card id",
                );
            }
            if card.enabled && !card.has_criteria() {
                report.push(
                    ValidationSeverity::Critical,
                    "triggers",
                    Some(card.id.clone()),
                    "enabled card has no keywords or phrases",
                );
            }
            match &card.answer {
                AnswerPayload::Static { text, audio_url } => {
                    let has_text = text.as_deref().is_some_and(|t| !t.is_empty());
                    let has_audio = audio_url.as_deref().is_some_and(|u| !u.is_empty());
                    if !has_text && !has_audio {
                        report.push(
                            ValidationSeverity::Critical,
                            "triggers",
                            Some(card.id.clone()),
                            "static answer has neither text nor audio",
                        );
                    }
                }
                AnswerPayload::Llm {
                    fact_pack,
                    fallback_text,
                } => {
                    if fact_pack.is_empty() {
                        report.push(
                            ValidationSeverity::Critical,
                            "triggers",
                            Some(card.id.clone()),
                            "llm answer has an empty fact pack",
                        );
                    }
                    if fallback_text.as_deref().map_or(true, |t| t.is_empty()) {
                        report.push(
                            ValidationSeverity::Warning,
                            "triggers",
                            Some(card.id.clone()),
                            "llm answer has no fallback text; emergency fallback will cover errors",
                        );
                    }
                }
            }
            if let Some(follow_up) = &card.follow_up {
                if follow_up.question.is_empty() {
                    report.push(
                        ValidationSeverity::Error,
                        "triggers",
                        Some(card.id.clone()),
                        "follow-up question is empty",
                    );
                }
            }
        }
    }

    fn check_greetings(&self, config: &CompanyConfig, report: &mut ValidationReport) {
        for rule in &config.greetings.rules {
            if rule.triggers.is_empty() {
                report.push(
                    ValidationSeverity::Error,
                    "greetings",
                    Some(rule.id.clone()),
                    "rule has no triggers",
                );
            }
            let has_text = rule.response_text.as_deref().is_some_and(|t| !t.is_empty());
            let has_audio = rule.audio_url.as_deref().is_some_and(|u| !u.is_empty());
            if rule.enabled && !has_text && !has_audio {
                report.push(
                    ValidationSeverity::Critical,
                    "greetings",
                    Some(rule.id.clone()),
                    "enabled rule has neither text nor audio",
                );
            }
        }
    }

    fn check_clarifiers(&self, config: &CompanyConfig, report: &mut ValidationReport) {
        for entry in &config.clarifiers.entries {
            if entry.hint_trigger.is_empty() {
                report.push(
                    ValidationSeverity::Error,
                    "clarifiers",
                    Some(entry.id.clone()),
                    "hint trigger is empty",
                );
            }
            if entry.question.is_empty() {
                report.push(
                    ValidationSeverity::Critical,
                    "clarifiers",
                    Some(entry.id.clone()),
                    "question is empty",
                );
            }
        }
    }

    fn check_vocabulary(&self, config: &CompanyConfig, report: &mut ValidationReport) {
        for (index, entry) in config.vocabulary.iter().enumerate() {
            if entry.from.is_empty() {
                report.push(
                    ValidationSeverity::Error,
                    "vocabulary",
                    Some(format!("entry[{index}]")),
                    "empty `from` pattern",
                );
            }
            if entry.to.is_empty() {
                report.push(
                    ValidationSeverity::Error,
                    "vocabulary",
                    Some(format!("entry[{index}]")),
                    "empty `to` value",
                );
            }
        }
    }

    fn check_patterns(&self, config: &CompanyConfig, report: &mut ValidationReport) {
        for pattern in &config.intent_gate.patterns {
            if let Err(e) = regex::RegexBuilder::new(&pattern.pattern)
                .case_insensitive(true)
                .build()
            {
                report.push(
                    ValidationSeverity::Error,
                    "intent_gate",
                    Some(pattern.id.clone()),
                    format!("pattern does not compile: {e}"),
                );
            }
        }
        for (index, pattern) in config.assist.extra_banned_patterns.iter().enumerate() {
            if let Err(e) = regex::RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
            {
                report.push(
                    ValidationSeverity::Error,
                    "assist",
                    Some(format!("extra_banned_patterns[{index}]")),
                    format!("pattern does not compile: {e}"),
                );
            }
        }
    }

    fn check_fallbacks(&self, config: &CompanyConfig, report: &mut ValidationReport) {
        if config.playbook.emergency_fallback.is_empty() {
            report.push(
                ValidationSeverity::Critical,
                "playbook",
                Some("emergency_fallback".to_string()),
                "emergency fallback line is empty",
            );
        }
        if config.playbook.no_match_answer.is_empty() {
            report.push(
                ValidationSeverity::Error,
                "playbook",
                Some("no_match_answer".to_string()),
                "no-match answer is empty; emergency fallback will be spoken instead",
            );
        }
        if config.behavior.ack_word.is_empty() {
            report.push(
                ValidationSeverity::Error,
                "behavior",
                Some("ack_word".to_string()),
                "acknowledgment word is empty",
            );
        }
    }
}
