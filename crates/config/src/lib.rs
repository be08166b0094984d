//! Per-company configuration for the dialog orchestrator
//!
//! Every spoken byte and every matching rule comes from the company
//! configuration bundle defined here. Bundles are loaded from YAML
//! (defaults plus per-company overrides), validated at load time, and
//! treated as read-only snapshots for the duration of a turn.

pub mod behavior;
pub mod clarifiers;
pub mod company;
pub mod greetings;
pub mod intent_gate;
pub mod llm_assist;
pub mod playbook;
pub mod resolver;
pub mod triggers;
pub mod validator;
pub mod vocabulary;

pub use behavior::{BehaviorConfig, RobotChallengeConfig};
pub use clarifiers::{ClarifierEntry, ClarifiersConfig};
pub use company::{CompanyConfig, FeatureFlags, GuardsConfig, SpokenLine};
pub use greetings::{GreetingRule, GreetingsConfig};
pub use intent_gate::{IntentGateConfig, IntentKind, IntentPattern};
pub use llm_assist::{
    AnswerReturnConfig, ContentBans, GuidedConfig, HandoffConfig, HandoffVariant, LlmAssistConfig,
};
pub use playbook::{FollowUpBucket, FollowUpBucketsConfig, PendingWordsConfig, PlaybookConfig};
pub use resolver::{ConfigStore, FileConfigStore, StaticConfigStore};
pub use triggers::{AnswerPayload, FollowUp, MatchSpec, TriggerCard};
pub use validator::{ValidationIssue, ValidationReport, ValidationSeverity, Validator};
pub use vocabulary::{MatchMode, SynonymGroup, TextConfig, VocabularyEntry, VocabularyKind};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Unknown company: {0}")]
    UnknownCompany(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<ConfigError> for frontdesk_core::Error {
    fn from(err: ConfigError) -> Self {
        frontdesk_core::Error::Config(err.to_string())
    }
}
