//! Behavior style: acknowledgment word, robot challenge, caller-name usage

use serde::{Deserialize, Serialize};

/// Robot/human challenge handling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotChallengeConfig {
    /// Line spoken when the caller asks whether they reached a machine
    #[serde(default = "default_challenge_line")]
    pub line: String,
    /// Patterns that count as a challenge, matched case-insensitively
    #[serde(default = "default_challenge_patterns")]
    pub patterns: Vec<String>,
}

fn default_challenge_line() -> String {
    "I'm the automated assistant for this office, and I can get you taken care of. What's going on today?".to_string()
}

fn default_challenge_patterns() -> Vec<String> {
    [
        "are you a robot",
        "are you a real person",
        "are you human",
        "is this a machine",
        "am i talking to a machine",
        "is this a recording",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for RobotChallengeConfig {
    fn default() -> Self {
        Self {
            line: default_challenge_line(),
            patterns: default_challenge_patterns(),
        }
    }
}

/// Company-wide speaking style
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorConfig {
    /// Word prepended to composed answers, e.g. "Okay."
    #[serde(default = "default_ack_word")]
    pub ack_word: String,
    /// Whether the ack may personalize with the caller's name
    #[serde(default = "default_true")]
    pub use_caller_name: bool,
    /// Minimum name-slot confidence before the name is spoken
    #[serde(default = "default_name_confidence_min")]
    pub name_confidence_min: f32,
    #[serde(default)]
    pub robot_challenge: RobotChallengeConfig,
}

fn default_ack_word() -> String {
    "Okay.".to_string()
}

fn default_true() -> bool {
    true
}

fn default_name_confidence_min() -> f32 {
    0.85
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            ack_word: default_ack_word(),
            use_caller_name: true,
            name_confidence_min: default_name_confidence_min(),
            robot_challenge: RobotChallengeConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_behavior_defaults() {
        let behavior = BehaviorConfig::default();
        assert_eq!(behavior.ack_word, "Okay.");
        assert!(behavior.use_caller_name);
        assert!((behavior.name_confidence_min - 0.85).abs() < f32::EPSILON);
        assert!(!behavior.robot_challenge.patterns.is_empty());
    }

    #[test]
    fn test_behavior_deserialization() {
        let yaml = r#"
ack_word: "Got it."
use_caller_name: false
robot_challenge:
  line: "You're speaking with our virtual receptionist."
"#;
        let behavior: BehaviorConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(behavior.ack_word, "Got it.");
        assert!(!behavior.use_caller_name);
        assert_eq!(
            behavior.robot_challenge.line,
            "You're speaking with our virtual receptionist."
        );
        // Patterns fall back to the built-in set
        assert!(!behavior.robot_challenge.patterns.is_empty());
    }
}
