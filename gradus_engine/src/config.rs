// Engine configuration.
//
// Every tunable the rule tables and the report builder consult lives in one
// immutable `EngineConfig` passed into `validate` — no globals, no
// environment variables. All fields have sensible defaults, so callers that
// want textbook behavior pass `EngineConfig::default()`. The UI can load a
// partial JSON override; missing fields fall back to the defaults.

use serde::{Deserialize, Serialize};

/// Melodic thresholds consulted by the shared rules.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MelodicLimits {
    /// Motion beyond this many semitones counts as a leap. Default 2: thirds
    /// and larger are leaps.
    pub leap_threshold: i32,
    /// Maximum span of the subject voice in semitones. Default 16, a major
    /// tenth.
    pub max_range: i32,
    /// How far the subject may dip past the reference (in semitones) before
    /// a voice-crossing warning. Default 0: any true crossing warns.
    pub crossing_tolerance: i32,
}

impl Default for MelodicLimits {
    fn default() -> Self {
        MelodicLimits {
            leap_threshold: 2,
            max_range: 16,
            crossing_tolerance: 0,
        }
    }
}

/// Score deductions and the pass threshold used by the report builder.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub error_deduction: u32,
    pub warning_deduction: u32,
    /// An exercise with no errors still fails below this score.
    pub passing_score: u32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        ScoreWeights {
            error_deduction: 10,
            warning_deduction: 3,
            passing_score: 90,
        }
    }
}

/// The complete engine configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub melodic: MelodicLimits,
    pub scoring: ScoreWeights,
    /// Escalate direct (hidden) perfects from warning to error, for stricter
    /// rule sets.
    pub strict_direct_perfects: bool,
}

impl EngineConfig {
    /// Load a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.melodic.leap_threshold, 2);
        assert_eq!(cfg.melodic.max_range, 16);
        assert_eq!(cfg.scoring.error_deduction, 10);
        assert_eq!(cfg.scoring.warning_deduction, 3);
        assert_eq!(cfg.scoring.passing_score, 90);
        assert!(!cfg.strict_direct_perfects);
    }

    #[test]
    fn test_partial_json_load() {
        let cfg = EngineConfig::from_json(
            r#"{ "melodic": { "max_range": 12 }, "strict_direct_perfects": true }"#,
        )
        .unwrap();
        assert_eq!(cfg.melodic.max_range, 12);
        assert_eq!(cfg.melodic.leap_threshold, 2, "missing fields keep defaults");
        assert!(cfg.strict_direct_perfects);
    }

    #[test]
    fn test_json_round_trip() {
        let mut cfg = EngineConfig::default();
        cfg.scoring.passing_score = 100;
        let json = serde_json::to_string(&cfg).unwrap();
        let back = EngineConfig::from_json(&json).unwrap();
        assert_eq!(back, cfg);
    }
}
