// Structural request errors.
//
// A malformed request is rejected before any musical rule runs and reported
// with the `REQUEST_INVALID` wire code, never mixed into the violation
// list. Everything here is about the shape of the request: timing grid,
// voice contiguity, pitch range, and the rhythm the declared species
// demands. Once a request passes these gates the engine is total — every
// musical problem becomes a recoverable `Violation`, not an error.

use gradus_protocol::message::ValidationResponse;
use thiserror::Error;

/// Which voice a structural complaint is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoiceRole {
    Reference,
    Subject,
}

impl std::fmt::Display for VoiceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoiceRole::Reference => write!(f, "reference"),
            VoiceRole::Subject => write!(f, "subject"),
        }
    }
}

/// Why a request was rejected before validation.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum RequestError {
    #[error("{role} voice is empty")]
    EmptyVoice { role: VoiceRole },

    #[error("{role} voice has a note off the sixteenth-note grid near beat {beat}")]
    OffGrid { role: VoiceRole, beat: f64 },

    #[error("{role} voice has overlapping notes at beat {beat}")]
    OverlappingNotes { role: VoiceRole, beat: f64 },

    #[error("{role} voice has a gap at beat {beat}")]
    GapInVoice { role: VoiceRole, beat: f64 },

    #[error("pitch {pitch} is outside the playable range {low}-{high}")]
    PitchOutOfRange { pitch: i32, low: i32, high: i32 },

    #[error("reference voice must be uniform whole-measure notes")]
    NonUniformReference,

    #[error("reference voice needs at least {min} notes, got {got}")]
    ReferenceTooShort { got: usize, min: usize },

    #[error("reference note duration of {beats} beats is not a supported measure (3 or 4 beats)")]
    UnsupportedMeasure { beats: f64 },

    #[error("voices end at different beats: reference ends at {reference}, subject at {subject}")]
    DurationMismatch { reference: f64, subject: f64 },

    #[error("subject rhythm in measure {measure} does not fit species {species}")]
    SpeciesMismatch { species: u8, measure: usize },
}

impl RequestError {
    /// The wire form of this rejection.
    pub fn to_response(&self) -> ValidationResponse {
        ValidationResponse::rejected(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_voice() {
        let err = RequestError::GapInVoice {
            role: VoiceRole::Subject,
            beat: 6.0,
        };
        assert_eq!(err.to_string(), "subject voice has a gap at beat 6");
    }

    #[test]
    fn test_wire_form_carries_code() {
        let err = RequestError::EmptyVoice {
            role: VoiceRole::Reference,
        };
        let json = serde_json::to_string(&err.to_response()).unwrap();
        assert!(json.contains("REQUEST_INVALID"), "json was {json}");
        assert!(json.contains("reference voice is empty"), "json was {json}");
    }
}
