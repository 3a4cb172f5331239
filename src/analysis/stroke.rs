use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;

const ROTATION_THRESHOLD_DEG: f64 = 5.0;
const CLASSIFIED_CONFIDENCE: f64 = 0.6;
const UNKNOWN_CONFIDENCE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StrokeGuess {
    Forehand,
    Backhand,
    Unknown,
}

/// Coarse stroke label from the sign of the shoulder rotation proxy.
pub fn classify_stroke(shoulder_rotation_proxy: f64) -> (StrokeGuess, f64) {
    if shoulder_rotation_proxy.abs() > ROTATION_THRESHOLD_DEG {
        let guess = if shoulder_rotation_proxy > 0.0 {
            StrokeGuess::Forehand
        } else {
            StrokeGuess::Backhand
        };
        (guess, CLASSIFIED_CONFIDENCE)
    } else {
        (StrokeGuess::Unknown, UNKNOWN_CONFIDENCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_rotation_is_forehand() {
        assert_eq!(classify_stroke(10.0), (StrokeGuess::Forehand, 0.6));
    }

    #[test]
    fn negative_rotation_is_backhand() {
        assert_eq!(classify_stroke(-10.0), (StrokeGuess::Backhand, 0.6));
    }

    #[test]
    fn small_rotation_is_unknown() {
        assert_eq!(classify_stroke(2.0), (StrokeGuess::Unknown, 0.3));
        assert_eq!(classify_stroke(5.0), (StrokeGuess::Unknown, 0.3));
        assert_eq!(classify_stroke(-5.0), (StrokeGuess::Unknown, 0.3));
    }

    #[test]
    fn labels_are_lowercase() {
        assert_eq!(StrokeGuess::Backhand.to_string(), "backhand");
        assert_eq!(
            serde_json::to_string(&StrokeGuess::Forehand).unwrap(),
            "\"forehand\""
        );
    }
}
