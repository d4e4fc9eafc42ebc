//! Fisher-scale classification of a CTG trace.
//!
//! Scoring is not implemented yet: [`FisherClassifier::classify`] always reports
//! [`Classification::Good`]. The feature slots mirror the five Fisher criteria.

use std::fmt;

use super::reader::CtgTrace;

/// Fisher scale outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    /// 8–10 points.
    Good,
    /// 5–7 points.
    Doubtful,
    /// 0–4 points.
    Bad,
}

impl Classification {
    /// Map a total Fisher score (0–10) to its class.
    pub fn from_score(score: u8) -> Self {
        match score {
            8.. => Self::Good,
            5..=7 => Self::Doubtful,
            _ => Self::Bad,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Doubtful => "doubtful",
            Self::Bad => "bad",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default)]
pub struct FisherClassifier {
    pub basal_rhythm: Option<f64>,
    pub amplitude: Option<f64>,
    pub variability: Option<f64>,
    pub accelerations: Option<f64>,
    pub decelerations: Option<f64>,
}

impl FisherClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classify(&self, _trace: &CtgTrace) -> String {
        Classification::Good.to_string()
    }
}
