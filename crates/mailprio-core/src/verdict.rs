//! Confidence pair, verdict, and the classification result shown to the user.

use std::fmt;

use serde::Serialize;

use crate::Threshold;

/// Importance expressed as a percentage pair that sums to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Confidence {
    pub important: f64,
    pub not_important: f64,
}

impl Confidence {
    /// Convert a model probability in `[0, 1]` into percentages.
    pub fn from_probability(probability: f64) -> Self {
        let important = probability.clamp(0.0, 1.0) * 100.0;
        Self {
            important,
            not_important: 100.0 - important,
        }
    }
}

/// Binary outcome of a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Important,
    NotImportant,
}

impl Verdict {
    /// Strictly greater than: a tie at the threshold is not important.
    pub fn decide(important_percent: f64, threshold: Threshold) -> Self {
        if important_percent > threshold.as_f64() {
            Self::Important
        } else {
            Self::NotImportant
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Important => "Important",
            Self::NotImportant => "Not Important",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one subject/body pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub confidence: Confidence,
    pub verdict: Verdict,
    pub threshold: Threshold,
}

impl Classification {
    pub fn from_probability(probability: f64, threshold: Threshold) -> Self {
        let confidence = Confidence::from_probability(probability);
        Self {
            confidence,
            verdict: Verdict::decide(confidence.important, threshold),
            threshold,
        }
    }

    /// Confidence of whichever side the verdict picked.
    pub fn verdict_confidence(&self) -> f64 {
        match self.verdict {
            Verdict::Important => self.confidence.important,
            Verdict::NotImportant => self.confidence.not_important,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Classified as {} ({:.2}% confidence)",
            self.verdict,
            self.verdict_confidence()
        )
    }
}
