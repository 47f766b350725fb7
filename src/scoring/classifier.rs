//! Threshold classification of emotion scores into qualitative buckets

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::Result;
use crate::WellbeingError;

/// Lowest score the scoring model can emit
pub const SCORE_MIN: f64 = -1.0;
/// Highest score the scoring model can emit
pub const SCORE_MAX: f64 = 1.0;

/// A validated emotion score in `[SCORE_MIN, SCORE_MAX]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Score(f64);

impl Score {
    /// Validate a raw score.
    ///
    /// # Errors
    /// Returns `InvalidScore` for NaN, infinities and values outside the declared range.
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(WellbeingError::InvalidScore(format!(
                "score must be finite, got {value}"
            )));
        }
        if !(SCORE_MIN..=SCORE_MAX).contains(&value) {
            return Err(WellbeingError::InvalidScore(format!(
                "score {value} outside [{SCORE_MIN}, {SCORE_MAX}]"
            )));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Score {
    type Error = WellbeingError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = f64::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Qualitative sentiment bucket.
///
/// Variants are declared from worst to best so the derived ordering matches
/// the bucket rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Critical,
    Negative,
    Neutral,
    Positive,
}

impl Bucket {
    pub const ALL: [Self; 4] = [Self::Positive, Self::Neutral, Self::Negative, Self::Critical];

    /// Rank used for ordering comparisons (higher is better)
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::Negative => 1,
            Self::Neutral => 2,
            Self::Positive => 3,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Positive => "positive",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw threshold values as they appear in configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RawThresholds {
    pub positive_min: f64,
    pub neutral_min: f64,
    pub negative_min: f64,
    pub critical_min: f64,
}

/// Bucket boundaries, strictly ordered
/// `positive_min > neutral_min > negative_min > critical_min`.
///
/// Fields are private so every instance went through [`Thresholds::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawThresholds", into = "RawThresholds")]
pub struct Thresholds {
    positive_min: f64,
    neutral_min: f64,
    negative_min: f64,
    critical_min: f64,
}

impl Thresholds {
    /// Build a validated set of boundaries.
    ///
    /// # Errors
    /// Returns `InvalidThresholds` if any boundary is non-finite or the ordering is not strict.
    pub fn new(
        positive_min: f64,
        neutral_min: f64,
        negative_min: f64,
        critical_min: f64,
    ) -> Result<Self> {
        let values = [positive_min, neutral_min, negative_min, critical_min];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(WellbeingError::InvalidThresholds(format!(
                "boundaries must be finite: {values:?}"
            )));
        }
        if !(positive_min > neutral_min && neutral_min > negative_min && negative_min > critical_min)
        {
            return Err(WellbeingError::InvalidThresholds(format!(
                "expected positive_min > neutral_min > negative_min > critical_min, got {positive_min} / {neutral_min} / {negative_min} / {critical_min}"
            )));
        }
        Ok(Self {
            positive_min,
            neutral_min,
            negative_min,
            critical_min,
        })
    }

    #[must_use]
    pub const fn positive_min(&self) -> f64 {
        self.positive_min
    }

    #[must_use]
    pub const fn neutral_min(&self) -> f64 {
        self.neutral_min
    }

    #[must_use]
    pub const fn negative_min(&self) -> f64 {
        self.negative_min
    }

    #[must_use]
    pub const fn critical_min(&self) -> f64 {
        self.critical_min
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            positive_min: 0.3,
            neutral_min: -0.3,
            negative_min: -0.6,
            critical_min: -0.8,
        }
    }
}

impl TryFrom<RawThresholds> for Thresholds {
    type Error = WellbeingError;

    fn try_from(raw: RawThresholds) -> Result<Self> {
        Self::new(
            raw.positive_min,
            raw.neutral_min,
            raw.negative_min,
            raw.critical_min,
        )
    }
}

impl From<Thresholds> for RawThresholds {
    fn from(t: Thresholds) -> Self {
        Self {
            positive_min: t.positive_min,
            neutral_min: t.neutral_min,
            negative_min: t.negative_min,
            critical_min: t.critical_min,
        }
    }
}

/// Map a raw score to its bucket.
///
/// Boundaries are inclusive on the lower bound except the critical one:
/// a score equal to `critical_min` is `Critical`.
///
/// # Errors
/// Returns `InvalidScore` for non-finite or out-of-range scores.
pub fn classify(score: f64, thresholds: &Thresholds) -> Result<Bucket> {
    Ok(classify_score(Score::new(score)?, thresholds))
}

/// Infallible variant for an already validated [`Score`]
#[must_use]
pub fn classify_score(score: Score, thresholds: &Thresholds) -> Bucket {
    let s = score.value();
    if s >= thresholds.positive_min {
        Bucket::Positive
    } else if s >= thresholds.neutral_min {
        Bucket::Neutral
    } else if s > thresholds.critical_min {
        Bucket::Negative
    } else {
        Bucket::Critical
    }
}
