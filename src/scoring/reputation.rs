//! Positive-day streaks and reputation points
//!
//! Histories passed to [`streak`] are ordered most-recent-first: the prefix
//! being walked is the latest end of an employee's check-in history.

/// Score at or above which a check-in counts toward a streak
pub const DEFAULT_POSITIVE_CUTOFF: f64 = 0.3;

/// Shortest run that is rewarded
pub const DEFAULT_MIN_STREAK: u32 = 3;

/// Reputation tier table: `(lower bound, inclusive, points)`, best tier first.
const TIERS: [(f64, bool, i64); 4] = [
    (0.4, true, 1000),
    (0.0, true, 500),
    (-0.3, true, 250),
    (-0.8, false, -200),
];

/// Points for scores below every tier
const FLOOR_POINTS: i64 = -500;

/// Count the leading run of scores at or above `positive_cutoff`.
///
/// Returns 0 as soon as one score in the sequence falls below the cutoff,
/// and 0 when the run is shorter than [`DEFAULT_MIN_STREAK`].
#[must_use]
pub fn streak(scores: &[f64], positive_cutoff: f64) -> u32 {
    streak_with_min(scores, positive_cutoff, DEFAULT_MIN_STREAK)
}

/// [`streak`] with a configurable minimum run length.
#[must_use]
pub fn streak_with_min(scores: &[f64], positive_cutoff: f64, min_streak: u32) -> u32 {
    let mut count: u32 = 0;
    for &score in scores {
        // NaN compares false and breaks the run like any other failure
        if !(score >= positive_cutoff) {
            return 0;
        }
        count = count.saturating_add(1);
    }
    if count >= min_streak {
        count
    } else {
        0
    }
}

/// Base points for a score, before any streak multiplier
#[must_use]
pub fn base_points(score: f64) -> i64 {
    for (bound, inclusive, points) in TIERS {
        let hit = if inclusive { score >= bound } else { score > bound };
        if hit {
            return points;
        }
    }
    FLOOR_POINTS
}

/// Reputation for the latest score given the current streak.
///
/// Non-negative scores with a rewarded streak multiply their base points by
/// the streak length; everything else keeps the base points.
#[must_use]
pub fn reputation(score: f64, streak: u32) -> i64 {
    let base = base_points(score);
    if score >= 0.0 && streak >= DEFAULT_MIN_STREAK {
        base.saturating_mul(i64::from(streak))
    } else {
        base
    }
}
