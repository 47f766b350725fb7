//! Pure scoring functions: bucket classification, streaks and reputation

pub mod classifier;
pub mod reputation;

pub use classifier::classify;
pub use classifier::classify_score;
pub use classifier::Bucket;
pub use classifier::RawThresholds;
pub use classifier::Score;
pub use classifier::Thresholds;
pub use reputation::base_points;
pub use reputation::reputation;
pub use reputation::streak;
pub use reputation::streak_with_min;
pub use reputation::DEFAULT_MIN_STREAK;
pub use reputation::DEFAULT_POSITIVE_CUTOFF;
