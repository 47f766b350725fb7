//! Emotion score aggregation pipeline
//!
//! Wires the classifier, the streak/reputation calculator, the cache-aside
//! accessor and the cursor paginator on top of a [`WellbeingRepository`].
//! Write paths evict the cached aggregates they affect.

use std::sync::Arc;

use tracing::debug;
use tracing::info;

use crate::cache::CacheAside;
use crate::config::AppConfig;
use crate::models::BucketDistribution;
use crate::models::BucketShare;
use crate::models::CheckIn;
use crate::models::ClassifiedEmployee;
use crate::models::Employee;
use crate::models::EmployeeHistory;
use crate::models::EmployeeListFilter;
use crate::models::LeaderboardEntry;
use crate::models::NewCheckIn;
use crate::models::NewEmployee;
use crate::models::ReputationReport;
use crate::models::WatchlistEntry;
use crate::pagination::paginate;
use crate::pagination::Page;
use crate::repository::WellbeingRepository;
use crate::scoring::classify;
use crate::scoring::classify_score;
use crate::scoring::reputation;
use crate::scoring::streak_with_min;
use crate::scoring::Bucket;
use crate::scoring::Score;
use crate::Result;
use crate::WellbeingError;

/// Cache key prefixes of every aggregate a new check-in can change
pub const AGGREGATE_KEY_PATTERNS: [&str; 4] =
    ["employees:*", "leaderboard:*", "distribution:*", "watchlist:*"];

/// Aggregates a new employee can change. Employees without check-ins never
/// appear in the leaderboard, distribution or watchlist.
pub const EMPLOYEE_KEY_PATTERNS: [&str; 1] = ["employees:*"];

pub struct WellbeingService<R: WellbeingRepository> {
    repository: Arc<R>,
    cache: CacheAside,
    config: AppConfig,
}

impl<R: WellbeingRepository> Clone for WellbeingService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            cache: self.cache.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R: WellbeingRepository> WellbeingService<R> {
    pub const fn new(repository: Arc<R>, cache: CacheAside, config: AppConfig) -> Self {
        Self {
            repository,
            cache,
            config,
        }
    }

    pub const fn cache(&self) -> &CacheAside {
        &self.cache
    }

    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Classify a score with the configured thresholds
    pub fn classify_score(&self, score: f64) -> Result<Bucket> {
        classify(score, self.config.thresholds())
    }

    fn streak_of(&self, scores: &[f64]) -> u32 {
        streak_with_min(
            scores,
            self.config.scoring.positive_cutoff,
            self.config.scoring.min_streak,
        )
    }

    fn window(&self) -> usize {
        self.config.scoring.streak_window as usize
    }

    /// Streak and reputation points of one employee
    pub async fn employee_reputation(&self, employee_id: i64) -> Result<ReputationReport> {
        if !self.repository.employee_exists(employee_id).await? {
            return Err(WellbeingError::EmployeeNotFound(employee_id));
        }
        let history = self
            .repository
            .recent_history(employee_id, self.window())
            .await?;
        let scores: Vec<f64> = history.iter().map(|h| h.score).collect();

        let Some(&latest) = scores.first() else {
            return Ok(ReputationReport {
                employee_id,
                latest_score: None,
                bucket: None,
                streak: 0,
                points: 0,
            });
        };

        let streak = self.streak_of(&scores);
        Ok(ReputationReport {
            employee_id,
            latest_score: Some(latest),
            bucket: Some(self.classify_score(latest)?),
            streak,
            points: reputation(latest, streak),
        })
    }

    /// One cached page of employees matching `filter`
    pub async fn list_employees(
        &self,
        filter: &EmployeeListFilter,
        limit: Option<usize>,
        after_id: Option<i64>,
    ) -> Result<Page<ClassifiedEmployee, i64>> {
        let limit = self.config.pagination.effective_limit(limit);
        let key = format!(
            "employees:{}:{}:{}",
            filter.cache_key(),
            limit,
            after_id.map_or_else(|| "-".to_string(), |id| id.to_string())
        );
        let thresholds = *self.config.thresholds();

        self.cache
            .get_or_compute(&key, self.config.cache.employees_ttl(), || async move {
                let page = paginate(
                    move |take, after| self.repository.fetch_employees(filter, take, after),
                    limit,
                    after_id,
                )
                .await?;
                let mut items = Vec::with_capacity(page.items.len());
                for employee in page.items {
                    let bucket = match employee.latest_score {
                        Some(score) => Some(classify(score, &thresholds)?),
                        None => None,
                    };
                    items.push(ClassifiedEmployee { employee, bucket });
                }
                Ok(Page {
                    items,
                    has_next_page: page.has_next_page,
                    next_cursor: page.next_cursor,
                })
            })
            .await
    }

    /// Cached reputation leaderboard, best first
    pub async fn leaderboard(
        &self,
        department: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<LeaderboardEntry>> {
        let limit = self.config.pagination.effective_limit(limit);
        let key = format!("leaderboard:{}:{}", department_key(department), limit);

        self.cache
            .get_or_compute(&key, self.config.cache.leaderboard_ttl(), || async move {
                let histories = self
                    .repository
                    .employee_histories(department, self.window())
                    .await?;
                let mut entries = self.build_leaderboard(histories)?;
                entries.truncate(limit);
                Ok(entries)
            })
            .await
    }

    fn build_leaderboard(&self, histories: Vec<EmployeeHistory>) -> Result<Vec<LeaderboardEntry>> {
        let mut entries = Vec::with_capacity(histories.len());
        for history in histories {
            let Some(latest) = history.latest_score() else {
                continue;
            };
            let streak = self.streak_of(&history.scores);
            entries.push(LeaderboardEntry {
                rank: 0,
                employee_id: history.employee_id,
                name: history.name,
                department: history.department,
                latest_score: latest,
                bucket: self.classify_score(latest)?,
                streak,
                points: reputation(latest, streak),
            });
        }
        rank_leaderboard(&mut entries);
        Ok(entries)
    }

    /// Cached bucket distribution over each employee's latest score
    pub async fn distribution(&self, department: Option<&str>) -> Result<BucketDistribution> {
        let key = format!("distribution:{}", department_key(department));

        self.cache
            .get_or_compute(&key, self.config.cache.distribution_ttl(), || async move {
                let histories = self.repository.employee_histories(department, 1).await?;
                let mut buckets = Vec::with_capacity(histories.len());
                for history in &histories {
                    if let Some(latest) = history.latest_score() {
                        buckets.push(self.classify_score(latest)?);
                    }
                }
                Ok(bucket_distribution(
                    department.map(str::to_string),
                    &buckets,
                ))
            })
            .await
    }

    /// Cached page of employees whose latest score is critical
    pub async fn watchlist(
        &self,
        limit: Option<usize>,
        after_id: Option<i64>,
    ) -> Result<Page<WatchlistEntry, i64>> {
        let limit = self.config.pagination.effective_limit(limit);
        let key = format!(
            "watchlist:{}:{}",
            limit,
            after_id.map_or_else(|| "-".to_string(), |id| id.to_string())
        );
        let critical_max = self.config.thresholds().critical_min();

        self.cache
            .get_or_compute(&key, self.config.cache.watchlist_ttl(), || {
                paginate(
                    move |take, after| self.repository.fetch_watchlist(critical_max, take, after),
                    limit,
                    after_id,
                )
            })
            .await
    }

    /// Store a new employee, then evict cached employee pages
    pub async fn add_employee(&self, employee: NewEmployee) -> Result<Employee> {
        let created = self.repository.insert_employee(&employee).await?;
        info!("Created employee {} ({})", created.id, created.name);

        let evicted = self.cache.invalidate_all(&EMPLOYEE_KEY_PATTERNS).await;
        debug!("Evicted {} cached employee pages after insert", evicted);

        Ok(created)
    }

    /// Validate and store a check-in, then evict affected aggregates
    pub async fn record_check_in(&self, check_in: NewCheckIn) -> Result<(CheckIn, Bucket)> {
        let score = Score::new(check_in.score)?;
        if !self.repository.employee_exists(check_in.employee_id).await? {
            return Err(WellbeingError::EmployeeNotFound(check_in.employee_id));
        }
        let bucket = classify_score(score, self.config.thresholds());

        let stored = self.repository.insert_check_in(&check_in).await?;
        info!(
            "Recorded check-in {} for employee {} ({})",
            stored.id, stored.employee_id, bucket
        );

        let evicted = self.cache.invalidate_all(&AGGREGATE_KEY_PATTERNS).await;
        debug!("Evicted {} cached aggregates after check-in", evicted);

        Ok((stored, bucket))
    }
}

fn department_key(department: Option<&str>) -> String {
    let filter = EmployeeListFilter {
        department: department.map(str::to_string),
        ..Default::default()
    };
    // Reuse the escaping of the list filter key: "d=<escaped>|..."
    filter
        .cache_key()
        .split('|')
        .next()
        .unwrap_or("d=-")
        .to_string()
}

/// Sort by points, then streak, then employee id, and assign competition
/// ranks: entries with equal points and streak share a rank.
pub fn rank_leaderboard(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| b.streak.cmp(&a.streak))
            .then_with(|| a.employee_id.cmp(&b.employee_id))
    });

    let mut previous: Option<(i64, u32)> = None;
    let mut rank = 0u32;
    for (position, entry) in entries.iter_mut().enumerate() {
        let key = (entry.points, entry.streak);
        if previous != Some(key) {
            rank = position as u32 + 1;
            previous = Some(key);
        }
        entry.rank = rank;
    }
}

/// Count buckets and express each as a percentage rounded to two decimals
pub fn bucket_distribution(department: Option<String>, buckets: &[Bucket]) -> BucketDistribution {
    let total = buckets.len() as u64;
    let shares = Bucket::ALL
        .iter()
        .map(|&bucket| {
            let count = buckets.iter().filter(|&&b| b == bucket).count() as u64;
            let percentage = if total == 0 {
                0.0
            } else {
                (count as f64 * 10_000.0 / total as f64).round() / 100.0
            };
            BucketShare {
                bucket,
                count,
                percentage,
            }
        })
        .collect();

    BucketDistribution {
        department,
        total,
        buckets: shares,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, points: i64, streak: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            rank: 0,
            employee_id: id,
            name: format!("e{id}"),
            department: None,
            latest_score: 0.5,
            bucket: Bucket::Positive,
            streak,
            points,
        }
    }

    #[test]
    fn test_rank_leaderboard_ties() {
        let mut entries = vec![
            entry(4, 500, 0),
            entry(2, 5000, 5),
            entry(3, 5000, 5),
            entry(1, 3000, 3),
            entry(5, 5000, 4),
        ];
        rank_leaderboard(&mut entries);

        let order: Vec<(i64, u32)> = entries.iter().map(|e| (e.employee_id, e.rank)).collect();
        assert_eq!(order, vec![(2, 1), (3, 1), (5, 3), (1, 4), (4, 5)]);
    }

    #[test]
    fn test_bucket_distribution_percentages() {
        let buckets = [
            Bucket::Positive,
            Bucket::Positive,
            Bucket::Critical,
        ];
        let dist = bucket_distribution(Some("eng".into()), &buckets);
        assert_eq!(dist.total, 3);
        let positive = &dist.buckets[0];
        assert_eq!(positive.bucket, Bucket::Positive);
        assert_eq!(positive.count, 2);
        assert_eq!(positive.percentage, 66.67);
        let critical = dist.buckets.iter().find(|b| b.bucket == Bucket::Critical).unwrap();
        assert_eq!(critical.percentage, 33.33);
    }

    #[test]
    fn test_bucket_distribution_empty() {
        let dist = bucket_distribution(None, &[]);
        assert_eq!(dist.total, 0);
        assert!(dist.buckets.iter().all(|b| b.count == 0 && b.percentage == 0.0));
        assert_eq!(dist.buckets.len(), 4);
    }

    #[test]
    fn test_department_key() {
        assert_eq!(department_key(None), "d=-");
        assert_eq!(department_key(Some("ops*")), "d=ops%2A");
    }
}
