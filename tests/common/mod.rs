//! Shared fixtures for integration tests: an in-memory repository that
//! follows the same ordering contracts as the Postgres implementation.

#![allow(dead_code)]

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Duration;
use chrono::TimeZone;
use chrono::Utc;
use wellbeing::cache::CacheAside;
use wellbeing::cache::MemoryCacheStore;
use wellbeing::models::CheckIn;
use wellbeing::models::Employee;
use wellbeing::models::EmployeeHistory;
use wellbeing::models::EmployeeListFilter;
use wellbeing::models::EmployeeStatus;
use wellbeing::models::EmployeeSummary;
use wellbeing::models::HistoryEntry;
use wellbeing::models::NewCheckIn;
use wellbeing::models::NewEmployee;
use wellbeing::models::WatchlistEntry;
use wellbeing::repository::WellbeingRepository;
use wellbeing::service::WellbeingService;
use wellbeing::AppConfig;
use wellbeing::Result;

#[derive(Debug, Clone)]
pub struct FakeEmployee {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub department: Option<String>,
    pub role: Option<String>,
    pub status: EmployeeStatus,
}

#[derive(Default)]
struct State {
    employees: Vec<FakeEmployee>,
    check_ins: Vec<CheckIn>,
}

/// In-memory repository counting how often aggregate queries hit "the database"
#[derive(Default)]
pub struct InMemoryRepository {
    state: Mutex<State>,
    pub employee_queries: AtomicUsize,
    pub history_queries: AtomicUsize,
    pub watchlist_queries: AtomicUsize,
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_employee(&self, name: &str, department: Option<&str>) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id = state.employees.len() as i64 + 1;
        state.employees.push(FakeEmployee {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            department: department.map(str::to_string),
            role: None,
            status: EmployeeStatus::Active,
        });
        id
    }

    pub fn set_status(&self, id: i64, status: EmployeeStatus) {
        let mut state = self.state.lock().unwrap();
        if let Some(e) = state.employees.iter_mut().find(|e| e.id == id) {
            e.status = status;
        }
    }

    /// Add check-ins oldest first, one day apart
    pub fn add_scores(&self, employee_id: i64, scores: &[f64]) {
        let mut state = self.state.lock().unwrap();
        for &score in scores {
            let id = state.check_ins.len() as i64 + 1;
            state.check_ins.push(CheckIn {
                id,
                employee_id,
                content: String::new(),
                score,
                created_at: base_time() + Duration::days(id),
            });
        }
    }

    fn newest_first(state: &State, employee_id: i64) -> Vec<CheckIn> {
        let mut rows: Vec<CheckIn> = state
            .check_ins
            .iter()
            .filter(|c| c.employee_id == employee_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rows
    }

    fn matches(filter: &EmployeeListFilter, e: &FakeEmployee) -> bool {
        filter
            .department
            .as_ref()
            .map_or(true, |d| e.department.as_ref() == Some(d))
            && filter.role.as_ref().map_or(true, |r| e.role.as_ref() == Some(r))
            && filter.status.map_or(true, |s| e.status == s)
            && filter.keyword.as_ref().map_or(true, |k| {
                let k = k.to_lowercase();
                e.name.to_lowercase().contains(&k) || e.email.to_lowercase().contains(&k)
            })
    }
}

#[async_trait]
impl WellbeingRepository for InMemoryRepository {
    async fn fetch_employees(
        &self,
        filter: &EmployeeListFilter,
        take: usize,
        after_id: Option<i64>,
    ) -> Result<Vec<EmployeeSummary>> {
        self.employee_queries.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        let mut employees: Vec<&FakeEmployee> = state
            .employees
            .iter()
            .filter(|e| after_id.map_or(true, |a| e.id > a))
            .filter(|e| Self::matches(filter, e))
            .collect();
        employees.sort_by_key(|e| e.id);
        Ok(employees
            .into_iter()
            .take(take)
            .map(|e| {
                let latest = Self::newest_first(&state, e.id).into_iter().next();
                EmployeeSummary {
                    id: e.id,
                    name: e.name.clone(),
                    email: e.email.clone(),
                    department: e.department.clone(),
                    role: e.role.clone(),
                    status: e.status,
                    latest_score: latest.as_ref().map(|c| c.score),
                    latest_check_in_at: latest.map(|c| c.created_at),
                }
            })
            .collect())
    }

    async fn employee_exists(&self, employee_id: i64) -> Result<bool> {
        let state = self.state.lock().unwrap();
        Ok(state.employees.iter().any(|e| e.id == employee_id))
    }

    async fn recent_history(&self, employee_id: i64, window: usize) -> Result<Vec<HistoryEntry>> {
        let state = self.state.lock().unwrap();
        Ok(Self::newest_first(&state, employee_id)
            .into_iter()
            .take(window)
            .map(|c| HistoryEntry {
                score: c.score,
                created_at: c.created_at,
            })
            .collect())
    }

    async fn employee_histories(
        &self,
        department: Option<&str>,
        window: usize,
    ) -> Result<Vec<EmployeeHistory>> {
        self.history_queries.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        let mut out = Vec::new();
        for e in &state.employees {
            if e.status != EmployeeStatus::Active {
                continue;
            }
            if department.is_some() && e.department.as_deref() != department {
                continue;
            }
            let scores: Vec<f64> = Self::newest_first(&state, e.id)
                .into_iter()
                .take(window)
                .map(|c| c.score)
                .collect();
            if scores.is_empty() {
                continue;
            }
            out.push(EmployeeHistory {
                employee_id: e.id,
                name: e.name.clone(),
                department: e.department.clone(),
                scores,
            });
        }
        Ok(out)
    }

    async fn fetch_watchlist(
        &self,
        critical_max: f64,
        take: usize,
        after_id: Option<i64>,
    ) -> Result<Vec<WatchlistEntry>> {
        self.watchlist_queries.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        let mut rows: Vec<WatchlistEntry> = state
            .employees
            .iter()
            .filter(|e| e.status == EmployeeStatus::Active)
            .filter_map(|e| {
                let latest = Self::newest_first(&state, e.id).into_iter().next()?;
                (latest.score <= critical_max).then(|| WatchlistEntry {
                    employee_id: e.id,
                    name: e.name.clone(),
                    department: e.department.clone(),
                    latest_score: latest.score,
                    latest_check_in_at: latest.created_at,
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            b.latest_check_in_at
                .cmp(&a.latest_check_in_at)
                .then(b.employee_id.cmp(&a.employee_id))
        });
        if let Some(after) = after_id {
            let Some(pos) = rows.iter().position(|r| r.employee_id == after) else {
                return Ok(Vec::new());
            };
            rows.drain(..=pos);
        }
        rows.truncate(take);
        Ok(rows)
    }

    async fn insert_employee(&self, employee: &NewEmployee) -> Result<Employee> {
        let mut state = self.state.lock().unwrap();
        let id = state.employees.len() as i64 + 1;
        state.employees.push(FakeEmployee {
            id,
            name: employee.name.clone(),
            email: employee.email.clone(),
            department: employee.department.clone(),
            role: employee.role.clone(),
            status: EmployeeStatus::Active,
        });
        Ok(Employee {
            id,
            name: employee.name.clone(),
            email: employee.email.clone(),
            department: employee.department.clone(),
            role: employee.role.clone(),
            status: EmployeeStatus::Active,
            created_at: base_time(),
            updated_at: base_time(),
        })
    }

    async fn insert_check_in(&self, check_in: &NewCheckIn) -> Result<CheckIn> {
        let mut state = self.state.lock().unwrap();
        let id = state.check_ins.len() as i64 + 1;
        let stored = CheckIn {
            id,
            employee_id: check_in.employee_id,
            content: check_in.content.clone(),
            score: check_in.score,
            created_at: base_time() + Duration::days(id),
        };
        state.check_ins.push(stored.clone());
        Ok(stored)
    }
}

/// Service over an in-memory repository and cache store
pub fn service_with(
    repository: Arc<InMemoryRepository>,
) -> (WellbeingService<InMemoryRepository>, MemoryCacheStore) {
    let store = MemoryCacheStore::new();
    let cache = CacheAside::new(Arc::new(store.clone()));
    (
        WellbeingService::new(repository, cache, AppConfig::default()),
        store,
    )
}
