//! Cursor-based forward pagination
//!
//! Pages are built by over-fetching one row: if the backing query returns
//! more than `limit` rows there is a next page, and the cursor is the id of
//! the last row kept. `fetch_page(take, after_id)` must return rows strictly
//! after `after_id` in a stable total order. Ordering by a non-unique key
//! (e.g. a shared timestamp) needs a unique tiebreaker such as
//! `ORDER BY updated_at, id`, otherwise rows can repeat or vanish across pages.

use std::future::Future;

use serde::Deserialize;
use serde::Serialize;

use crate::Result;
use crate::WellbeingError;

/// Rows that expose a stable identifier usable as a cursor
pub trait Identified {
    type Id: Clone;

    fn id(&self) -> Self::Id;
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T, C> {
    pub items: Vec<T>,
    pub has_next_page: bool,
    pub next_cursor: Option<C>,
}

impl<T: Identified> Page<T, T::Id> {
    /// Build a page from rows fetched with `take = limit + 1`.
    ///
    /// # Errors
    /// `PaginationContractViolation` when `limit` is zero or `rows` holds
    /// more than `limit + 1` elements.
    pub fn from_overfetch(mut rows: Vec<T>, limit: usize) -> Result<Self> {
        if limit == 0 {
            return Err(WellbeingError::PaginationContractViolation(
                "page limit must be at least 1".to_string(),
            ));
        }
        if rows.len() > limit + 1 {
            return Err(WellbeingError::PaginationContractViolation(format!(
                "fetch_page returned {} rows, at most {} were requested",
                rows.len(),
                limit + 1
            )));
        }

        if rows.len() > limit {
            rows.truncate(limit);
            let next_cursor = rows.last().map(Identified::id);
            Ok(Self {
                items: rows,
                has_next_page: true,
                next_cursor,
            })
        } else {
            Ok(Self {
                items: rows,
                has_next_page: false,
                next_cursor: None,
            })
        }
    }
}

impl<T, C> Page<T, C> {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            has_next_page: false,
            next_cursor: None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Convert the items, keeping the cursor
    pub fn map<U, F>(self, f: F) -> Page<U, C>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            has_next_page: self.has_next_page,
            next_cursor: self.next_cursor,
        }
    }
}

/// Fetch one page through `fetch_page`, requesting `limit + 1` rows.
///
/// # Errors
/// Errors from `fetch_page` propagate unchanged; see [`Page::from_overfetch`]
/// for contract violations.
pub async fn paginate<T, F, Fut>(
    fetch_page: F,
    limit: usize,
    after_id: Option<T::Id>,
) -> Result<Page<T, T::Id>>
where
    T: Identified,
    F: FnOnce(usize, Option<T::Id>) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    if limit == 0 {
        return Err(WellbeingError::PaginationContractViolation(
            "page limit must be at least 1".to_string(),
        ));
    }
    let rows = fetch_page(limit + 1, after_id).await?;
    Page::from_overfetch(rows, limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: i64,
    }

    impl Identified for Row {
        type Id = i64;

        fn id(&self) -> i64 {
            self.id
        }
    }

    fn rows(n: i64) -> Vec<Row> {
        (1..=n).map(|id| Row { id }).collect()
    }

    /// Backing store returning rows with id > after, ascending
    fn fetch_from(
        all: &[Row],
    ) -> impl FnOnce(usize, Option<i64>) -> std::future::Ready<Result<Vec<Row>>> + '_ {
        move |take, after| {
            let out = all
                .iter()
                .filter(|r| after.map_or(true, |a| r.id > a))
                .take(take)
                .cloned()
                .collect();
            std::future::ready(Ok(out))
        }
    }

    #[tokio::test]
    async fn test_exactly_limit_plus_one() {
        let all = rows(8);
        let page = paginate(fetch_from(&all), 7, None).await.unwrap();
        assert_eq!(page.len(), 7);
        assert!(page.has_next_page);
        assert_eq!(page.next_cursor, Some(7));
    }

    #[tokio::test]
    async fn test_exactly_limit() {
        let all = rows(7);
        let page = paginate(fetch_from(&all), 7, None).await.unwrap();
        assert_eq!(page.len(), 7);
        assert!(!page.has_next_page);
        assert_eq!(page.next_cursor, None);
    }

    #[tokio::test]
    async fn test_walk_all_pages() {
        let all = rows(20);
        let mut seen = Vec::new();
        let mut cursor = None;
        loop {
            let page = paginate(fetch_from(&all), 6, cursor).await.unwrap();
            seen.extend(page.items.iter().map(|r| r.id));
            if !page.has_next_page {
                break;
            }
            cursor = page.next_cursor;
        }
        assert_eq!(seen, (1..=20).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_zero_limit_rejected() {
        let all = rows(3);
        let err = paginate(fetch_from(&all), 0, None).await.unwrap_err();
        assert!(matches!(err, WellbeingError::PaginationContractViolation(_)));
    }

    #[tokio::test]
    async fn test_overlong_fetch_rejected() {
        let err = paginate(
            |_take, _after| async { Ok(rows(10)) },
            3,
            None::<i64>,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, WellbeingError::PaginationContractViolation(_)));
    }

    #[tokio::test]
    async fn test_fetch_error_propagates() {
        let err = paginate(
            |_take, _after: Option<i64>| async {
                Err::<Vec<Row>, _>(WellbeingError::Custom("db down".into()))
            },
            3,
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, WellbeingError::Custom(_)));
    }

    #[test]
    fn test_map_keeps_cursor() {
        let page = Page::from_overfetch(rows(4), 3).unwrap();
        let mapped = page.map(|r| r.id * 10);
        assert_eq!(mapped.items, vec![10, 20, 30]);
        assert_eq!(mapped.next_cursor, Some(3));
    }

    #[test]
    fn test_serialized_field_names() {
        let page: Page<i64, i64> = Page {
            items: vec![1],
            has_next_page: false,
            next_cursor: None,
        };
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"items": [1], "hasNextPage": false, "nextCursor": null})
        );
    }
}
