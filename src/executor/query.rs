/// Query execution - the bridge between paging intent and the data store
///
/// Stores implement [`QueryExecutor`]; handlers call [`query`] (or
/// [`query_async`]) instead of executing directly so the current intent is
/// applied and the total count reaches the interceptor.

use crate::context::PagingContext;
use crate::core::{PagerError, PagingIntent, Table};
use std::future::Future;

/// Rows returned by one execution
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRows<T> {
    pub rows: Vec<T>,
    /// Matching rows before LIMIT/OFFSET. Always `None` for unpaged runs.
    pub total_count: Option<i64>,
}

impl<T> QueryRows<T> {
    #[must_use]
    pub const fn full(rows: Vec<T>) -> Self {
        Self { rows, total_count: None }
    }

    #[must_use]
    pub const fn paged(rows: Vec<T>, total_count: i64) -> Self {
        Self { rows, total_count: Some(total_count) }
    }
}

pub trait QueryExecutor<T> {
    type Error;

    /// Runs the query under `intent`. A `Skipped` intent must return every row
    /// and no count; a `Paged` one at most `page_size` rows plus the total.
    fn execute(&self, intent: &PagingIntent) -> Result<QueryRows<T>, Self::Error>;
}

/// Executes under the current chain's intent and reports the total count
pub fn query<T, Q>(executor: &Q) -> Result<Vec<T>, Q::Error>
where
    Q: QueryExecutor<T> + ?Sized,
{
    let intent = PagingContext::effective();
    let result = executor.execute(&intent)?;
    Ok(record(intent, result))
}

/// Async form of [`query`]: `execute` receives the intent and resolves to rows
pub async fn query_async<T, E, F, Fut>(execute: F) -> Result<Vec<T>, E>
where
    F: FnOnce(PagingIntent) -> Fut,
    Fut: Future<Output = Result<QueryRows<T>, E>>,
{
    let intent = PagingContext::effective();
    let result = execute(intent).await?;
    Ok(record(intent, result))
}

fn record<T>(intent: PagingIntent, result: QueryRows<T>) -> Vec<T> {
    if intent.is_paged() {
        match result.total_count {
            Some(total) => PagingContext::record_total(total),
            None => tracing::debug!(?intent, "paged query reported no total count"),
        }
    }
    tracing::trace!(?intent, rows = result.rows.len(), "query executed");
    result.rows
}

type RowFilter<'a, T> = Box<dyn Fn(&T) -> bool + 'a>;

/// Query over an in-memory [`Table`] with an optional filter
pub struct TableQuery<'a, T> {
    table: &'a Table<T>,
    filter: Option<RowFilter<'a, T>>,
}

impl<'a, T> TableQuery<'a, T> {
    #[must_use]
    pub const fn new(table: &'a Table<T>) -> Self {
        Self { table, filter: None }
    }

    #[must_use]
    pub fn filter(mut self, predicate: impl Fn(&T) -> bool + 'a) -> Self {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn matches(&self, row: &T) -> bool {
        self.filter.as_ref().is_none_or(|f| f(row))
    }
}

impl<T: Clone> QueryExecutor<T> for TableQuery<'_, T> {
    type Error = PagerError;

    fn execute(&self, intent: &PagingIntent) -> Result<QueryRows<T>, PagerError> {
        let matched = self.table.rows.iter().filter(|row| self.matches(row));

        let Some(limit) = intent.limit() else {
            return Ok(QueryRows::full(matched.cloned().collect()));
        };

        // COUNT(*) then OFFSET + LIMIT
        let matched: Vec<&T> = matched.collect();
        let total = matched.len() as i64;
        let rows = matched
            .into_iter()
            .skip(intent.offset())
            .take(limit)
            .cloned()
            .collect();
        Ok(QueryRows::paged(rows, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(n: i64) -> Table<i64> {
        Table::with_rows("numbers".to_string(), (1..=n).collect())
    }

    #[test]
    fn test_table_query_paged() {
        let table = numbers(1000);
        let result = TableQuery::new(&table).execute(&PagingIntent::paged(2, 200)).unwrap();
        assert_eq!(result.total_count, Some(1000));
        assert_eq!(result.rows.len(), 200);
        assert_eq!(result.rows[0], 201);
    }

    #[test]
    fn test_table_query_skipped_returns_everything() {
        let table = numbers(30);
        let result = TableQuery::new(&table)
            .filter(|n| *n > 15)
            .execute(&PagingIntent::skipped())
            .unwrap();
        assert_eq!(result.total_count, None);
        assert_eq!(result.rows.len(), 15);
    }

    #[test]
    fn test_table_query_page_past_end() {
        let table = numbers(10);
        let result = TableQuery::new(&table).execute(&PagingIntent::paged(5, 4)).unwrap();
        assert_eq!(result.total_count, Some(10));
        assert!(result.rows.is_empty());
    }

    #[test]
    fn test_query_without_context_is_unpaged() {
        let table = numbers(50);
        let rows = query(&TableQuery::new(&table)).unwrap();
        assert_eq!(rows.len(), 50);
    }

    #[test]
    fn test_query_records_total_on_paged_frame() {
        let table = numbers(95);
        let guard = PagingContext::push(PagingIntent::paged(1, 10));
        let rows = query(&TableQuery::new(&table)).unwrap();
        assert_eq!(rows.len(), 10);
        assert_eq!(guard.close().unwrap().total_count, Some(95));
    }

    #[test]
    fn test_skipped_query_inside_paged_frame_records_nothing() {
        let table = numbers(95);
        let guard = PagingContext::push(PagingIntent::paged(1, 10));
        let rows = PagingContext::with_skip(|| query(&TableQuery::new(&table))).unwrap();
        assert_eq!(rows.len(), 95);
        assert_eq!(guard.close().unwrap().total_count, None);
    }

    #[tokio::test]
    async fn test_query_async_uses_current_intent() {
        let table = numbers(40);
        let rows = PagingContext::scope(async {
            let guard = PagingContext::push(PagingIntent::paged(2, 15));
            let rows = query_async(|intent| {
                let result = TableQuery::new(&table).execute(&intent);
                async move { result }
            })
            .await
            .unwrap();
            assert_eq!(guard.close().unwrap().total_count, Some(40));
            rows
        })
        .await;
        assert_eq!(rows, (16..=30).collect::<Vec<_>>());
    }
}
