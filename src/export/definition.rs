use crate::core::{PagerError, Value};

/// How a handler's items become table rows
pub trait PagerExport<T>: Send + Sync {
    /// Header labels, one per cell of every row
    fn columns(&self) -> Vec<String>;

    /// Cells for the item at position `idx` (0-based) of the full result
    fn row(&self, item: &T, idx: usize) -> Result<Vec<Value>, PagerError>;
}

type RowMapper<T> = Box<dyn Fn(&T, usize) -> Result<Vec<Value>, PagerError> + Send + Sync>;

/// Export definition built from a column list and a closure
pub struct SimpleExport<T> {
    columns: Vec<String>,
    mapper: RowMapper<T>,
}

impl<T> SimpleExport<T> {
    pub fn new<F>(columns: &[&str], mapper: F) -> Self
    where
        F: Fn(&T, usize) -> Vec<Value> + Send + Sync + 'static,
    {
        Self::fallible(columns, move |item, idx| Ok(mapper(item, idx)))
    }

    /// Like [`Self::new`] for mappers that can fail
    pub fn fallible<F>(columns: &[&str], mapper: F) -> Self
    where
        F: Fn(&T, usize) -> Result<Vec<Value>, PagerError> + Send + Sync + 'static,
    {
        Self {
            columns: columns.iter().map(ToString::to_string).collect(),
            mapper: Box::new(mapper),
        }
    }
}

impl<T> PagerExport<T> for SimpleExport<T> {
    fn columns(&self) -> Vec<String> {
        self.columns.clone()
    }

    fn row(&self, item: &T, idx: usize) -> Result<Vec<Value>, PagerError> {
        (self.mapper)(item, idx)
    }
}
