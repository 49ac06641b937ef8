use serde::{Deserialize, Serialize};

/// In-memory table of entities, the backing store for [`crate::executor::TableQuery`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table<T> {
    pub name: String,
    pub rows: Vec<T>,
}

impl<T> Table<T> {
    #[must_use]
    pub const fn new(name: String) -> Self {
        Self { name, rows: Vec::new() }
    }

    #[must_use]
    pub const fn with_rows(name: String, rows: Vec<T>) -> Self {
        Self { name, rows }
    }

    pub fn insert(&mut self, row: T) {
        self.rows.push(row);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<T> FromIterator<T> for Table<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::with_rows(String::new(), iter.into_iter().collect())
    }
}
