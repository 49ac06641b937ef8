use crate::core::{PageBody, Value};
use serde::Serialize;
use std::collections::BTreeMap;

/// Reserved key a keyed reply keeps its collection under
pub const DATA_KEY: &str = "data";

/// A slot inside a container reply
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Field<T> {
    Rows(Vec<T>),
    Page(PageBody<T>),
    Value(Value),
    Empty,
}

impl<T> Field<T> {
    #[must_use]
    pub const fn is_rows(&self) -> bool {
        matches!(self, Self::Rows(_))
    }

    #[must_use]
    pub const fn as_page(&self) -> Option<&PageBody<T>> {
        match self {
            Self::Page(page) => Some(page),
            _ => None,
        }
    }

    /// Moves the rows out, leaving the slot empty
    pub fn take_rows(&mut self) -> Option<Vec<T>> {
        match std::mem::replace(self, Self::Empty) {
            Self::Rows(rows) => Some(rows),
            other => {
                *self = other;
                None
            }
        }
    }
}

/// Anything that exposes a gettable/settable `data` member
pub trait DataHolder<T> {
    fn data(&self) -> Option<&Field<T>>;
    fn data_mut(&mut self) -> Option<&mut Field<T>>;
}

/// String-keyed reply, e.g. `{"data": [...], "filters": ...}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Keyed<T> {
    entries: BTreeMap<String, Field<T>>,
}

impl<T> Keyed<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: BTreeMap::new() }
    }

    #[must_use]
    pub fn with(mut self, key: &str, field: Field<T>) -> Self {
        self.insert(key, field);
        self
    }

    pub fn insert(&mut self, key: &str, field: Field<T>) -> Option<Field<T>> {
        self.entries.insert(key.to_string(), field)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Field<T>> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Field<T>> {
        self.entries.get_mut(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for Keyed<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DataHolder<T> for Keyed<T> {
    fn data(&self) -> Option<&Field<T>> {
        self.get(DATA_KEY)
    }

    fn data_mut(&mut self) -> Option<&mut Field<T>> {
        self.get_mut(DATA_KEY)
    }
}

/// Result envelope handlers commonly return to web callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub code: i32,
    pub message: String,
    pub data: Field<T>,
}

impl<T> Envelope<T> {
    #[must_use]
    pub fn ok(data: Field<T>) -> Self {
        Self { code: 0, message: "ok".to_string(), data }
    }
}

impl<T> DataHolder<T> for Envelope<T> {
    fn data(&self) -> Option<&Field<T>> {
        Some(&self.data)
    }

    fn data_mut(&mut self) -> Option<&mut Field<T>> {
        Some(&mut self.data)
    }
}

/// Return value of a marked handler
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply<T> {
    /// The collection itself
    Rows(Vec<T>),
    /// A raw collection after pagination replaced it wholesale
    Page(PageBody<T>),
    Keyed(Keyed<T>),
    Envelope(Envelope<T>),
    /// Any other value; never recognized by the built-in adapters
    Other(Value),
}

impl<T> Reply<T> {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Rows(_) => "rows",
            Self::Page(_) => "page",
            Self::Keyed(_) => "keyed",
            Self::Envelope(_) => "envelope",
            Self::Other(_) => "other",
        }
    }

    /// Structural view of replies that expose a `data` member
    #[must_use]
    pub fn as_data_holder(&self) -> Option<&dyn DataHolder<T>> {
        match self {
            Self::Keyed(keyed) => Some(keyed),
            Self::Envelope(envelope) => Some(envelope),
            _ => None,
        }
    }

    pub fn as_data_holder_mut(&mut self) -> Option<&mut dyn DataHolder<T>> {
        match self {
            Self::Keyed(keyed) => Some(keyed),
            Self::Envelope(envelope) => Some(envelope),
            _ => None,
        }
    }

    /// The page body wherever pagination placed it
    #[must_use]
    pub fn page(&self) -> Option<&PageBody<T>> {
        match self {
            Self::Page(page) => Some(page),
            other => other
                .as_data_holder()
                .and_then(|holder| holder.data())
                .and_then(Field::as_page),
        }
    }
}

impl<T> From<Vec<T>> for Reply<T> {
    fn from(rows: Vec<T>) -> Self {
        Self::Rows(rows)
    }
}

impl<T> From<Keyed<T>> for Reply<T> {
    fn from(keyed: Keyed<T>) -> Self {
        Self::Keyed(keyed)
    }
}

impl<T> From<Envelope<T>> for Reply<T> {
    fn from(envelope: Envelope<T>) -> Self {
        Self::Envelope(envelope)
    }
}
