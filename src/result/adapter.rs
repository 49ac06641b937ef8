/// Result adapters - recognize a reply shape, pull its collection out and put
/// a page body back in its place
///
/// Adapters are tried in registration order and the first whose `support`
/// returns true wins. The order is part of the contract: a keyed reply also
/// exposes a `data` member, so putting the wrapper adapter first changes which
/// adapter rewrites it.

use super::reply::{Field, Reply, DATA_KEY};
use crate::core::PageBody;

pub trait ResultAdapter<T>: Send + Sync {
    /// Name used in logs and diagnostics
    fn name(&self) -> &'static str;

    /// Pure predicate, never fails for a non-matching reply
    fn support(&self, reply: &Reply<T>) -> bool;

    /// Moves the collection out of the reply. Only called after `support`.
    fn extract(&self, reply: &mut Reply<T>) -> Option<Vec<T>>;

    /// Writes the page body into the slot the collection came from
    fn replace(&self, reply: &mut Reply<T>, page: PageBody<T>);
}

/// The reply is the collection itself. There is no container to write into,
/// so `replace` substitutes the whole reply with the page body.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowsAdapter;

impl<T> ResultAdapter<T> for RowsAdapter {
    fn name(&self) -> &'static str {
        "rows"
    }

    fn support(&self, reply: &Reply<T>) -> bool {
        matches!(reply, Reply::Rows(_))
    }

    fn extract(&self, reply: &mut Reply<T>) -> Option<Vec<T>> {
        match reply {
            Reply::Rows(rows) => Some(std::mem::take(rows)),
            _ => None,
        }
    }

    fn replace(&self, reply: &mut Reply<T>, page: PageBody<T>) {
        *reply = Reply::Page(page);
    }
}

/// A keyed reply holding a collection under [`DATA_KEY`]
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyedAdapter;

impl<T> ResultAdapter<T> for KeyedAdapter {
    fn name(&self) -> &'static str {
        "keyed"
    }

    fn support(&self, reply: &Reply<T>) -> bool {
        match reply {
            Reply::Keyed(keyed) => keyed.get(DATA_KEY).is_some_and(Field::is_rows),
            _ => false,
        }
    }

    fn extract(&self, reply: &mut Reply<T>) -> Option<Vec<T>> {
        match reply {
            Reply::Keyed(keyed) => keyed.get_mut(DATA_KEY).and_then(Field::take_rows),
            _ => None,
        }
    }

    fn replace(&self, reply: &mut Reply<T>, page: PageBody<T>) {
        if let Reply::Keyed(keyed) = reply {
            keyed.insert(DATA_KEY, Field::Page(page));
        }
    }
}

/// Any reply exposing a `data` member (see [`super::DataHolder`]) that holds a collection
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeAdapter;

impl<T> ResultAdapter<T> for EnvelopeAdapter {
    fn name(&self) -> &'static str {
        "envelope"
    }

    fn support(&self, reply: &Reply<T>) -> bool {
        reply
            .as_data_holder()
            .and_then(|holder| holder.data())
            .is_some_and(Field::is_rows)
    }

    fn extract(&self, reply: &mut Reply<T>) -> Option<Vec<T>> {
        reply
            .as_data_holder_mut()
            .and_then(|holder| holder.data_mut())
            .and_then(Field::take_rows)
    }

    fn replace(&self, reply: &mut Reply<T>, page: PageBody<T>) {
        if let Some(slot) = reply.as_data_holder_mut().and_then(|holder| holder.data_mut()) {
            *slot = Field::Page(page);
        }
    }
}

/// Ordered adapter list
pub struct AdapterSet<T> {
    adapters: Vec<Box<dyn ResultAdapter<T>>>,
}

impl<T> AdapterSet<T> {
    /// Empty set, nothing is recognized
    #[must_use]
    pub fn empty() -> Self {
        Self { adapters: Vec::new() }
    }

    /// Appends an adapter at the lowest priority
    #[must_use]
    pub fn with(mut self, adapter: impl ResultAdapter<T> + 'static) -> Self {
        self.adapters.push(Box::new(adapter));
        self
    }

    /// First adapter that supports `reply`
    #[must_use]
    pub fn select(&self, reply: &Reply<T>) -> Option<&dyn ResultAdapter<T>> {
        self.adapters
            .iter()
            .map(AsRef::as_ref)
            .find(|adapter| adapter.support(reply))
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl<T> Default for AdapterSet<T> {
    /// rows, keyed, envelope
    fn default() -> Self {
        Self::empty()
            .with(RowsAdapter)
            .with(KeyedAdapter)
            .with(EnvelopeAdapter)
    }
}

impl<T> std::fmt::Debug for AdapterSet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
