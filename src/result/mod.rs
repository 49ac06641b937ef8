/// Handler reply shapes and the adapters that rewrite them into pages
///
/// - reply: closed set of shapes a marked handler can return
/// - adapter: recognize/extract/replace strategies, tried in priority order

pub mod reply;
pub mod adapter;

pub use reply::{DataHolder, Envelope, Field, Keyed, Reply, DATA_KEY};
pub use adapter::{AdapterSet, EnvelopeAdapter, KeyedAdapter, ResultAdapter, RowsAdapter};
