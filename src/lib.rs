// Pagerust - transparent pagination and export for query-returning handlers
// A handler opts in by running through an Interceptor; it never sees LIMIT/OFFSET itself

// Clippy configuration - allow non-critical warnings
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::multiple_crate_versions)]

// Shared types (values, page bodies, errors)
pub mod core;

// Per-call-chain paging intent stack
pub mod context;

// Reply shapes and result adapters
pub mod result;

// Interceptor, query execution, request parameters
pub mod executor;

// Tabular export and output sinks
pub mod export;

// Configuration loading
pub mod settings;

// Re-export commonly used types for convenience
pub use core::{PageBody, PageRequest, PagerError, PagingIntent, PagingMode, Table, Value};
pub use context::{IntentGuard, PagingContext};
pub use result::{AdapterSet, DataHolder, Envelope, Field, Keyed, Reply, ResultAdapter, DATA_KEY};
pub use executor::{
    query, query_async, Interceptor, PageParams, PagerOptions, QueryExecutor, QueryParams, QueryRows, TableQuery,
    UnsupportedShape,
};
pub use export::{Exporter, ExportSummary, PagerExport, SimpleExport, TableSink};
pub use settings::PagerConfig;
