/// Executor module - runs marked handlers and the queries inside them
///
/// Structure:
/// - query: query-execution collaborator, intent-aware `query()`, in-memory `TableQuery`
/// - params: request-parameter collaborator (`PageParams`, `QueryParams`)
/// - interceptor: marked-call wrapper (paging, export, adapter dispatch)

pub mod query;
pub mod params;
pub mod interceptor;

pub use query::{query, query_async, QueryExecutor, QueryRows, TableQuery};
pub use params::{PageParams, ParamNames, QueryParams};
pub use interceptor::{Interceptor, PagerOptions, UnsupportedShape};
