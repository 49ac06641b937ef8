// Module declarations
pub mod error;
pub mod value;
pub mod page;
pub mod table;

// Re-exports for convenience
pub use error::PagerError;
pub use value::Value;
pub use page::{PageBody, PageRequest, PagingIntent, PagingMode};
pub use table::Table;
