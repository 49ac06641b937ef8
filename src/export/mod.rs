/// Export - streams a handler's full (unpaged) result into a table sink
///
/// The interceptor fetches the rows with paging skipped; this module only maps
/// items to cells and drives the sink. Any failure aborts the sink before the
/// error propagates, so sinks with transactional output never expose a
/// partial export.

pub mod definition;
pub mod sink;

pub use definition::{PagerExport, SimpleExport};
pub use sink::{ConsoleSink, CsvSink, FileSink, MemorySink, TableSink, csv_record};

use crate::core::PagerError;

/// What a finished export produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Name the sink reported (file path for [`FileSink`])
    pub output: String,
    pub columns: usize,
    pub rows: usize,
}

pub struct Exporter;

impl Exporter {
    /// Writes a header row followed by one row per item, in order
    pub fn export<T>(
        definition: &dyn PagerExport<T>,
        items: &[T],
        sink: &mut dyn TableSink,
    ) -> Result<ExportSummary, PagerError> {
        let columns = definition.columns();
        let written = Self::write_all(definition, &columns, items, sink)
            .and_then(|rows| sink.finish().map(|output| (output, rows)));

        match written {
            Ok((output, rows)) => {
                tracing::info!(%output, rows, "export finished");
                Ok(ExportSummary { output, columns: columns.len(), rows })
            }
            Err(err) => {
                tracing::warn!(%err, "export aborted");
                sink.abort();
                Err(err)
            }
        }
    }

    fn write_all<T>(
        definition: &dyn PagerExport<T>,
        columns: &[String],
        items: &[T],
        sink: &mut dyn TableSink,
    ) -> Result<usize, PagerError> {
        sink.write_header(columns)?;

        for (idx, item) in items.iter().enumerate() {
            let cells = definition.row(item, idx)?;
            if cells.len() != columns.len() {
                return Err(PagerError::RowWidthMismatch {
                    index: idx,
                    expected: columns.len(),
                    found: cells.len(),
                });
            }
            sink.write_row(&cells)?;
        }

        Ok(items.len())
    }
}
