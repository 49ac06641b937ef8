/// Output collaborators for exports
///
/// - CsvSink: CSV onto any writer
/// - FileSink: CSV file that only appears once the export finished
/// - ConsoleSink: comfy-table rendering for terminals
/// - MemorySink: keeps everything in memory (tests, previews)

use crate::core::{PagerError, Value};
use comfy_table::{Cell, Table as ComfyTable, presets::UTF8_FULL};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub trait TableSink {
    fn write_header(&mut self, columns: &[String]) -> Result<(), PagerError>;

    fn write_row(&mut self, cells: &[Value]) -> Result<(), PagerError>;

    /// Completes the output and returns its name (file path, stream label)
    fn finish(&mut self) -> Result<String, PagerError>;

    /// Discards whatever was written so far, where the sink can
    fn abort(&mut self);
}

/// Encodes one CSV record (RFC 4180), including the trailing CRLF
pub fn csv_record<I, S>(cells: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut line = cells
        .into_iter()
        .map(|cell| escape_csv_field(cell.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    line.push_str("\r\n");
    line
}

fn escape_csv_field(s: &str) -> String {
    if s.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// CSV onto an arbitrary writer. Bytes already handed to the writer cannot be
/// taken back, so `abort` only stops further output.
pub struct CsvSink<W: Write> {
    writer: W,
    name: String,
    aborted: bool,
}

impl<W: Write> CsvSink<W> {
    pub fn new(writer: W, name: impl Into<String>) -> Self {
        Self { writer, name: name.into(), aborted: false }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_record(&mut self, record: &str) -> Result<(), PagerError> {
        if self.aborted {
            return Err(PagerError::ExportAborted(self.name.clone()));
        }
        self.writer.write_all(record.as_bytes())?;
        Ok(())
    }
}

impl<W: Write> TableSink for CsvSink<W> {
    fn write_header(&mut self, columns: &[String]) -> Result<(), PagerError> {
        self.write_record(&csv_record(columns))
    }

    fn write_row(&mut self, cells: &[Value]) -> Result<(), PagerError> {
        self.write_record(&csv_record(cells.iter().map(Value::to_cell)))
    }

    fn finish(&mut self) -> Result<String, PagerError> {
        self.writer.flush()?;
        Ok(self.name.clone())
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}

/// CSV file named `<prefix><timestamp>.csv` inside `dir`
///
/// Rows go to a temporary file in the same directory, which is renamed into
/// place on `finish` and deleted on `abort`, so a failed export leaves no file.
pub struct FileSink {
    dir: PathBuf,
    prefix: String,
    temp: Option<BufWriter<NamedTempFile>>,
}

impl FileSink {
    pub fn new(dir: impl AsRef<Path>, prefix: &str) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            prefix: prefix.to_string(),
            temp: None,
        }
    }

    fn writer(&mut self) -> Result<&mut BufWriter<NamedTempFile>, PagerError> {
        if self.temp.is_none() {
            std::fs::create_dir_all(&self.dir)?;
            let file = tempfile::Builder::new()
                .prefix(".pagerust-")
                .suffix(".csv.part")
                .tempfile_in(&self.dir)?;
            self.temp = Some(BufWriter::new(file));
        }
        self.temp
            .as_mut()
            .ok_or_else(|| PagerError::ExportAborted("temporary file unavailable".to_string()))
    }

    fn target_path(&self) -> PathBuf {
        let stamp = chrono::Local::now().format("%Y%m%d%H%M%S%3f");
        self.dir.join(format!("{}{stamp}.csv", self.prefix))
    }
}

impl TableSink for FileSink {
    fn write_header(&mut self, columns: &[String]) -> Result<(), PagerError> {
        let record = csv_record(columns);
        self.writer()?.write_all(record.as_bytes())?;
        Ok(())
    }

    fn write_row(&mut self, cells: &[Value]) -> Result<(), PagerError> {
        let record = csv_record(cells.iter().map(Value::to_cell));
        self.writer()?.write_all(record.as_bytes())?;
        Ok(())
    }

    fn finish(&mut self) -> Result<String, PagerError> {
        // An export with no header still produces an (empty) file
        self.writer()?;
        let target = self.target_path();
        let temp = self
            .temp
            .take()
            .ok_or_else(|| PagerError::ExportAborted("temporary file unavailable".to_string()))?;
        let file = temp.into_inner().map_err(|e| PagerError::Io(e.into_error()))?;
        file.persist(&target).map_err(|e| PagerError::Io(e.error))?;
        Ok(target.display().to_string())
    }

    fn abort(&mut self) {
        // Dropping the NamedTempFile removes it
        self.temp = None;
    }
}

/// Renders the export as a comfy-table and writes it on `finish`
pub struct ConsoleSink<W: Write> {
    out: W,
    table: ComfyTable,
    rows: usize,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        let mut table = ComfyTable::new();
        table.load_preset(UTF8_FULL);
        Self { out, table, rows: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TableSink for ConsoleSink<W> {
    fn write_header(&mut self, columns: &[String]) -> Result<(), PagerError> {
        self.table.set_header(columns.iter().map(Cell::new));
        Ok(())
    }

    fn write_row(&mut self, cells: &[Value]) -> Result<(), PagerError> {
        self.table.add_row(cells.iter().map(|c| Cell::new(c.to_cell())));
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<String, PagerError> {
        writeln!(self.out, "{}", self.table)?;
        writeln!(self.out, "({} rows)", self.rows)?;
        self.out.flush()?;
        Ok("console".to_string())
    }

    fn abort(&mut self) {
        self.table = ComfyTable::new();
        self.rows = 0;
    }
}

/// Keeps header and rows in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub finished: bool,
    pub aborted: bool,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TableSink for MemorySink {
    fn write_header(&mut self, columns: &[String]) -> Result<(), PagerError> {
        self.header = columns.to_vec();
        Ok(())
    }

    fn write_row(&mut self, cells: &[Value]) -> Result<(), PagerError> {
        self.rows.push(cells.to_vec());
        Ok(())
    }

    fn finish(&mut self) -> Result<String, PagerError> {
        self.finished = true;
        Ok("memory".to_string())
    }

    fn abort(&mut self) {
        self.header.clear();
        self.rows.clear();
        self.aborted = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_csv_record_quoting() {
        assert_eq!(csv_record(["a", "b"]), "a,b\r\n");
        assert_eq!(csv_record(["x,y", "say \"hi\"", "line\nbreak"]), "\"x,y\",\"say \"\"hi\"\"\",\"line\nbreak\"\r\n");
        assert_eq!(csv_record(Vec::<String>::new()), "\r\n");
    }

    #[test]
    fn test_csv_sink_writes_nulls_as_empty() {
        let mut sink = CsvSink::new(Vec::new(), "buffer");
        sink.write_header(&["id".to_string(), "note".to_string()]).unwrap();
        sink.write_row(&[Value::Integer(1), Value::Null]).unwrap();
        assert_eq!(sink.finish().unwrap(), "buffer");
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text, "id,note\r\n1,\r\n");
    }

    #[test]
    fn test_csv_sink_rejects_rows_after_abort() {
        let mut sink = CsvSink::new(Vec::new(), "buffer");
        sink.abort();
        assert!(matches!(
            sink.write_row(&[Value::Integer(1)]),
            Err(PagerError::ExportAborted(_))
        ));
    }

    #[test]
    fn test_file_sink_persists_on_finish() {
        let dir = TempDir::new().unwrap();
        let mut sink = FileSink::new(dir.path(), "test_");
        sink.write_header(&["id".to_string()]).unwrap();
        sink.write_row(&[Value::Integer(7)]).unwrap();
        let path = sink.finish().unwrap();

        let name = Path::new(&path).file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("test_"));
        assert!(name.ends_with(".csv"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "id\r\n7\r\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_file_sink_abort_leaves_nothing() {
        let dir = TempDir::new().unwrap();
        let mut sink = FileSink::new(dir.path(), "test_");
        sink.write_header(&["id".to_string()]).unwrap();
        sink.write_row(&[Value::Integer(1)]).unwrap();
        sink.abort();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_console_sink_renders_table() {
        let mut sink = ConsoleSink::new(Vec::new());
        sink.write_header(&["id".to_string(), "name".to_string()]).unwrap();
        sink.write_row(&[Value::Integer(1), Value::from("Alice")]).unwrap();
        sink.finish().unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert!(text.contains("Alice"));
        assert!(text.contains("(1 rows)"));
    }
}
