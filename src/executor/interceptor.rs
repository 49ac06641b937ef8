/// Interceptor - applies paging (or export) around a marked handler
///
/// Flow for one call:
/// 1. resolve page params (request values, else configured defaults)
/// 2. push a `Paged` intent for the duration of the handler body
/// 3. pop it on every exit path, then propagate a handler error unchanged
/// 4. pick the first adapter that recognizes the reply and swap its
///    collection for a `PageBody`

use super::params::PageParams;
use crate::context::PagingContext;
use crate::core::{PageBody, PageRequest, PagerError, Value};
use crate::export::{ExportSummary, Exporter, FileSink, PagerExport, TableSink};
use crate::result::{AdapterSet, Reply};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

/// What to do when no adapter recognizes a paged handler's reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnsupportedShape {
    /// Return the reply untouched
    Passthrough,
    /// Return the reply untouched and log a warning
    #[default]
    Warn,
    /// Fail with [`PagerError::UnsupportedResultShape`]
    Reject,
}

/// Per-handler marker configuration
pub struct PagerOptions<T> {
    pub default_page_size: usize,
    /// Upper bound for requested page sizes, 0 for none
    pub max_page_size: usize,
    /// Naming hint for export output
    pub filename_prefix: String,
    pub export_dir: PathBuf,
    pub export: Option<Arc<dyn PagerExport<T>>>,
    pub unsupported: UnsupportedShape,
}

impl<T> Default for PagerOptions<T> {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 1000,
            filename_prefix: String::new(),
            export_dir: PathBuf::from("."),
            export: None,
            unsupported: UnsupportedShape::default(),
        }
    }
}

impl<T> PagerOptions<T> {
    #[must_use]
    pub fn with_export(mut self, export: impl PagerExport<T> + 'static) -> Self {
        self.export = Some(Arc::new(export));
        self
    }

    #[must_use]
    pub fn with_filename_prefix(mut self, prefix: &str) -> Self {
        self.filename_prefix = prefix.to_string();
        self
    }

    #[must_use]
    pub const fn with_default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = size;
        self
    }

    #[must_use]
    pub const fn with_unsupported(mut self, policy: UnsupportedShape) -> Self {
        self.unsupported = policy;
        self
    }
}

pub struct Interceptor<T> {
    options: PagerOptions<T>,
    adapters: AdapterSet<T>,
}

impl<T> Interceptor<T> {
    #[must_use]
    pub fn new(options: PagerOptions<T>) -> Self {
        Self { options, adapters: AdapterSet::default() }
    }

    /// Replaces the adapter set (and with it the priority order)
    #[must_use]
    pub fn with_adapters(mut self, adapters: AdapterSet<T>) -> Self {
        self.adapters = adapters;
        self
    }

    #[must_use]
    pub const fn options(&self) -> &PagerOptions<T> {
        &self.options
    }

    #[must_use]
    pub const fn adapters(&self) -> &AdapterSet<T> {
        &self.adapters
    }

    /// Effective page for a request
    #[must_use]
    pub fn page_request(&self, params: &dyn PageParams) -> PageRequest {
        params
            .resolve_page_params()
            .unwrap_or(PageRequest::new(1, self.options.default_page_size))
            .normalize(self.options.default_page_size, self.options.max_page_size)
    }

    /// Runs a synchronous handler as a marked call
    ///
    /// When the request asks for an export and an export definition is
    /// configured, the handler runs unpaged, its rows are written to a
    /// [`FileSink`] and the reply becomes the output file name.
    pub fn call<E, F>(&self, params: &dyn PageParams, body: F) -> Result<Reply<T>, E>
    where
        F: FnOnce() -> Result<Reply<T>, E>,
        E: From<PagerError>,
    {
        if let Some(definition) = self.export_definition(params) {
            let mut sink = self.file_sink();
            let outcome = PagingContext::with_skip(body);
            let summary = self.export_outcome(definition.as_ref(), &mut sink, outcome)?;
            return Ok(Reply::Other(Value::Text(summary.output)));
        }

        let request = self.page_request(params);
        let guard = PagingContext::push(request.into());
        let outcome = body();
        let frame = guard.close();

        let mut reply = outcome?;
        let frame = frame?;
        self.apply(&mut reply, request, frame.total_count)?;
        Ok(reply)
    }

    /// Async form of [`Self::call`]. The handler future runs in its own
    /// task-local paging scope unless one is already active.
    pub fn call_async<'a, E, Fut>(
        &'a self,
        params: &dyn PageParams,
        body: Fut,
    ) -> impl Future<Output = Result<Reply<T>, E>> + use<'a, T, E, Fut>
    where
        Fut: Future<Output = Result<Reply<T>, E>> + 'a,
        E: From<PagerError> + 'a,
    {
        let definition = self.export_definition(params);
        let request = self.page_request(params);
        PagingContext::scope(self.run_async(definition, request, body))
    }

    async fn run_async<E, Fut>(
        &self,
        definition: Option<Arc<dyn PagerExport<T>>>,
        request: PageRequest,
        body: Fut,
    ) -> Result<Reply<T>, E>
    where
        Fut: Future<Output = Result<Reply<T>, E>>,
        E: From<PagerError>,
    {
        if let Some(definition) = definition {
            let mut sink = self.file_sink();
            let outcome = PagingContext::with_skip_async(body).await;
            let summary = self.export_outcome(definition.as_ref(), &mut sink, outcome)?;
            return Ok(Reply::Other(Value::Text(summary.output)));
        }

        let guard = PagingContext::push(request.into());
        let outcome = body.await;
        let frame = guard.close();

        let mut reply = outcome?;
        let frame = frame?;
        self.apply(&mut reply, request, frame.total_count)?;
        Ok(reply)
    }

    /// Runs the handler unpaged and exports its full result into `sink`
    pub fn call_export<E, F>(&self, sink: &mut dyn TableSink, body: F) -> Result<ExportSummary, E>
    where
        F: FnOnce() -> Result<Reply<T>, E>,
        E: From<PagerError>,
    {
        let definition = self
            .options
            .export
            .clone()
            .ok_or_else(|| PagerError::ExportAborted("handler has no export definition".to_string()))?;
        let outcome = PagingContext::with_skip(body);
        self.export_outcome(definition.as_ref(), sink, outcome)
    }

    /// Decorator form: the returned closure runs `handler` through [`Self::call`]
    pub fn wrap<E, F>(self, handler: F) -> impl Fn(&dyn PageParams) -> Result<Reply<T>, E>
    where
        F: Fn() -> Result<Reply<T>, E>,
        E: From<PagerError>,
    {
        move |params: &dyn PageParams| self.call(params, &handler)
    }

    /// Rewrites `reply` in place with a page body
    ///
    /// Without a reported total the handler produced its rows itself, so they
    /// are treated as the full result and the requested page is sliced out.
    fn apply(&self, reply: &mut Reply<T>, request: PageRequest, total_count: Option<i64>) -> Result<(), PagerError> {
        let Some(adapter) = self.adapters.select(reply) else {
            return self.unsupported(reply);
        };
        let Some(rows) = adapter.extract(reply) else {
            return self.unsupported(reply);
        };

        let (total, rows) = match total_count {
            Some(total) => (total, rows),
            None => {
                let total = rows.len() as i64;
                let offset = request.page_index.saturating_sub(1).saturating_mul(request.page_size);
                (total, rows.into_iter().skip(offset).take(request.page_size).collect())
            }
        };

        let page = PageBody::new(request.page_index, request.page_size, total, rows);
        tracing::debug!(
            adapter = adapter.name(),
            page = page.page_index,
            size = page.page_size,
            total = page.total_count,
            "reply paged"
        );
        adapter.replace(reply, page);
        Ok(())
    }

    fn unsupported(&self, reply: &Reply<T>) -> Result<(), PagerError> {
        match self.options.unsupported {
            UnsupportedShape::Passthrough => Ok(()),
            UnsupportedShape::Warn => {
                tracing::warn!(shape = reply.kind(), "no result adapter matched, reply left unpaged");
                Ok(())
            }
            UnsupportedShape::Reject => Err(PagerError::UnsupportedResultShape(reply.kind().to_string())),
        }
    }

    fn export_definition(&self, params: &dyn PageParams) -> Option<Arc<dyn PagerExport<T>>> {
        if !params.export_requested() {
            return None;
        }
        if self.options.export.is_none() {
            tracing::warn!("export requested but handler has no export definition, paging instead");
        }
        self.options.export.clone()
    }

    fn file_sink(&self) -> FileSink {
        FileSink::new(&self.options.export_dir, &self.options.filename_prefix)
    }

    /// Handler errors propagate before the sink sees anything
    fn export_outcome<E>(
        &self,
        definition: &dyn PagerExport<T>,
        sink: &mut dyn TableSink,
        outcome: Result<Reply<T>, E>,
    ) -> Result<ExportSummary, E>
    where
        E: From<PagerError>,
    {
        let mut reply = outcome?;
        let rows = self
            .adapters
            .select(&reply)
            .and_then(|adapter| adapter.extract(&mut reply))
            .ok_or_else(|| PagerError::UnsupportedResultShape(reply.kind().to_string()))?;
        Ok(Exporter::export(definition, &rows, sink)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PagingIntent, PagingMode, Table};
    use crate::executor::{query, TableQuery};
    use crate::export::{MemorySink, SimpleExport};
    use crate::result::{Envelope, EnvelopeAdapter, Field, Keyed, KeyedAdapter, DATA_KEY};

    fn numbers(n: i64) -> Table<i64> {
        Table::with_rows("numbers".to_string(), (1..=n).collect())
    }

    fn interceptor() -> Interceptor<i64> {
        Interceptor::new(PagerOptions::default())
    }

    #[test]
    fn test_raw_rows_become_page() {
        let table = numbers(1000);
        let reply = interceptor()
            .call::<PagerError, _>(&PageRequest::new(1, 200), || {
                Ok(Reply::Rows(query(&TableQuery::new(&table))?))
            })
            .unwrap();

        let page = reply.page().unwrap();
        assert_eq!(page.page_index, 1);
        assert_eq!(page.page_size, 200);
        assert_eq!(page.total_count, 1000);
        assert_eq!(page.total_pages, 5);
        assert_eq!(page.rows.len(), 200);
        assert_eq!(PagingContext::depth(), 0);
    }

    #[test]
    fn test_body_sees_paged_intent() {
        let seen = std::cell::Cell::new(None);
        let _ = interceptor().call::<PagerError, _>(&PageRequest::new(3, 7), || {
            seen.set(PagingContext::current());
            Ok(Reply::Rows(Vec::new()))
        });
        assert_eq!(seen.get(), Some(PagingIntent::paged(3, 7)));
    }

    #[test]
    fn test_defaults_when_request_has_no_params() {
        let options = PagerOptions::default().with_default_page_size(15);
        let seen = std::cell::Cell::new(None);
        let _ = Interceptor::<i64>::new(options).call::<PagerError, _>(&(), || {
            seen.set(PagingContext::current());
            Ok(Reply::Rows(Vec::new()))
        });
        assert_eq!(seen.get(), Some(PagingIntent::paged(1, 15)));
    }

    #[test]
    fn test_handler_error_propagates_and_pops() {
        let err = interceptor()
            .call(&PageRequest::new(1, 10), || Err(PagerError::Query("connection lost".to_string())))
            .unwrap_err();
        assert!(matches!(err, PagerError::Query(msg) if msg == "connection lost"));
        assert_eq!(PagingContext::current(), None);
    }

    #[test]
    fn test_handler_panic_still_pops() {
        let outcome = std::panic::catch_unwind(|| {
            let _ = interceptor().call::<PagerError, _>(&PageRequest::new(1, 10), || panic!("handler bug"));
        });
        assert!(outcome.is_err());
        assert_eq!(PagingContext::depth(), 0);
    }

    #[test]
    fn test_in_memory_rows_are_sliced() {
        let reply = interceptor()
            .call::<PagerError, _>(&PageRequest::new(2, 3), || Ok(Reply::Rows((1..=10).collect())))
            .unwrap();
        let page = reply.page().unwrap();
        assert_eq!(page.rows, vec![4, 5, 6]);
        assert_eq!(page.total_count, 10);
        assert_eq!(page.total_pages, 4);
    }

    #[test]
    fn test_keyed_reply_rewritten_in_place() {
        let table = numbers(50);
        let reply = interceptor()
            .call::<PagerError, _>(&PageRequest::new(1, 20), || {
                let rows = query(&TableQuery::new(&table))?;
                Ok(Keyed::new()
                    .with(DATA_KEY, Field::Rows(rows))
                    .with("title", Field::Value(Value::from("numbers")))
                    .into())
            })
            .unwrap();

        let Reply::Keyed(keyed) = &reply else { panic!("expected keyed reply") };
        assert_eq!(keyed.get("title"), Some(&Field::Value(Value::from("numbers"))));
        assert_eq!(reply.page().unwrap().total_pages, 3);
    }

    #[test]
    fn test_adapter_priority_is_configurable() {
        let build = || -> Result<Reply<i64>, PagerError> {
            Ok(Keyed::new().with(DATA_KEY, Field::Rows(vec![1, 2])).into())
        };
        let standard = interceptor();
        assert_eq!(standard.adapters().select(&build().unwrap()).unwrap().name(), "keyed");

        let reversed = interceptor().with_adapters(AdapterSet::empty().with(EnvelopeAdapter).with(KeyedAdapter));
        assert_eq!(reversed.adapters().select(&build().unwrap()).unwrap().name(), "envelope");
        let reply = reversed.call(&PageRequest::new(1, 10), build).unwrap();
        assert_eq!(reply.page().unwrap().rows, vec![1, 2]);
    }

    #[test]
    fn test_envelope_reply() {
        let reply = interceptor()
            .call::<PagerError, _>(&PageRequest::new(1, 2), || Ok(Envelope::ok(Field::Rows(vec![9, 8, 7])).into()))
            .unwrap();
        let Reply::Envelope(envelope) = reply else { panic!("expected envelope") };
        assert_eq!(envelope.data.as_page().unwrap().rows, vec![9, 8]);
    }

    #[test]
    fn test_unsupported_shape_policies() {
        let scalar = || -> Result<Reply<i64>, PagerError> { Ok(Reply::Other(Value::Integer(3))) };

        let warn = interceptor().call(&PageRequest::new(1, 10), scalar).unwrap();
        assert_eq!(warn, Reply::Other(Value::Integer(3)));

        let quiet = Interceptor::new(PagerOptions::default().with_unsupported(UnsupportedShape::Passthrough));
        assert_eq!(quiet.call(&PageRequest::new(1, 10), scalar).unwrap(), Reply::Other(Value::Integer(3)));

        let strict = Interceptor::new(PagerOptions::default().with_unsupported(UnsupportedShape::Reject));
        assert!(matches!(
            strict.call(&PageRequest::new(1, 10), scalar),
            Err(PagerError::UnsupportedResultShape(shape)) if shape == "other"
        ));
    }

    #[test]
    fn test_call_export_reads_full_data() {
        let table = numbers(120);
        let options = PagerOptions::default()
            .with_export(SimpleExport::new(&["idx", "n", "square"], |n: &i64, idx| {
                vec![Value::from(idx), Value::from(*n), Value::from(n * n)]
            }));
        let interceptor = Interceptor::new(options);
        let mut sink = MemorySink::new();

        let seen = std::cell::Cell::new(None);
        let summary = interceptor
            .call_export::<PagerError, _>(&mut sink, || {
                seen.set(PagingContext::current());
                Ok(Reply::Rows(query(&TableQuery::new(&table))?))
            })
            .unwrap();

        assert_eq!(seen.get().map(|i| i.mode), Some(PagingMode::Skipped));
        assert_eq!(summary.rows, 120);
        assert_eq!(sink.rows.len(), 120);
        assert!(sink.rows.iter().all(|r| r.len() == 3));
    }

    #[test]
    fn test_call_export_without_definition() {
        let mut sink = MemorySink::new();
        let err = interceptor()
            .call_export::<PagerError, _>(&mut sink, || Ok(Reply::Rows(vec![1])))
            .unwrap_err();
        assert!(matches!(err, PagerError::ExportAborted(_)));
    }

    #[test]
    fn test_export_query_failure_writes_nothing() {
        let options = PagerOptions::default().with_export(SimpleExport::new(&["n"], |n: &i64, _| vec![Value::from(*n)]));
        let mut sink = MemorySink::new();
        let err = Interceptor::new(options)
            .call_export(&mut sink, || Err(PagerError::Query("timeout".to_string())))
            .unwrap_err();
        assert!(matches!(err, PagerError::Query(_)));
        assert!(sink.header.is_empty());
        assert!(!sink.finished);
    }

    #[test]
    fn test_wrap_decorator() {
        let table = numbers(30);
        let handler = interceptor().wrap(|| -> Result<Reply<i64>, PagerError> {
            Ok(Reply::Rows(query(&TableQuery::new(&table))?))
        });
        let first = handler(&PageRequest::new(1, 10)).unwrap();
        let third = handler(&PageRequest::new(3, 10)).unwrap();
        assert_eq!(first.page().unwrap().rows[0], 1);
        assert_eq!(third.page().unwrap().rows[0], 21);
    }

    #[tokio::test]
    async fn test_call_async() {
        let table = numbers(45);
        let reply = interceptor()
            .call_async::<PagerError, _>(&PageRequest::new(2, 20), async {
                let before = PagingContext::with_skip_async(async { query(&TableQuery::new(&table)) }).await?;
                assert_eq!(before.len(), 45);
                Ok(Reply::Rows(query(&TableQuery::new(&table))?))
            })
            .await
            .unwrap();
        let page = reply.page().unwrap();
        assert_eq!(page.rows.len(), 20);
        assert_eq!(page.rows[0], 21);
        assert_eq!(page.total_pages, 3);
    }
}
