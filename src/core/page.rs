use serde::{Deserialize, Serialize};

/// Page parameters as requested by a caller (1-based page index)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_index: usize,
    pub page_size: usize,
}

impl PageRequest {
    #[must_use]
    pub const fn new(page_index: usize, page_size: usize) -> Self {
        Self { page_index, page_size }
    }

    /// Clamps the request into a usable range
    ///
    /// - page index 0 becomes 1
    /// - page size 0 falls back to `default_size`
    /// - page size above `max_size` is capped (a `max_size` of 0 disables the cap)
    #[must_use]
    pub fn normalize(self, default_size: usize, max_size: usize) -> Self {
        let page_index = self.page_index.max(1);
        let mut page_size = if self.page_size == 0 { default_size } else { self.page_size };
        if max_size > 0 && page_size > max_size {
            page_size = max_size;
        }
        Self { page_index, page_size }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingMode {
    /// Queries run with LIMIT/OFFSET and report a total count
    Paged,
    /// Queries run over the complete result, no count query
    Skipped,
}

/// The paging parameters in effect for queries issued "right now"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingIntent {
    pub mode: PagingMode,
    pub page_index: usize,
    pub page_size: usize,
}

impl PagingIntent {
    #[must_use]
    pub const fn paged(page_index: usize, page_size: usize) -> Self {
        Self { mode: PagingMode::Paged, page_index, page_size }
    }

    #[must_use]
    pub const fn skipped() -> Self {
        Self { mode: PagingMode::Skipped, page_index: 0, page_size: 0 }
    }

    #[must_use]
    pub const fn is_paged(&self) -> bool {
        matches!(self.mode, PagingMode::Paged)
    }

    /// Rows to skip before the page starts
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.page_index.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Maximum rows in the page, `None` when unpaged
    #[must_use]
    pub const fn limit(&self) -> Option<usize> {
        if self.is_paged() { Some(self.page_size) } else { None }
    }
}

impl From<PageRequest> for PagingIntent {
    fn from(req: PageRequest) -> Self {
        Self::paged(req.page_index, req.page_size)
    }
}

/// One page of rows plus the metadata describing where it sits in the full result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageBody<T> {
    pub page_index: usize,
    pub page_size: usize,
    pub total_count: i64,
    pub total_pages: usize,
    pub rows: Vec<T>,
}

impl<T> PageBody<T> {
    /// Builds a page body. Rows beyond `page_size` are dropped so the page never
    /// holds more than one page worth of rows.
    #[must_use]
    pub fn new(page_index: usize, page_size: usize, total_count: i64, mut rows: Vec<T>) -> Self {
        let total_count = total_count.max(0);
        if page_size > 0 && rows.len() > page_size {
            rows.truncate(page_size);
        }
        Self {
            page_index,
            page_size,
            total_count,
            total_pages: total_pages(total_count, page_size),
            rows,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page_index < self.total_pages
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page_index > 1
    }

    /// Converts the rows while keeping the page metadata
    pub fn map<U, F>(self, f: F) -> PageBody<U>
    where
        F: FnMut(T) -> U,
    {
        PageBody {
            page_index: self.page_index,
            page_size: self.page_size,
            total_count: self.total_count,
            total_pages: self.total_pages,
            rows: self.rows.into_iter().map(f).collect(),
        }
    }
}

fn total_pages(total_count: i64, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    (total_count as u64).div_ceil(page_size as u64) as usize
}
