use crate::core::PageRequest;
use std::collections::HashMap;

/// Request-scoped paging parameters
pub trait PageParams {
    /// Page requested by the caller, `None` when the request carries none
    fn resolve_page_params(&self) -> Option<PageRequest>;

    /// Whether the caller asked for a full export instead of a page
    fn export_requested(&self) -> bool {
        false
    }
}

/// No request scope at all
impl PageParams for () {
    fn resolve_page_params(&self) -> Option<PageRequest> {
        None
    }
}

impl PageParams for PageRequest {
    fn resolve_page_params(&self) -> Option<PageRequest> {
        Some(*self)
    }
}

/// Names of the request parameters read by [`QueryParams`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamNames {
    pub page: String,
    pub size: String,
    pub export: String,
}

impl Default for ParamNames {
    fn default() -> Self {
        Self {
            page: "page".to_string(),
            size: "pageSize".to_string(),
            export: "export".to_string(),
        }
    }
}

/// Page parameters taken from a string map such as a parsed query string
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    values: HashMap<String, String>,
    names: ParamNames,
}

impl QueryParams {
    #[must_use]
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values, names: ParamNames::default() }
    }

    /// Parses `key=value` pairs separated by `&`. Values are taken verbatim,
    /// no percent-decoding.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let values = query
            .trim_start_matches('?')
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => (pair.to_string(), String::new()),
            })
            .collect();
        Self::new(values)
    }

    #[must_use]
    pub fn with_names(mut self, names: ParamNames) -> Self {
        self.names = names;
        self
    }

    pub fn insert(&mut self, key: &str, value: impl ToString) {
        self.values.insert(key.to_string(), value.to_string());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn number(&self, key: &str) -> Option<usize> {
        let raw = self.get(key)?.trim().parse::<i64>().ok()?;
        Some(usize::try_from(raw).unwrap_or(0))
    }
}

impl PageParams for QueryParams {
    fn resolve_page_params(&self) -> Option<PageRequest> {
        let page = self.number(&self.names.page);
        let size = self.number(&self.names.size);
        if page.is_none() && size.is_none() {
            return None;
        }
        // Missing halves become 0 and are filled in by normalization
        Some(PageRequest::new(page.unwrap_or(0), size.unwrap_or(0)))
    }

    fn export_requested(&self) -> bool {
        self.get(&self.names.export).is_some_and(|v| {
            matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_string() {
        let params = QueryParams::parse("?page=3&pageSize=25&flag");
        assert_eq!(params.resolve_page_params(), Some(PageRequest::new(3, 25)));
        assert_eq!(params.get("flag"), Some(""));
        assert!(!params.export_requested());
    }

    #[test]
    fn test_absent_params() {
        assert_eq!(QueryParams::parse("").resolve_page_params(), None);
        assert_eq!(QueryParams::parse("page=abc").resolve_page_params(), None);
        assert_eq!(().resolve_page_params(), None);
    }

    #[test]
    fn test_partial_and_negative_params() {
        assert_eq!(QueryParams::parse("page=2").resolve_page_params(), Some(PageRequest::new(2, 0)));
        assert_eq!(QueryParams::parse("page=-4&pageSize=10").resolve_page_params(), Some(PageRequest::new(0, 10)));
    }

    #[test]
    fn test_export_flag() {
        assert!(QueryParams::parse("export=true").export_requested());
        assert!(QueryParams::parse("export=YES").export_requested());
        assert!(QueryParams::parse("export=1").export_requested());
        assert!(!QueryParams::parse("export=no").export_requested());
    }

    #[test]
    fn test_custom_names() {
        let names = ParamNames {
            page: "p".to_string(),
            size: "n".to_string(),
            export: "dl".to_string(),
        };
        let mut params = QueryParams::default().with_names(names);
        params.insert("p", 4);
        params.insert("n", 50);
        params.insert("dl", true);
        assert_eq!(params.resolve_page_params(), Some(PageRequest::new(4, 50)));
        assert!(params.export_requested());
    }
}
