//! Response-shape normalizer for list endpoints.
//!
//! The dashboard backend has never fixed its list envelope: the same
//! endpoint has been observed returning a top-level array, `{<key>: [...]}`,
//! `{data: {<key>: [...]}}`, and `{data: [...]}`, with pagination sometimes
//! attached and sometimes not. Rather than repeating shape-sniffing at every
//! call site, this module parses all documented variants in one place and
//! hands back a canonical page.
//!
//! Unrecognized shapes yield an empty page rather than an error, so the
//! dashboard stays up through backend contract drift. The mismatch is
//! logged at `warn` so outages are not silent.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Pagination summary for a list page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub total_pages: u64,
}

impl Pagination {
    /// Defaults derived from the extracted list length, used when the
    /// envelope carries no pagination of its own.
    #[must_use]
    pub fn from_len(len: usize) -> Self {
        let len = len as u64;
        Self {
            total: len,
            page: 1,
            limit: len,
            total_pages: u64::from(len > 0),
        }
    }
}

/// A canonical list page: extracted records plus a pagination summary.
#[derive(Debug, Clone)]
pub struct ListPage<T> {
    pub records: Vec<T>,
    pub pagination: Pagination,
}

impl<T> ListPage<T> {
    fn empty() -> Self {
        Self {
            records: Vec::new(),
            pagination: Pagination::default(),
        }
    }
}

/// The documented envelope variants, probed in order.
enum Envelope<'a> {
    /// `[...]`
    Bare(&'a [Value]),
    /// `{<key>: [...]}`
    Keyed(&'a [Value]),
    /// `{data: {<key>: [...]}}`
    DataKeyed(&'a [Value]),
    /// `{data: [...]}`
    DataBare(&'a [Value]),
}

fn classify<'a>(body: &'a Value, key: &str) -> Option<Envelope<'a>> {
    if let Some(items) = body.as_array() {
        return Some(Envelope::Bare(items));
    }
    if let Some(items) = body.get(key).and_then(Value::as_array) {
        return Some(Envelope::Keyed(items));
    }
    let data = body.get("data")?;
    if let Some(items) = data.get(key).and_then(Value::as_array) {
        return Some(Envelope::DataKeyed(items));
    }
    if let Some(items) = data.as_array() {
        return Some(Envelope::DataBare(items));
    }
    None
}

/// Pagination from the envelope (top level or under `data`), or derived
/// defaults from the record count.
fn extract_pagination(body: &Value, len: usize) -> Pagination {
    let explicit = body
        .get("pagination")
        .or_else(|| body.get("data").and_then(|d| d.get("pagination")))
        .and_then(|p| serde_json::from_value::<Pagination>(p.clone()).ok());

    match explicit {
        Some(mut p) => {
            // Backends that paginate still omit individual fields; derive
            // the missing ones from what we have.
            if p.total == 0 {
                p.total = len as u64;
            }
            if p.page == 0 {
                p.page = 1;
            }
            if p.limit == 0 {
                p.limit = len as u64;
            }
            if p.total_pages == 0 {
                p.total_pages = if p.limit > 0 {
                    p.total.div_ceil(p.limit)
                } else {
                    u64::from(p.total > 0)
                };
            }
            p
        }
        None => Pagination::from_len(len),
    }
}

/// Parse a list response body into a canonical [`ListPage`].
///
/// `key` is the endpoint's collection name (`"alerts"`, `"farmers"`, ...).
/// Elements that fail to deserialize are skipped with a warning; the rest of
/// the page survives.
#[must_use]
pub fn parse_list_page<T: DeserializeOwned>(body: &Value, key: &str) -> ListPage<T> {
    let Some(envelope) = classify(body, key) else {
        tracing::warn!(key, "Unrecognized list envelope shape, treating as empty");
        return ListPage::empty();
    };

    let items = match envelope {
        Envelope::Bare(items)
        | Envelope::Keyed(items)
        | Envelope::DataKeyed(items)
        | Envelope::DataBare(items) => items,
    };

    let mut records = Vec::with_capacity(items.len());
    let mut skipped = 0usize;
    for item in items {
        match serde_json::from_value::<T>(item.clone()) {
            Ok(record) => records.push(record),
            Err(e) => {
                skipped += 1;
                tracing::warn!(key, error = %e, "Skipping undecodable list element");
            }
        }
    }
    if skipped > 0 {
        tracing::warn!(key, skipped, "Dropped undecodable elements from list page");
    }

    let pagination = extract_pagination(body, records.len());
    ListPage {
        records,
        pagination,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Alert;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::bare_array(json!([]))]
    #[case::keyed(json!({"alerts": []}))]
    #[case::data_keyed(json!({"data": {"alerts": []}}))]
    #[case::data_bare(json!({"data": []}))]
    #[case::unrecognized(json!({"unexpected": true}))]
    fn test_empty_page_for_all_documented_shapes(#[case] body: Value) {
        let page: ListPage<Alert> = parse_list_page(&body, "alerts");
        assert!(page.records.is_empty());
        assert_eq!(page.pagination.total, 0);
    }

    #[test]
    fn test_bare_array_records() {
        let body = json!([{"title": "Storm"}, {"title": "Drought"}]);
        let page: ListPage<Alert> = parse_list_page(&body, "alerts");
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].title, "Storm");
        // Derived pagination
        assert_eq!(page.pagination.total, 2);
        assert_eq!(page.pagination.page, 1);
        assert_eq!(page.pagination.total_pages, 1);
    }

    #[test]
    fn test_nested_data_keyed_records() {
        let body = json!({"data": {"alerts": [{"title": "Frost"}]}});
        let page: ListPage<Alert> = parse_list_page(&body, "alerts");
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].title, "Frost");
    }

    #[test]
    fn test_explicit_pagination_preferred() {
        let body = json!({
            "alerts": [{"title": "Storm"}],
            "pagination": {"total": 40, "page": 2, "limit": 20, "totalPages": 2}
        });
        let page: ListPage<Alert> = parse_list_page(&body, "alerts");
        assert_eq!(
            page.pagination,
            Pagination {
                total: 40,
                page: 2,
                limit: 20,
                total_pages: 2
            }
        );
    }

    #[test]
    fn test_partial_pagination_filled_in() {
        // totalPages absent: derived from total and limit.
        let body = json!({
            "data": {
                "alerts": [{"title": "Storm"}],
                "pagination": {"total": 45, "limit": 20}
            }
        });
        let page: ListPage<Alert> = parse_list_page(&body, "alerts");
        assert_eq!(page.pagination.total, 45);
        assert_eq!(page.pagination.page, 1);
        assert_eq!(page.pagination.total_pages, 3);
    }

    #[test]
    fn test_undecodable_elements_skipped() {
        // A string where an object is expected must not sink the page.
        let body = json!({"alerts": [{"title": "Storm"}, "garbage"]});
        let page: ListPage<Alert> = parse_list_page(&body, "alerts");
        assert_eq!(page.records.len(), 1);
    }

    #[test]
    fn test_wrong_key_is_unrecognized() {
        let body = json!({"farmers": [{"title": "Storm"}]});
        let page: ListPage<Alert> = parse_list_page(&body, "alerts");
        assert!(page.records.is_empty());
        assert_eq!(page.pagination, Pagination::default());
    }
}
