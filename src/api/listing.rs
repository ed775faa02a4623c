//! List responses: a bare array or a paginated envelope

use serde::{Deserialize, Serialize};

/// One page of a paginated listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub count: Option<u64>,
}

/// Either form a list endpoint may return
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Page(Page<T>),
    Bare(Vec<T>),
}

impl<T> Listing<T> {
    pub fn items(&self) -> &[T] {
        match self {
            Listing::Page(page) => &page.results,
            Listing::Bare(items) => items,
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Page(page) => page.results,
            Listing::Bare(items) => items,
        }
    }

    /// Total number of items across all pages, when known
    pub fn total(&self) -> usize {
        match self {
            Listing::Page(page) => page
                .count
                .map(|c| c as usize)
                .unwrap_or(page.results.len()),
            Listing::Bare(items) => items.len(),
        }
    }

    pub fn has_next(&self) -> bool {
        matches!(self, Listing::Page(page) if page.next.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn bare_array() {
        let listing: Listing<Value> = serde_json::from_value(json!([{"id": 1}])).unwrap();
        assert_eq!(listing.items().len(), 1);
        assert!(!listing.has_next());
    }

    #[test]
    fn paginated_envelope() {
        let listing: Listing<Value> = serde_json::from_value(json!({
            "results": [{"id": 1}, {"id": 2}],
            "next": "https://api/services/?page=2",
            "previous": null,
            "count": 7
        }))
        .unwrap();
        assert_eq!(listing.total(), 7);
        assert!(listing.has_next());
        assert_eq!(listing.into_items().len(), 2);
    }
}
