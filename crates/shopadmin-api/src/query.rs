//! List query parameters

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Parameters of a paginated list request
///
/// `page` is zero-based. `page_size` is always at least 1: the builder
/// methods clamp it and [`ListQuery::to_pairs`] never emits 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: u64,
    pub page_size: u64,
    #[serde(default)]
    pub search: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    /// Resource-specific filters, sent after the standard parameters
    #[serde(default, flatten)]
    pub filters: BTreeMap<String, String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ListQuery {
    /// First page of `page_size` items with no search, sort or filters
    #[must_use]
    pub fn new(page_size: u64) -> Self {
        Self {
            page: 0,
            page_size: page_size.max(1),
            search: String::new(),
            sort_by: None,
            filters: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_page(mut self, page: u64) -> Self {
        self.page = page;
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort_by: impl Into<String>) -> Self {
        self.sort_by = Some(sort_by.into());
        self
    }

    /// Add or replace a resource-specific filter
    #[must_use]
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Number of items preceding this page
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.page_size.max(1))
    }

    /// Query-string pairs in wire order: `page`, `pageSize`, `search`,
    /// `sortBy` (when set), then filters in key order.
    ///
    /// Filters named like a standard parameter are skipped.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("pageSize".to_string(), self.page_size.max(1).to_string()),
            ("search".to_string(), self.search.clone()),
        ];
        if let Some(sort_by) = &self.sort_by {
            pairs.push(("sortBy".to_string(), sort_by.clone()));
        }
        pairs.extend(
            self.filters
                .iter()
                .filter(|(key, _)| !matches!(key.as_str(), "page" | "pageSize" | "search" | "sortBy"))
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_is_clamped() {
        assert_eq!(ListQuery::new(0).page_size, 1);
        assert_eq!(ListQuery::new(12).with_page_size(0).page_size, 1);
    }

    #[test]
    fn test_pairs_order_and_filters() {
        let query = ListQuery::new(12)
            .with_page(2)
            .with_search("mug")
            .with_sort("latest")
            .with_filter("status", "ACTIVE")
            .with_filter("categoryId", "7");

        let pairs = query.to_pairs();
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec!["page", "pageSize", "search", "sortBy", "categoryId", "status"]
        );
        assert_eq!(pairs[0].1, "2");
        assert_eq!(pairs[1].1, "12");
        assert_eq!(pairs[2].1, "mug");
    }

    #[test]
    fn test_sort_omitted_when_unset() {
        let pairs = ListQuery::new(10).to_pairs();
        assert!(pairs.iter().all(|(k, _)| k != "sortBy"));
        assert!(pairs.iter().any(|(k, v)| k == "search" && v.is_empty()));
    }

    #[test]
    fn test_filter_cannot_shadow_standard_params() {
        let pairs = ListQuery::new(10).with_filter("page", "9").to_pairs();
        assert_eq!(pairs.iter().filter(|(k, _)| k == "page").count(), 1);
    }

    #[test]
    fn test_offset() {
        assert_eq!(ListQuery::new(12).with_page(3).offset(), 36);
    }

    #[test]
    fn test_serialize_flattens_filters() {
        let query = ListQuery::new(5).with_filter("role", "ADMIN");
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["pageSize"], 5);
        assert_eq!(json["role"], "ADMIN");
        assert!(json.get("sortBy").is_none());
    }
}
