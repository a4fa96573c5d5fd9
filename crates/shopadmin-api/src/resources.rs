//! Catalogue of backend list resources

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::query::ListQuery;

/// JSON envelope a list endpoint wraps its page in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeShape {
    /// `{ "content": [...], "page": { "totalElements", "totalPages" } }`
    ContentPage,
    /// `{ "data": [...], "total": n }`
    DataTotal,
}

/// Backend-managed collections exposed through paginated endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Users,
    Products,
    Categories,
    Orders,
    Coupons,
    Posts,
    Notifications,
}

impl Resource {
    pub const ALL: [Resource; 7] = [
        Resource::Users,
        Resource::Products,
        Resource::Categories,
        Resource::Orders,
        Resource::Coupons,
        Resource::Posts,
        Resource::Notifications,
    ];

    /// Path relative to the API base URL
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Resource::Users => "users",
            Resource::Products => "products",
            Resource::Categories => "categories",
            Resource::Orders => "orders",
            Resource::Coupons => "coupons",
            Resource::Posts => "posts",
            Resource::Notifications => "notifications",
        }
    }

    #[must_use]
    pub fn envelope(self) -> EnvelopeShape {
        match self {
            Resource::Users | Resource::Products | Resource::Categories | Resource::Orders => {
                EnvelopeShape::ContentPage
            }
            Resource::Coupons | Resource::Posts | Resource::Notifications => {
                EnvelopeShape::DataTotal
            }
        }
    }

    #[must_use]
    pub fn default_page_size(self) -> u64 {
        match self {
            Resource::Products => 12,
            Resource::Posts => 9,
            Resource::Notifications => 20,
            _ => 10,
        }
    }

    #[must_use]
    pub fn default_sort(self) -> Option<&'static str> {
        match self {
            Resource::Products | Resource::Posts => Some("latest"),
            _ => None,
        }
    }

    /// Initial query a list screen for this resource starts from
    #[must_use]
    pub fn default_query(self) -> ListQuery {
        let query = ListQuery::new(self.default_page_size());
        match self.default_sort() {
            Some(sort) => query.with_sort(sort),
            None => query,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Resource {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Resource::ALL
            .into_iter()
            .find(|r| r.path() == wanted)
            .ok_or_else(|| ApiError::UnknownResource(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrips_display() {
        for resource in Resource::ALL {
            assert_eq!(resource.to_string().parse::<Resource>(), Ok(resource));
        }
        assert_eq!("Products".parse::<Resource>(), Ok(Resource::Products));
        assert!("widgets".parse::<Resource>().is_err());
    }

    #[test]
    fn test_product_default_query() {
        let query = Resource::Products.default_query();
        assert_eq!(query.page, 0);
        assert_eq!(query.page_size, 12);
        assert_eq!(query.search, "");
        assert_eq!(query.sort_by.as_deref(), Some("latest"));
    }

    #[test]
    fn test_envelope_shapes() {
        assert_eq!(Resource::Orders.envelope(), EnvelopeShape::ContentPage);
        assert_eq!(Resource::Notifications.envelope(), EnvelopeShape::DataTotal);
    }
}
