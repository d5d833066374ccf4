//! Common types used across the inventory core

use serde::{Deserialize, Serialize};

/// Sort direction for ledger queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Pagination parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
        }
    }
}

/// Paginated response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

impl PaginationMeta {
    /// Build metadata from a total item count and the requested page window.
    pub fn new(total_items: u64, pagination: &Pagination) -> Self {
        let per_page = pagination.per_page.max(1);
        let total_pages = total_items.div_ceil(per_page as u64) as u32;
        Self {
            page: pagination.page.max(1),
            per_page,
            total_items,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let p = Pagination::default();
        assert_eq!(p.page, 1);
        assert_eq!(p.per_page, 10);
    }

    #[test]
    fn test_pagination_meta_rounds_up() {
        let meta = PaginationMeta::new(21, &Pagination::default());
        assert_eq!(meta.total_pages, 3);
    }

    #[test]
    fn test_pagination_meta_zero_per_page_is_clamped() {
        let meta = PaginationMeta::new(
            5,
            &Pagination {
                page: 0,
                per_page: 0,
            },
        );
        assert_eq!(meta.page, 1);
        assert_eq!(meta.per_page, 1);
        assert_eq!(meta.total_pages, 5);
    }
}
