use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 20;

/// The page the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    pub page: usize,
    pub limit: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            total_items: 0,
            total_pages: 0,
        }
    }
}

impl PaginationState {
    pub fn request(&self) -> PageRequest {
        PageRequest {
            page: self.page,
            limit: self.limit,
        }
    }

    /// Replace the item count and rederive the page count.
    pub fn recompute(&mut self, total_items: usize) {
        self.total_items = total_items;
        self.total_pages = total_pages(total_items, self.limit);
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

pub fn total_pages(total_items: usize, limit: usize) -> usize {
    if limit == 0 {
        return 0;
    }
    total_items.div_ceil(limit)
}

/// Slice out one 1-based page. Pages past the end come back empty.
pub fn paginate<T>(records: &[T], page: usize, limit: usize) -> &[T] {
    let start = page.saturating_sub(1).saturating_mul(limit);
    if start >= records.len() {
        return &[];
    }
    let end = start.saturating_add(limit).min(records.len());
    &records[start..end]
}
