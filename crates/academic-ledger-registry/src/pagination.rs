//! Offset pagination for list queries.

use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: u64 = 100;
pub const MAX_LIMIT: u64 = 1000;

/// Requested window. A zero limit means [`DEFAULT_LIMIT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub offset: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    pub fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    /// Limit after applying the default and the cap.
    pub fn effective_limit(&self) -> u64 {
        match self.limit {
            0 => DEFAULT_LIMIT,
            n => n.min(MAX_LIMIT),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResponse {
    pub total: u64,
    pub next_offset: Option<u64>,
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: PageResponse,
}

impl<T> Page<T> {
    /// Cut a page out of a full, ordered result set.
    pub fn from_all(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let limit = request.effective_limit();
        let items: Vec<T> = all
            .into_iter()
            .skip(usize::try_from(request.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect();

        let end = request.offset.saturating_add(items.len() as u64);
        let next_offset = (end < total).then_some(end);

        Self {
            items,
            page: PageResponse { total, next_offset },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page() {
        let page = Page::from_all((0..250).collect::<Vec<_>>(), PageRequest::default());
        assert_eq!(page.items.len(), 100);
        assert_eq!(page.page.total, 250);
        assert_eq!(page.page.next_offset, Some(100));
    }

    #[test]
    fn test_last_page_has_no_next() {
        let page = Page::from_all((0..250).collect::<Vec<_>>(), PageRequest::new(200, 100));
        assert_eq!(page.items, (200..250).collect::<Vec<_>>());
        assert_eq!(page.page.next_offset, None);
    }

    #[test]
    fn test_limit_is_capped() {
        assert_eq!(PageRequest::new(0, 5000).effective_limit(), MAX_LIMIT);
        assert_eq!(PageRequest::new(0, 0).effective_limit(), DEFAULT_LIMIT);
    }

    #[test]
    fn test_offset_past_end() {
        let page = Page::from_all(vec![1, 2, 3], PageRequest::new(10, 5));
        assert!(page.items.is_empty());
        assert_eq!(page.page.total, 3);
        assert_eq!(page.page.next_offset, None);
    }
}
