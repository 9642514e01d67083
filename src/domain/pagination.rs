// ============================================================================
// Pagination
// ============================================================================

use crate::error::{EngineError, EngineResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Offset/limit window over a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PageRequest {
    pub offset: usize,
    /// `None` means the configured default page size
    pub limit: Option<usize>,
}

impl PageRequest {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self {
            offset,
            limit: Some(limit),
        }
    }

    pub fn first(limit: usize) -> Self {
        Self::new(0, limit)
    }

    /// Concrete `(offset, limit)`: a missing limit becomes `default_size`,
    /// an oversized one is clamped to `max_size`, zero is rejected.
    pub fn resolve(&self, default_size: usize, max_size: usize) -> EngineResult<(usize, usize)> {
        match self.limit {
            Some(0) => Err(EngineError::InvalidInput(
                "Page limit must be positive".to_string(),
            )),
            Some(limit) => Ok((self.offset, limit.min(max_size))),
            None => Ok((self.offset, default_size.min(max_size))),
        }
    }
}

/// One page of a listing together with the size of the whole result
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

impl<T> Page<T> {
    /// Cut one page out of an already ordered result.
    pub fn slice(all: Vec<T>, offset: usize, limit: usize) -> Self {
        let total = all.len();
        let items = all.into_iter().skip(offset).take(limit).collect();
        Self {
            items,
            total,
            offset,
            limit,
        }
    }

    pub fn has_more(&self) -> bool {
        self.offset + self.items.len() < self.total
    }

    pub fn next(&self) -> Option<PageRequest> {
        self.has_more()
            .then(|| PageRequest::new(self.offset + self.items.len(), self.limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_slicing() {
        let page = Page::slice((0..25).collect::<Vec<_>>(), 10, 10);
        assert_eq!(page.items, (10..20).collect::<Vec<_>>());
        assert_eq!(page.total, 25);
        assert!(page.has_more());
        assert_eq!(page.next(), Some(PageRequest::new(20, 10)));

        let last = Page::slice((0..25).collect::<Vec<_>>(), 20, 10);
        assert_eq!(last.items.len(), 5);
        assert_eq!(last.next(), None);
    }

    #[test]
    fn test_resolve_limits() {
        assert_eq!(PageRequest::default().resolve(20, 100).unwrap(), (0, 20));
        assert_eq!(PageRequest::new(40, 500).resolve(20, 100).unwrap(), (40, 100));
        assert!(PageRequest::new(0, 0).resolve(20, 100).is_err());
    }

    #[test]
    fn test_offset_past_end() {
        let page = Page::slice(vec![1, 2, 3], 10, 5);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
        assert!(!page.has_more());
    }
}
