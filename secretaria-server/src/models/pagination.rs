//! Offset/limit pagination shared by every list endpoint

use serde::Deserialize;

/// Maximum rows a single list request may return
const MAX_LIMIT: i64 = 100;

/// Default rows per list request
const DEFAULT_LIMIT: i64 = 10;

/// Validated pagination window
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

impl Page {
    /// Create a page window with validation.
    ///
    /// - Offset is clamped to a minimum of 0
    /// - Limit is clamped to 1..=100
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset: offset.max(0),
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Raw `offset`/`limit` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ListParams {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl From<ListParams> for Page {
    fn from(params: ListParams) -> Self {
        Self::new(
            params.offset.unwrap_or(0),
            params.limit.unwrap_or(DEFAULT_LIMIT),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let page = Page::from(ListParams::default());
        assert_eq!(page.offset, 0);
        assert_eq!(page.limit, 10);
    }

    #[test]
    fn caps_limit_at_100() {
        let page = Page::new(0, 200);
        assert_eq!(page.limit, 100);
    }

    #[test]
    fn clamps_negative_offset() {
        let page = Page::new(-5, 10);
        assert_eq!(page.offset, 0);
    }

    #[test]
    fn clamps_zero_limit() {
        let page = Page::new(0, 0);
        assert_eq!(page.limit, 1);
    }

    #[test]
    fn from_params() {
        let page = Page::from(ListParams {
            offset: Some(30),
            limit: Some(50),
        });
        assert_eq!(page.offset, 30);
        assert_eq!(page.limit, 50);
    }
}
