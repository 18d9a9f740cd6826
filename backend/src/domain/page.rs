//! Offset pagination window.

use serde::Deserialize;

/// Smallest page size accepted from callers.
pub const PAGE_LIMIT_MIN: u32 = 10;
/// Largest page size accepted from callers.
pub const PAGE_LIMIT_MAX: u32 = 500;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageValidationError {
    #[error("limit must be between {min} and {max}")]
    LimitOutOfRange { min: u32, max: u32 },
}

/// A `limit`/`offset` window over an ordered result set.
///
/// # Examples
/// ```
/// use contactbook::domain::Page;
///
/// let page = Page::new(Some(20), None).unwrap();
/// assert_eq!((page.limit(), page.offset()), (20, 0));
/// assert!(Page::new(Some(5), None).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    limit: u32,
    offset: u32,
}

impl Page {
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Result<Self, PageValidationError> {
        let limit = limit.unwrap_or(PAGE_LIMIT_MIN);
        if !(PAGE_LIMIT_MIN..=PAGE_LIMIT_MAX).contains(&limit) {
            return Err(PageValidationError::LimitOutOfRange {
                min: PAGE_LIMIT_MIN,
                max: PAGE_LIMIT_MAX,
            });
        }
        Ok(Self {
            limit,
            offset: offset.unwrap_or(0),
        })
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Slice an in-memory, already ordered sequence.
    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: PAGE_LIMIT_MIN,
            offset: 0,
        }
    }
}

/// Raw query-string shape, validated through [`Page::new`].
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl TryFrom<PageQuery> for Page {
    type Error = PageValidationError;

    fn try_from(value: PageQuery) -> Result<Self, Self::Error> {
        Self::new(value.limit, value.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, Some((10, 0)))]
    #[case(Some(10), Some(0), Some((10, 0)))]
    #[case(Some(500), Some(40), Some((500, 40)))]
    #[case(Some(9), None, None)]
    #[case(Some(501), None, None)]
    fn validates_limit_range(
        #[case] limit: Option<u32>,
        #[case] offset: Option<u32>,
        #[case] expected: Option<(u32, u32)>,
    ) {
        let page = Page::new(limit, offset).ok().map(|p| (p.limit(), p.offset()));
        assert_eq!(page, expected);
    }

    #[rstest]
    fn apply_skips_and_takes() {
        let page = Page::new(Some(10), Some(5)).expect("valid page");
        let items: Vec<u32> = page.apply(0..30);
        assert_eq!(items, (5..15).collect::<Vec<_>>());
    }
}
