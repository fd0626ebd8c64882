//! Directory listing query: role scope, pagination, ordering.
//!
//! Adapters translate a [`UserListQuery`] into their own query language. The
//! query is always ordered by user id ascending so consecutive pages are
//! stable.

use std::fmt;

use super::RoleScope;

/// Default page size when the caller does not specify one.
pub const DEFAULT_LIMIT: i64 = 50;
/// Largest page a caller may request.
pub const MAX_LIMIT: i64 = 200;

/// Errors raised when pagination parameters are out of range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    LimitOutOfRange { limit: i64 },
    NegativeOffset { offset: i64 },
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LimitOutOfRange { limit } => {
                write!(f, "limit must be between 1 and {MAX_LIMIT}, got {limit}")
            }
            Self::NegativeOffset { offset } => {
                write!(f, "offset must not be negative, got {offset}")
            }
        }
    }
}

impl std::error::Error for PageError {}

/// Validated limit/offset window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    limit: i64,
    offset: i64,
}

impl Page {
    /// Build a page, applying defaults for absent values.
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Result<Self, PageError> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(PageError::LimitOutOfRange { limit });
        }
        let offset = offset.unwrap_or(0);
        if offset < 0 {
            return Err(PageError::NegativeOffset { offset });
        }
        Ok(Self { limit, offset })
    }

    #[must_use]
    pub const fn limit(self) -> i64 {
        self.limit
    }

    #[must_use]
    pub const fn offset(self) -> i64 {
        self.offset
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// Listing request handed to a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserListQuery {
    pub scope: RoleScope,
    pub page: Page,
}

impl UserListQuery {
    #[must_use]
    pub fn new(scope: RoleScope, page: Page) -> Self {
        Self { scope, page }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_apply_when_absent() {
        let page = Page::new(None, None).expect("defaults are valid");
        assert_eq!(page, Page::default());
        assert_eq!(page.limit(), DEFAULT_LIMIT);
        assert_eq!(page.offset(), 0);
    }

    #[rstest]
    #[case(1)]
    #[case(MAX_LIMIT)]
    fn accepts_limits_at_bounds(#[case] limit: i64) {
        let page = Page::new(Some(limit), Some(10)).expect("limit in range");
        assert_eq!(page.limit(), limit);
        assert_eq!(page.offset(), 10);
    }

    #[rstest]
    #[case(0)]
    #[case(-3)]
    #[case(MAX_LIMIT + 1)]
    fn rejects_limits_out_of_range(#[case] limit: i64) {
        assert_eq!(
            Page::new(Some(limit), None),
            Err(PageError::LimitOutOfRange { limit })
        );
    }

    #[rstest]
    fn rejects_negative_offset() {
        assert_eq!(
            Page::new(None, Some(-1)),
            Err(PageError::NegativeOffset { offset: -1 })
        );
    }
}
