//! Page results and the fetch state machine

use crate::error::FetchError;
use crate::pagination;

/// One page of a resource collection plus pagination metadata
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Default for PageResult<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_elements: 0,
            total_pages: 0,
        }
    }
}

impl<T> PageResult<T> {
    #[must_use]
    pub fn new(items: Vec<T>, total_elements: u64, total_pages: u64) -> Self {
        Self {
            items,
            total_elements,
            total_pages,
        }
    }

    /// Page whose page count is derived from `page_size`
    #[must_use]
    pub fn with_page_size(items: Vec<T>, total_elements: u64, page_size: u64) -> Self {
        Self::new(
            items,
            total_elements,
            pagination::total_pages(total_elements, page_size),
        )
    }
}

/// Lifecycle of a collection fetch
///
/// `Loading` keeps the previously displayed page so the view can keep
/// rendering it until the response replaces it wholesale.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Idle,
    Loading {
        previous: Option<PageResult<T>>,
    },
    Success(PageResult<T>),
    Failure(FetchError),
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        FetchState::Idle
    }
}

impl<T> FetchState<T> {
    /// Page currently on display, if any
    #[must_use]
    pub fn page(&self) -> Option<&PageResult<T>> {
        match self {
            FetchState::Success(page) => Some(page),
            FetchState::Loading { previous } => previous.as_ref(),
            FetchState::Idle | FetchState::Failure(_) => None,
        }
    }

    pub(crate) fn page_mut(&mut self) -> Option<&mut PageResult<T>> {
        match self {
            FetchState::Success(page) => Some(page),
            FetchState::Loading { previous } => previous.as_mut(),
            FetchState::Idle | FetchState::Failure(_) => None,
        }
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        self.page()
            .map(|page| page.items.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.page().map_or(0, |page| page.total_elements)
    }

    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.page().map_or(0, |page| page.total_pages)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading { .. })
    }

    #[must_use]
    pub fn error(&self) -> Option<&FetchError> {
        match self {
            FetchState::Failure(err) => Some(err),
            _ => None,
        }
    }

    /// Move into `Loading`, carrying the displayed page along
    pub(crate) fn begin_loading(&mut self) {
        let previous = match std::mem::take(self) {
            FetchState::Success(page) => Some(page),
            FetchState::Loading { previous } => previous,
            FetchState::Idle | FetchState::Failure(_) => None,
        };
        *self = FetchState::Loading { previous };
    }

    /// Apply a completed fetch
    pub(crate) fn complete(&mut self, result: Result<PageResult<T>, FetchError>) {
        *self = match result {
            Ok(page) => FetchState::Success(page),
            Err(err) => FetchState::Failure(err),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_keeps_previous_page() {
        let mut state = FetchState::Success(PageResult::new(vec![1, 2], 2, 1));
        state.begin_loading();
        assert!(state.is_loading());
        assert_eq!(state.items(), &[1, 2]);
        assert_eq!(state.total(), 2);
    }

    #[test]
    fn test_loading_after_failure_shows_nothing() {
        let mut state: FetchState<i32> = FetchState::Failure(FetchError::Transport("down".into()));
        state.begin_loading();
        assert!(state.items().is_empty());
        assert!(state.error().is_none());
    }

    #[test]
    fn test_failure_clears_items() {
        let mut state = FetchState::Success(PageResult::new(vec![1], 1, 1));
        state.begin_loading();
        state.complete(Err(FetchError::Transport("down".into())));
        assert!(state.items().is_empty());
        assert_eq!(state.total(), 0);
        assert_eq!(state.error().map(FetchError::message), Some("down"));
    }

    #[test]
    fn test_with_page_size_derives_pages() {
        let page = PageResult::with_page_size(vec!['a'; 12], 25, 12);
        assert_eq!(page.total_pages, 3);
    }
}
