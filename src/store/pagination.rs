//! Incremental reveal of the (filtered) email list.
//!
//! The paginator owns only its page counter; the collection store owns the
//! list itself. `revealed_pages` only increases, except on an explicit reset
//! when the search query changes.

use crate::constants::SCROLL_BOTTOM_TOLERANCE;

/// Scroll position of the list container, in layout units.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollPos {
    pub offset: f64,
    pub max: f64,
}

impl ScrollPos {
    pub fn new(offset: f64, max: f64) -> Self {
        Self { offset, max }
    }

    /// A position that always reads as the bottom of the list.
    pub fn bottom() -> Self {
        Self::default()
    }

    /// Whether the offset has reached its maximum, within tolerance.
    pub fn at_bottom(&self) -> bool {
        self.offset >= self.max - SCROLL_BOTTOM_TOLERANCE
    }
}

/// How many pages of the list are revealed to the view.
#[derive(Debug, Clone)]
pub struct PageView {
    revealed_pages: usize,
    page_size: usize,
}

impl PageView {
    pub fn new(page_size: usize) -> Self {
        Self {
            revealed_pages: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn revealed_pages(&self) -> usize {
        self.revealed_pages
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Visible prefix length for a list of `len` entries.
    pub fn visible_count(&self, len: usize) -> usize {
        (self.revealed_pages * self.page_size).min(len)
    }

    /// Whether already-fetched entries remain beyond the visible prefix.
    pub fn has_more_local(&self, len: usize) -> bool {
        self.visible_count(len) < len
    }

    /// Reveal one more page.
    pub fn advance(&mut self) {
        self.revealed_pages += 1;
    }

    /// Re-paginate from the top (search query changed).
    pub fn reset(&mut self) {
        self.revealed_pages = 1;
    }

    /// Recompute the page size (viewport resize). Revealed pages are kept.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revealed_pages_never_decrease_without_reset() {
        let mut view = PageView::new(10);
        let mut last = view.revealed_pages();
        for _ in 0..5 {
            view.advance();
            assert!(view.revealed_pages() > last);
            last = view.revealed_pages();
        }
        view.reset();
        assert_eq!(view.revealed_pages(), 1);
    }

    #[test]
    fn visible_count_clamps_to_list_length() {
        let view = PageView::new(25);
        assert_eq!(view.visible_count(0), 0);
        assert_eq!(view.visible_count(10), 10);
        assert_eq!(view.visible_count(60), 25);
    }

    #[test]
    fn has_more_local_tracks_unrevealed_entries() {
        let mut view = PageView::new(25);
        assert!(view.has_more_local(30));
        view.advance();
        assert!(!view.has_more_local(30));
        assert!(!view.has_more_local(0));
    }

    #[test]
    fn scroll_bottom_detection_has_one_unit_tolerance() {
        assert!(ScrollPos::new(100.0, 100.0).at_bottom());
        assert!(ScrollPos::new(99.2, 100.0).at_bottom());
        assert!(!ScrollPos::new(98.5, 100.0).at_bottom());
        assert!(ScrollPos::bottom().at_bottom());
    }

    #[test]
    fn page_size_is_at_least_one() {
        let mut view = PageView::new(0);
        assert_eq!(view.page_size(), 1);
        view.set_page_size(0);
        assert_eq!(view.page_size(), 1);
        view.set_page_size(40);
        assert_eq!(view.page_size(), 40);
    }
}
