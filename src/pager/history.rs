//! Cursor history for reconstructing "previous page" on forward-only sources.
//!
//! Entry `i` is the start cursor of page `i + 2`. Page 1 always starts from the
//! beginning of the results and has no entry, so the length equals the deepest
//! page reached along the current path minus one.

use crate::source::Cursor;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorHistory {
    entries: Vec<Cursor>,
}

impl CursorHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deepest page whose start cursor is known.
    pub fn deepest_page(&self) -> usize {
        self.entries.len() + 1
    }

    /// Append the start cursor of the page after the deepest known one.
    pub fn push(&mut self, cursor: Cursor) {
        self.entries.push(cursor);
    }

    /// Start cursor of `page`. Always `None` for page 1.
    pub fn cursor_for(&self, page: usize) -> Option<&Cursor> {
        if page < 2 {
            return None;
        }
        self.entries.get(page - 2)
    }

    /// Cursor needed to fetch the page before `page`.
    ///
    /// `Some(None)` means "fetch from the start" (the previous page is page 1).
    /// `None` means there is no previous page, or its cursor was never recorded.
    pub fn peek_prev(&self, page: usize) -> Option<Option<&Cursor>> {
        match page {
            0 | 1 => None,
            2 => Some(None),
            _ => self.cursor_for(page - 1).map(Some),
        }
    }

    /// Record `cursor` as the start of `page`.
    ///
    /// Re-recording the same cursor is a no-op. A different cursor means the
    /// path diverged, so everything from `page` onward is dropped first.
    /// Returns `false` if `page` is not adjacent to the known history.
    pub fn record(&mut self, page: usize, cursor: Cursor) -> bool {
        if page < 2 || page > self.deepest_page() + 1 {
            return false;
        }

        match self.cursor_for(page) {
            Some(existing) if *existing == cursor => true,
            Some(_) => {
                self.truncate_after(page - 1);
                self.entries.push(cursor);
                true
            }
            None => {
                self.entries.push(cursor);
                true
            }
        }
    }

    /// Drop every entry for pages beyond `page`.
    pub fn truncate_after(&mut self, page: usize) {
        self.entries.truncate(page.saturating_sub(1));
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }
}
