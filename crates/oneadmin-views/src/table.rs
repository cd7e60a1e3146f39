//! Client-side paging over a locally cached result array.
//!
//! The gateway serves fixed-size pages. The table keeps every page fetched
//! so far and slices the active one out locally; moving one page past the
//! cached rows is the only case that needs another fetch.

use oneadmin_api::channel::Channel;
use oneadmin_api::mj::MjTask;
use oneadmin_api::redemption::Redemption;
use oneadmin_api::token::Token;
use oneadmin_api::user::User;

/// Anything with a server id.
pub trait Row {
    fn row_id(&self) -> i64;
}

impl Row for Channel {
    fn row_id(&self) -> i64 {
        self.id
    }
}

impl Row for User {
    fn row_id(&self) -> i64 {
        self.id
    }
}

impl Row for Token {
    fn row_id(&self) -> i64 {
        self.id
    }
}

impl Row for Redemption {
    fn row_id(&self) -> i64 {
        self.id
    }
}

impl Row for MjTask {
    fn row_id(&self) -> i64 {
        self.id
    }
}

/// Rows per page on list endpoints that take no `page_size` parameter.
/// Only the channel list lets the caller choose.
pub const ITEMS_PER_PAGE: usize = 10;

#[derive(Debug, Clone)]
pub struct PagedTable<T> {
    rows: Vec<T>,
    page_size: usize,
    /// 1-based.
    active_page: usize,
}

impl<T: Row> PagedTable<T> {
    pub fn new(page_size: usize) -> Self {
        Self {
            rows: Vec::new(),
            page_size: page_size.max(1),
            active_page: 1,
        }
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn active_page(&self) -> usize {
        self.active_page
    }

    /// Rows of the active page; empty when the page is past the cache.
    pub fn page_rows(&self) -> &[T] {
        let start = (self.active_page - 1) * self.page_size;
        if start >= self.rows.len() {
            return &[];
        }
        let end = (start + self.page_size).min(self.rows.len());
        &self.rows[start..end]
    }

    /// Number of pages the cache covers.
    pub fn cached_pages(&self) -> usize {
        self.rows.len().div_ceil(self.page_size)
    }

    /// True exactly when `page` is the first page beyond the cache.
    pub fn needs_fetch(&self, page: usize) -> bool {
        page == self.cached_pages() + 1
    }

    pub fn set_active_page(&mut self, page: usize) {
        self.active_page = page.max(1);
    }

    /// Changes the page size and returns to page 1. Callers reload.
    pub fn set_page_size(&mut self, size: usize) {
        self.page_size = size.max(1);
        self.active_page = 1;
    }

    /// Replaces the whole cache (a fetch of page 0 or a search result).
    pub fn replace(&mut self, rows: Vec<T>) {
        self.rows = rows;
    }

    /// Writes a fetched page over its slot in the cache, growing it when
    /// the page is new.
    pub fn merge_page(&mut self, page_index: usize, rows: Vec<T>) {
        let at = (page_index * self.page_size).min(self.rows.len());
        let end = (at + rows.len()).min(self.rows.len());
        self.rows.splice(at..end, rows);
    }

    pub fn append(&mut self, rows: Vec<T>) {
        self.rows.extend(rows);
    }

    /// Drops the row with `id`; other rows keep their order.
    pub fn remove_by_id(&mut self, id: i64) -> Option<T> {
        let idx = self.rows.iter().position(|r| r.row_id() == id)?;
        Some(self.rows.remove(idx))
    }

    pub fn find(&self, id: i64) -> Option<&T> {
        self.rows.iter().find(|r| r.row_id() == id)
    }

    pub fn find_mut(&mut self, id: i64) -> Option<&mut T> {
        self.rows.iter_mut().find(|r| r.row_id() == id)
    }

    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&T, &T) -> std::cmp::Ordering,
    {
        self.rows.sort_by(compare);
    }

    pub fn reverse(&mut self) {
        self.rows.reverse();
    }

    /// Row count for the pager. While the cache holds at least one full
    /// page another page may exist, so one more page is advertised.
    pub fn total_hint(&self) -> usize {
        if self.rows.len() >= self.page_size {
            self.rows.len() + self.page_size
        } else {
            self.rows.len()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct R(i64);

    impl Row for R {
        fn row_id(&self) -> i64 {
            self.0
        }
    }

    fn rows(ids: std::ops::Range<i64>) -> Vec<R> {
        ids.map(R).collect()
    }

    #[test]
    fn page_slicing() {
        let mut t = PagedTable::new(3);
        t.replace(rows(1..8));
        assert_eq!(t.page_rows(), &[R(1), R(2), R(3)]);
        t.set_active_page(3);
        assert_eq!(t.page_rows(), &[R(7)]);
        t.set_active_page(4);
        assert!(t.page_rows().is_empty());
    }

    #[test]
    fn fetch_only_one_page_past_cache() {
        let mut t = PagedTable::new(10);
        t.replace(rows(0..20));
        assert!(!t.needs_fetch(2));
        assert!(t.needs_fetch(3));
        assert!(!t.needs_fetch(4));

        t.replace(rows(0..15));
        assert!(t.needs_fetch(3));
        assert!(!t.needs_fetch(2));
    }

    #[test]
    fn merge_extends_and_overwrites() {
        let mut t = PagedTable::new(2);
        t.replace(rows(0..4));
        t.merge_page(2, vec![R(10), R(11)]);
        assert_eq!(t.rows(), &[R(0), R(1), R(2), R(3), R(10), R(11)]);

        t.merge_page(1, vec![R(20), R(21)]);
        assert_eq!(t.rows(), &[R(0), R(1), R(20), R(21), R(10), R(11)]);
    }

    #[test]
    fn remove_by_id_touches_only_the_match() {
        let mut t = PagedTable::new(5);
        t.replace(vec![R(4), R(9), R(2)]);
        assert_eq!(t.remove_by_id(9), Some(R(9)));
        assert_eq!(t.rows(), &[R(4), R(2)]);
        assert_eq!(t.remove_by_id(9), None);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn total_hint_advertises_next_page_when_full() {
        let mut t = PagedTable::new(10);
        t.replace(rows(0..10));
        assert_eq!(t.total_hint(), 20);
        t.replace(rows(0..7));
        assert_eq!(t.total_hint(), 7);
    }

    #[test]
    fn page_size_change_resets_page() {
        let mut t: PagedTable<R> = PagedTable::new(10);
        t.set_active_page(4);
        t.set_page_size(0);
        assert_eq!(t.page_size(), 1);
        assert_eq!(t.active_page(), 1);
    }
}
