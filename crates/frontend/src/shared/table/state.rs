use crate::shared::list_utils::{sort_list, Sortable};

/// Rows of one rendered table plus paging.
///
/// Контроллер держит ровно один `TableState`; новая выборка заменяет его
/// целиком (`replace`), счётчик `generation` растёт.
#[derive(Debug, Clone, PartialEq)]
pub struct TableState<R> {
    generation: u64,
    rows: Vec<R>,
    page: usize,
    page_size: usize,
    limit_reached: bool,
    sort_field: &'static str,
    ascending: bool,
}

impl<R> TableState<R> {
    pub fn new(page_size: usize, sort: (&'static str, bool)) -> Self {
        Self {
            generation: 0,
            rows: Vec::new(),
            page: 0,
            page_size: page_size.max(1),
            limit_reached: false,
            sort_field: sort.0,
            ascending: sort.1,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [R] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn limit_reached(&self) -> bool {
        self.limit_reached
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn sort(&self) -> (&'static str, bool) {
        (self.sort_field, self.ascending)
    }

    pub fn pages(&self) -> usize {
        self.rows.len().div_ceil(self.page_size)
    }

    pub fn page_rows(&self) -> &[R] {
        let start = (self.page * self.page_size).min(self.rows.len());
        let end = (start + self.page_size).min(self.rows.len());
        &self.rows[start..end]
    }

    /// Returns false when the page does not exist
    pub fn set_page(&mut self, page: usize) -> bool {
        if page >= self.pages().max(1) || page == self.page {
            return false;
        }
        self.page = page;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.set_page(self.page + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        match self.page.checked_sub(1) {
            Some(p) => self.set_page(p),
            None => false,
        }
    }

    pub fn set_page_size(&mut self, size: usize) {
        self.page_size = size.max(1);
        self.page = 0;
    }
}

impl<R: Sortable> TableState<R> {
    /// Swaps in a new result set
    pub fn replace(&mut self, mut rows: Vec<R>, limit: usize) {
        sort_list(&mut rows, self.sort_field, self.ascending);
        self.limit_reached = limit > 0 && rows.len() == limit;
        self.rows = rows;
        self.page = 0;
        self.generation += 1;
    }

    pub fn sort_by(&mut self, field: &'static str, ascending: bool) {
        self.sort_field = field;
        self.ascending = ascending;
        sort_list(&mut self.rows, field, ascending);
        self.page = 0;
    }
}

/// `#page-3` → page index 2, if that page exists
pub fn page_from_hash(hash: &str, pages: usize) -> Option<usize> {
    let n: usize = hash.strip_prefix("#page-")?.parse().ok()?;
    let index = n.checked_sub(1)?;
    (index < pages).then_some(index)
}

/// Page index 2 → `#page-3`
pub fn page_hash(page: usize) -> String {
    format!("#page-{}", page + 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStep {
    Previous,
    Next,
}

pub fn arrow_key(key: &str) -> Option<PageStep> {
    match key {
        "ArrowLeft" => Some(PageStep::Previous),
        "ArrowRight" => Some(PageStep::Next),
        _ => None,
    }
}

/// Arrow keys are left alone inside text controls
pub fn is_text_entry(node_name: &str) -> bool {
    matches!(node_name.to_ascii_uppercase().as_str(), "INPUT" | "TEXTAREA")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[derive(Debug, Clone, PartialEq)]
    struct Row(i64);

    impl Sortable for Row {
        fn compare_by_field(&self, other: &Self, _field: &str) -> Ordering {
            self.0.cmp(&other.0)
        }
    }

    fn rows(n: i64) -> Vec<Row> {
        (1..=n).map(Row).collect()
    }

    #[test]
    fn test_replace_leaves_one_state() {
        let mut table = TableState::new(25, ("id", false));
        table.replace(rows(30), 500);
        table.set_page(1);
        table.replace(rows(3), 500);
        assert_eq!(table.generation(), 2);
        assert_eq!(table.len(), 3);
        assert_eq!(table.page(), 0);
        assert_eq!(table.rows()[0], Row(3));
    }

    #[test]
    fn test_paging() {
        let mut table = TableState::new(25, ("id", true));
        table.replace(rows(60), 500);
        assert_eq!(table.pages(), 3);
        assert_eq!(table.page_rows().len(), 25);
        assert!(table.next_page());
        assert!(table.next_page());
        assert_eq!(table.page_rows().len(), 10);
        assert!(!table.next_page());
        assert!(table.prev_page());
        assert_eq!(table.page(), 1);
        table.set_page_size(100);
        assert_eq!(table.page(), 0);
        assert_eq!(table.pages(), 1);
        assert!(!table.prev_page());
    }

    #[test]
    fn test_limit_reached() {
        let mut table = TableState::new(25, ("id", true));
        table.replace(rows(5), 5);
        assert!(table.limit_reached());
        table.replace(rows(4), 5);
        assert!(!table.limit_reached());
    }

    #[test]
    fn test_empty_table() {
        let mut table: TableState<Row> = TableState::new(25, ("id", true));
        table.replace(Vec::new(), 500);
        assert_eq!(table.pages(), 0);
        assert!(table.page_rows().is_empty());
        assert!(!table.next_page());
    }

    #[test]
    fn test_sort_and_page_size_return_to_first_page() {
        let mut table = TableState::new(10, ("id", true));
        table.replace(rows(40), 500);
        table.set_page(2);
        table.sort_by("id", false);
        assert_eq!(page_hash(table.page()), "#page-1");
        assert_eq!(table.page_rows()[0], Row(40));

        table.set_page(3);
        table.set_page_size(25);
        assert_eq!(page_hash(table.page()), "#page-1");
    }

    #[test]
    fn test_page_hash() {
        assert_eq!(page_from_hash("#page-3", 3), Some(2));
        assert_eq!(page_from_hash("#page-4", 3), None);
        assert_eq!(page_from_hash("#page-0", 3), None);
        assert_eq!(page_from_hash("#other", 3), None);
        assert_eq!(page_from_hash("", 3), None);
        assert_eq!(page_hash(2), "#page-3");
    }

    #[test]
    fn test_keys() {
        assert_eq!(arrow_key("ArrowLeft"), Some(PageStep::Previous));
        assert_eq!(arrow_key("ArrowRight"), Some(PageStep::Next));
        assert_eq!(arrow_key("a"), None);
        assert!(is_text_entry("INPUT"));
        assert!(is_text_entry("TEXTAREA"));
        assert!(!is_text_entry("BODY"));
    }
}
