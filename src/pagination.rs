//! Page windows for list views.

use std::collections::BTreeSet;

use serde::Serialize;

/// Number of rows shown on one page of a list.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;

/// How many page links surround the edges and the current page.
#[derive(Clone, Copy, Debug)]
struct Window {
    edge: usize,
    before_current: usize,
    after_current: usize,
}

const WINDOW: Window = Window {
    edge: 2,
    before_current: 2,
    after_current: 4,
};

/// Page links to render; `None` marks a gap between two runs of pages.
fn page_links(last_page: usize, current: usize, window: Window) -> Vec<Option<usize>> {
    let mut shown = BTreeSet::new();
    shown.extend(1..=window.edge.min(last_page));
    shown.extend(last_page.saturating_sub(window.edge - 1).max(1)..=last_page);
    let from = current.saturating_sub(window.before_current).max(1);
    let to = (current + window.after_current).min(last_page);
    shown.extend(from..=to);

    let mut links = Vec::with_capacity(shown.len() + 2);
    let mut previous = 0;
    for page in shown {
        if page > previous + 1 {
            links.push(None);
        }
        links.push(Some(page));
        previous = page;
    }
    links
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pages: Vec<Option<usize>>,
    pub page: usize,
}

impl<T> Paginated<T> {
    /// Wraps one page of `items` out of `total_items` rows.
    pub fn from_total(items: Vec<T>, page: usize, total_items: usize) -> Self {
        let page = page.max(1);
        let last_page = total_items.div_ceil(DEFAULT_ITEMS_PER_PAGE);

        Self {
            items,
            pages: page_links(last_page, page, WINDOW),
            page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_has_no_links() {
        let page: Paginated<i32> = Paginated::from_total(vec![], 1, 0);
        assert!(page.pages.is_empty());
        assert_eq!(page.page, 1);
    }

    #[test]
    fn page_zero_is_treated_as_first() {
        let page: Paginated<i32> = Paginated::from_total(vec![], 0, 45);
        assert_eq!(page.page, 1);
        assert_eq!(page.pages, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn long_lists_collapse_into_gaps() {
        let links = page_links(30, 15, WINDOW);
        assert_eq!(
            links,
            vec![
                Some(1),
                Some(2),
                None,
                Some(13),
                Some(14),
                Some(15),
                Some(16),
                Some(17),
                Some(18),
                Some(19),
                None,
                Some(29),
                Some(30),
            ]
        );
    }

    #[test]
    fn adjacent_runs_are_not_split() {
        let links = page_links(8, 3, WINDOW);
        assert_eq!(links, (1..=8).map(Some).collect::<Vec<_>>());
    }
}
