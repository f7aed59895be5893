//! Page-number window for the article list.
//!
//! Page 1 and the last page are always shown, along with the current page
//! and two pages either side. Every hidden run of pages becomes one ellipsis.

pub const WINDOW_RADIUS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page { number: u32, active: bool },
    Ellipsis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLink {
    pub target: u32,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub current: u32,
    pub total_pages: u32,
    pub prev: PageLink,
    pub items: Vec<PageItem>,
    pub next: PageLink,
}

impl Pagination {
    /// `None` when there is at most one page, which renders as an empty control.
    pub fn compute(current: u32, total_pages: u32) -> Option<Self> {
        if total_pages <= 1 {
            return None;
        }
        let current = current.max(1);
        Some(Self {
            current,
            total_pages,
            prev: PageLink {
                target: current.saturating_sub(1),
                disabled: current <= 1,
            },
            items: window(current, total_pages),
            next: PageLink {
                target: current.saturating_add(1),
                disabled: current >= total_pages,
            },
        })
    }

    pub fn page_numbers(&self) -> Vec<u32> {
        self.items
            .iter()
            .filter_map(|item| match item {
                PageItem::Page { number, .. } => Some(*number),
                PageItem::Ellipsis => None,
            })
            .collect()
    }
}

fn window(current: u32, total_pages: u32) -> Vec<PageItem> {
    let low = current.saturating_sub(WINDOW_RADIUS).max(1);
    let high = current.saturating_add(WINDOW_RADIUS).min(total_pages);
    let mut numbers: Vec<u32> = Vec::new();
    numbers.push(1);
    numbers.extend(low..=high);
    numbers.push(total_pages);
    numbers.sort_unstable();
    numbers.dedup();

    let mut items = Vec::with_capacity(numbers.len() + 2);
    let mut previous: Option<u32> = None;
    for number in numbers {
        if let Some(prev) = previous {
            if number - prev > 1 {
                items.push(PageItem::Ellipsis);
            }
        }
        items.push(PageItem::Page {
            number,
            active: number == current,
        });
        previous = Some(number);
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ellipsis_count(p: &Pagination) -> usize {
        p.items.iter().filter(|i| matches!(i, PageItem::Ellipsis)).count()
    }

    #[test]
    fn test_single_page_renders_nothing() {
        assert!(Pagination::compute(1, 0).is_none());
        assert!(Pagination::compute(1, 1).is_none());
    }

    #[test]
    fn test_middle_window() {
        let p = Pagination::compute(5, 10).unwrap();
        assert_eq!(p.page_numbers(), vec![1, 3, 4, 5, 6, 7, 10]);
        assert_eq!(
            &p.items[..3],
            &[
                PageItem::Page { number: 1, active: false },
                PageItem::Ellipsis,
                PageItem::Page { number: 3, active: false },
            ]
        );
        assert_eq!(ellipsis_count(&p), 2);
        assert_eq!(p.items[p.items.len() - 2], PageItem::Ellipsis);
        assert!(p.items.contains(&PageItem::Page { number: 5, active: true }));
    }

    #[test]
    fn test_boundaries_disable_controls() {
        let first = Pagination::compute(1, 3).unwrap();
        assert!(first.prev.disabled);
        assert!(!first.next.disabled);
        assert_eq!(first.page_numbers(), vec![1, 2, 3]);
        assert_eq!(ellipsis_count(&first), 0);

        let last = Pagination::compute(3, 3).unwrap();
        assert!(!last.prev.disabled);
        assert!(last.next.disabled);
        assert_eq!(last.prev.target, 2);
    }

    #[test]
    fn test_edges_collapse_one_side() {
        let p = Pagination::compute(1, 10).unwrap();
        assert_eq!(p.page_numbers(), vec![1, 2, 3, 10]);
        assert_eq!(ellipsis_count(&p), 1);

        let p = Pagination::compute(10, 10).unwrap();
        assert_eq!(p.page_numbers(), vec![1, 8, 9, 10]);
        assert_eq!(ellipsis_count(&p), 1);

        let p = Pagination::compute(4, 10).unwrap();
        assert_eq!(p.page_numbers(), vec![1, 2, 3, 4, 5, 6, 10]);
        assert_eq!(ellipsis_count(&p), 1);
    }

    #[test]
    fn test_every_page_count_has_one_prev_and_next() {
        for total in 2..40 {
            for current in 1..=total {
                let p = Pagination::compute(current, total).unwrap();
                assert_eq!(p.prev.disabled, current == 1);
                assert_eq!(p.next.disabled, current == total);
                let pages = p.page_numbers();
                assert_eq!(pages.first(), Some(&1));
                assert_eq!(pages.last(), Some(&total));
                assert!(ellipsis_count(&p) <= 2);
            }
        }
    }
}
