//! Page-number pagination helpers for list displays.

use std::fmt;

/// At most this many pages are listed before the display collapses into
/// ellipses.
const MAX_LISTED_PAGES: u32 = 5;

/// One slot of a page selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMarker {
    Page(u32),
    /// Non-interactive gap.
    Ellipsis,
}

impl fmt::Display for PageMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageMarker::Page(n) => write!(f, "{n}"),
            PageMarker::Ellipsis => f.write_str("…"),
        }
    }
}

/// Markers for current page `page` out of `total` pages.
///
/// Up to five pages are listed in full. Beyond that the first and last page
/// are always present, with the current neighborhood in between.
pub fn page_markers(page: u32, total: u32) -> Vec<PageMarker> {
    use PageMarker::{Ellipsis, Page};

    if total <= MAX_LISTED_PAGES {
        return (1..=total).map(Page).collect();
    }

    if page <= 3 {
        let mut markers: Vec<_> = (1..=4).map(Page).collect();
        markers.extend([Ellipsis, Page(total)]);
        markers
    } else if page >= total - 2 {
        let mut markers = vec![Page(1), Ellipsis];
        markers.extend((total - 3..=total).map(Page));
        markers
    } else {
        vec![
            Page(1),
            Ellipsis,
            Page(page - 1),
            Page(page),
            Page(page + 1),
            Ellipsis,
            Page(total),
        ]
    }
}

/// Previous/next targets and markers for a page selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageNavigation {
    pub current: u32,
    pub total: u32,
    pub markers: Vec<PageMarker>,
}

impl PageNavigation {
    pub fn new(current: u32, total: u32) -> Self {
        Self {
            current,
            total,
            markers: page_markers(current, total),
        }
    }

    /// A single page needs no selector.
    pub fn is_visible(&self) -> bool {
        self.total > 1
    }

    pub fn previous(&self) -> Option<u32> {
        (self.current > 1).then(|| self.current - 1)
    }

    pub fn next(&self) -> Option<u32> {
        (self.current < self.total).then(|| self.current + 1)
    }
}

impl fmt::Display for PageNavigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.previous().is_some() { "‹" } else { " " })?;
        for marker in &self.markers {
            match marker {
                PageMarker::Page(n) if *n == self.current => write!(f, " [{n}]")?,
                other => write!(f, " {other}")?,
            }
        }
        f.write_str(if self.next().is_some() { " ›" } else { "  " })
    }
}

#[cfg(test)]
mod tests {
    use super::PageMarker::{Ellipsis, Page};
    use super::*;

    #[test]
    fn small_totals_list_every_page() {
        for total in 0..=5 {
            for page in 1..=total.max(1) {
                let markers = page_markers(page, total);
                let expected: Vec<_> = (1..=total).map(Page).collect();
                assert_eq!(markers, expected, "page {page} of {total}");
                assert!(!markers.contains(&Ellipsis));
            }
        }
    }

    #[test]
    fn near_start_shows_first_four() {
        for total in 6..=20 {
            for page in 1..=3 {
                assert_eq!(
                    page_markers(page, total),
                    vec![Page(1), Page(2), Page(3), Page(4), Ellipsis, Page(total)]
                );
            }
        }
    }

    #[test]
    fn near_end_shows_last_four() {
        for total in 6..=20 {
            for page in (total - 2)..=total {
                if page <= 3 {
                    continue;
                }
                assert_eq!(
                    page_markers(page, total),
                    vec![
                        Page(1),
                        Ellipsis,
                        Page(total - 3),
                        Page(total - 2),
                        Page(total - 1),
                        Page(total)
                    ]
                );
            }
        }
    }

    #[test]
    fn middle_shows_neighbors() {
        assert_eq!(
            page_markers(5, 10),
            vec![
                Page(1),
                Ellipsis,
                Page(4),
                Page(5),
                Page(6),
                Ellipsis,
                Page(10)
            ]
        );
    }

    #[test]
    fn six_pages_on_page_three_prefers_start_layout() {
        assert_eq!(
            page_markers(3, 6),
            vec![Page(1), Page(2), Page(3), Page(4), Ellipsis, Page(6)]
        );
    }

    #[test]
    fn navigation_disables_edges() {
        let first = PageNavigation::new(1, 7);
        assert_eq!(first.previous(), None);
        assert_eq!(first.next(), Some(2));

        let last = PageNavigation::new(7, 7);
        assert_eq!(last.previous(), Some(6));
        assert_eq!(last.next(), None);

        assert!(!PageNavigation::new(1, 1).is_visible());
    }

    #[test]
    fn navigation_renders_current_page() {
        assert_eq!(PageNavigation::new(2, 3).to_string(), "‹ 1 [2] 3 ›");
    }
}
