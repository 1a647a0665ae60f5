use crate::CatalogError;
use crate::snapshot::ListingSnapshot;

pub const DEFAULT_PAGE_SIZE: usize = 8;

/// Offset pagination over a full listing snapshot.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Pagination {
    page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn new(page_size: usize) -> Result<Self, CatalogError> {
        if page_size == 0 {
            return Err(CatalogError::InvalidPageSize);
        }
        Ok(Self { page_size })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Lenient page-number parsing: missing, non-numeric or < 1 all mean page 1.
    pub fn parse_page(raw: Option<&str>) -> usize {
        raw.and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(1)
            .max(1)
    }

    pub fn total_pages(&self, total_items: usize) -> usize {
        total_items.div_ceil(self.page_size)
    }

    /// Page `number` (1-based) of `all`.
    ///
    /// Pages past the end are empty rather than an error.
    pub fn page(&self, all: &ListingSnapshot, number: usize) -> Page {
        let number = number.max(1);
        let start = (number - 1).saturating_mul(self.page_size);
        let end = start.saturating_add(self.page_size);
        Page {
            number,
            total_pages: self.total_pages(all.len()),
            total_items: all.len(),
            listings: all.slice(start..end),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    pub number: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub listings: ListingSnapshot,
}

impl Page {
    pub fn has_prev(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    pub fn prev_number(&self) -> Option<usize> {
        self.has_prev().then(|| self.number - 1)
    }

    pub fn next_number(&self) -> Option<usize> {
        self.has_next().then(|| self.number + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::Listing;
    use foundation::geo::LatLon;
    use foundation::ids::ListingId;

    fn all(n: u64) -> ListingSnapshot {
        ListingSnapshot::new(
            (1..=n)
                .map(|i| Listing::new(ListingId(i), format!("P{i}"), LatLon::new(12.9, 77.5)))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn parses_page_leniently() {
        assert_eq!(Pagination::parse_page(None), 1);
        assert_eq!(Pagination::parse_page(Some("abc")), 1);
        assert_eq!(Pagination::parse_page(Some("0")), 1);
        assert_eq!(Pagination::parse_page(Some("-3")), 1);
        assert_eq!(Pagination::parse_page(Some(" 3 ")), 3);
    }

    #[test]
    fn slices_by_offset() {
        let p = Pagination::default();
        let page = p.page(&all(20), 3);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_items, 20);
        let ids: Vec<_> = page.listings.iter().map(|l| l.id.get()).collect();
        assert_eq!(ids, vec![17, 18, 19, 20]);
        assert!(page.has_prev());
        assert!(!page.has_next());
        assert_eq!(page.prev_number(), Some(2));
        assert_eq!(page.next_number(), None);
    }

    #[test]
    fn first_page_has_no_prev() {
        let page = Pagination::default().page(&all(9), 1);
        assert_eq!(page.listings.len(), 8);
        assert!(!page.has_prev());
        assert!(page.has_next());
    }

    #[test]
    fn page_past_end_is_empty() {
        let page = Pagination::new(4).unwrap().page(&all(5), 9);
        assert!(page.listings.is_empty());
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        assert_eq!(Pagination::new(0), Err(CatalogError::InvalidPageSize));
    }
}
