use crate::domain::SiteId;
use crate::finder::criteria::FinderCriteria;
use crate::finder::page::{total_pages, PageSize};
use crate::finder::params::ListParams;
use crate::finder::sort::{Sort, SortDirection, SortField};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FinderDefaults {
    pub page_size: PageSize,
    pub sort: Sort,
}

/// Filter, sort and pagination state of the finder for one site.
///
/// This type performs no I/O. It owns the page/sort arithmetic and derives the
/// parameters the API client sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinderQuery {
    site_id: SiteId,
    defaults: FinderDefaults,
    criteria: FinderCriteria,
    sort: Sort,
    page: u32,
    page_size: PageSize,
    total_records: Option<u64>,
}

impl FinderQuery {
    pub fn new(site_id: SiteId, defaults: FinderDefaults) -> Self {
        Self {
            site_id,
            defaults,
            criteria: FinderCriteria::default(),
            sort: defaults.sort,
            page: 1,
            page_size: defaults.page_size,
            total_records: None,
        }
    }

    pub fn site_id(&self) -> SiteId {
        self.site_id
    }

    pub fn criteria(&self) -> &FinderCriteria {
        &self.criteria
    }

    pub fn sort(&self) -> Sort {
        self.sort
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn total_records(&self) -> Option<u64> {
        self.total_records
    }

    pub fn total_pages(&self) -> Option<u32> {
        self.total_records
            .map(|total| total_pages(total, self.page_size.get()))
    }

    pub fn has_filters(&self) -> bool {
        !self.criteria.is_empty()
    }

    /// Replaces the whole filter set and returns to the first page.
    pub fn set_filters(&mut self, criteria: FinderCriteria) {
        self.criteria = criteria.normalized();
        self.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.set_filters(FinderCriteria::default());
    }

    /// Explicit sort selection. Leaves filters and page untouched.
    pub fn set_sort(&mut self, field: SortField, direction: SortDirection) {
        self.sort = Sort::new(field, direction);
    }

    /// Column-header click semantics; see [`Sort::clicked`].
    pub fn click_sort(&mut self, field: SortField) {
        self.sort = self.sort.clicked(field);
    }

    /// Moves to page `n`. Returns `false` (and changes nothing) when `n` is
    /// outside `[1, total_pages]` or already current.
    pub fn set_page(&mut self, n: u32) -> bool {
        if n < 1 || n == self.page {
            return false;
        }
        if let Some(pages) = self.total_pages() {
            if n > pages {
                return false;
            }
        }
        self.page = n;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.set_page(self.page.saturating_add(1))
    }

    pub fn prev_page(&mut self) -> bool {
        self.set_page(self.page.saturating_sub(1))
    }

    pub fn set_page_size(&mut self, size: PageSize) {
        self.page_size = size;
        self.page = 1;
    }

    /// Records the server-reported total and clamps the current page into
    /// range. Returns `true` when the page had to move.
    pub fn apply_total(&mut self, total: u64) -> bool {
        self.total_records = Some(total);
        let last = total_pages(total, self.page_size.get()).max(1);
        let clamped = self.page.clamp(1, last);
        let moved = clamped != self.page;
        self.page = clamped;
        moved
    }

    /// Back to defaults under `site_id`: first page, no filters, default sort
    /// and page size.
    pub fn reset_for_site(&mut self, site_id: SiteId) {
        *self = Self::new(site_id, self.defaults);
    }

    pub fn params(&self) -> ListParams {
        let mut params = ListParams::new();
        self.criteria.push_params(&mut params);
        params.push("sort", self.sort.field.api_name());
        params.push("direction", self.sort.direction.api_name());
        params.push("page", self.page.to_string());
        params.push("page_size", self.page_size.get().to_string());
        params.push("site_id", self.site_id.to_string());
        params
    }
}
