pub mod criteria;
pub mod page;
pub mod params;
pub mod query;
pub mod sort;
pub mod tracker;

pub use criteria::FinderCriteria;
pub use page::{total_pages, PageSize, ALLOWED_PAGE_SIZES};
pub use params::ListParams;
pub use query::{FinderDefaults, FinderQuery};
pub use sort::{Sort, SortDirection, SortField};
pub use tracker::{ListOutcome, ListState, ListTicket};

use crate::domain::SiteId;

/// Resets the finder for a newly selected site and issues the first fetch
/// under it. Any request still in flight for the previous site goes stale.
pub fn switch_site(query: &mut FinderQuery, list: &mut ListState, site_id: SiteId) -> ListTicket {
    query.reset_for_site(site_id);
    list.clear();
    list.begin(query)
}
