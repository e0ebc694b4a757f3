//! In-process implementation of [`InteractionApi`] used by tests and the
//! `--demo` mode. Applies the same filter, sort and paging rules as the
//! server.

use crate::api::InteractionApi;
use crate::error::{ApiError, Result};
use crate::wire::ErrorDetail;
use chrono::{DateTime, Duration, TimeZone, Utc};
use ims_core::rules::END_BEFORE_START;
use ims_core::time::{now_utc, parse_date};
use ims_core::{
    FinderCriteria, Interaction, InteractionId, InteractionPage, InteractionPayload,
    InteractionType, ListParams, PageSize, Site, SiteId, Sort, SortDirection, SortField,
};
use std::cmp::Ordering;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

pub const DUPLICATE_TITLE: &str = "An interaction with this title already exists";

#[derive(Debug, Default)]
struct MemoryState {
    sites: Vec<Site>,
    records: Vec<Interaction>,
    next_id: i64,
}

#[derive(Debug, Default)]
pub struct MemoryApi {
    state: Mutex<MemoryState>,
}

struct ListRequest {
    site_id: SiteId,
    criteria: FinderCriteria,
    sort: Sort,
    page: u32,
    page_size: u32,
}

impl MemoryApi {
    pub fn new(sites: Vec<Site>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                sites,
                records: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Two sites with a few dozen interactions spread across types and leads.
    pub fn demo() -> Self {
        let api = Self::new(vec![
            Site {
                id: SiteId::new(1),
                name: "Headquarters".to_string(),
                description: Some("Main office".to_string()),
            },
            Site {
                id: SiteId::new(2),
                name: "Regional Office".to_string(),
                description: None,
            },
        ]);
        if let Ok(mut state) = api.state.lock() {
            let base = Utc.with_ymd_and_hms(2024, 1, 8, 14, 0, 0).single();
            if let Some(base) = base {
                for index in 0..32 {
                    let site = if index % 4 == 3 { 2 } else { 1 };
                    let record = demo_record(&mut state, SiteId::new(site), index, base);
                    state.records.push(record);
                }
            }
        }
        api
    }

    pub fn len(&self) -> usize {
        self.lock().map(|state| state.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state.lock().map_err(|_| ApiError::Server {
            status: 500,
            message: "in-memory store is unavailable".to_string(),
            request_id: None,
        })
    }
}

impl InteractionApi for MemoryApi {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn list_sites(&self) -> Result<Vec<Site>> {
        Ok(self.lock()?.sites.clone())
    }

    fn list_interactions(&self, params: &ListParams) -> Result<InteractionPage> {
        let request = parse_list_params(params)?;
        let state = self.lock()?;
        ensure_site(&state, request.site_id)?;

        let mut matching: Vec<&Interaction> = state
            .records
            .iter()
            .filter(|record| record.site_id == request.site_id)
            .filter(|record| request.criteria.matches(record))
            .collect();
        matching.sort_by(|a, b| compare(a, b, request.sort));

        let total = matching.len() as u64;
        let offset = (request.page as usize - 1) * request.page_size as usize;
        let records = matching
            .into_iter()
            .skip(offset)
            .take(request.page_size as usize)
            .cloned()
            .collect();
        debug!(site_id = %request.site_id, total, page = request.page, "memory list");
        Ok(InteractionPage {
            records,
            total,
            page: request.page,
            page_size: request.page_size,
        })
    }

    fn get_interaction(&self, site_id: SiteId, id: InteractionId) -> Result<Interaction> {
        let state = self.lock()?;
        find(&state, site_id, id).cloned()
    }

    fn create_interaction(
        &self,
        site_id: SiteId,
        payload: &InteractionPayload,
    ) -> Result<Interaction> {
        let mut state = self.lock()?;
        ensure_site(&state, site_id)?;
        check_payload(&state, site_id, None, payload)?;

        let id = InteractionId::new(state.next_id);
        state.next_id += 1;
        let record = Interaction {
            id,
            site_id,
            title: payload.title.clone(),
            kind: payload.kind,
            lead: payload.lead.clone(),
            start_datetime: payload.start_datetime,
            end_datetime: Some(payload.end_datetime),
            timezone: payload.timezone.clone(),
            location: payload.location.clone(),
            description: payload.description.clone(),
            notes: payload.notes.clone(),
            created_by: None,
            created_at: now_utc(),
            updated_at: None,
        };
        state.records.push(record.clone());
        Ok(record)
    }

    fn update_interaction(
        &self,
        site_id: SiteId,
        id: InteractionId,
        payload: &InteractionPayload,
    ) -> Result<Interaction> {
        let mut state = self.lock()?;
        find(&state, site_id, id)?;
        check_payload(&state, site_id, Some(id), payload)?;

        let record = state
            .records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or_else(|| not_found(id))?;
        record.title = payload.title.clone();
        record.kind = payload.kind;
        record.lead = payload.lead.clone();
        record.start_datetime = payload.start_datetime;
        record.end_datetime = Some(payload.end_datetime);
        record.timezone = payload.timezone.clone();
        record.location = payload.location.clone();
        record.description = payload.description.clone();
        record.notes = payload.notes.clone();
        record.updated_at = Some(now_utc());
        Ok(record.clone())
    }

    fn delete_interaction(&self, site_id: SiteId, id: InteractionId) -> Result<()> {
        let mut state = self.lock()?;
        find(&state, site_id, id)?;
        state.records.retain(|record| record.id != id);
        Ok(())
    }
}

fn parse_list_params(params: &ListParams) -> Result<ListRequest> {
    let invalid = |key: &str, message: String| ApiError::Validation {
        message: "The request contains invalid data.".to_string(),
        details: vec![ErrorDetail {
            field: key.to_string(),
            message,
        }],
        request_id: None,
    };

    let site_id = params
        .get("site_id")
        .ok_or_else(|| invalid("site_id", "Site context is required".to_string()))?
        .parse::<SiteId>()
        .map_err(|err| invalid("site_id", err.to_string()))?;

    let mut criteria = FinderCriteria {
        search: params.get("search").map(str::to_string),
        title: params.get("title").map(str::to_string),
        lead: params.get("lead").map(str::to_string),
        location: params.get("location").map(str::to_string),
        ..FinderCriteria::default()
    };
    if let Some(raw) = params.get("type") {
        criteria.kind =
            Some(InteractionType::parse(raw).map_err(|err| invalid("type", err.to_string()))?);
    }
    if let Some(raw) = params.get("start_date") {
        criteria.start_date =
            Some(parse_date(raw).map_err(|err| invalid("start_date", err.to_string()))?);
    }
    if let Some(raw) = params.get("end_date") {
        criteria.end_date =
            Some(parse_date(raw).map_err(|err| invalid("end_date", err.to_string()))?);
    }

    let mut sort = Sort::default();
    if let Some(raw) = params.get("sort") {
        sort.field = SortField::parse(raw).map_err(|err| invalid("sort", err.to_string()))?;
    }
    if let Some(raw) = params.get("direction") {
        sort.direction =
            SortDirection::parse(raw).map_err(|err| invalid("direction", err.to_string()))?;
    }

    let page = match params.get("page") {
        Some(raw) => raw
            .parse::<u32>()
            .ok()
            .filter(|page| *page >= 1)
            .ok_or_else(|| invalid("page", format!("invalid page: {}", raw)))?,
        None => 1,
    };
    let page_size = match params.get("page_size") {
        Some(raw) => raw
            .parse::<u32>()
            .ok()
            .and_then(|size| PageSize::new(size).ok())
            .ok_or_else(|| invalid("page_size", format!("invalid page size: {}", raw)))?,
        None => PageSize::DEFAULT,
    };

    Ok(ListRequest {
        site_id,
        criteria: criteria.normalized(),
        sort,
        page,
        page_size: page_size.get(),
    })
}

fn compare(a: &Interaction, b: &Interaction, sort: Sort) -> Ordering {
    let ordering = match sort.field {
        SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortField::Type => a.kind.label().cmp(b.kind.label()),
        SortField::Lead => a.lead.to_lowercase().cmp(&b.lead.to_lowercase()),
        SortField::StartDatetime => a.start_datetime.cmp(&b.start_datetime),
        SortField::EndDatetime => a.end_datetime.cmp(&b.end_datetime),
        SortField::Location => a.location.cmp(&b.location),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    };
    let ordering = match sort.direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    };
    ordering.then_with(|| a.id.cmp(&b.id))
}

fn ensure_site(state: &MemoryState, site_id: SiteId) -> Result<()> {
    if state.sites.iter().any(|site| site.id == site_id) {
        Ok(())
    } else {
        Err(ApiError::NotFound(format!("site {}", site_id)))
    }
}

fn find(state: &MemoryState, site_id: SiteId, id: InteractionId) -> Result<&Interaction> {
    state
        .records
        .iter()
        .find(|record| record.id == id && record.site_id == site_id)
        .ok_or_else(|| not_found(id))
}

fn not_found(id: InteractionId) -> ApiError {
    ApiError::NotFound(format!("interaction {}", id))
}

fn check_payload(
    state: &MemoryState,
    site_id: SiteId,
    existing: Option<InteractionId>,
    payload: &InteractionPayload,
) -> Result<()> {
    let mut details = Vec::new();
    let title = payload.title.trim().to_lowercase();
    let duplicate = state.records.iter().any(|record| {
        record.site_id == site_id
            && Some(record.id) != existing
            && record.title.trim().to_lowercase() == title
    });
    if duplicate {
        details.push(ErrorDetail {
            field: "title".to_string(),
            message: DUPLICATE_TITLE.to_string(),
        });
    }
    if payload.end_datetime <= payload.start_datetime {
        details.push(ErrorDetail {
            field: "end_datetime".to_string(),
            message: END_BEFORE_START.to_string(),
        });
    }
    if details.is_empty() {
        return Ok(());
    }
    Err(ApiError::Validation {
        message: "The request contains invalid data.".to_string(),
        details,
        request_id: None,
    })
}

const DEMO_TOPICS: [&str; 8] = [
    "Quarterly planning",
    "Vendor check-in",
    "Budget review",
    "Onboarding session",
    "Safety training",
    "Client follow-up",
    "Product demo",
    "Team retrospective",
];

const DEMO_LEADS: [&str; 4] = ["Jane Smith", "Omar Haddad", "Lena Park", "Carlos Ruiz"];

fn demo_record(
    state: &mut MemoryState,
    site_id: SiteId,
    index: i64,
    base: DateTime<Utc>,
) -> Interaction {
    let id = InteractionId::new(state.next_id);
    state.next_id += 1;
    let slot = index as usize;
    let start = base + Duration::days(index) + Duration::hours(index % 3);
    Interaction {
        id,
        site_id,
        title: format!("{} #{}", DEMO_TOPICS[slot % DEMO_TOPICS.len()], index + 1),
        kind: InteractionType::ALL[slot % InteractionType::ALL.len()],
        lead: DEMO_LEADS[slot % DEMO_LEADS.len()].to_string(),
        start_datetime: start,
        end_datetime: Some(start + Duration::minutes(60)),
        timezone: "America/New_York".to_string(),
        location: match slot % 3 {
            0 => Some("Conference Room A".to_string()),
            1 => Some("Zoom".to_string()),
            _ => None,
        },
        description: None,
        notes: None,
        created_by: None,
        created_at: base - Duration::days(30) + Duration::hours(index),
        updated_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryApi, DUPLICATE_TITLE};
    use crate::api::InteractionApi;
    use crate::error::ApiError;
    use ims_core::{
        FinderCriteria, FinderDefaults, FinderQuery, InteractionType, PageSize, SiteId,
        SortField,
    };

    #[test]
    fn demo_lists_default_order_newest_first() {
        let api = MemoryApi::demo();
        let query = FinderQuery::new(SiteId::new(1), FinderDefaults::default());
        let page = api.list_interactions(&query.params()).expect("list");
        assert_eq!(page.total, 24);
        assert_eq!(page.records.len(), 24);
        assert!(page.records[0].created_at > page.records[1].created_at);
        assert!(page.records.iter().all(|r| r.site_id == SiteId::new(1)));
    }

    #[test]
    fn filters_sort_and_pages() {
        let api = MemoryApi::demo();
        let mut query = FinderQuery::new(SiteId::new(1), FinderDefaults::default());
        query.set_filters(FinderCriteria {
            lead: Some("jane".to_string()),
            ..FinderCriteria::default()
        });
        query.click_sort(SortField::Title);
        query.set_page_size(PageSize::new(5).unwrap());

        let page = api.list_interactions(&query.params()).expect("list");
        assert!(page.records.iter().all(|r| r.lead == "Jane Smith"));
        assert!(page.records.len() <= 5);
        let titles: Vec<_> = page.records.iter().map(|r| r.title.to_lowercase()).collect();
        let mut sorted = titles.clone();
        sorted.sort();
        assert_eq!(titles, sorted);
    }

    #[test]
    fn page_past_end_is_empty_with_total() {
        let api = MemoryApi::demo();
        let mut query = FinderQuery::new(SiteId::new(2), FinderDefaults::default());
        query.apply_total(100);
        assert!(query.set_page(3));
        let page = api.list_interactions(&query.params()).expect("list");
        assert!(page.records.is_empty());
        assert_eq!(page.total, 8);
    }

    #[test]
    fn duplicate_title_is_field_error() {
        let api = MemoryApi::demo();
        let site = SiteId::new(1);
        let existing = api
            .list_interactions(&FinderQuery::new(site, FinderDefaults::default()).params())
            .expect("list")
            .records
            .remove(0);
        let payload = ims_core::InteractionPayload {
            site_id: Some(site),
            title: existing.title.to_uppercase(),
            kind: InteractionType::Call,
            lead: "New lead".to_string(),
            start_datetime: existing.start_datetime,
            end_datetime: existing.end_datetime.expect("end"),
            timezone: "UTC".to_string(),
            location: None,
            description: None,
            notes: None,
        };
        let err = api.create_interaction(site, &payload).unwrap_err();
        let (errors, _) = err.field_errors();
        assert_eq!(errors.get(ims_core::Field::Title), Some(DUPLICATE_TITLE));

        let updated = api
            .update_interaction(site, existing.id, &payload)
            .expect("same record may keep its title");
        assert_eq!(updated.lead, "New lead");
        assert!(updated.updated_at.is_some());
    }

    #[test]
    fn records_are_scoped_to_their_site() {
        let api = MemoryApi::demo();
        let other_site = api
            .list_interactions(&FinderQuery::new(SiteId::new(2), FinderDefaults::default()).params())
            .expect("list")
            .records
            .remove(0);
        let err = api
            .get_interaction(SiteId::new(1), other_site.id)
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(
            api.delete_interaction(SiteId::new(1), other_site.id),
            Err(ApiError::NotFound(_))
        ));
        api.delete_interaction(SiteId::new(2), other_site.id)
            .expect("delete");
        assert_eq!(api.len(), 31);
    }
}
