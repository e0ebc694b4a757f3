//! Presentation model for the finder table. Front ends render a [`TableView`]
//! and report clicks back as [`TableIntent`]s; neither touches records.

use crate::domain::{Interaction, InteractionId};
use crate::finder::{FinderQuery, ListState, PageSize, SortDirection, SortField};
use crate::time::format_in_timezone;

pub const MAX_SKELETON_ROWS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub title: &'static str,
    pub field: SortField,
}

pub const COLUMNS: [Column; 6] = [
    Column {
        title: "Title",
        field: SortField::Title,
    },
    Column {
        title: "Type",
        field: SortField::Type,
    },
    Column {
        title: "Lead",
        field: SortField::Lead,
    },
    Column {
        title: "Start",
        field: SortField::StartDatetime,
    },
    Column {
        title: "End",
        field: SortField::EndDatetime,
    },
    Column {
        title: "Location",
        field: SortField::Location,
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub column: Column,
    /// Set only on the column the finder is sorted by.
    pub indicator: Option<SortDirection>,
}

impl HeaderCell {
    pub fn label(&self) -> String {
        match self.indicator {
            Some(SortDirection::Asc) => format!("{} ▲", self.column.title),
            Some(SortDirection::Desc) => format!("{} ▼", self.column.title),
            None => self.column.title.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub id: InteractionId,
    pub cells: [String; 6],
}

impl TableRow {
    pub fn from_record(record: &Interaction) -> Self {
        Self {
            id: record.id,
            cells: [
                record.title.clone(),
                record.kind.label().to_string(),
                record.lead.clone(),
                format_in_timezone(record.start_datetime, &record.timezone),
                record
                    .end_datetime
                    .map(|ts| format_in_timezone(ts, &record.timezone))
                    .unwrap_or_default(),
                record.location.clone().unwrap_or_default(),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyKind {
    /// Filters are active; the way out is clearing them.
    NoMatches,
    /// Nothing exists for this site yet; the way out is creating a record.
    NoData,
}

impl EmptyKind {
    pub fn message(&self) -> &'static str {
        match self {
            EmptyKind::NoMatches => "No interactions match the current filters",
            EmptyKind::NoData => "No interactions yet",
        }
    }

    pub fn action_hint(&self) -> &'static str {
        match self {
            EmptyKind::NoMatches => "Clear filters",
            EmptyKind::NoData => "Create interaction",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableBody {
    Skeleton(usize),
    Empty(EmptyKind),
    /// The fetch failed and there is nothing previous to show.
    Failed(String),
    Rows(Vec<TableRow>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub total_pages: u32,
    pub page_size: PageSize,
    pub total: u64,
}

impl Pagination {
    pub fn first_index(&self) -> u64 {
        if self.total == 0 {
            return 0;
        }
        u64::from(self.page - 1) * u64::from(self.page_size.get()) + 1
    }

    pub fn last_index(&self) -> u64 {
        (u64::from(self.page) * u64::from(self.page_size.get())).min(self.total)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn summary(&self) -> String {
        if self.total == 0 {
            return "Showing 0 of 0".to_string();
        }
        format!(
            "Showing {}–{} of {} · page {} of {}",
            self.first_index(),
            self.last_index(),
            self.total,
            self.page,
            self.total_pages.max(1)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub header: Vec<HeaderCell>,
    pub body: TableBody,
    pub loading: bool,
    /// Page-level error shown above rows that are still from an earlier fetch.
    pub banner: Option<String>,
    pub pagination: Option<Pagination>,
}

impl TableView {
    pub fn build(query: &FinderQuery, list: &ListState) -> Self {
        let sort = query.sort();
        let header = COLUMNS
            .iter()
            .map(|column| HeaderCell {
                column: *column,
                indicator: (column.field == sort.field).then_some(sort.direction),
            })
            .collect();

        let records = list.records();
        // Rows on screen belong to the previous query until the fetch lands.
        let mut banner = if list.is_loading() {
            None
        } else {
            list.error().map(str::to_string)
        };
        let body = if list.is_loading() {
            TableBody::Skeleton((query.page_size().get() as usize).min(MAX_SKELETON_ROWS))
        } else if !records.is_empty() {
            TableBody::Rows(records.iter().map(TableRow::from_record).collect())
        } else if let Some(error) = banner.take() {
            TableBody::Failed(error)
        } else if !list.is_loaded() {
            TableBody::Skeleton(0)
        } else if query.has_filters() {
            TableBody::Empty(EmptyKind::NoMatches)
        } else {
            TableBody::Empty(EmptyKind::NoData)
        };

        let pagination = list.total().map(|total| Pagination {
            page: query.page(),
            total_pages: query.total_pages().unwrap_or(0),
            page_size: query.page_size(),
            total,
        });

        Self {
            header,
            body,
            loading: list.is_loading(),
            banner,
            pagination,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableIntent {
    SortColumnClicked(SortField),
    PageChanged(u32),
    PageSizeChanged(PageSize),
    FiltersCleared,
}

/// Applies a table intent to the finder. Returns `true` when the derived
/// request parameters changed and a fetch is due.
pub fn apply_intent(query: &mut FinderQuery, intent: TableIntent) -> bool {
    let before = query.params();
    match intent {
        TableIntent::SortColumnClicked(field) => query.click_sort(field),
        TableIntent::PageChanged(page) => {
            query.set_page(page);
        }
        TableIntent::PageSizeChanged(size) => query.set_page_size(size),
        TableIntent::FiltersCleared => query.clear_filters(),
    }
    query.params() != before
}
