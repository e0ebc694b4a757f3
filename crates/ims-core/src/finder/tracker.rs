use crate::domain::{Interaction, InteractionId};
use crate::dto::InteractionPage;
use crate::finder::params::ListParams;
use crate::finder::query::FinderQuery;
use std::fmt;

/// Tag attached to a list request: a sequence number plus the parameter
/// snapshot it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTicket {
    seq: u64,
    params: ListParams,
}

impl ListTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn params(&self) -> &ListParams {
        &self.params
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOutcome {
    /// Records replaced with the response.
    Applied,
    /// Records replaced, but the reported total moved the current page; the
    /// caller should fetch again.
    PageClamped,
    /// The request failed; previous records are kept and an error is shown.
    Failed,
    /// The response no longer matches the current query and was dropped.
    Stale,
}

/// What the finder table displays, plus loading/error flags.
#[derive(Debug, Clone, Default)]
pub struct ListState {
    records: Vec<Interaction>,
    total: Option<u64>,
    loading: bool,
    loaded: bool,
    error: Option<String>,
    next_seq: u64,
    pending: Option<ListTicket>,
}

impl ListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a fetch for the current query as in flight and returns its tag.
    /// A newer call supersedes any earlier pending ticket.
    pub fn begin(&mut self, query: &FinderQuery) -> ListTicket {
        self.next_seq += 1;
        let ticket = ListTicket {
            seq: self.next_seq,
            params: query.params(),
        };
        self.loading = true;
        self.pending = Some(ticket.clone());
        ticket
    }

    /// Applies a response if it belongs to the latest request and still
    /// matches `query`; anything else is discarded untouched.
    pub fn resolve<E: fmt::Display>(
        &mut self,
        ticket: &ListTicket,
        query: &mut FinderQuery,
        result: Result<InteractionPage, E>,
    ) -> ListOutcome {
        if self.pending.as_ref() != Some(ticket) || ticket.params != query.params() {
            return ListOutcome::Stale;
        }
        self.pending = None;
        self.loading = false;

        match result {
            Ok(page) => {
                self.records = page.records;
                self.total = Some(page.total);
                self.loaded = true;
                self.error = None;
                if query.apply_total(page.total) {
                    ListOutcome::PageClamped
                } else {
                    ListOutcome::Applied
                }
            }
            Err(err) => {
                self.error = Some(err.to_string());
                ListOutcome::Failed
            }
        }
    }

    /// Drops everything shown and forgets the pending request.
    pub fn clear(&mut self) {
        self.records.clear();
        self.total = None;
        self.loading = false;
        self.loaded = false;
        self.error = None;
        self.pending = None;
    }

    /// Removes a deleted record from the displayed page.
    pub fn remove(&mut self, id: InteractionId) -> bool {
        let before = self.records.len();
        self.records.retain(|record| record.id != id);
        let removed = self.records.len() != before;
        if removed {
            if let Some(total) = self.total.as_mut() {
                *total = total.saturating_sub(1);
            }
        }
        removed
    }

    pub fn records(&self) -> &[Interaction] {
        &self.records
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_empty(&self) -> bool {
        self.loaded && self.records.is_empty()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn pending(&self) -> Option<&ListTicket> {
        self.pending.as_ref()
    }
}
