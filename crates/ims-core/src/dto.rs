use crate::domain::{Interaction, InteractionType, SiteId};
use crate::finder::page::total_pages;
use crate::time::wire_instant;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request body for create and update calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<SiteId>,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: InteractionType,
    pub lead: String,
    #[serde(with = "wire_instant")]
    pub start_datetime: DateTime<Utc>,
    #[serde(with = "wire_instant")]
    pub end_datetime: DateTime<Utc>,
    pub timezone: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
}

/// One page of list results as reported by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionPage {
    pub records: Vec<Interaction>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl InteractionPage {
    pub fn total_pages(&self) -> u32 {
        total_pages(self.total, self.page_size)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
