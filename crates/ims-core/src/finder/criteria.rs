use crate::domain::{Interaction, InteractionType};
use crate::finder::params::ListParams;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Finder filter criteria. Every present criterion must match (AND).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinderCriteria {
    pub search: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<InteractionType>,
    pub lead: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub location: Option<String>,
}

impl FinderCriteria {
    /// Trims text criteria and drops blank ones.
    pub fn normalized(self) -> Self {
        Self {
            search: clean(self.search),
            title: clean(self.title),
            kind: self.kind,
            lead: clean(self.lead),
            start_date: self.start_date,
            end_date: self.end_date,
            location: clean(self.location),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.title.is_none()
            && self.kind.is_none()
            && self.lead.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.location.is_none()
    }

    pub(crate) fn push_params(&self, params: &mut ListParams) {
        if let Some(value) = &self.search {
            params.push("search", value.clone());
        }
        if let Some(value) = &self.title {
            params.push("title", value.clone());
        }
        if let Some(kind) = self.kind {
            params.push("type", kind.label());
        }
        if let Some(value) = &self.lead {
            params.push("lead", value.clone());
        }
        if let Some(date) = self.start_date {
            params.push("start_date", date.format("%Y-%m-%d").to_string());
        }
        if let Some(date) = self.end_date {
            params.push("end_date", date.format("%Y-%m-%d").to_string());
        }
        if let Some(value) = &self.location {
            params.push("location", value.clone());
        }
    }

    /// Client-side evaluation of the criteria, mirroring the server's rules:
    /// case-insensitive substring for text, exact type, inclusive date range
    /// on the start date (UTC).
    pub fn matches(&self, record: &Interaction) -> bool {
        if let Some(term) = &self.search {
            let haystacks = [
                Some(record.title.as_str()),
                Some(record.lead.as_str()),
                Some(record.kind.label()),
                record.location.as_deref(),
                record.description.as_deref(),
                record.notes.as_deref(),
            ];
            if !haystacks.iter().flatten().any(|text| contains_ci(text, term)) {
                return false;
            }
        }
        if let Some(term) = &self.title {
            if !contains_ci(&record.title, term) {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if record.kind != kind {
                return false;
            }
        }
        if let Some(term) = &self.lead {
            if !contains_ci(&record.lead, term) {
                return false;
            }
        }
        let start_date = record.start_datetime.date_naive();
        if let Some(from) = self.start_date {
            if start_date < from {
                return false;
            }
        }
        if let Some(to) = self.end_date {
            if start_date > to {
                return false;
            }
        }
        if let Some(term) = &self.location {
            match record.location.as_deref() {
                Some(location) if contains_ci(location, term) => {}
                _ => return false,
            }
        }
        true
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::FinderCriteria;
    use crate::domain::{Interaction, InteractionId, InteractionType, SiteId};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn record() -> Interaction {
        Interaction {
            id: InteractionId::new(1),
            site_id: SiteId::new(1),
            title: "Vendor Onboarding".to_string(),
            kind: InteractionType::Training,
            lead: "Priya Patel".to_string(),
            start_datetime: Utc.with_ymd_and_hms(2024, 2, 14, 15, 0, 0).unwrap(),
            end_datetime: None,
            timezone: "UTC".to_string(),
            location: Some("HQ Room 2".to_string()),
            description: Some("walkthrough of the portal".to_string()),
            notes: None,
            created_by: None,
            created_at: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn normalized_drops_blank_text() {
        let criteria = FinderCriteria {
            title: Some("  ".to_string()),
            lead: Some(" Priya ".to_string()),
            ..FinderCriteria::default()
        }
        .normalized();
        assert_eq!(criteria.title, None);
        assert_eq!(criteria.lead.as_deref(), Some("Priya"));
        assert!(!criteria.is_empty());
        assert!(FinderCriteria::default().normalized().is_empty());
    }

    #[test]
    fn criteria_combine_with_and() {
        let record = record();
        let both = FinderCriteria {
            title: Some("onboarding".to_string()),
            kind: Some(InteractionType::Training),
            ..FinderCriteria::default()
        };
        assert!(both.matches(&record));

        let wrong_type = FinderCriteria {
            kind: Some(InteractionType::Call),
            ..both.clone()
        };
        assert!(!wrong_type.matches(&record));
    }

    #[test]
    fn search_spans_text_fields() {
        let record = record();
        let search = |term: &str| FinderCriteria {
            search: Some(term.to_string()),
            ..FinderCriteria::default()
        };
        assert!(search("portal").matches(&record));
        assert!(search("training").matches(&record));
        assert!(!search("budget").matches(&record));
    }

    #[test]
    fn date_range_is_inclusive() {
        let record = record();
        let day = NaiveDate::from_ymd_opt(2024, 2, 14).unwrap();
        let criteria = FinderCriteria {
            start_date: Some(day),
            end_date: Some(day),
            ..FinderCriteria::default()
        };
        assert!(criteria.matches(&record));

        let later = FinderCriteria {
            start_date: day.succ_opt(),
            ..FinderCriteria::default()
        };
        assert!(!later.matches(&record));
    }

    #[test]
    fn location_filter_excludes_records_without_location() {
        let mut record = record();
        record.location = None;
        let criteria = FinderCriteria {
            location: Some("HQ".to_string()),
            ..FinderCriteria::default()
        };
        assert!(!criteria.matches(&record));
    }
}
