use crate::domain::ids::{InteractionId, SiteId};
use crate::domain::interaction::{Interaction, InteractionType};
use crate::dto::InteractionPayload;
use crate::rules::fields::{Field, FieldErrors};
use crate::rules::validation::{resolve_instant, validate};
use crate::time::{format_editable, parse_timezone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Editable, possibly invalid copy of an interaction. Timestamps are kept as
/// the text the user typed until submit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionDraft {
    pub id: Option<InteractionId>,
    pub site_id: Option<SiteId>,
    pub title: String,
    pub kind: Option<InteractionType>,
    pub lead: String,
    pub start: String,
    pub end: String,
    pub timezone: String,
    pub location: String,
    pub description: String,
    pub notes: String,
}

impl InteractionDraft {
    pub fn empty(site_id: SiteId, default_timezone: &str) -> Self {
        Self {
            site_id: Some(site_id),
            timezone: default_timezone.to_string(),
            ..Self::default()
        }
    }

    pub fn from_interaction(record: &Interaction) -> Self {
        let tz = parse_timezone(&record.timezone).unwrap_or(Tz::UTC);
        Self {
            id: Some(record.id),
            site_id: Some(record.site_id),
            title: record.title.clone(),
            kind: Some(record.kind),
            lead: record.lead.clone(),
            start: format_editable(record.start_datetime, tz),
            end: record
                .end_datetime
                .map(|ts| format_editable(ts, tz))
                .unwrap_or_default(),
            timezone: record.timezone.clone(),
            location: record.location.clone().unwrap_or_default(),
            description: record.description.clone().unwrap_or_default(),
            notes: record.notes.clone().unwrap_or_default(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    pub fn zone(&self) -> Option<Tz> {
        parse_timezone(&self.timezone).ok()
    }

    pub fn text(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Type => self.kind.map(|kind| kind.label()).unwrap_or(""),
            Field::Lead => &self.lead,
            Field::StartDatetime => &self.start,
            Field::EndDatetime => &self.end,
            Field::Timezone => &self.timezone,
            Field::Location => &self.location,
            Field::Description => &self.description,
            Field::Notes => &self.notes,
        }
    }

    /// Mutable access to free-text fields. `Type` is not free text.
    pub fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Title => Some(&mut self.title),
            Field::Type => None,
            Field::Lead => Some(&mut self.lead),
            Field::StartDatetime => Some(&mut self.start),
            Field::EndDatetime => Some(&mut self.end),
            Field::Timezone => Some(&mut self.timezone),
            Field::Location => Some(&mut self.location),
            Field::Description => Some(&mut self.description),
            Field::Notes => Some(&mut self.notes),
        }
    }

    /// Validates and, when clean, builds the request body for create/update.
    pub fn to_payload(&self) -> Result<InteractionPayload, FieldErrors> {
        let errors = validate(self);
        let zone = self.zone().unwrap_or(Tz::UTC);
        let parts = (
            self.kind,
            resolve_instant(&self.start, zone),
            resolve_instant(&self.end, zone),
        );
        let (Some(kind), Some(start), Some(end)) = parts else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(InteractionPayload {
            site_id: if self.is_new() { self.site_id } else { None },
            title: self.title.trim().to_string(),
            kind,
            lead: self.lead.trim().to_string(),
            start_datetime: start,
            end_datetime: end,
            timezone: self.timezone.trim().to_string(),
            location: optional_text(&self.location),
            description: optional_text(&self.description),
            notes: optional_text(&self.notes),
        })
    }
}

fn optional_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
