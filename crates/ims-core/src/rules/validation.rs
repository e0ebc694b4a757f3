use crate::domain::InteractionDraft;
use crate::rules::fields::{Field, FieldErrors};
use crate::time::parse_instant;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

pub const MAX_TITLE_LENGTH: usize = 255;
pub const MAX_LEAD_LENGTH: usize = 100;
pub const MAX_LOCATION_LENGTH: usize = 255;
pub const MAX_DESCRIPTION_LENGTH: usize = 5000;
pub const MAX_NOTES_LENGTH: usize = 2000;

pub const TITLE_REQUIRED: &str = "Title is required";
pub const TYPE_REQUIRED: &str = "Type is required";
pub const LEAD_REQUIRED: &str = "Lead is required";
pub const START_REQUIRED: &str = "Start date/time is required";
pub const END_REQUIRED: &str = "End date/time is required";
pub const END_BEFORE_START: &str = "End date/time must be after start date/time";
pub const INVALID_TIMEZONE: &str = "Invalid timezone";

/// Runs every field rule against `draft`. An empty result means the draft can
/// be submitted.
pub fn validate(draft: &InteractionDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();

    require_text(&mut errors, Field::Title, &draft.title, TITLE_REQUIRED);
    check_length(&mut errors, Field::Title, &draft.title, MAX_TITLE_LENGTH, "Title");

    if draft.kind.is_none() {
        errors.insert(Field::Type, TYPE_REQUIRED);
    }

    require_text(&mut errors, Field::Lead, &draft.lead, LEAD_REQUIRED);
    check_length(&mut errors, Field::Lead, &draft.lead, MAX_LEAD_LENGTH, "Lead name");

    let tz = draft.zone();
    if tz.is_none() {
        errors.insert(Field::Timezone, INVALID_TIMEZONE);
    }

    // Without a valid zone both ends are read in UTC, which keeps them comparable.
    let zone = tz.unwrap_or(Tz::UTC);
    let start = resolve_instant(&draft.start, zone);
    let end = resolve_instant(&draft.end, zone);

    if start.is_none() {
        errors.insert(Field::StartDatetime, START_REQUIRED);
    }
    match (start, end) {
        (_, None) => errors.insert(Field::EndDatetime, END_REQUIRED),
        (Some(start), Some(end)) if end <= start => {
            errors.insert(Field::EndDatetime, END_BEFORE_START)
        }
        _ => {}
    }

    check_length(
        &mut errors,
        Field::Location,
        &draft.location,
        MAX_LOCATION_LENGTH,
        "Location",
    );
    check_length(
        &mut errors,
        Field::Description,
        &draft.description,
        MAX_DESCRIPTION_LENGTH,
        "Description",
    );
    check_length(&mut errors, Field::Notes, &draft.notes, MAX_NOTES_LENGTH, "Notes");

    errors
}

pub(crate) fn resolve_instant(raw: &str, tz: Tz) -> Option<DateTime<Utc>> {
    parse_instant(raw, tz).ok()
}

fn require_text(errors: &mut FieldErrors, field: Field, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.insert(field, message);
    }
}

fn check_length(errors: &mut FieldErrors, field: Field, value: &str, max: usize, label: &str) {
    if errors.contains(field) {
        return;
    }
    if value.trim().chars().count() > max {
        errors.insert(field, format!("{} must be less than {} characters", label, max));
    }
}
