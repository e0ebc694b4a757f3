use crate::domain::ids::{InteractionId, SiteId, UserId};
use crate::error::CoreError;
use crate::time::wire_instant;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionType {
    Meeting,
    Call,
    Email,
    Update,
    Training,
    Review,
    Presentation,
    Conference,
    Workshop,
    Other,
}

impl InteractionType {
    pub const ALL: [InteractionType; 10] = [
        InteractionType::Meeting,
        InteractionType::Call,
        InteractionType::Email,
        InteractionType::Update,
        InteractionType::Training,
        InteractionType::Review,
        InteractionType::Presentation,
        InteractionType::Conference,
        InteractionType::Workshop,
        InteractionType::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            InteractionType::Meeting => "Meeting",
            InteractionType::Call => "Call",
            InteractionType::Email => "Email",
            InteractionType::Update => "Update",
            InteractionType::Training => "Training",
            InteractionType::Review => "Review",
            InteractionType::Presentation => "Presentation",
            InteractionType::Conference => "Conference",
            InteractionType::Workshop => "Workshop",
            InteractionType::Other => "Other",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| CoreError::InvalidInteractionType(trimmed.to_string()))
    }

    /// Cycles through the closed set, wrapping at either end.
    pub fn step(current: Option<Self>, forward: bool) -> Self {
        let len = Self::ALL.len();
        let index = match current {
            None => return if forward { Self::ALL[0] } else { Self::ALL[len - 1] },
            Some(kind) => Self::ALL.iter().position(|k| *k == kind).unwrap_or(0),
        };
        let next = if forward {
            (index + 1) % len
        } else {
            (index + len - 1) % len
        };
        Self::ALL[next]
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for InteractionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: InteractionId,
    pub site_id: SiteId,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: InteractionType,
    pub lead: String,
    #[serde(with = "wire_instant")]
    pub start_datetime: DateTime<Utc>,
    #[serde(default, with = "wire_instant::option")]
    pub end_datetime: Option<DateTime<Utc>>,
    pub timezone: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_by: Option<UserId>,
    #[serde(with = "wire_instant")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "wire_instant::option")]
    pub updated_at: Option<DateTime<Utc>>,
}
