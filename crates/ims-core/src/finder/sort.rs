use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Title,
    Type,
    Lead,
    StartDatetime,
    EndDatetime,
    Location,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    pub const ALL: [SortField; 8] = [
        SortField::Title,
        SortField::Type,
        SortField::Lead,
        SortField::StartDatetime,
        SortField::EndDatetime,
        SortField::Location,
        SortField::CreatedAt,
        SortField::UpdatedAt,
    ];

    pub fn api_name(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Type => "type",
            SortField::Lead => "lead",
            SortField::StartDatetime => "start_datetime",
            SortField::EndDatetime => "end_datetime",
            SortField::Location => "location",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }

    /// Accepts the API name plus the short forms `start`, `end`, `created`
    /// and `updated`.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let lower = raw.trim().to_ascii_lowercase();
        let field = match lower.as_str() {
            "start" => Some(SortField::StartDatetime),
            "end" => Some(SortField::EndDatetime),
            "created" => Some(SortField::CreatedAt),
            "updated" => Some(SortField::UpdatedAt),
            other => Self::ALL.iter().copied().find(|f| f.api_name() == other),
        };
        field.ok_or_else(|| CoreError::InvalidSortField(raw.trim().to_string()))
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn api_name(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(CoreError::InvalidSortDirection(raw.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Column-header click: the active column flips direction, any other
    /// column becomes active in ascending order.
    pub fn clicked(self, field: SortField) -> Self {
        if self.field == field {
            Self::new(field, self.direction.toggled())
        } else {
            Self::new(field, SortDirection::Asc)
        }
    }
}

impl Default for Sort {
    fn default() -> Self {
        Self::new(SortField::CreatedAt, SortDirection::Desc)
    }
}

#[cfg(test)]
mod tests {
    use super::{Sort, SortDirection, SortField};

    #[test]
    fn clicking_active_column_toggles() {
        let sort = Sort::new(SortField::Title, SortDirection::Asc);
        let once = sort.clicked(SortField::Title);
        assert_eq!(once, Sort::new(SortField::Title, SortDirection::Desc));
        assert_eq!(
            once.clicked(SortField::Title),
            Sort::new(SortField::Title, SortDirection::Asc)
        );
    }

    #[test]
    fn clicking_other_column_always_starts_ascending() {
        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let sort = Sort::new(SortField::Lead, direction);
            for field in SortField::ALL {
                if field == SortField::Lead {
                    continue;
                }
                assert_eq!(sort.clicked(field), Sort::new(field, SortDirection::Asc));
            }
        }
    }

    #[test]
    fn parse_accepts_short_forms() {
        assert_eq!(SortField::parse("start").unwrap(), SortField::StartDatetime);
        assert_eq!(SortField::parse("Title").unwrap(), SortField::Title);
        assert!(SortField::parse("priority").is_err());
        assert_eq!(SortDirection::parse("DESC").unwrap(), SortDirection::Desc);
    }
}
