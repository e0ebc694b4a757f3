use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Editable interaction fields, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Title,
    Type,
    Lead,
    StartDatetime,
    EndDatetime,
    Timezone,
    Location,
    Description,
    Notes,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Title,
        Field::Type,
        Field::Lead,
        Field::StartDatetime,
        Field::EndDatetime,
        Field::Timezone,
        Field::Location,
        Field::Description,
        Field::Notes,
    ];

    /// Name used by the API in payloads and error details.
    pub fn api_name(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Type => "type",
            Field::Lead => "lead",
            Field::StartDatetime => "start_datetime",
            Field::EndDatetime => "end_datetime",
            Field::Timezone => "timezone",
            Field::Location => "location",
            Field::Description => "description",
            Field::Notes => "notes",
        }
    }

    pub fn from_api_name(name: &str) -> Option<Field> {
        let trimmed = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.api_name() == trimmed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Type => "Type",
            Field::Lead => "Lead",
            Field::StartDatetime => "Start",
            Field::EndDatetime => "End",
            Field::Timezone => "Timezone",
            Field::Location => "Location",
            Field::Description => "Description",
            Field::Notes => "Notes",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}

/// Field-scoped error messages; one message per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn remove(&mut self, field: Field) -> Option<String> {
        self.0.remove(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// Overlays `other` onto `self`; fields absent from `other` keep their message.
    pub fn merge(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }
}

impl FromIterator<(Field, String)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (Field, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Field, FieldErrors};

    #[test]
    fn api_names_round_trip() {
        for field in Field::ALL {
            assert_eq!(Field::from_api_name(field.api_name()), Some(field));
        }
        assert_eq!(Field::from_api_name("site_id"), None);
    }

    #[test]
    fn merge_overlays_without_dropping_other_fields() {
        let mut errors = FieldErrors::new();
        errors.insert(Field::Lead, "Lead is required");
        errors.insert(Field::Title, "Title is required");

        let mut server = FieldErrors::new();
        server.insert(Field::Title, "Title already exists");
        errors.merge(server);

        assert_eq!(errors.get(Field::Title), Some("Title already exists"));
        assert_eq!(errors.get(Field::Lead), Some("Lead is required"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn serializes_as_api_keyed_map() {
        let mut errors = FieldErrors::new();
        errors.insert(Field::EndDatetime, "End date/time is required");
        let json = serde_json::to_string(&errors).unwrap();
        assert_eq!(json, r#"{"end_datetime":"End date/time is required"}"#);
    }
}
