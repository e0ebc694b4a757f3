use crate::domain::InteractionType;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterTerm {
    Text(String),
    Title(String),
    Type(InteractionType),
    Lead(String),
    From(NaiveDate),
    To(NaiveDate),
    Location(String),
}
