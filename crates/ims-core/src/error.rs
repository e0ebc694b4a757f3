use crate::domain::{InteractionId, SiteId};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid interaction type: {0}")]
    InvalidInteractionType(String),
    #[error("invalid page size: {0} (expected one of 5, 10, 25, 50, 100)")]
    InvalidPageSize(u32),
    #[error("invalid sort field: {0}")]
    InvalidSortField(String),
    #[error("invalid sort direction: {0}")]
    InvalidSortDirection(String),
    #[error("unknown site: {0}")]
    UnknownSite(SiteId),
    #[error("no active site")]
    NoActiveSite,
    #[error("a request is already in flight")]
    RequestInFlight,
    #[error("interaction {0} has not been loaded")]
    NotLoaded(InteractionId),
    #[error("invalid form transition: {0}")]
    InvalidTransition(&'static str),
}

pub type Result<T> = std::result::Result<T, CoreError>;
