pub mod domain;
pub mod dto;
pub mod error;
pub mod filter;
pub mod finder;
pub mod form;
pub mod rules;
pub mod site;
pub mod table;
pub mod time;

pub use domain::*;
pub use dto::*;
pub use error::CoreError;
pub use filter::{format_filter, parse_filter, FilterParseError};
pub use finder::{
    switch_site, FinderCriteria, FinderDefaults, FinderQuery, ListOutcome, ListParams, ListState,
    ListTicket, PageSize, Sort, SortDirection, SortField,
};
pub use form::{
    FormController, FormExit, FormMode, FormOutcome, FormPhase, SubmitFailure, SubmitKind,
    SubmitRequest,
};
pub use rules::*;
pub use site::SiteContext;
pub use table::{apply_intent, EmptyKind, TableBody, TableIntent, TableView};
