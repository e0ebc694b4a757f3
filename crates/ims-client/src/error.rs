use crate::wire::ErrorDetail;
use ims_core::{Field, FieldErrors, SubmitFailure};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server rejected the payload; `details` name the offending fields.
    #[error("{message}")]
    Validation {
        message: String,
        details: Vec<ErrorDetail>,
        request_id: Option<String>,
    },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("not authorized: {0}")]
    Unauthorized(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("server error ({status}): {message}")]
    Server {
        status: u16,
        message: String,
        request_id: Option<String>,
    },
    #[error("http error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }

    /// Field errors the form can show inline, plus details for fields the
    /// form does not know.
    pub fn field_errors(&self) -> (FieldErrors, Vec<&ErrorDetail>) {
        let mut errors = FieldErrors::new();
        let mut unknown = Vec::new();
        if let ApiError::Validation { details, .. } = self {
            for detail in details {
                match Field::from_api_name(&detail.field) {
                    Some(field) => errors.insert(field, detail.message.clone()),
                    None => unknown.push(detail),
                }
            }
        }
        (errors, unknown)
    }

    /// Splits a create/update failure into what the form displays inline and
    /// what it shows as a page-level error.
    pub fn submit_failure(&self) -> SubmitFailure {
        if !matches!(self, ApiError::Validation { .. }) {
            return SubmitFailure::Page(self.to_string());
        }
        let (errors, unknown) = self.field_errors();
        let mut message = self.to_string();
        if !unknown.is_empty() {
            let extra: Vec<String> = unknown
                .iter()
                .map(|detail| {
                    if detail.field.is_empty() {
                        detail.message.clone()
                    } else {
                        format!("{}: {}", detail.field, detail.message)
                    }
                })
                .collect();
            message = format!("{} ({})", message, extra.join("; "));
        }
        if errors.is_empty() {
            SubmitFailure::Page(message)
        } else {
            SubmitFailure::Fields {
                errors,
                message: Some(message),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use crate::wire::ErrorDetail;
    use ims_core::{Field, SubmitFailure};

    fn detail(field: &str, message: &str) -> ErrorDetail {
        ErrorDetail {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn validation_maps_known_fields_and_folds_unknown() {
        let err = ApiError::Validation {
            message: "The request contains invalid data.".to_string(),
            details: vec![
                detail("title", "An interaction with this title already exists"),
                detail("start_datetime", "Start date/time is required"),
                detail("site_id", "Site is not accessible"),
            ],
            request_id: None,
        };
        let SubmitFailure::Fields { errors, message } = err.submit_failure() else {
            panic!("expected field failure");
        };
        assert_eq!(errors.len(), 2);
        assert!(errors.contains(Field::StartDatetime));
        assert_eq!(
            message.as_deref(),
            Some("The request contains invalid data. (site_id: Site is not accessible)")
        );
    }

    #[test]
    fn validation_without_known_fields_is_page_level() {
        let err = ApiError::Validation {
            message: "Bad input".to_string(),
            details: vec![],
            request_id: None,
        };
        assert_eq!(
            err.submit_failure(),
            SubmitFailure::Page("Bad input".to_string())
        );
    }

    #[test]
    fn fieldless_detail_reaches_the_page_message() {
        let err = ApiError::Validation {
            message: "The request contains invalid data.".to_string(),
            details: vec![detail("", "End must follow start")],
            request_id: None,
        };
        assert_eq!(
            err.submit_failure(),
            SubmitFailure::Page(
                "The request contains invalid data. (End must follow start)".to_string()
            )
        );
    }

    #[test]
    fn server_errors_are_page_level() {
        let err = ApiError::Server {
            status: 503,
            message: "unavailable".to_string(),
            request_id: None,
        };
        assert_eq!(
            err.submit_failure(),
            SubmitFailure::Page("server error (503): unavailable".to_string())
        );
    }
}
