//! JSON envelopes used by the interaction API.
//!
//! Success bodies look like `{"status": "success", "data": {...}, "meta": {...}}`;
//! failures like `{"error": {"code", "message", "requestId", "details": [...]}}`.

use crate::error::ApiError;
use ims_core::{Interaction, InteractionPage, Site};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Empty when the server reports a problem with the request as a whole.
    #[serde(default)]
    pub field: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
    #[serde(default)]
    pub meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Meta {
    pub pagination: Option<PaginationMeta>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InteractionList {
    pub interactions: Vec<Interaction>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SingleInteraction {
    pub interaction: Interaction,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SiteList {
    pub sites: Vec<Site>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
    #[serde(default, rename = "requestId")]
    request_id: Option<String>,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

pub(crate) fn decode<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|err| ApiError::Decode(err.to_string()))
}

pub(crate) fn decode_page(body: &str, requested_size: u32) -> Result<InteractionPage, ApiError> {
    let envelope: Envelope<InteractionList> = decode(body)?;
    let records = envelope.data.interactions;
    let pagination = envelope.meta.and_then(|meta| meta.pagination);
    Ok(match pagination {
        Some(p) => InteractionPage {
            records,
            total: p.total,
            page: p.page,
            page_size: p.page_size,
        },
        None => InteractionPage {
            total: records.len() as u64,
            records,
            page: 1,
            page_size: requested_size,
        },
    })
}

/// Maps a non-success response onto an [`ApiError`]. Bodies that are not the
/// error envelope fall back to the raw text.
pub(crate) fn decode_error(status: u16, body: &str) -> ApiError {
    let (code, message, request_id, details) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => (
            envelope.error.code,
            envelope.error.message,
            envelope.error.request_id,
            envelope.error.details,
        ),
        Err(_) => (String::new(), body.trim().to_string(), None, Vec::new()),
    };
    let message = if message.is_empty() {
        format!("HTTP {}", status)
    } else {
        message
    };

    match status {
        400 | 422 if code == "VALIDATION_ERROR" || !details.is_empty() => ApiError::Validation {
            message,
            details,
            request_id,
        },
        401 | 403 => ApiError::Unauthorized(message),
        404 => ApiError::NotFound(message),
        409 => ApiError::Conflict(message),
        _ => ApiError::Server {
            status,
            message,
            request_id,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{decode, decode_error, decode_page, Envelope, SiteList};
    use crate::error::ApiError;

    const LIST_BODY: &str = r#"{
        "status": "success",
        "data": {"interactions": [{
            "id": 7, "site_id": 1, "title": "Weekly sync", "type": "Meeting",
            "lead": "Jane", "start_datetime": "2024-02-01T14:00:00Z",
            "end_datetime": "2024-02-01T15:00:00Z", "timezone": "UTC",
            "location": null, "description": null, "notes": null,
            "created_by": 3, "created_at": "2024-01-20T10:00:00Z", "updated_at": null
        }]},
        "meta": {"pagination": {"page": 2, "page_size": 1, "total": 5, "total_pages": 5}}
    }"#;

    #[test]
    fn list_envelope_carries_pagination() {
        let page = decode_page(LIST_BODY, 25).expect("decode");
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].title, "Weekly sync");
        assert_eq!(page.total, 5);
        assert_eq!(page.page, 2);
        assert_eq!(page.page_size, 1);
    }

    #[test]
    fn list_without_meta_is_single_page() {
        let body = r#"{"data": {"interactions": []}}"#;
        let page = decode_page(body, 10).expect("decode");
        assert_eq!(page.total, 0);
        assert_eq!(page.page_size, 10);
    }

    #[test]
    fn sites_envelope() {
        let body = r#"{"data": {"sites": [{"id": 1, "name": "HQ"}]}}"#;
        let envelope: Envelope<SiteList> = decode(body).expect("decode");
        assert_eq!(envelope.data.sites[0].name, "HQ");
    }

    #[test]
    fn validation_error_envelope() {
        let body = r#"{"error": {"code": "VALIDATION_ERROR", "message": "The request contains invalid data.",
            "requestId": "abc", "details": [{"field": "title", "message": "Title is required"}]}}"#;
        match decode_error(400, body) {
            ApiError::Validation {
                details,
                request_id,
                ..
            } => {
                assert_eq!(details.len(), 1);
                assert_eq!(request_id.as_deref(), Some("abc"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn validation_detail_without_field_still_decodes() {
        let body = r#"{"error": {"code": "VALIDATION_ERROR",
            "message": "The request contains invalid data.",
            "details": [{"message": "bad"}]}}"#;
        match decode_error(400, body) {
            ApiError::Validation { message, details, .. } => {
                assert_eq!(message, "The request contains invalid data.");
                assert_eq!(details.len(), 1);
                assert_eq!(details[0].field, "");
                assert_eq!(details[0].message, "bad");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn status_classes() {
        assert!(matches!(decode_error(404, "{}"), ApiError::NotFound(_)));
        assert!(matches!(decode_error(401, ""), ApiError::Unauthorized(_)));
        assert!(matches!(
            decode_error(400, r#"{"error": {"code": "BAD_REQUEST", "message": "nope"}}"#),
            ApiError::Server { status: 400, .. }
        ));
        match decode_error(502, "Bad Gateway") {
            ApiError::Server { status, message, .. } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
