mod controller;

pub use controller::FormController;

use crate::domain::{Interaction, InteractionId};
use crate::dto::InteractionPayload;
use crate::rules::FieldErrors;

pub const SAVED_STATUS: &str = "Interaction saved";
pub const DELETED_STATUS: &str = "Interaction deleted";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(InteractionId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitKind {
    /// Save and return to the finder.
    Save,
    /// Save and start over with an empty create draft.
    SaveAndNew,
}

/// How the form was left. The front end navigates back to the finder on any
/// of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormExit {
    Saved(Interaction),
    Deleted(InteractionId),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPhase {
    /// Edit mode waiting for the record to arrive.
    Loading,
    /// The record could not be fetched.
    LoadFailed,
    Editing,
    Submitting(SubmitKind),
    /// A submit or delete failed. Still editable; errors are on display.
    Failed,
    ConfirmingDelete,
    Deleting,
    Finished(FormExit),
}

/// The API call a valid submit asks the caller to make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitRequest {
    Create(InteractionPayload),
    Update(InteractionId, InteractionPayload),
}

/// Why a create/update call failed, as seen by the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitFailure {
    /// Field-scoped server validation, plus an optional page-level message.
    Fields {
        errors: FieldErrors,
        message: Option<String>,
    },
    /// Transport or server failure.
    Page(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// Still on the form (a failure was recorded).
    Stay,
    /// Saved with "Save & New"; the form is an empty create draft again.
    SavedAndNew(Interaction),
    Exit(FormExit),
}
