use crate::domain::{Interaction, InteractionDraft, InteractionId, SiteId};
use crate::error::{CoreError, Result};
use crate::form::{
    FormExit, FormMode, FormOutcome, FormPhase, SubmitFailure, SubmitKind, SubmitRequest,
    DELETED_STATUS, SAVED_STATUS,
};
use crate::rules::FieldErrors;
use crate::site::SiteContext;

/// Create/edit form state machine.
///
/// Performs no I/O: `submit` and `confirm_delete` hand back the call to make,
/// and the caller feeds the result into `on_submit_result` or
/// `on_delete_result`. Field errors only change on submit or when a server
/// response reports them.
#[derive(Debug, Clone)]
pub struct FormController {
    mode: FormMode,
    site_id: SiteId,
    default_timezone: String,
    draft: InteractionDraft,
    phase: FormPhase,
    errors: FieldErrors,
    page_error: Option<String>,
    status: Option<String>,
}

impl FormController {
    pub fn create(sites: &SiteContext, default_timezone: &str) -> Result<Self> {
        let site_id = sites.require_active()?;
        Ok(Self {
            mode: FormMode::Create,
            site_id,
            default_timezone: default_timezone.to_string(),
            draft: InteractionDraft::empty(site_id, default_timezone),
            phase: FormPhase::Editing,
            errors: FieldErrors::new(),
            page_error: None,
            status: None,
        })
    }

    /// Starts in `Loading`; the caller fetches `id` and calls
    /// [`FormController::load_record`].
    pub fn edit(id: InteractionId, sites: &SiteContext, default_timezone: &str) -> Result<Self> {
        let mut form = Self::create(sites, default_timezone)?;
        form.mode = FormMode::Edit(id);
        form.draft = InteractionDraft::default();
        form.phase = FormPhase::Loading;
        Ok(form)
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn phase(&self) -> &FormPhase {
        &self.phase
    }

    pub fn draft(&self) -> &InteractionDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn page_error(&self) -> Option<&str> {
        self.page_error.as_deref()
    }

    /// Transient confirmation such as "Interaction saved".
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn take_status(&mut self) -> Option<String> {
        self.status.take()
    }

    pub fn is_editable(&self) -> bool {
        matches!(self.phase, FormPhase::Editing | FormPhase::Failed)
    }

    pub fn is_busy(&self) -> bool {
        matches!(
            self.phase,
            FormPhase::Loading | FormPhase::Submitting(_) | FormPhase::Deleting
        )
    }

    pub fn load_record(&mut self, record: &Interaction) -> Result<()> {
        let FormMode::Edit(id) = self.mode else {
            return Err(CoreError::InvalidTransition("create form has nothing to load"));
        };
        if !matches!(self.phase, FormPhase::Loading | FormPhase::LoadFailed) {
            return Err(CoreError::InvalidTransition("record already loaded"));
        }
        if record.id != id {
            return Err(CoreError::NotLoaded(id));
        }
        self.draft = InteractionDraft::from_interaction(record);
        self.site_id = record.site_id;
        self.phase = FormPhase::Editing;
        self.page_error = None;
        Ok(())
    }

    pub fn load_failed(&mut self, message: impl Into<String>) {
        if self.phase == FormPhase::Loading {
            self.phase = FormPhase::LoadFailed;
            self.page_error = Some(message.into());
        }
    }

    /// Back to `Loading` after a failed fetch. Returns the id to fetch.
    pub fn retry_load(&mut self) -> Result<InteractionId> {
        match (self.mode, &self.phase) {
            (FormMode::Edit(id), FormPhase::LoadFailed) => {
                self.phase = FormPhase::Loading;
                self.page_error = None;
                Ok(id)
            }
            _ => Err(CoreError::InvalidTransition("nothing to reload")),
        }
    }

    pub fn edit_draft<F>(&mut self, edit: F) -> Result<()>
    where
        F: FnOnce(&mut InteractionDraft),
    {
        if !self.is_editable() {
            return Err(self.blocked("form is not editable"));
        }
        edit(&mut self.draft);
        self.status = None;
        Ok(())
    }

    /// Validates the draft. With errors, records them and returns `None`;
    /// otherwise moves to `Submitting` and returns the call to make.
    pub fn submit(&mut self, kind: SubmitKind) -> Result<Option<SubmitRequest>> {
        if !self.is_editable() {
            return Err(self.blocked("form cannot be submitted now"));
        }
        self.status = None;
        match self.draft.to_payload() {
            Err(errors) => {
                self.errors = errors;
                Ok(None)
            }
            Ok(payload) => {
                self.errors = FieldErrors::new();
                self.page_error = None;
                self.phase = FormPhase::Submitting(kind);
                Ok(Some(match self.mode {
                    FormMode::Create => SubmitRequest::Create(payload),
                    FormMode::Edit(id) => SubmitRequest::Update(id, payload),
                }))
            }
        }
    }

    pub fn on_submit_result(
        &mut self,
        result: std::result::Result<Interaction, SubmitFailure>,
    ) -> Result<FormOutcome> {
        let FormPhase::Submitting(kind) = self.phase else {
            return Err(CoreError::InvalidTransition("no submit in flight"));
        };

        match result {
            Ok(record) => {
                self.status = Some(SAVED_STATUS.to_string());
                match kind {
                    SubmitKind::Save => {
                        let exit = FormExit::Saved(record);
                        self.phase = FormPhase::Finished(exit.clone());
                        Ok(FormOutcome::Exit(exit))
                    }
                    SubmitKind::SaveAndNew => {
                        self.mode = FormMode::Create;
                        self.draft = InteractionDraft::empty(self.site_id, &self.default_timezone);
                        self.errors = FieldErrors::new();
                        self.page_error = None;
                        self.phase = FormPhase::Editing;
                        Ok(FormOutcome::SavedAndNew(record))
                    }
                }
            }
            Err(SubmitFailure::Fields { errors, message }) => {
                self.errors.merge(errors);
                self.page_error = message;
                self.phase = FormPhase::Failed;
                Ok(FormOutcome::Stay)
            }
            Err(SubmitFailure::Page(message)) => {
                self.page_error = Some(message);
                self.phase = FormPhase::Failed;
                Ok(FormOutcome::Stay)
            }
        }
    }

    /// Leaves without any API call, discarding the draft.
    pub fn cancel(&mut self) -> Result<FormExit> {
        if matches!(self.phase, FormPhase::Submitting(_) | FormPhase::Deleting) {
            return Err(CoreError::RequestInFlight);
        }
        self.phase = FormPhase::Finished(FormExit::Cancelled);
        Ok(FormExit::Cancelled)
    }

    pub fn request_delete(&mut self) -> Result<()> {
        if self.mode == FormMode::Create {
            return Err(CoreError::InvalidTransition("unsaved interactions cannot be deleted"));
        }
        if !self.is_editable() {
            return Err(self.blocked("form cannot delete now"));
        }
        self.phase = FormPhase::ConfirmingDelete;
        Ok(())
    }

    pub fn cancel_delete(&mut self) -> Result<()> {
        if self.phase != FormPhase::ConfirmingDelete {
            return Err(CoreError::InvalidTransition("no delete to cancel"));
        }
        self.phase = FormPhase::Editing;
        Ok(())
    }

    /// Returns the id the caller must delete.
    pub fn confirm_delete(&mut self) -> Result<InteractionId> {
        match (self.mode, &self.phase) {
            (FormMode::Edit(id), FormPhase::ConfirmingDelete) => {
                self.phase = FormPhase::Deleting;
                self.page_error = None;
                Ok(id)
            }
            (_, FormPhase::Deleting) => Err(CoreError::RequestInFlight),
            _ => Err(CoreError::InvalidTransition("delete was not confirmed")),
        }
    }

    pub fn on_delete_result(
        &mut self,
        result: std::result::Result<(), String>,
    ) -> Result<FormOutcome> {
        let (FormMode::Edit(id), FormPhase::Deleting) = (self.mode, &self.phase) else {
            return Err(CoreError::InvalidTransition("no delete in flight"));
        };
        match result {
            Ok(()) => {
                let exit = FormExit::Deleted(id);
                self.status = Some(DELETED_STATUS.to_string());
                self.phase = FormPhase::Finished(exit.clone());
                Ok(FormOutcome::Exit(exit))
            }
            Err(message) => {
                self.page_error = Some(message);
                self.phase = FormPhase::Failed;
                Ok(FormOutcome::Stay)
            }
        }
    }

    fn blocked(&self, reason: &'static str) -> CoreError {
        if self.is_busy() {
            CoreError::RequestInFlight
        } else {
            CoreError::InvalidTransition(reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FormController;
    use crate::domain::{Interaction, InteractionId, InteractionType, Site, SiteId};
    use crate::error::CoreError;
    use crate::form::{FormExit, FormMode, FormOutcome, FormPhase, SubmitFailure, SubmitKind, SubmitRequest};
    use crate::rules::{Field, FieldErrors, TITLE_REQUIRED};
    use crate::site::SiteContext;
    use chrono::{TimeZone, Utc};

    fn sites() -> SiteContext {
        SiteContext::start(
            vec![Site {
                id: SiteId::new(3),
                name: "North".to_string(),
                description: None,
            }],
            None,
        )
    }

    fn fill(form: &mut FormController) {
        form.edit_draft(|draft| {
            draft.title = "Kickoff".to_string();
            draft.kind = Some(InteractionType::Meeting);
            draft.lead = "Ana".to_string();
            draft.start = "2024-05-01 09:00".to_string();
            draft.end = "2024-05-01 10:00".to_string();
        })
        .unwrap();
    }

    fn saved(id: i64, title: &str) -> Interaction {
        Interaction {
            id: InteractionId::new(id),
            site_id: SiteId::new(3),
            title: title.to_string(),
            kind: InteractionType::Meeting,
            lead: "Ana".to_string(),
            start_datetime: Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap(),
            end_datetime: Some(Utc.with_ymd_and_hms(2024, 5, 1, 14, 0, 0).unwrap()),
            timezone: "America/New_York".to_string(),
            location: None,
            description: None,
            notes: None,
            created_by: None,
            created_at: Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn create_requires_active_site() {
        let err = FormController::create(&SiteContext::default(), "UTC").unwrap_err();
        assert_eq!(err, CoreError::NoActiveSite);
    }

    #[test]
    fn invalid_submit_stays_editing_with_errors() {
        let mut form = FormController::create(&sites(), "America/New_York").unwrap();
        assert_eq!(form.submit(SubmitKind::Save).unwrap(), None);
        assert_eq!(form.phase(), &FormPhase::Editing);
        assert_eq!(form.errors().get(Field::Title), Some(TITLE_REQUIRED));

        form.edit_draft(|draft| draft.title = "Fixed".to_string()).unwrap();
        assert!(form.errors().contains(Field::Title));
    }

    #[test]
    fn valid_create_submit_carries_site_and_blocks_resubmit() {
        let mut form = FormController::create(&sites(), "America/New_York").unwrap();
        fill(&mut form);
        let Some(SubmitRequest::Create(payload)) = form.submit(SubmitKind::Save).unwrap() else {
            panic!("expected create request");
        };
        assert_eq!(payload.site_id, Some(SiteId::new(3)));
        assert_eq!(form.submit(SubmitKind::Save), Err(CoreError::RequestInFlight));
        assert_eq!(form.cancel(), Err(CoreError::RequestInFlight));
    }

    #[test]
    fn save_navigates_away_with_status() {
        let mut form = FormController::create(&sites(), "America/New_York").unwrap();
        fill(&mut form);
        form.submit(SubmitKind::Save).unwrap();
        let outcome = form.on_submit_result(Ok(saved(1, "Kickoff"))).unwrap();
        assert_eq!(outcome, FormOutcome::Exit(FormExit::Saved(saved(1, "Kickoff"))));
        assert_eq!(form.status(), Some("Interaction saved"));
        assert!(matches!(form.phase(), FormPhase::Finished(_)));
    }

    #[test]
    fn save_and_new_resets_to_empty_create_draft() {
        let mut form = FormController::create(&sites(), "America/New_York").unwrap();
        fill(&mut form);
        form.submit(SubmitKind::SaveAndNew).unwrap();
        let outcome = form.on_submit_result(Ok(saved(1, "Kickoff"))).unwrap();

        assert!(matches!(outcome, FormOutcome::SavedAndNew(_)));
        assert_eq!(form.mode(), FormMode::Create);
        assert_eq!(form.phase(), &FormPhase::Editing);
        assert_eq!(form.draft().title, "");
        assert_eq!(form.draft().kind, None);
        assert_eq!(form.draft().site_id, Some(SiteId::new(3)));
        assert_eq!(form.draft().timezone, "America/New_York");
        assert!(form.errors().is_empty());
    }

    #[test]
    fn server_field_errors_merge_and_keep_draft() {
        let mut form = FormController::create(&sites(), "UTC").unwrap();
        fill(&mut form);
        form.submit(SubmitKind::Save).unwrap();

        let mut server = FieldErrors::new();
        server.insert(Field::Title, "An interaction with this title already exists");
        let outcome = form
            .on_submit_result(Err(SubmitFailure::Fields {
                errors: server,
                message: Some("Validation failed".to_string()),
            }))
            .unwrap();

        assert_eq!(outcome, FormOutcome::Stay);
        assert_eq!(form.phase(), &FormPhase::Failed);
        assert_eq!(
            form.errors().get(Field::Title),
            Some("An interaction with this title already exists")
        );
        assert_eq!(form.errors().len(), 1);
        assert_eq!(form.page_error(), Some("Validation failed"));
        assert_eq!(form.draft().title, "Kickoff");
        assert!(form.submit(SubmitKind::Save).unwrap().is_some());
    }

    #[test]
    fn transport_failure_is_page_level() {
        let mut form = FormController::create(&sites(), "UTC").unwrap();
        fill(&mut form);
        form.submit(SubmitKind::Save).unwrap();
        form.on_submit_result(Err(SubmitFailure::Page("server unavailable".to_string())))
            .unwrap();
        assert!(form.errors().is_empty());
        assert_eq!(form.page_error(), Some("server unavailable"));
        assert!(form.is_editable());
    }

    #[test]
    fn edit_loads_record_then_submits_update() {
        let mut form = FormController::edit(InteractionId::new(8), &sites(), "UTC").unwrap();
        assert_eq!(form.phase(), &FormPhase::Loading);
        assert!(form.edit_draft(|_| {}).is_err());

        assert_eq!(
            form.load_record(&saved(9, "Other")),
            Err(CoreError::NotLoaded(InteractionId::new(8)))
        );
        form.load_record(&saved(8, "Review")).unwrap();
        assert_eq!(form.draft().start, "2024-05-01 09:00");

        let request = form.submit(SubmitKind::Save).unwrap();
        assert!(matches!(
            request,
            Some(SubmitRequest::Update(id, ref payload))
                if id == InteractionId::new(8) && payload.site_id.is_none()
        ));
    }

    #[test]
    fn load_failure_can_be_retried() {
        let mut form = FormController::edit(InteractionId::new(8), &sites(), "UTC").unwrap();
        form.load_failed("not found");
        assert_eq!(form.phase(), &FormPhase::LoadFailed);
        assert_eq!(form.page_error(), Some("not found"));
        assert_eq!(form.retry_load(), Ok(InteractionId::new(8)));
        assert_eq!(form.phase(), &FormPhase::Loading);
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut form = FormController::edit(InteractionId::new(8), &sites(), "UTC").unwrap();
        form.load_record(&saved(8, "Review")).unwrap();

        assert!(form.confirm_delete().is_err());
        form.request_delete().unwrap();
        form.cancel_delete().unwrap();
        assert_eq!(form.phase(), &FormPhase::Editing);

        form.request_delete().unwrap();
        assert_eq!(form.confirm_delete(), Ok(InteractionId::new(8)));
        assert_eq!(form.confirm_delete(), Err(CoreError::RequestInFlight));
        let outcome = form.on_delete_result(Ok(())).unwrap();
        assert_eq!(
            outcome,
            FormOutcome::Exit(FormExit::Deleted(InteractionId::new(8)))
        );
    }

    #[test]
    fn failed_delete_returns_to_editable() {
        let mut form = FormController::edit(InteractionId::new(8), &sites(), "UTC").unwrap();
        form.load_record(&saved(8, "Review")).unwrap();
        form.request_delete().unwrap();
        form.confirm_delete().unwrap();
        form.on_delete_result(Err("server error".to_string())).unwrap();
        assert_eq!(form.phase(), &FormPhase::Failed);
        assert_eq!(form.page_error(), Some("server error"));
    }

    #[test]
    fn create_form_cannot_delete() {
        let mut form = FormController::create(&sites(), "UTC").unwrap();
        assert!(matches!(
            form.request_delete(),
            Err(CoreError::InvalidTransition(_))
        ));
        assert_eq!(form.cancel(), Ok(FormExit::Cancelled));
    }
}
