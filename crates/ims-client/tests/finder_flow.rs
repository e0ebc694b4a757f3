use ims_client::{ApiError, InteractionApi, MemoryApi};
use ims_core::{
    switch_site, Field, FinderDefaults, FinderQuery, FormController, FormExit, FormMode,
    FormOutcome, Interaction, InteractionDraft, InteractionId, InteractionType, ListOutcome,
    ListState, PageSize, Site, SiteContext, SiteId, SubmitKind, SubmitRequest,
};

fn sites() -> Vec<Site> {
    vec![
        Site {
            id: SiteId::new(1),
            name: "North".to_string(),
            description: None,
        },
        Site {
            id: SiteId::new(2),
            name: "South".to_string(),
            description: None,
        },
    ]
}

fn draft(site: SiteId, title: &str) -> InteractionDraft {
    InteractionDraft {
        title: title.to_string(),
        kind: Some(InteractionType::Meeting),
        lead: "Jane Smith".to_string(),
        start: "2024-05-01 10:00".to_string(),
        end: "2024-05-01 11:00".to_string(),
        ..InteractionDraft::empty(site, "UTC")
    }
}

fn seed(api: &MemoryApi, site: i64, count: usize) {
    for index in 0..count {
        let payload = draft(SiteId::new(site), &format!("Site {} item {}", site, index))
            .to_payload()
            .expect("valid draft");
        api.create_interaction(SiteId::new(site), &payload)
            .expect("create");
    }
}

fn send(
    api: &dyn InteractionApi,
    request: &SubmitRequest,
    site: SiteId,
) -> Result<Interaction, ApiError> {
    match request {
        SubmitRequest::Create(payload) => api.create_interaction(site, payload),
        SubmitRequest::Update(id, payload) => api.update_interaction(site, *id, payload),
    }
}

#[test]
fn fifteen_records_page_in_threes_of_five() {
    let api = MemoryApi::new(sites());
    seed(&api, 1, 15);

    let defaults = FinderDefaults {
        page_size: PageSize::new(5).expect("size"),
        ..FinderDefaults::default()
    };
    let mut query = FinderQuery::new(SiteId::new(1), defaults);
    let mut list = ListState::new();

    let ticket = list.begin(&query);
    let result = api.list_interactions(ticket.params());
    assert_eq!(list.resolve(&ticket, &mut query, result), ListOutcome::Applied);
    assert_eq!(query.total_pages(), Some(3));
    assert_eq!(list.records().len(), 5);

    assert!(!query.set_page(4));
    assert_eq!(query.page(), 1);

    assert!(query.set_page(2));
    assert_eq!(query.params().get("page"), Some("2"));
    let ticket = list.begin(&query);
    let result = api.list_interactions(ticket.params());
    assert_eq!(list.resolve(&ticket, &mut query, result), ListOutcome::Applied);
    assert_eq!(list.records().len(), 5);
    assert_eq!(list.total(), Some(15));
}

#[test]
fn late_response_for_previous_site_is_discarded() {
    let api = MemoryApi::new(sites());
    seed(&api, 1, 6);
    seed(&api, 2, 2);

    let mut query = FinderQuery::new(SiteId::new(1), FinderDefaults::default());
    let mut list = ListState::new();
    let first = list.begin(&query);
    let first_result = api.list_interactions(first.params());

    let second = switch_site(&mut query, &mut list, SiteId::new(2));
    let second_result = api.list_interactions(second.params());
    assert_eq!(
        list.resolve(&second, &mut query, second_result),
        ListOutcome::Applied
    );

    assert_eq!(
        list.resolve(&first, &mut query, first_result),
        ListOutcome::Stale
    );
    assert_eq!(list.total(), Some(2));
    assert!(list
        .records()
        .iter()
        .all(|record| record.site_id == SiteId::new(2)));
}

#[test]
fn save_and_new_resets_to_an_empty_create_draft() {
    let api = MemoryApi::new(sites());
    let context = SiteContext::start(sites(), Some(SiteId::new(1)));
    let mut form = FormController::create(&context, "UTC").expect("form");

    form.edit_draft(|current| *current = draft(SiteId::new(1), "Weekly sync"))
        .expect("edit");
    let request = form
        .submit(SubmitKind::SaveAndNew)
        .expect("submit")
        .expect("valid");
    let result = send(&api, &request, SiteId::new(1)).map_err(|err| err.submit_failure());

    let outcome = form.on_submit_result(result).expect("result");
    assert!(
        matches!(outcome, FormOutcome::SavedAndNew(ref record) if record.title == "Weekly sync")
    );
    assert_eq!(form.mode(), FormMode::Create);
    assert_eq!(form.draft().title, "");
    assert_eq!(form.draft().kind, None);
    assert!(form.errors().is_empty());
    assert_eq!(form.status(), Some("Interaction saved"));
    assert_eq!(api.len(), 1);
}

#[test]
fn server_rejection_lands_on_the_title_field() {
    let api = MemoryApi::new(sites());
    seed(&api, 1, 1);
    let context = SiteContext::start(sites(), Some(SiteId::new(1)));
    let mut form = FormController::create(&context, "UTC").expect("form");

    form.edit_draft(|current| *current = draft(SiteId::new(1), "site 1 ITEM 0"))
        .expect("edit");
    let request = form.submit(SubmitKind::Save).expect("submit").expect("valid");
    let result = send(&api, &request, SiteId::new(1)).map_err(|err| err.submit_failure());

    assert_eq!(form.on_submit_result(result).expect("result"), FormOutcome::Stay);
    assert!(form.errors().contains(Field::Title));
    assert!(form.is_editable());

    // Same title on the other site is fine.
    let mut other = FormController::create(
        &SiteContext::start(sites(), Some(SiteId::new(2))),
        "UTC",
    )
    .expect("form");
    other
        .edit_draft(|current| *current = draft(SiteId::new(2), "site 1 ITEM 0"))
        .expect("edit");
    let request = other.submit(SubmitKind::Save).expect("submit").expect("valid");
    let result = send(&api, &request, SiteId::new(2)).map_err(|err| err.submit_failure());
    assert!(matches!(
        other.on_submit_result(result).expect("result"),
        FormOutcome::Exit(FormExit::Saved(_))
    ));
}

#[test]
fn edit_loads_updates_and_deletes() {
    let api = MemoryApi::new(sites());
    seed(&api, 1, 2);
    let context = SiteContext::start(sites(), Some(SiteId::new(1)));
    let id = InteractionId::new(2);

    let mut form = FormController::edit(id, &context, "UTC").expect("form");
    let record = api.get_interaction(SiteId::new(1), id).expect("record");
    form.load_record(&record).expect("load");
    assert_eq!(form.draft().title, "Site 1 item 1");

    form.edit_draft(|current| current.location = "Room 7".to_string())
        .expect("edit");
    let request = form.submit(SubmitKind::Save).expect("submit").expect("valid");
    let result = send(&api, &request, SiteId::new(1)).map_err(|err| err.submit_failure());
    let FormOutcome::Exit(FormExit::Saved(saved)) = form.on_submit_result(result).expect("result")
    else {
        panic!("expected saved exit");
    };
    assert_eq!(saved.location.as_deref(), Some("Room 7"));
    assert!(saved.updated_at.is_some());

    let mut form = FormController::edit(id, &context, "UTC").expect("form");
    form.load_record(&saved).expect("load");
    form.request_delete().expect("ask");
    let target = form.confirm_delete().expect("confirm");
    let result = api
        .delete_interaction(SiteId::new(1), target)
        .map_err(|err| err.to_string());
    assert_eq!(
        form.on_delete_result(result).expect("result"),
        FormOutcome::Exit(FormExit::Deleted(id))
    );
    assert!(api
        .get_interaction(SiteId::new(1), id)
        .expect_err("gone")
        .is_not_found());
}
