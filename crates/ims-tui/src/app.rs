use std::collections::VecDeque;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ims_config::AppConfig;
use ims_core::table::COLUMNS;
use ims_core::{
    apply_intent, format_filter, parse_filter, switch_site, Field, FinderDefaults, FinderQuery,
    FormController, FormExit, FormMode, FormOutcome, FormPhase, InteractionId, InteractionType,
    ListOutcome, ListState, SiteContext, SiteId, Sort, SubmitKind, TableIntent,
};

use crate::actions::{Action, Reply};
use crate::util::apply_text_input;

const NO_SITES: &str = "No accessible sites. Check the API token or site permissions.";

#[derive(Debug, Clone)]
pub enum Mode {
    Finder,
    FilterEditing,
    SitePicker(usize),
    Form(FormState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormButton {
    Save,
    SaveAndNew,
    Cancel,
    Delete,
}

const CREATE_BUTTONS: [FormButton; 3] = [
    FormButton::Save,
    FormButton::SaveAndNew,
    FormButton::Cancel,
];
const EDIT_BUTTONS: [FormButton; 4] = [
    FormButton::Save,
    FormButton::SaveAndNew,
    FormButton::Cancel,
    FormButton::Delete,
];

/// A form controller plus the focused slot: the fields in form order, then
/// the buttons.
#[derive(Debug, Clone)]
pub struct FormState {
    pub controller: FormController,
    pub focus: usize,
    /// Opened from the finder's delete key: ask for confirmation once loaded.
    confirm_on_load: bool,
}

impl FormState {
    fn new(controller: FormController) -> Self {
        Self {
            controller,
            focus: 0,
            confirm_on_load: false,
        }
    }

    pub fn buttons(&self) -> &'static [FormButton] {
        match self.controller.mode() {
            FormMode::Create => &CREATE_BUTTONS,
            FormMode::Edit(_) => &EDIT_BUTTONS,
        }
    }

    pub fn focused_field(&self) -> Option<Field> {
        Field::ALL.get(self.focus).copied()
    }

    pub fn focused_button(&self) -> Option<FormButton> {
        let index = self.focus.checked_sub(Field::ALL.len())?;
        self.buttons().get(index).copied()
    }

    fn slots(&self) -> usize {
        Field::ALL.len() + self.buttons().len()
    }

    fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.slots();
    }

    fn focus_prev(&mut self) {
        let total = self.slots();
        self.focus = (self.focus + total - 1) % total;
    }

    fn focus_field(&mut self, field: Field) {
        if let Some(pos) = Field::ALL.iter().position(|candidate| *candidate == field) {
            self.focus = pos;
        }
    }
}

#[derive(Debug)]
pub struct App {
    pub mode: Mode,
    pub show_help: bool,
    pub should_quit: bool,
    pub sites: SiteContext,
    /// `None` until the site list has arrived.
    pub query: Option<FinderQuery>,
    pub list: ListState,
    pub selected: usize,
    pub filter_input: String,
    pub filter_error: Option<String>,
    pub status: Option<String>,
    pub error: Option<String>,
    default_timezone: String,
    defaults: FinderDefaults,
    preferred_site: Option<SiteId>,
    actions: VecDeque<Action>,
    pending_select: Option<InteractionId>,
}

impl App {
    pub fn new(config: &AppConfig, preferred_site: Option<SiteId>) -> Self {
        let mut app = Self {
            mode: Mode::Finder,
            show_help: false,
            should_quit: false,
            sites: SiteContext::default(),
            query: None,
            list: ListState::new(),
            selected: 0,
            filter_input: String::new(),
            filter_error: None,
            status: None,
            error: None,
            default_timezone: config.default_timezone.clone(),
            defaults: FinderDefaults {
                page_size: config.default_page_size,
                sort: Sort::default(),
            },
            preferred_site: preferred_site.or(config.default_site_id),
            actions: VecDeque::new(),
            pending_select: None,
        };
        app.enqueue(Action::LoadSites);
        app
    }

    pub fn enqueue(&mut self, action: Action) {
        self.actions.push_back(action);
    }

    pub fn next_action(&mut self) -> Option<Action> {
        self.actions.pop_front()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    pub fn selected_id(&self) -> Option<InteractionId> {
        self.list.records().get(self.selected).map(|record| record.id)
    }

    /// Issues a list request for the current query. Any earlier request
    /// still in flight is superseded.
    fn fetch_list(&mut self) {
        if let Some(query) = &self.query {
            let ticket = self.list.begin(query);
            self.actions.push_back(Action::LoadList(ticket));
        }
    }

    pub fn apply_reply(&mut self, reply: Reply) {
        match reply {
            Reply::Sites(Ok(sites)) => {
                self.sites = SiteContext::start(sites, self.preferred_site);
                match self.sites.active_id() {
                    Some(site_id) => {
                        self.query = Some(FinderQuery::new(site_id, self.defaults));
                        self.list.clear();
                        self.error = None;
                        self.fetch_list();
                    }
                    None => self.set_error(NO_SITES),
                }
            }
            Reply::Sites(Err(err)) => self.set_error(format!("Could not load sites: {}", err)),
            Reply::List(ticket, result) => {
                let Some(query) = self.query.as_mut() else {
                    return;
                };
                match self.list.resolve(&ticket, query, result) {
                    ListOutcome::Applied => self.select_after_load(),
                    ListOutcome::PageClamped => self.fetch_list(),
                    ListOutcome::Failed | ListOutcome::Stale => {}
                }
            }
            Reply::Record(id, result) => {
                let Mode::Form(form) = &mut self.mode else {
                    return;
                };
                if form.controller.mode() != FormMode::Edit(id)
                    || *form.controller.phase() != FormPhase::Loading
                {
                    return;
                }
                match result {
                    Ok(record) => {
                        let loaded = form.controller.load_record(&record).and_then(|()| {
                            if form.confirm_on_load {
                                form.controller.request_delete()
                            } else {
                                Ok(())
                            }
                        });
                        if let Err(err) = loaded {
                            self.error = Some(err.to_string());
                        }
                    }
                    Err(message) => form.controller.load_failed(message),
                }
            }
            Reply::Submitted(result) => {
                let Mode::Form(form) = &mut self.mode else {
                    return;
                };
                if !matches!(form.controller.phase(), FormPhase::Submitting(_)) {
                    return;
                }
                match form.controller.on_submit_result(result) {
                    Ok(FormOutcome::Exit(FormExit::Saved(record))) => {
                        self.status = form.controller.take_status();
                        self.mode = Mode::Finder;
                        self.pending_select = Some(record.id);
                        self.fetch_list();
                    }
                    Ok(FormOutcome::SavedAndNew(_)) => {
                        self.status = form.controller.take_status();
                        form.focus = 0;
                        self.fetch_list();
                    }
                    Ok(_) => {}
                    Err(err) => self.set_error(err.to_string()),
                }
            }
            Reply::Deleted(id, result) => {
                let Mode::Form(form) = &mut self.mode else {
                    return;
                };
                if *form.controller.phase() != FormPhase::Deleting {
                    return;
                }
                match form.controller.on_delete_result(result) {
                    Ok(FormOutcome::Exit(FormExit::Deleted(_))) => {
                        self.status = form.controller.take_status();
                        self.mode = Mode::Finder;
                        self.list.remove(id);
                        self.fetch_list();
                    }
                    Ok(_) => {}
                    Err(err) => self.set_error(err.to_string()),
                }
            }
        }
    }

    fn select_after_load(&mut self) {
        let records = self.list.records();
        if let Some(target) = self.pending_select.take() {
            if let Some(pos) = records.iter().position(|record| record.id == target) {
                self.selected = pos;
            }
        }
        if self.selected >= records.len() {
            self.selected = records.len().saturating_sub(1);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press && key.kind != KeyEventKind::Repeat {
            return;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
                self.show_help = false;
            }
            return;
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        let mut mode = std::mem::replace(&mut self.mode, Mode::Finder);
        match &mut mode {
            Mode::Finder => {
                if let Some(next) = self.handle_finder_key(key) {
                    mode = next;
                }
            }
            Mode::FilterEditing => {
                if let Some(next) = self.handle_filter_key(key) {
                    mode = next;
                }
            }
            Mode::SitePicker(index) => {
                if let Some(next) = self.handle_site_picker_key(index, key) {
                    mode = next;
                }
            }
            Mode::Form(form) => {
                if let Some(next) = self.handle_form_key(form, key) {
                    mode = next;
                }
            }
        }
        self.mode = mode;
    }

    fn handle_finder_key(&mut self, key: KeyEvent) -> Option<Mode> {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Home | KeyCode::Char('g') => self.selected = 0,
            KeyCode::End | KeyCode::Char('G') => {
                self.selected = self.list.records().len().saturating_sub(1);
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                if let Some(id) = self.selected_id() {
                    return self.open_edit(id, false);
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_id() {
                    return self.open_edit(id, true);
                }
            }
            KeyCode::Char('a') => return self.open_create(),
            KeyCode::Char('/') => {
                self.filter_input = self
                    .query
                    .as_ref()
                    .map(|query| format_filter(query.criteria()))
                    .unwrap_or_default();
                self.filter_error = None;
                return Some(Mode::FilterEditing);
            }
            KeyCode::Char('c') => {
                self.filter_input.clear();
                self.apply_table_intent(TableIntent::FiltersCleared);
            }
            KeyCode::Char(ch @ '1'..='6') => {
                let column = COLUMNS[ch as usize - '1' as usize];
                self.apply_table_intent(TableIntent::SortColumnClicked(column.field));
            }
            // Paging and refresh wait for the list request in flight.
            KeyCode::Right | KeyCode::PageDown | KeyCode::Char('n') | KeyCode::Left
            | KeyCode::PageUp | KeyCode::Char('p') | KeyCode::Char('r')
                if self.list.is_loading() => {}
            KeyCode::Right | KeyCode::PageDown | KeyCode::Char('n') => {
                if let Some(page) = self.query.as_ref().map(|query| query.page() + 1) {
                    self.apply_table_intent(TableIntent::PageChanged(page));
                }
            }
            KeyCode::Left | KeyCode::PageUp | KeyCode::Char('p') => {
                let page = self.query.as_ref().map(|query| query.page().saturating_sub(1));
                if let Some(page) = page {
                    self.apply_table_intent(TableIntent::PageChanged(page));
                }
            }
            KeyCode::Char('+') => {
                if let Some(size) = self.query.as_ref().map(|query| query.page_size().larger()) {
                    self.apply_table_intent(TableIntent::PageSizeChanged(size));
                }
            }
            KeyCode::Char('-') => {
                if let Some(size) = self.query.as_ref().map(|query| query.page_size().smaller()) {
                    self.apply_table_intent(TableIntent::PageSizeChanged(size));
                }
            }
            KeyCode::Char('s') => {
                if !self.sites.sites().is_empty() {
                    let active = self.sites.active_id();
                    let index = self
                        .sites
                        .sites()
                        .iter()
                        .position(|site| Some(site.id) == active)
                        .unwrap_or(0);
                    return Some(Mode::SitePicker(index));
                }
            }
            KeyCode::Char('r') => {
                if self.query.is_some() {
                    self.fetch_list();
                } else {
                    self.enqueue(Action::LoadSites);
                }
            }
            _ => {}
        }
        None
    }

    fn handle_filter_key(&mut self, key: KeyEvent) -> Option<Mode> {
        match key.code {
            KeyCode::Esc => {
                self.filter_error = None;
                return Some(Mode::Finder);
            }
            KeyCode::Enter => match parse_filter(&self.filter_input) {
                Ok(criteria) => {
                    if let Some(query) = self.query.as_mut() {
                        query.set_filters(criteria);
                    }
                    self.filter_error = None;
                    self.selected = 0;
                    self.fetch_list();
                    return Some(Mode::Finder);
                }
                Err(err) => self.filter_error = Some(err.to_string()),
            },
            _ => apply_text_input(&mut self.filter_input, key),
        }
        None
    }

    fn handle_site_picker_key(&mut self, index: &mut usize, key: KeyEvent) -> Option<Mode> {
        let count = self.sites.sites().len();
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Some(Mode::Finder),
            KeyCode::Down | KeyCode::Char('j') => {
                if *index + 1 < count {
                    *index += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => *index = index.saturating_sub(1),
            KeyCode::Enter => {
                if let Some(site_id) = self.sites.sites().get(*index).map(|site| site.id) {
                    self.change_site(site_id);
                }
                return Some(Mode::Finder);
            }
            _ => {}
        }
        None
    }

    fn change_site(&mut self, site_id: SiteId) {
        match self.sites.switch_to(site_id) {
            Ok(true) => {
                let defaults = self.defaults;
                let query = self
                    .query
                    .get_or_insert_with(|| FinderQuery::new(site_id, defaults));
                let ticket = switch_site(query, &mut self.list, site_id);
                self.actions.push_back(Action::LoadList(ticket));
                self.selected = 0;
                self.filter_input.clear();
                self.filter_error = None;
                if let Some(site) = self.sites.active_site() {
                    self.status = Some(format!("Switched to {}", site.name));
                }
            }
            Ok(false) => {}
            Err(err) => self.set_error(err.to_string()),
        }
    }

    fn handle_form_key(&mut self, form: &mut FormState, key: KeyEvent) -> Option<Mode> {
        if form.controller.is_busy() && key.code != KeyCode::Esc {
            return None;
        }
        if *form.controller.phase() == FormPhase::ConfirmingDelete {
            self.handle_delete_confirm_key(form, key);
            return None;
        }
        if *form.controller.phase() == FormPhase::LoadFailed {
            match key.code {
                KeyCode::Char('r') => match form.controller.retry_load() {
                    Ok(id) => self.enqueue_record_load(id),
                    Err(err) => self.set_error(err.to_string()),
                },
                KeyCode::Esc => return Some(Mode::Finder),
                _ => {}
            }
            return None;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => match form.controller.cancel() {
                Ok(_) => return Some(Mode::Finder),
                Err(err) => self.set_error(err.to_string()),
            },
            KeyCode::Char('s') if ctrl => self.submit_form(form, SubmitKind::Save),
            KeyCode::Char('n') if ctrl => self.submit_form(form, SubmitKind::SaveAndNew),
            KeyCode::Char('d') if ctrl => self.request_delete(form),
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            KeyCode::Enter => match form.focused_button() {
                Some(FormButton::Save) => self.submit_form(form, SubmitKind::Save),
                Some(FormButton::SaveAndNew) => self.submit_form(form, SubmitKind::SaveAndNew),
                Some(FormButton::Cancel) => match form.controller.cancel() {
                    Ok(_) => return Some(Mode::Finder),
                    Err(err) => self.set_error(err.to_string()),
                },
                Some(FormButton::Delete) => self.request_delete(form),
                None => form.focus_next(),
            },
            _ => self.edit_focused_field(form, key),
        }
        None
    }

    fn handle_delete_confirm_key(&mut self, form: &mut FormState, key: KeyEvent) {
        let result = match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => match form.controller.confirm_delete() {
                Ok(id) => match self.sites.active_id() {
                    Some(site_id) => {
                        self.enqueue(Action::Delete(site_id, id));
                        Ok(())
                    }
                    None => form
                        .controller
                        .on_delete_result(Err(NO_SITES.to_string()))
                        .map(|_| ()),
                },
                Err(err) => Err(err),
            },
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                form.controller.cancel_delete()
            }
            _ => Ok(()),
        };
        if let Err(err) = result {
            self.set_error(err.to_string());
        }
    }

    fn edit_focused_field(&mut self, form: &mut FormState, key: KeyEvent) {
        let Some(field) = form.focused_field() else {
            return;
        };
        let result = if field == Field::Type {
            let forward = match key.code {
                KeyCode::Right | KeyCode::Char(' ') => true,
                KeyCode::Left => false,
                _ => return,
            };
            form.controller
                .edit_draft(|draft| draft.kind = Some(InteractionType::step(draft.kind, forward)))
        } else {
            form.controller.edit_draft(|draft| {
                if let Some(target) = draft.text_mut(field) {
                    apply_text_input(target, key);
                }
            })
        };
        if let Err(err) = result {
            self.set_error(err.to_string());
        }
    }

    fn submit_form(&mut self, form: &mut FormState, kind: SubmitKind) {
        let Some(site_id) = self.sites.active_id() else {
            self.set_error(NO_SITES);
            return;
        };
        match form.controller.submit(kind) {
            Ok(Some(request)) => {
                self.error = None;
                self.enqueue(Action::Submit(site_id, request));
            }
            Ok(None) => {
                let first = form.controller.errors().fields().next();
                if let Some(field) = first {
                    form.focus_field(field);
                }
            }
            Err(err) => self.set_error(err.to_string()),
        }
    }

    fn request_delete(&mut self, form: &mut FormState) {
        if let Err(err) = form.controller.request_delete() {
            self.set_error(err.to_string());
        }
    }

    fn open_create(&mut self) -> Option<Mode> {
        match FormController::create(&self.sites, &self.default_timezone) {
            Ok(controller) => Some(Mode::Form(FormState::new(controller))),
            Err(err) => {
                self.set_error(err.to_string());
                None
            }
        }
    }

    fn open_edit(&mut self, id: InteractionId, confirm_delete: bool) -> Option<Mode> {
        match FormController::edit(id, &self.sites, &self.default_timezone) {
            Ok(controller) => {
                self.enqueue_record_load(id);
                let mut form = FormState::new(controller);
                form.confirm_on_load = confirm_delete;
                Some(Mode::Form(form))
            }
            Err(err) => {
                self.set_error(err.to_string());
                None
            }
        }
    }

    fn enqueue_record_load(&mut self, id: InteractionId) {
        if let Some(site_id) = self.sites.active_id() {
            self.enqueue(Action::LoadRecord(site_id, id));
        }
    }

    fn apply_table_intent(&mut self, intent: TableIntent) {
        let Some(query) = self.query.as_mut() else {
            return;
        };
        if apply_intent(query, intent) {
            self.selected = 0;
            self.fetch_list();
        }
    }

    fn move_selection(&mut self, delta: i32) {
        let len = self.list.records().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let next = (self.selected as i64 + delta as i64).clamp(0, len as i64 - 1);
        self.selected = next as usize;
    }
}
