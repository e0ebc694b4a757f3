use crate::commands::{print_json, Context};
use crate::error::{invalid_input, not_found};
use crate::util::{or_dash, parse_interaction_id, report_field_errors};
use anyhow::{Context as _, Result};
use clap::{ArgAction, Args};
use ims_client::{ApiError, InteractionApi};
use ims_config::AppConfig;
use ims_core::rules::validate as validate_draft;
use ims_core::table::{Pagination, TableBody, TableView};
use ims_core::time::format_in_timezone;
use ims_core::{
    parse_filter, FieldErrors, FinderDefaults, FinderQuery, FormController, FormExit, FormOutcome,
    Interaction, InteractionDraft, InteractionId, InteractionType, ListOutcome, ListState,
    PageSize, SiteId, Sort, SortDirection, SortField, SubmitKind, SubmitRequest,
};
use serde::Serialize;

#[derive(Debug, Clone, Default, Args)]
pub struct FieldArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long = "type", value_name = "TYPE")]
    pub kind: Option<String>,
    #[arg(long)]
    pub lead: Option<String>,
    /// Local wall time (YYYY-MM-DD HH:MM) or RFC 3339
    #[arg(long)]
    pub start: Option<String>,
    #[arg(long)]
    pub end: Option<String>,
    #[arg(long)]
    pub timezone: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl FieldArgs {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.kind.is_none()
            && self.lead.is_none()
            && self.start.is_none()
            && self.end.is_none()
            && self.timezone.is_none()
            && self.location.is_none()
            && self.description.is_none()
            && self.notes.is_none()
    }

    fn parse_kind(&self) -> Result<Option<InteractionType>> {
        match self.kind.as_deref() {
            Some(raw) => Ok(Some(InteractionType::parse(raw)?)),
            None => Ok(None),
        }
    }

    /// Copies the given values onto `draft`; `kind` comes from
    /// [`FieldArgs::parse_kind`].
    fn apply(self, draft: &mut InteractionDraft, kind: Option<InteractionType>) {
        if kind.is_some() {
            draft.kind = kind;
        }
        let texts = [
            (&mut draft.title, self.title),
            (&mut draft.lead, self.lead),
            (&mut draft.start, self.start),
            (&mut draft.end, self.end),
            (&mut draft.timezone, self.timezone),
            (&mut draft.location, self.location),
            (&mut draft.description, self.description),
            (&mut draft.notes, self.notes),
        ];
        for (slot, value) in texts {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Filter expression, e.g. `type:meeting lead:"Jane" from:2024-01-01 budget`
    #[arg(long)]
    pub filter: Option<String>,
    /// Sort field: title, type, lead, start, end, location, created, updated
    #[arg(long)]
    pub sort: Option<String>,
    #[arg(long, action = ArgAction::SetTrue)]
    pub desc: bool,
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub page_size: Option<u32>,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[command(flatten)]
    pub fields: FieldArgs,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    pub id: String,
    #[command(flatten)]
    pub fields: FieldArgs,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    pub id: String,
    /// Confirm the deletion
    #[arg(long, action = ArgAction::SetTrue)]
    pub yes: bool,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub fields: FieldArgs,
}

#[derive(Debug, Serialize)]
struct ValidationReport<'a> {
    valid: bool,
    errors: &'a FieldErrors,
}

pub fn list(ctx: &Context<'_>, args: ListArgs) -> Result<()> {
    let site_id = ctx.sites.require_active()?;
    let mut query = FinderQuery::new(
        site_id,
        FinderDefaults {
            page_size: ctx.config.default_page_size,
            sort: Sort::default(),
        },
    );

    if let Some(expr) = args.filter.as_deref() {
        query.set_filters(parse_filter(expr)?);
    }
    match args.sort.as_deref() {
        Some(raw) => {
            let direction = if args.desc {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            };
            query.set_sort(SortField::parse(raw)?, direction);
        }
        None if args.desc => query.set_sort(query.sort().field, SortDirection::Desc),
        None => {}
    }
    if let Some(size) = args.page_size {
        query.set_page_size(PageSize::new(size)?);
    }
    if let Some(page) = args.page {
        if page == 0 {
            return Err(invalid_input("page must be at least 1"));
        }
        query.set_page(page);
    }

    let mut list = ListState::new();
    let mut outcome = fetch(ctx.api, &mut query, &mut list)?;
    if outcome == ListOutcome::PageClamped {
        outcome = fetch(ctx.api, &mut query, &mut list)?;
    }
    tracing::debug!(?outcome, total = ?list.total(), "list fetched");

    if ctx.json {
        #[derive(Serialize)]
        struct ListJson<'a> {
            interactions: &'a [Interaction],
            page: u32,
            page_size: u32,
            total: u64,
            total_pages: u32,
        }
        return print_json(&ListJson {
            interactions: list.records(),
            page: query.page(),
            page_size: query.page_size().get(),
            total: list.total().unwrap_or(0),
            total_pages: query.total_pages().unwrap_or(0),
        });
    }

    print_table(&TableView::build(&query, &list));
    Ok(())
}

fn fetch(
    api: &dyn InteractionApi,
    query: &mut FinderQuery,
    list: &mut ListState,
) -> Result<ListOutcome> {
    let ticket = list.begin(query);
    let page = api
        .list_interactions(ticket.params())
        .with_context(|| "list interactions")?;
    Ok(list.resolve::<ApiError>(&ticket, query, Ok(page)))
}

fn print_table(view: &TableView) {
    match &view.body {
        TableBody::Rows(rows) => {
            let header: Vec<String> = view.header.iter().map(|cell| cell.label()).collect();
            let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
            for row in rows {
                for (width, cell) in widths.iter_mut().zip(row.cells.iter()) {
                    *width = (*width).max(cell.chars().count());
                }
            }
            let id_width = rows
                .iter()
                .map(|row| row.id.to_string().len())
                .max()
                .unwrap_or(2)
                .max(2);

            let mut line = format!("{:<id_width$}", "ID");
            for (label, width) in header.iter().zip(&widths) {
                line.push_str(&format!("  {:<width$}", label, width = *width));
            }
            println!("{}", line.trim_end());
            for row in rows {
                let mut line = format!("{:<id_width$}", row.id.to_string());
                for (cell, width) in row.cells.iter().zip(&widths) {
                    line.push_str(&format!("  {:<width$}", cell, width = *width));
                }
                println!("{}", line.trim_end());
            }
        }
        TableBody::Empty(kind) => {
            println!("{} ({})", kind.message(), kind.action_hint().to_lowercase());
        }
        TableBody::Failed(message) => println!("error: {}", message),
        TableBody::Skeleton(_) => {}
    }
    if let Some(pagination) = view.pagination.filter(|p: &Pagination| p.total > 0) {
        println!("{}", pagination.summary());
    }
}

pub fn show(ctx: &Context<'_>, args: ShowArgs) -> Result<()> {
    let site_id = ctx.sites.require_active()?;
    let id = parse_interaction_id(&args.id)?;
    let record = get_record(ctx.api, site_id, id)?;

    if ctx.json {
        return print_json(&record);
    }

    let zone = &record.timezone;
    println!("{} {}", record.id, record.title);
    println!("type: {}", record.kind);
    println!("lead: {}", record.lead);
    println!("start: {}", format_in_timezone(record.start_datetime, zone));
    let end = record
        .end_datetime
        .map(|ts| format_in_timezone(ts, zone));
    println!("end: {}", or_dash(end.as_deref()));
    println!("timezone: {}", zone);
    println!("location: {}", or_dash(record.location.as_deref()));
    println!("description: {}", or_dash(record.description.as_deref()));
    println!("notes: {}", or_dash(record.notes.as_deref()));
    Ok(())
}

pub fn add(ctx: &Context<'_>, args: AddArgs) -> Result<()> {
    let kind = args.fields.parse_kind()?;
    let mut form = FormController::create(ctx.sites, &ctx.config.default_timezone)?;
    form.edit_draft(|draft| args.fields.apply(draft, kind))?;
    let record = submit(ctx, &mut form)?;

    if ctx.json {
        print_json(&record)?;
    } else {
        println!("created {} {}", record.id, record.title);
    }
    Ok(())
}

pub fn edit(ctx: &Context<'_>, args: EditArgs) -> Result<()> {
    if args.fields.is_empty() {
        return Err(invalid_input("no updates provided"));
    }
    let site_id = ctx.sites.require_active()?;
    let id = parse_interaction_id(&args.id)?;
    let kind = args.fields.parse_kind()?;
    let mut form = FormController::edit(id, ctx.sites, &ctx.config.default_timezone)?;
    let existing = get_record(ctx.api, site_id, id)?;
    form.load_record(&existing)?;
    form.edit_draft(|draft| args.fields.apply(draft, kind))?;
    let record = submit(ctx, &mut form)?;

    if ctx.json {
        print_json(&record)?;
    } else {
        println!("updated {} {}", record.id, record.title);
    }
    Ok(())
}

pub fn delete(ctx: &Context<'_>, args: DeleteArgs) -> Result<()> {
    let site_id = ctx.sites.require_active()?;
    let id = parse_interaction_id(&args.id)?;
    if !args.yes {
        return Err(invalid_input(format!(
            "refusing to delete interaction {} without --yes",
            id
        )));
    }

    let mut form = FormController::edit(id, ctx.sites, &ctx.config.default_timezone)?;
    let existing = get_record(ctx.api, site_id, id)?;
    form.load_record(&existing)?;
    form.request_delete()?;
    let target = form.confirm_delete()?;

    let result = ctx.api.delete_interaction(site_id, target);
    form.on_delete_result(result.as_ref().map(|_| ()).map_err(|err| err.to_string()))?;
    result.with_context(|| format!("delete interaction {}", target))?;

    if ctx.json {
        print_json(&serde_json::json!({ "deleted": target }))?;
    } else {
        println!("deleted {} {}", target, existing.title);
    }
    Ok(())
}

/// Runs the Validation Engine over the given fields without any API call.
pub fn validate(config: &AppConfig, json: bool, args: ValidateArgs) -> Result<()> {
    let mut draft = InteractionDraft {
        timezone: config.default_timezone.clone(),
        ..InteractionDraft::default()
    };
    let kind = args.fields.parse_kind()?;
    args.fields.apply(&mut draft, kind);
    let errors = validate_draft(&draft);

    if json {
        print_json(&ValidationReport {
            valid: errors.is_empty(),
            errors: &errors,
        })?;
    } else if errors.is_empty() {
        println!("valid");
    } else {
        for (field, message) in errors.iter() {
            println!("{}: {}", field.api_name(), message);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(invalid_input(format!("{} invalid field(s)", errors.len())))
    }
}

fn get_record(api: &dyn InteractionApi, site_id: SiteId, id: InteractionId) -> Result<Interaction> {
    match api.get_interaction(site_id, id) {
        Ok(record) => Ok(record),
        Err(err) if err.is_not_found() => Err(not_found(format!("interaction {}", id))),
        Err(err) => Err(err).with_context(|| format!("load interaction {}", id)),
    }
}

/// Submits the form once and returns the saved record. Field errors, from
/// the local rules or from the server, are printed before failing.
fn submit(ctx: &Context<'_>, form: &mut FormController) -> Result<Interaction> {
    let site_id = ctx.sites.require_active()?;
    let Some(request) = form.submit(SubmitKind::Save)? else {
        report_field_errors(form.errors());
        return Err(invalid_input("validation failed"));
    };

    let result = match &request {
        SubmitRequest::Create(payload) => ctx.api.create_interaction(site_id, payload),
        SubmitRequest::Update(id, payload) => ctx.api.update_interaction(site_id, *id, payload),
    };

    match result {
        Ok(record) => match form.on_submit_result(Ok(record))? {
            FormOutcome::Exit(FormExit::Saved(record))
            | FormOutcome::SavedAndNew(record) => Ok(record),
            other => Err(anyhow::anyhow!("unexpected form outcome: {:?}", other)),
        },
        Err(err) => {
            form.on_submit_result(Err(err.submit_failure()))?;
            report_field_errors(form.errors());
            Err(err).with_context(|| "save interaction")
        }
    }
}
