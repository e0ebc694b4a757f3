use crate::commands::{print_json, Context};
use anyhow::Result;
use ims_core::SiteId;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct SiteRow<'a> {
    id: SiteId,
    name: &'a str,
    description: Option<&'a str>,
    active: bool,
}

pub fn list_sites(ctx: &Context<'_>) -> Result<()> {
    let active = ctx.sites.active_id();
    let rows: Vec<SiteRow<'_>> = ctx
        .sites
        .sites()
        .iter()
        .map(|site| SiteRow {
            id: site.id,
            name: &site.name,
            description: site.description.as_deref(),
            active: Some(site.id) == active,
        })
        .collect();

    if ctx.json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        println!("no accessible sites");
        return Ok(());
    }
    for row in rows {
        let marker = if row.active { '*' } else { ' ' };
        match row.description {
            Some(description) => println!("{} {} {} ({})", marker, row.id, row.name, description),
            None => println!("{} {} {}", marker, row.id, row.name),
        }
    }
    Ok(())
}
