use anyhow::Result;
use ims_client::InteractionApi;
use ims_config::AppConfig;
use ims_core::SiteContext;
use serde::Serialize;
use std::io::{self, Write};

pub mod completions;
pub mod interactions;
pub mod sites;
pub mod tui;

pub struct Context<'a> {
    pub api: &'a dyn InteractionApi,
    pub sites: &'a SiteContext,
    pub json: bool,
    pub config: &'a AppConfig,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
