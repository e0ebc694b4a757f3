mod commands;
mod error;
mod util;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::debug;

use crate::commands::{completions, interactions, sites, tui, Context};
use crate::error::{exit_code_for, not_found, report_error};
use ims_client::{HttpApi, InteractionApi, MemoryApi};
use ims_config as config;
use ims_core::{SiteContext, SiteId};

#[derive(Debug, Parser)]
#[command(name = "ims", version, about = "Interaction management CLI")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Site to work in (defaults to the configured or first accessible site)
    #[arg(long, global = true)]
    site: Option<SiteId>,
    /// Use the built-in sample data instead of the API
    #[arg(long, global = true)]
    demo: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List interactions for the active site
    List(interactions::ListArgs),
    Show(interactions::ShowArgs),
    Add(interactions::AddArgs),
    Edit(interactions::EditArgs),
    Delete(interactions::DeleteArgs),
    /// Check interaction fields without contacting the API
    Validate(interactions::ValidateArgs),
    /// List accessible sites
    Sites,
    Tui,
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        config: config_path,
        json,
        verbose,
        site,
        demo,
        command,
    } = cli;

    match command {
        Command::Completions(args) => completions::emit(args),
        Command::Tui => tui::launch(config_path, site, demo, verbose),
        Command::Validate(args) => {
            let app_config = config::load(config_path).with_context(|| "load config")?;
            interactions::validate(&app_config, json, args)
        }
        command => {
            let app_config = config::load(config_path.clone()).with_context(|| "load config")?;
            if verbose {
                match config::resolve_config_path(config_path) {
                    Ok(path) if path.exists() => debug!(path = %path.display(), "config resolved"),
                    Ok(path) => debug!(path = %path.display(), "config missing, using defaults"),
                    Err(err) => debug!(error = %err, "config unavailable"),
                }
            }

            let api: Box<dyn InteractionApi> = if demo {
                Box::new(MemoryApi::demo())
            } else {
                Box::new(
                    HttpApi::new(
                        &app_config.api.base_url,
                        app_config.api.token.clone(),
                        Duration::from_secs(app_config.api.timeout_secs),
                    )
                    .with_context(|| "build api client")?,
                )
            };
            debug!(backend = api.backend_name(), "api backend selected");

            let available = api.list_sites().with_context(|| "list sites")?;
            let preferred = site.or(app_config.default_site_id);
            if let Some(requested) = site {
                if !available.iter().any(|s| s.id == requested) {
                    return Err(not_found(format!("site {} is not accessible", requested)));
                }
            }
            let sites = SiteContext::start(available, preferred);

            let ctx = Context {
                api: api.as_ref(),
                sites: &sites,
                json,
                config: &app_config,
            };

            match command {
                Command::List(args) => interactions::list(&ctx, args),
                Command::Show(args) => interactions::show(&ctx, args),
                Command::Add(args) => interactions::add(&ctx, args),
                Command::Edit(args) => interactions::edit(&ctx, args),
                Command::Delete(args) => interactions::delete(&ctx, args),
                Command::Sites => sites::list_sites(&ctx),
                Command::Validate(_) | Command::Tui | Command::Completions(_) => {
                    unreachable!("offline commands handled before api setup")
                }
            }
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
