mod actions;
mod app;
mod ui;
mod util;

use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context as _, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::actions::Worker;
use crate::app::App;
use ims_client::{HttpApi, InteractionApi, MemoryApi};
use ims_core::SiteId;

#[derive(Debug, Parser)]
#[command(name = "ims-tui", version, about = "Interaction management TUI")]
struct Args {
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    site: Option<SiteId>,
    /// Use the built-in sample data instead of the API
    #[arg(long)]
    demo: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = ims_config::load(args.config).with_context(|| "load config")?;

    let api: Box<dyn InteractionApi> = if args.demo {
        Box::new(MemoryApi::demo())
    } else {
        Box::new(
            HttpApi::new(
                &config.api.base_url,
                config.api.token.clone(),
                Duration::from_secs(config.api.timeout_secs),
            )
            .with_context(|| "build api client")?,
        )
    };
    let worker = Worker::spawn(api)?;
    let mut app = App::new(&config, args.site);

    let mut terminal = TerminalGuard::new()?;
    run_app(&mut terminal, &worker, &mut app)
}

fn run_app(terminal: &mut TerminalGuard, worker: &Worker, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    loop {
        while let Some(action) = app.next_action() {
            worker.send(action)?;
        }
        while let Some(reply) = worker.try_recv() {
            app.apply_reply(reply);
        }

        terminal.terminal_mut().draw(|frame| ui::draw(frame, app))?;

        if app.should_quit {
            break;
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }

    Ok(())
}

struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.clear()?;

        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = restore_terminal();
            original_hook(info);
        }));

        Ok(Self { terminal })
    }

    fn terminal_mut(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = restore_terminal();
    }
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}
