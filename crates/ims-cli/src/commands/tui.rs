use anyhow::{anyhow, Result};
use ims_core::SiteId;
use std::env;
use std::path::PathBuf;
use std::process::Command;

const TUI_BINARY: &str = "ims-tui";

/// Replaces the current process with the `ims-tui` binary that sits next to
/// this one, forwarding the global options it understands.
pub fn launch(
    config_path: Option<PathBuf>,
    site: Option<SiteId>,
    demo: bool,
    verbose: bool,
) -> Result<()> {
    let binary = find_tui_binary();
    if verbose {
        eprintln!("tui: {}", binary.display());
    }
    let mut command = Command::new(&binary);
    if let Some(path) = config_path {
        command.arg("--config").arg(path);
    }
    if let Some(site) = site {
        command.arg("--site").arg(site.to_string());
    }
    if demo {
        command.arg("--demo");
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        let err = command.exec();
        Err(exec_error(err))
    }

    #[cfg(not(unix))]
    {
        let status = command.status().map_err(exec_error)?;
        std::process::exit(status.code().unwrap_or(1));
    }
}

fn find_tui_binary() -> PathBuf {
    let name = format!("{}{}", TUI_BINARY, env::consts::EXE_SUFFIX);
    let sibling = env::current_exe()
        .ok()
        .and_then(|current| current.parent().map(|dir| dir.join(&name)))
        .filter(|candidate| candidate.is_file());
    sibling.unwrap_or_else(|| PathBuf::from(name))
}

fn exec_error(err: std::io::Error) -> anyhow::Error {
    if err.kind() == std::io::ErrorKind::NotFound {
        return anyhow!(
            "{} binary not found; build it with `cargo build -p {}`",
            TUI_BINARY,
            TUI_BINARY
        );
    }
    anyhow!("launch {} failed: {}", TUI_BINARY, err)
}
