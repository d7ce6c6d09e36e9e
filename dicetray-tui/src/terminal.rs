use std::io::{self, Stdout};

use anyhow::Context;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use dicetray::prelude::TerminalCapabilities;
use ratatui::{Terminal, backend::CrosstermBackend};

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Probes the real terminal once. Falls back to the library defaults when the
/// size cannot be read.
pub fn probe_capabilities() -> TerminalCapabilities {
    let env = |name: &str| std::env::var(name).ok();
    let defaults = TerminalCapabilities::default();
    let (width, height) = crossterm::terminal::size().unwrap_or_else(|e| {
        log::warn!("Could not read terminal size: {}", e);
        (defaults.width, defaults.height)
    });
    let capabilities = TerminalCapabilities {
        width,
        height,
        emoji_support: supports_emoji(env),
        color_support: supports_color(env),
    };
    log::info!("Terminal capabilities: {:?}", capabilities);
    capabilities
}

fn supports_emoji(env: impl Fn(&str) -> Option<String>) -> bool {
    if env("TERM").as_deref() == Some("linux") {
        return false;
    }
    // first non-empty of LC_ALL, LC_CTYPE, LANG wins
    ["LC_ALL", "LC_CTYPE", "LANG"]
        .iter()
        .filter_map(|name| env(name))
        .find(|value| !value.is_empty())
        .map(|locale| {
            let locale = locale.to_ascii_lowercase();
            locale.contains("utf-8") || locale.contains("utf8")
        })
        .unwrap_or(false)
}

fn supports_color(env: impl Fn(&str) -> Option<String>) -> bool {
    if env("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        return false;
    }
    !matches!(env("TERM").as_deref(), Some("dumb") | None)
}

pub fn enter() -> anyhow::Result<Tui> {
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.hide_cursor()?;
    terminal.clear()?;
    Ok(terminal)
}

pub fn leave(terminal: &mut Tui) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Restores the terminal before the default panic message is printed.
pub fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        default_hook(info);
    }));
}
