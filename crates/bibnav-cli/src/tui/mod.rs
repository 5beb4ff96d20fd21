//! Terminal front end of the dispatcher.

mod events;
mod palette;
mod screen;

use std::io;

use anyhow::Result;
use bibnav_engine::{Dispatcher, Records};
use crossterm::cursor::Show;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

pub use events::{CrosstermEvents, translate_key};
pub use palette::{Palette, to_color};
pub use screen::{TerminalScreen, draw};

/// Raw mode and the alternate screen for as long as the guard lives.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        if let Err(err) = execute!(io::stdout(), EnterAlternateScreen) {
            restore_terminal();
            return Err(err);
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
}

/// Leave raw mode before the panic message is printed.
fn install_panic_hook() {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal();
        hook(info);
    }));
}

/// Run the dispatcher on the controlling terminal until the user quits.
pub fn run<R: Records>(dispatcher: &mut Dispatcher<R>, palette: Palette) -> Result<()> {
    install_panic_hook();
    let _guard = TerminalGuard::enter()?;

    let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    let mut screen = TerminalScreen::new(terminal, palette).attached();
    dispatcher.run(&mut CrosstermEvents, &mut screen)?;

    tracing::info!("tui closed");
    Ok(())
}
