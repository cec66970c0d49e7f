//! Raw-mode terminal session.
//!
//! Entering sets raw mode, the alternate screen and focus reporting (focus
//! stands in for page visibility). Leaving undoes all three, both on `Drop`
//! and from a panic hook, so a panic never strands the shell in raw mode.

use std::{
    io::{self, Stdout, Write},
    panic,
    sync::Once,
};

use anyhow::Result;
use crossterm::{
    cursor::Show,
    event::{DisableFocusChange, EnableFocusChange},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};

static PANIC_RESTORE: Once = Once::new();

pub struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    pub fn new() -> Result<Self> {
        install_panic_restore_hook();
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        if let Err(error) = enter_screen(&mut stdout) {
            let _ = disable_raw_mode();
            return Err(error.into());
        }

        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }

    pub fn width(&self) -> Result<u16> {
        Ok(self.terminal.size()?.width)
    }

    pub fn draw<F>(&mut self, render: F) -> Result<()>
    where
        F: FnOnce(&mut Frame<'_>),
    {
        self.terminal.draw(render)?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = leave_screen(self.terminal.backend_mut());
    }
}

fn enter_screen(out: &mut impl Write) -> io::Result<()> {
    execute!(out, EnterAlternateScreen, EnableFocusChange)
}

fn leave_screen(out: &mut impl Write) -> io::Result<()> {
    execute!(out, DisableFocusChange, LeaveAlternateScreen, Show)
}

/// Restores the terminal before the previous hook prints the panic message.
fn install_panic_restore_hook() {
    PANIC_RESTORE.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = leave_screen(&mut io::stdout());
            previous(panic_info);
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(write: fn(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        write(&mut out).expect("writing to a buffer cannot fail");
        String::from_utf8(out).expect("escape sequences are ascii")
    }

    #[test]
    fn entering_switches_screen_and_reports_focus() {
        let out = written(|out| enter_screen(out));

        assert!(out.contains("\u{1b}[?1049h"));
        assert!(out.contains("\u{1b}[?1004h"));
    }

    #[test]
    fn leaving_undoes_focus_reporting_and_screen_and_shows_cursor() {
        let out = written(|out| leave_screen(out));

        assert!(out.contains("\u{1b}[?1004l"));
        assert!(out.contains("\u{1b}[?1049l"));
        assert!(out.contains("\u{1b}[?25h"));
    }
}
