//! Terminal backend abstraction and crossterm implementation.
//!
//! The backend owns raw-mode and alternate-screen state; `TerminalGuard`
//! restores cooperative mode on drop so every exit path (including panics
//! unwinding through the binary) leaves the terminal usable.

use anyhow::Result;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{
        Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode,
        enable_raw_mode,
    },
};
use std::io::{Write, stdout};

use core_render::{Fragment, Style};

pub trait TerminalBackend {
    fn enter(&mut self) -> Result<()>;
    fn leave(&mut self) -> Result<()>;
}

/// Crossterm-backed terminal: raw mode plus alternate screen, with the
/// configured window title applied on entry.
pub struct CrosstermBackend {
    title: Option<String>,
    entered: bool,
}

/// RAII guard ensuring terminal state restoration even if the caller
/// early-returns or panics.
pub struct TerminalGuard<'a, B: TerminalBackend> {
    backend: &'a mut B,
    active: bool,
}

impl<'a, B: TerminalBackend> TerminalGuard<'a, B> {
    /// Enter the backend; the guard leaves again on drop.
    pub fn enter(backend: &'a mut B) -> Result<Self> {
        backend.enter()?;
        Ok(Self {
            backend,
            active: true,
        })
    }
}

impl<B: TerminalBackend> Drop for TerminalGuard<'_, B> {
    fn drop(&mut self) {
        if self.active {
            let _ = self.backend.leave();
        }
    }
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermBackend {
    pub fn new() -> Self {
        Self {
            title: None,
            entered: false,
        }
    }

    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            entered: false,
        }
    }
}

impl TerminalBackend for CrosstermBackend {
    fn enter(&mut self) -> Result<()> {
        if !self.entered {
            enable_raw_mode()?;
            execute!(stdout(), EnterAlternateScreen, Hide)?;
            if let Some(title) = &self.title {
                execute!(stdout(), SetTitle(title))?;
            }
            self.entered = true;
        }
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        if self.entered {
            execute!(stdout(), LeaveAlternateScreen, Show)?;
            disable_raw_mode()?;
            self.entered = false;
        }
        Ok(())
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

/// Batched frame commands, flushed in one pass per redraw. Ordering is
/// preserved; nothing reaches the terminal before `flush`.
#[derive(Debug)]
enum Command {
    MoveTo(u16, u16),
    ClearAll,
    Print(String, Style),
    ShowCursorAt(u16, u16),
}

#[derive(Default)]
pub struct FrameWriter {
    cmds: Vec<Command>,
}

fn color_for(style: Style) -> Option<Color> {
    match style {
        Style::Normal => None,
        Style::Added => Some(Color::Green),
        Style::Removed => Some(Color::Red),
        Style::Header => Some(Color::Cyan),
    }
}

impl FrameWriter {
    pub fn new() -> Self {
        Self { cmds: Vec::new() }
    }

    pub fn clear_all(&mut self) {
        self.cmds.push(Command::ClearAll);
    }

    /// Position for subsequent prints; 1-based frame coordinates.
    pub fn move_to(&mut self, row: usize, col: usize) {
        self.cmds
            .push(Command::MoveTo(col as u16 - 1, row as u16 - 1));
    }

    /// Queue one styled fragment at its frame cell. Fragments arrive from
    /// the projector with whole UTF-8 sequences, and each one is emitted as
    /// a single print, so a sequence is never split across writes.
    pub fn fragment(&mut self, f: &Fragment) {
        if f.text.is_empty() {
            return;
        }
        debug_assert!(
            !core_text::utf8::is_continuation(f.text.as_bytes()[0]),
            "fragment starts mid-sequence"
        );
        self.move_to(f.row, f.col);
        self.cmds.push(Command::Print(f.text.clone(), f.style));
    }

    pub fn print(&mut self, row: usize, col: usize, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        self.move_to(row, col);
        self.cmds.push(Command::Print(text, Style::Normal));
    }

    /// Final cursor cell; 1-based frame coordinates.
    pub fn show_cursor_at(&mut self, row: usize, col: usize) {
        self.cmds
            .push(Command::ShowCursorAt(col as u16 - 1, row as u16 - 1));
    }

    pub fn flush(self) -> Result<()> {
        let mut out = stdout();
        queue!(out, Hide)?;
        for c in self.cmds {
            match c {
                Command::MoveTo(x, y) => queue!(out, MoveTo(x, y))?,
                Command::ClearAll => queue!(out, Clear(ClearType::All))?,
                Command::Print(s, style) => match color_for(style) {
                    Some(color) => {
                        queue!(out, SetForegroundColor(color), Print(s), ResetColor)?;
                    }
                    None => queue!(out, Print(s))?,
                },
                Command::ShowCursorAt(x, y) => queue!(out, MoveTo(x, y), Show)?,
            }
        }
        out.flush()?;
        Ok(())
    }
}
