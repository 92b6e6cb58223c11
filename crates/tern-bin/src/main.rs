//! Tern entrypoint.
//!
//! Deliberately a thin collaborator around the core crates: one synchronous
//! loop reading a key event, dispatching to cursor/edit operations, and
//! repainting the full frame. No modes, no keymaps; the engine underneath
//! carries the interesting behavior.

use anyhow::Result;
use clap::Parser;
use core_buffer::{Buffer, SearchMode};
use core_model::{
    Frame, constrain_cursor_column, erase_backward, erase_forward, insert_byte, insert_newline,
    jump_left, jump_right, move_down, move_left, move_right, move_up, page_down, page_up,
    search_and_move,
};
use core_render::{FileKind, cursor_position, highlighter_for, layout_line, project};
use core_state::EditorState;
use core_terminal::{CrosstermBackend, FrameWriter, TerminalGuard};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, read};
use crossterm::terminal;
use std::path::PathBuf;
use std::sync::Once;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

mod config;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "tern", version, about = "Tern editor")]
struct Args {
    /// Optional path to open at startup. If omitted a scratch buffer is used.
    pub path: Option<PathBuf>,
    /// Optional configuration file path (overrides discovery of `tern.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

fn configure_logging(config: &config::Config) -> Option<WorkerGuard> {
    let dir = config.log_file.parent().unwrap_or(std::path::Path::new("."));
    let name = config
        .log_file
        .file_name()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "tern.log".into());
    let file_appender = tracing_appender::rolling::never(dir, name);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter));
    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(()) => Some(guard),
        // Global subscriber already installed (tests); drop the guard so the
        // writer shuts down.
        Err(_) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = config::load_from(args.config.clone())?;
    let _log_guard = configure_logging(&config);
    install_panic_hook();
    info!(target: "runtime", "startup");

    let mut app = App::new();
    if let Some(path) = args.path.as_ref() {
        match Buffer::load(path) {
            Ok(buf) => {
                app.kind = FileKind::from_path(path);
                let id = app.state.register(buf);
                app.state.switch_to(id);
            }
            Err(e) => {
                error!(target: "io", %e, "file_open_error");
                app.status = Some(format!("open failed: {e}"));
            }
        }
    }

    let mut backend = CrosstermBackend::with_title(config.title.as_str());
    let _guard = TerminalGuard::enter(&mut backend)?;
    let result = app.run();
    info!(target: "runtime", "shutdown");
    result
}

struct App {
    state: EditorState,
    kind: FileKind,
    status: Option<String>,
    needle: Vec<u8>,
    pending_quit: bool,
}

impl App {
    fn new() -> Self {
        Self {
            state: EditorState::new(),
            kind: FileKind::Plain,
            status: None,
            needle: Vec::new(),
            pending_quit: false,
        }
    }

    /// Text-area frame: the bottom terminal row is reserved for status.
    fn frame() -> Result<Frame> {
        let (w, h) = terminal::size()?;
        Ok(Frame::new(
            (w as usize).max(1),
            (h as usize).saturating_sub(1).max(1),
        ))
    }

    fn run(&mut self) -> Result<()> {
        loop {
            let frame = Self::frame()?;
            let status = self.status_line(frame);
            self.redraw(frame, &status, true)?;
            match read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    if !self.handle_key(key, frame)? {
                        return Ok(());
                    }
                }
                // Resize repaints on the next pass with the fresh size.
                _ => {}
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent, frame: Frame) -> Result<bool> {
        self.status = None;
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if !(ctrl && key.code == KeyCode::Char('q')) {
            self.pending_quit = false;
        }
        match key.code {
            KeyCode::Char('q') if ctrl => {
                if self.state.active_buffer().is_dirty() && !self.pending_quit {
                    self.pending_quit = true;
                    self.status = Some("unsaved changes (Ctrl-Q again to quit)".to_string());
                    return Ok(true);
                }
                return Ok(false);
            }
            KeyCode::Char('s') if ctrl => {
                let buf = self.state.active_buffer_mut();
                self.status = Some(match buf.save() {
                    Ok(()) => format!("wrote {}", buf.name),
                    Err(e) => format!("save failed: {e}"),
                });
            }
            KeyCode::Char('w') if ctrl => self.search_prompt(frame)?,
            KeyCode::Char(c) if !ctrl => {
                let mut utf8 = [0u8; 4];
                for &b in c.encode_utf8(&mut utf8).as_bytes() {
                    insert_byte(&mut self.state, b);
                }
            }
            KeyCode::Enter => insert_newline(&mut self.state, frame),
            KeyCode::Backspace => erase_backward(&mut self.state, frame),
            KeyCode::Delete => erase_forward(&mut self.state, frame),
            KeyCode::Up => move_up(&mut self.state, frame),
            KeyCode::Down => move_down(&mut self.state, frame),
            KeyCode::Left => move_left(&mut self.state),
            KeyCode::Right => move_right(&mut self.state),
            KeyCode::Home => jump_left(&mut self.state),
            KeyCode::End => jump_right(&mut self.state),
            KeyCode::PageUp => page_up(&mut self.state, frame),
            KeyCode::PageDown => page_down(&mut self.state, frame),
            _ => {}
        }
        Ok(true)
    }

    /// Modal line input on the status row; Enter runs the search, Esc
    /// abandons it. Repeating the previous needle continues from the next
    /// line instead of re-finding the match under the cursor.
    fn search_prompt(&mut self, frame: Frame) -> Result<()> {
        let mut input = String::new();
        loop {
            self.redraw(frame, &format!("/{input}"), false)?;
            let Event::Key(key) = read()? else { continue };
            if key.kind == KeyEventKind::Release {
                continue;
            }
            match key.code {
                KeyCode::Esc => return Ok(()),
                KeyCode::Enter => break,
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    input.push(c);
                }
                _ => {}
            }
        }
        if input.is_empty() {
            return Ok(());
        }
        let mode = if input.as_bytes() == self.needle.as_slice() {
            SearchMode::Next
        } else {
            SearchMode::FromCursor
        };
        self.needle = input.into_bytes();
        if search_and_move(&mut self.state, &self.needle, mode, frame) {
            constrain_cursor_column(self.state.active_buffer_mut());
        } else {
            self.status = Some(format!(
                "not found: {}",
                String::from_utf8_lossy(&self.needle)
            ));
        }
        Ok(())
    }

    fn status_line(&self, frame: Frame) -> String {
        if let Some(msg) = &self.status {
            return msg.clone();
        }
        let buf = self.state.active_buffer();
        let dirty = if buf.is_dirty() { " *" } else { "" };
        let text = format!(
            " {}{}  {}:{}",
            buf.name,
            dirty,
            buf.cur_index() + 1,
            buf.column
        );
        text.chars().take(frame.width).collect()
    }

    /// Full-frame repaint: projected text rows, the status row, and the
    /// cursor cell (hidden while a prompt owns the status row).
    fn redraw(&self, frame: Frame, status: &str, text_cursor: bool) -> Result<()> {
        let buf = self.state.active_buffer();
        let mut writer = FrameWriter::new();
        writer.clear_all();

        let visible = project(buf, frame);
        let mut hl = highlighter_for(self.kind);
        // stateful highlighters need the lines above the viewport replayed
        for idx in 0..buf.top {
            let _ = hl.spans(buf.line_bytes(idx), idx);
        }
        for v in &visible {
            let bytes = buf.line_bytes(v.index);
            let spans = hl.spans(bytes, v.index);
            for frag in layout_line(bytes, &spans, v.first_row, frame) {
                if frag.row <= frame.height {
                    writer.fragment(&frag);
                }
            }
        }

        writer.print(frame.height + 1, 1, status);
        if text_cursor {
            let (row, col) = cursor_position(buf, frame);
            writer.show_cursor_at(row, col);
        } else {
            writer.show_cursor_at(frame.height + 1, status.len() + 1);
        }
        writer.flush()
    }
}
