// SPDX-License-Identifier: MIT
//
// pres — a terminal text viewer and editor.
//
// This is the main binary that wires the two crates together:
//
//   pres-term   → terminal control, rendering, input parsing, event loop
//   pres-editor → buffer, highlighter, viewport cursor, key map
//
// `Pres` implements pres-term's App trait. Each keypress flows through:
//
//   /dev/tty → parser → map_key → Document::handle (mutate → re-highlight → move)
//   paint → tokens colored by class → framebuffer → diff renderer → terminal
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ text                         │  ← rows - 1
//   ├──────────────────────────────┤
//   │ status line (INVERSE)        │  ← 1 row
//   └──────────────────────────────┘
//
// The document comes from the files on the command line, joined with line
// breaks, or from stdin. Keys always come from the controlling terminal.

use std::fs::{self, OpenOptions};
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use std::sync::Mutex;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pres_editor::document::Document;
use pres_editor::highlight::ColorScheme;
use pres_editor::keymap::map_key;
use pres_editor::session::{CursorStore, JsonCursorStore};
use pres_editor::syntax::{SyntaxDefinition, SyntaxSet};

use pres_term::color::Color;
use pres_term::event_loop::{Action, App, EventLoop};
use pres_term::frame::{FrameBuffer, FrameError};
use pres_term::input::KeyEvent;
use pres_term::terminal::{self, Size};

// ─── Command line ───────────────────────────────────────────────────────────

/// Present text files in the terminal, with highlighting.
#[derive(Debug, Parser)]
#[command(name = "pres", version, about)]
struct Args {
    /// Allow editing. Without it the document is read-only.
    #[arg(short, long)]
    edit: bool,

    /// File type to highlight as, by name or extension (`python`, `rs`).
    #[arg(long, value_name = "TYPE")]
    syntax: Option<String>,

    /// Files to show, joined in order. Reads stdin when none are given.
    files: Vec<PathBuf>,
}

// ─── Directories ────────────────────────────────────────────────────────────

const APP_DIR: &str = "pres";

fn config_file(name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(name))
}

/// Log to `<cache_dir>/pres/pres.log`, filtered by `PRES_LOG` (default
/// `warn`). The terminal is in raw mode on the alternate screen, so nothing
/// may go to stdout or stderr. Without a cache directory, logs are dropped.
fn init_logging() {
    let Some(dir) = dirs::cache_dir().map(|dir| dir.join(APP_DIR)) else {
        return;
    };
    let file = fs::create_dir_all(&dir).and_then(|()| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("pres.log"))
    });
    let Ok(file) = file else {
        return;
    };

    let filter = EnvFilter::try_from_env("PRES_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
}

// ─── Loading ────────────────────────────────────────────────────────────────

/// The document text: every file joined with `\n`, or stdin.
fn read_input(files: &[PathBuf]) -> Result<String> {
    if files.is_empty() {
        if terminal::stdin_is_tty() {
            tracing::debug!("no files and stdin is a terminal, starting empty");
            return Ok(String::new());
        }
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("cannot read stdin")?;
        return Ok(text);
    }

    let texts = files
        .iter()
        .map(|path| {
            fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(texts.join("\n"))
}

/// Built-in definitions with the user's syntax file layered on top.
fn load_syntaxes() -> Result<SyntaxSet> {
    let mut set = SyntaxSet::builtin().context("built-in syntax definitions")?;
    if let Some(path) = config_file("syntax.json") {
        if let Some(user) =
            SyntaxSet::load(&path).with_context(|| format!("loading {}", path.display()))?
        {
            set.merge(user);
        }
    }
    Ok(set)
}

/// The definition to highlight with: `--syntax` if given, else the first
/// file's extension. No match means no highlighting.
fn pick_syntax<'a>(
    set: &'a SyntaxSet,
    forced: Option<&str>,
    files: &[PathBuf],
) -> Result<Option<&'a SyntaxDefinition>> {
    if let Some(name) = forced {
        let Some(def) = set.find(name) else {
            bail!("unknown file type `{name}`");
        };
        return Ok(Some(def));
    }
    Ok(files.first().and_then(|path| set.for_path(path)))
}

/// The key for cursor persistence: the absolute path of the one file shown.
fn persistent_path(files: &[PathBuf]) -> Option<PathBuf> {
    match files {
        [only] => only
            .canonicalize()
            .inspect_err(|err| tracing::debug!(path = %only.display(), %err, "cannot canonicalize"))
            .ok(),
        _ => None,
    }
}

// ─── App ────────────────────────────────────────────────────────────────────

/// The pres application: one document and the colors to paint it with.
struct Pres {
    doc: Document,
    colors: ColorScheme,
    title: String,
}

impl Pres {
    fn new(doc: Document, colors: ColorScheme, title: impl Into<String>) -> Self {
        Self {
            doc,
            colors,
            title: title.into(),
        }
    }

    fn status(&self) -> String {
        let mut status = format!(" {}  {}", self.title, self.doc.cursor());
        if let Some(syntax) = self.doc.highlighter().syntax() {
            status.push_str("  ");
            status.push_str(syntax.name());
        }
        if !self.doc.is_editable() {
            status.push_str("  [RO]");
        } else if self.doc.buffer().is_modified() {
            status.push_str("  [+]");
        }
        status
    }

    /// Paint buffer line `line` on screen row `row`, starting at column
    /// `origin_x`.
    fn paint_line(
        &self,
        frame: &mut FrameBuffer,
        row: u16,
        line: usize,
        origin_x: usize,
    ) -> Result<(), FrameError> {
        let chars: Vec<char> = self.doc.buffer().line_text(line).chars().collect();
        if origin_x >= chars.len() {
            return Ok(());
        }
        frame.put_chars(0, row, chars[origin_x..].iter().copied(), Color::Default)?;

        let width = usize::from(frame.width());
        for token in self.doc.highlighter().tokens(line) {
            let start = token.start.max(origin_x);
            if start >= token.end {
                continue;
            }
            let x = start - origin_x;
            if x >= width {
                break;
            }
            let color = self.colors.color(token.class);
            if color.is_default() {
                continue;
            }
            let end = token.end.min(chars.len());
            frame.put_chars(to_u16(x), row, chars[start..end].iter().copied(), color)?;
        }
        Ok(())
    }
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Rows available for text: everything but the status line.
const fn text_rows(size: Size) -> usize {
    size.rows.saturating_sub(1) as usize
}

impl App for Pres {
    fn on_key(&mut self, key: KeyEvent) -> Action {
        let Some(edit_key) = map_key(key) else {
            return Action::Continue;
        };
        if self.doc.handle(edit_key).quit {
            Action::Quit
        } else {
            Action::Continue
        }
    }

    fn on_resize(&mut self, size: Size) {
        self.doc.resize(text_rows(size), usize::from(size.cols));
    }

    fn paint(&mut self, frame: &mut FrameBuffer) -> Result<(), FrameError> {
        let rows = frame.height();
        if rows == 0 {
            return Ok(());
        }
        let view = self.doc.view().viewport();
        let lines = self.doc.buffer().line_count();

        for row in 0..rows - 1 {
            let line = view.origin_y + usize::from(row);
            if line >= lines {
                break;
            }
            self.paint_line(frame, row, line, view.origin_x)?;
        }

        frame.put_bar(rows - 1, &self.status())
    }

    fn cursor(&self) -> Option<(u16, u16)> {
        let (x, y) = self.doc.view().screen_cursor();
        let view = self.doc.view().viewport();
        (y < view.height && x < view.width.max(1)).then(|| (to_u16(x), to_u16(y)))
    }
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn run() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let text = read_input(&args.files)?;
    let syntaxes = load_syntaxes()?;
    let syntax = pick_syntax(&syntaxes, args.syntax.as_deref(), &args.files)?.cloned();

    let mut colors = ColorScheme::default();
    colors.apply_overrides(syntaxes.colors());

    let mut event_loop = EventLoop::new().context("failed to initialize terminal")?;
    let size = event_loop.size();
    let mut doc = Document::new(&text, syntax, text_rows(size), usize::from(size.cols))
        .editable(args.edit);

    let persisted = persistent_path(&args.files);
    let mut store = config_file("cursors.json").map(JsonCursorStore::open);
    if let (Some(path), Some(store)) = (&persisted, &store) {
        doc = doc.with_path(path);
        if let Some(state) = store.get(path) {
            doc.restore_cursor(state.into());
        }
    }

    let title = match args.files.as_slice() {
        [] => "<stdin>".to_owned(),
        [only] => only.display().to_string(),
        many => format!("{} files", many.len()),
    };
    let mut app = Pres::new(doc, colors, title);
    event_loop.run(&mut app).context("terminal error")?;

    if let (Some(path), Some(store)) = (app.doc.path(), store.as_mut()) {
        store
            .set(path, app.doc.cursor().into())
            .context("saving cursor position")?;
    }
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        tracing::error!("{err:#}");
        eprintln!("pres: {err:#}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
