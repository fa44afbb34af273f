//! Interactive tree chooser
//!
//! A full-screen crossterm loop over the directory tree. Filter changes go
//! straight to the [`DirTree`]; the menu learns which rows to redraw from
//! a filter observer subscribed for the length of the session.
//!
//! - `menu` - View state (expanded set, cursor, scroll) and actions
//! - `input` - Key bindings
//! - `render` - Row, status bar and help text rendering

mod input;
mod menu;
mod render;

pub use input::key_to_action;
pub use menu::{ActionOutcome, ChooserAction, ChooserMenu, Row};

use std::cell::RefCell;
use std::io::{self, Stdout, Write};
use std::rc::Rc;

use crossterm::{
    cursor,
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{self, ClearType},
};
use tracing::debug;

use crate::domain::ports::{SelectionOutcome, TreeSelector};
use crate::domain::tree::{DirTree, Node, NodeId};
use crate::ui::terminal::TerminalCapabilities;
use crate::ui::theme::{prompt_theme, Glyphs};

/// Lines used by everything but the tree rows
const CHROME_LINES: u16 = 11;

/// [`TreeSelector`] driven by the keyboard in a raw-mode terminal
#[derive(Debug, Clone, Default)]
pub struct TreeChooser {
    ascii: bool,
}

impl TreeChooser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force ASCII icons even on Unicode terminals
    pub fn with_ascii(mut self, ascii: bool) -> Self {
        self.ascii = ascii;
        self
    }
}

impl TreeSelector for TreeChooser {
    fn select(&mut self, tree: &mut DirTree) -> io::Result<SelectionOutcome> {
        let caps = TerminalCapabilities::detect();
        if !caps.is_tty {
            return Err(io::Error::other(
                "the chooser needs an interactive terminal (use --quiet to skip it)",
            ));
        }

        let changed: Rc<RefCell<Vec<NodeId>>> = Rc::default();
        let sink = Rc::clone(&changed);
        let subscription = tree.subscribe(move |id: NodeId, _: &Node| sink.borrow_mut().push(id));

        let glyphs = Glyphs::new(caps.supports_unicode && !self.ascii);
        let result = run_session(tree, &changed, caps, glyphs);

        tree.unsubscribe(subscription);
        result
    }
}

/// Leaves raw mode and restores the cursor when dropped
struct RawMode;

impl RawMode {
    fn enter(stdout: &mut Stdout) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(stdout, cursor::Hide)?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = execute!(
            stdout,
            cursor::Show,
            terminal::Clear(ClearType::All),
            cursor::MoveTo(0, 0)
        );
        let _ = terminal::disable_raw_mode();
    }
}

fn page_height(height: u16) -> usize {
    usize::from(height.saturating_sub(CHROME_LINES).max(3))
}

fn run_session(
    tree: &mut DirTree,
    changed: &Rc<RefCell<Vec<NodeId>>>,
    caps: TerminalCapabilities,
    glyphs: Glyphs,
) -> io::Result<SelectionOutcome> {
    let mut stdout = io::stdout();
    let mut width = usize::from(caps.width);
    let mut menu = ChooserMenu::new(tree, page_height(caps.height));

    let mut raw = Some(RawMode::enter(&mut stdout)?);
    draw(&mut stdout, &menu, tree, glyphs, width)?;

    loop {
        let key = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => key,
            Event::Resize(cols, rows) => {
                width = usize::from(cols);
                menu.set_page_height(page_height(rows));
                draw(&mut stdout, &menu, tree, glyphs, width)?;
                continue;
            }
            _ => continue,
        };
        let Some(action) = key_to_action(key) else {
            continue;
        };

        match menu.handle_action(action, tree) {
            ActionOutcome::Continue => {}
            ActionOutcome::Done => return Ok(SelectionOutcome::Confirmed),
            ActionOutcome::Abort => return Ok(SelectionOutcome::Aborted),
            ActionOutcome::EditNotes(id) => {
                drop(raw.take());
                edit_notes(tree, id)?;
                menu.refresh_notes(tree, id);
                raw.replace(RawMode::enter(&mut stdout)?);
            }
        }

        let dirty: Vec<NodeId> = changed.borrow_mut().drain(..).collect();
        if !dirty.is_empty() {
            debug!(count = dirty.len(), "refreshing rows after filter change");
            menu.refresh(tree, &dirty);
        }
        draw(&mut stdout, &menu, tree, glyphs, width)?;
    }
}

fn draw(
    stdout: &mut Stdout,
    menu: &ChooserMenu,
    tree: &DirTree,
    glyphs: Glyphs,
    width: usize,
) -> io::Result<()> {
    execute!(
        stdout,
        terminal::Clear(ClearType::All),
        cursor::MoveTo(0, 0)
    )?;

    print!("treepick: {}\r\n", tree[tree.root()].name());
    print!("\r\n");

    for line in menu.render(glyphs, width).lines() {
        print!("{line}\r\n");
    }

    print!("{}\r\n", glyphs.separator().repeat(width.min(72)));
    for line in menu.render_status_bar(tree, glyphs).lines() {
        print!("{line}\r\n");
    }
    print!("\r\n");
    for line in menu.render_help_bar().lines() {
        print!("{line}\r\n");
    }

    stdout.flush()
}

/// Prompt for the notes of one node on a cooked terminal
///
/// The prompt is a single line, so line breaks are edited as a literal `\n`.
fn edit_notes(tree: &mut DirTree, id: NodeId) -> io::Result<()> {
    let current = tree[id].notes().map(escape_newlines).unwrap_or_default();

    let input = dialoguer::Input::<String>::with_theme(&prompt_theme())
        .with_prompt(format!("Notes for {}", tree.path(id).display()))
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()
        .map_err(io::Error::other)?;

    tree.set_notes(id, Some(unescape_newlines(&input)));
    Ok(())
}

fn escape_newlines(notes: &str) -> String {
    notes.replace('\\', "\\\\").replace('\n', "\\n")
}

fn unescape_newlines(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
