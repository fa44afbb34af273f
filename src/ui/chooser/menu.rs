//! Chooser view state and action handling.
//!
//! The tree itself owns the filter states; the menu only keeps what is
//! needed to show it: which directories are expanded, the cursor, the
//! scroll offset and a flattened list of visible rows.

use std::collections::{HashMap, HashSet};

use crate::domain::tree::{DirTree, NodeId};
use crate::domain::value_objects::FilterState;

use super::render::{render_help_bar, render_row, render_status_bar};
use crate::ui::theme::Glyphs;

/// A visible tree node, flattened for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: NodeId,
    /// Depth level (0 = root)
    pub depth: usize,
    /// Display label (directories end with `/`)
    pub label: String,
    pub filter: FilterState,
    pub size: u64,
    pub filtered_size: u64,
    pub has_children: bool,
    pub expanded: bool,
    pub has_notes: bool,
}

/// Chooser action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChooserAction {
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Expand,
    Collapse,
    /// Include an excluded node, exclude anything else
    Toggle,
    Include,
    Exclude,
    EditNotes,
    /// Finish and keep the selection
    Done,
    /// Abandon the run
    Abort,
}

/// What the event loop should do after an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Continue,
    EditNotes(NodeId),
    Done,
    Abort,
}

/// View state of the chooser
#[derive(Debug, Clone)]
pub struct ChooserMenu {
    expanded: HashSet<NodeId>,
    cursor: usize,
    scroll: usize,
    page_height: usize,
    rows: Vec<Row>,
    row_of: HashMap<NodeId, usize>,
}

impl ChooserMenu {
    /// Create a menu with only the root expanded
    pub fn new(tree: &DirTree, page_height: usize) -> Self {
        let mut menu = Self {
            expanded: HashSet::from([tree.root()]),
            cursor: 0,
            scroll: 0,
            page_height: page_height.max(1),
            rows: Vec::new(),
            row_of: HashMap::new(),
        };
        menu.rebuild(tree);
        menu
    }

    /// Rebuild the visible rows from scratch
    pub fn rebuild(&mut self, tree: &DirTree) {
        self.rows.clear();
        self.row_of.clear();

        let mut walk = tree.preorder();
        let mut depth_of: HashMap<NodeId, usize> = HashMap::new();
        while let Some(id) = walk.next() {
            let depth = tree[id]
                .parent()
                .and_then(|parent| depth_of.get(&parent))
                .map_or(0, |depth| depth + 1);
            depth_of.insert(id, depth);

            self.row_of.insert(id, self.rows.len());
            self.rows.push(self.row(tree, id, depth));
            if !self.expanded.contains(&id) {
                walk.skip_children(id);
            }
        }

        if self.cursor >= self.rows.len() {
            self.cursor = self.rows.len().saturating_sub(1);
        }
        self.scroll_to_cursor();
    }

    /// Refresh only the rows of nodes whose filter changed
    pub fn refresh(&mut self, tree: &DirTree, changed: &[NodeId]) {
        for id in changed {
            if let Some(&index) = self.row_of.get(id) {
                let node = &tree[*id];
                let row = &mut self.rows[index];
                row.filter = node.filter();
                row.filtered_size = node.filtered_size();
            }
        }
    }

    /// Refresh the notes marker of one row
    pub fn refresh_notes(&mut self, tree: &DirTree, id: NodeId) {
        if let Some(&index) = self.row_of.get(&id) {
            self.rows[index].has_notes = tree[id].has_notes();
        }
    }

    fn row(&self, tree: &DirTree, id: NodeId, depth: usize) -> Row {
        let node = &tree[id];
        Row {
            id,
            depth,
            label: tree.display_name(id),
            filter: node.filter(),
            size: node.size(),
            filtered_size: node.filtered_size(),
            has_children: !node.children().is_empty(),
            expanded: self.expanded.contains(&id),
            has_notes: node.has_notes(),
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Node under the cursor
    pub fn focused(&self) -> Option<NodeId> {
        self.rows.get(self.cursor).map(|row| row.id)
    }

    pub fn set_page_height(&mut self, page_height: usize) {
        self.page_height = page_height.max(1);
        self.scroll_to_cursor();
    }

    /// Handle an action, mutating the tree for filter changes
    ///
    /// Filter changes are reflected in the rows through [`Self::refresh`],
    /// which the caller drives with the ids its observer collected.
    pub fn handle_action(&mut self, action: ChooserAction, tree: &mut DirTree) -> ActionOutcome {
        let last = self.rows.len().saturating_sub(1);
        match action {
            ChooserAction::Up => self.cursor = self.cursor.saturating_sub(1),
            ChooserAction::Down => self.cursor = (self.cursor + 1).min(last),
            ChooserAction::PageUp => self.cursor = self.cursor.saturating_sub(self.page_height),
            ChooserAction::PageDown => self.cursor = (self.cursor + self.page_height).min(last),
            ChooserAction::Home => self.cursor = 0,
            ChooserAction::End => self.cursor = last,
            ChooserAction::Expand => {
                if let Some(id) = self.focused() {
                    if !tree[id].children().is_empty() && self.expanded.insert(id) {
                        self.rebuild(tree);
                    }
                }
            }
            ChooserAction::Collapse => {
                if let Some(id) = self.focused() {
                    if self.expanded.remove(&id) {
                        self.rebuild(tree);
                    } else if let Some(parent) = tree[id].parent() {
                        // Already collapsed: jump to the parent
                        if let Some(&index) = self.row_of.get(&parent) {
                            self.cursor = index;
                        }
                    }
                }
            }
            ChooserAction::Toggle => {
                if let Some(id) = self.focused() {
                    tree.toggle(id);
                }
            }
            ChooserAction::Include => {
                if let Some(id) = self.focused() {
                    tree.include_all(id);
                }
            }
            ChooserAction::Exclude => {
                if let Some(id) = self.focused() {
                    tree.exclude_all(id);
                }
            }
            ChooserAction::EditNotes => {
                if let Some(id) = self.focused() {
                    return ActionOutcome::EditNotes(id);
                }
            }
            ChooserAction::Done => return ActionOutcome::Done,
            ChooserAction::Abort => return ActionOutcome::Abort,
        }
        self.scroll_to_cursor();
        ActionOutcome::Continue
    }

    fn scroll_to_cursor(&mut self) {
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        } else if self.cursor >= self.scroll + self.page_height {
            self.scroll = self.cursor + 1 - self.page_height;
        }
    }

    /// Render the visible page of rows, each cut to `width` columns
    pub fn render(&self, glyphs: Glyphs, width: usize) -> String {
        let mut out = String::new();
        let end = (self.scroll + self.page_height).min(self.rows.len());
        for index in self.scroll..end {
            out.push_str(&render_row(
                &self.rows[index],
                index == self.cursor,
                glyphs,
                width,
            ));
            out.push('\n');
        }
        out
    }

    /// Render the status bar for the focused node
    pub fn render_status_bar(&self, tree: &DirTree, glyphs: Glyphs) -> String {
        render_status_bar(tree, self.focused(), glyphs)
    }

    /// Render the help bar
    pub fn render_help_bar(&self) -> String {
        render_help_bar()
    }
}
