//! Rendering of chooser rows, status bar and help text.

use unicode_width::UnicodeWidthChar;

use crate::domain::tree::{DirTree, NodeId};
use crate::domain::value_objects::{ByteSize, FilterState};
use crate::ui::theme::{Glyphs, NOTES_MARKER};

use super::menu::Row;

/// Render a single row, cut to `width` display columns
pub fn render_row(row: &Row, is_active: bool, glyphs: Glyphs, width: usize) -> String {
    let cursor = if is_active {
        format!("{} ", glyphs.cursor())
    } else {
        String::from("  ")
    };
    let indent = "  ".repeat(row.depth);

    let expand_icon = if row.has_children {
        if row.expanded {
            format!("{} ", glyphs.expanded())
        } else {
            format!("{} ", glyphs.collapsed())
        }
    } else {
        " ".repeat(glyphs.expanded().chars().count() + 1)
    };

    let state_icon = filter_icon(row.filter, glyphs);

    let size = match row.filter {
        FilterState::Partial => format!(
            "{} of {}",
            ByteSize(row.filtered_size),
            ByteSize(row.size)
        ),
        _ => ByteSize(row.size).to_string(),
    };

    let notes = if row.has_notes {
        format!(" {NOTES_MARKER}")
    } else {
        String::new()
    };

    let line = format!(
        "{cursor}{indent}{expand_icon}{state_icon} {} ({size}){notes}",
        row.label
    );
    truncate(&line, width)
}

/// Icon for a filter state
pub fn filter_icon(filter: FilterState, glyphs: Glyphs) -> &'static str {
    match filter {
        FilterState::IncludeAll => glyphs.included(),
        FilterState::ExcludeAll => glyphs.excluded(),
        FilterState::Partial => glyphs.partial(),
    }
}

/// Render the status bar: totals, the focused path and its first note line
pub fn render_status_bar(tree: &DirTree, focused: Option<NodeId>, glyphs: Glyphs) -> String {
    let root = &tree[tree.root()];
    let mut status = format!(
        "Included {} of {}",
        ByteSize(root.filtered_size()),
        ByteSize(root.size())
    );

    if let Some(id) = focused {
        status.push('\n');
        status.push_str(&tree.path(id).display().to_string());
        if let Some(first) = tree[id].notes().and_then(|notes| notes.lines().next()) {
            status.push_str(&format!("\n{NOTES_MARKER} {first}"));
        }
    }

    status.push_str(&format!(
        "\n\n{} = included    {} = partial    {} = excluded",
        glyphs.included(),
        glyphs.partial(),
        glyphs.excluded()
    ));
    status
}

/// Render the help bar showing keyboard shortcuts
pub fn render_help_bar() -> String {
    String::from(
        "[Space] Toggle    [i] Include    [e] Exclude    [n] Notes    [Enter] Done    [Esc] Abort\n\
         (Use ↑↓ to navigate, →← to expand/collapse, PgUp/PgDn/Home/End to jump)",
    )
}

/// Cut `text` to at most `width` display columns
fn truncate(text: &str, width: usize) -> String {
    let mut used = 0;
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(c);
    }
    out
}
