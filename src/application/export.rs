//! Export helpers
//!
//! Text artifacts derived from a tree:
//!
//! - the manifest (`FILES.csv`): every included node with its filtered size
//! - the summary (`README.txt`): overview plus the notes of included nodes
//! - the exclusion list handed to rsync via `--exclude-from`

use std::io::{self, Write};
use std::path::PathBuf;

use chrono::NaiveDateTime;
use tracing::warn;

use crate::domain::tree::{DirTree, NodeId};
use crate::domain::value_objects::ByteSize;

/// One manifest row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub id: NodeId,
    /// `/`-separated path below the root, empty for the root; non-ASCII
    /// characters are replaced with `?`
    pub path: String,
    pub is_directory: bool,
    /// Filtered size of the node
    pub size: u64,
}

/// Pre-order list of every node that is not excluded
///
/// Excluded nodes are pruned together with their whole subtree.
pub fn included_entries(tree: &DirTree) -> Vec<ManifestEntry> {
    let mut entries = Vec::new();
    let mut walk = tree.preorder();
    while let Some(id) = walk.next() {
        let node = &tree[id];
        if node.filter().is_excluded() {
            walk.skip_children(id);
            continue;
        }
        entries.push(ManifestEntry {
            id,
            path: ascii_lossy(&slash_path(tree, id)),
            is_directory: node.is_directory(),
            size: node.filtered_size(),
        });
    }
    entries
}

/// Write the manifest as CSV with a `path,is_directory,size` header
pub fn write_manifest<W: Write>(tree: &DirTree, mut out: W) -> io::Result<()> {
    writeln!(out, "path,is_directory,size")?;
    for entry in included_entries(tree) {
        writeln!(
            out,
            "{},{},{}",
            csv_field(&entry.path),
            entry.is_directory,
            entry.size
        )?;
    }
    out.flush()
}

/// Context for the summary header
#[derive(Debug, Clone)]
pub struct SummaryInfo {
    pub generated_at: NaiveDateTime,
    pub source: PathBuf,
    /// File name of the manifest the summary points to
    pub manifest_name: String,
}

/// Write the human-readable summary
pub fn write_summary<W: Write>(tree: &DirTree, info: &SummaryInfo, mut out: W) -> io::Result<()> {
    let root = &tree[tree.root()];

    writeln!(out, "Overview")?;
    writeln!(out, "========")?;
    writeln!(out)?;
    writeln!(
        out,
        "Files in this directory were copied using treepick on {} at {}.",
        info.generated_at.format("%b %-d, %Y"),
        info.generated_at.format("%-I:%M %p")
    )?;
    writeln!(out)?;
    writeln!(out, "Source directory: {}", info.source.display())?;
    writeln!(out, "Total size: {}", ByteSize(root.filtered_size()))?;
    writeln!(out)?;
    writeln!(out, "A full list of files can be found in {}", info.manifest_name)?;
    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "File Notes")?;
    writeln!(out, "==========")?;

    let mut walk = tree.preorder();
    while let Some(id) = walk.next() {
        let node = &tree[id];
        if node.filter().is_excluded() {
            walk.skip_children(id);
            continue;
        }
        let Some(notes) = node.notes() else {
            continue;
        };

        let path = slash_path(tree, id);
        writeln!(out)?;
        writeln!(out, "{}", if path.is_empty() { "." } else { path.as_str() })?;
        writeln!(out)?;
        for line in notes.lines() {
            let line = line.trim();
            if line.is_empty() {
                writeln!(out)?;
            } else {
                writeln!(out, "    {line}")?;
            }
        }
    }

    out.flush()
}

/// Write one rsync exclude pattern per excluded subtree
///
/// Patterns are anchored at the transfer root, directories end with `/`,
/// and nothing below an excluded node is listed. Names are written as their
/// on-disk bytes. Returns the number of patterns written.
pub fn write_exclusions<W: Write>(tree: &DirTree, mut out: W) -> io::Result<usize> {
    let mut count = 0;
    let mut walk = tree.preorder();
    while let Some(id) = walk.next() {
        let node = &tree[id];
        if !node.filter().is_excluded() {
            continue;
        }
        walk.skip_children(id);

        let path = slash_path_bytes(tree, id);
        let mut pattern = vec![b'/'];
        escape_pattern(&path, &mut pattern);
        if node.is_directory() && pattern.last() != Some(&b'/') {
            pattern.push(b'/');
        }
        if path.contains(&b'\n') || path.contains(&b'\r') {
            warn!(
                "{} has a line break in its name; its exclusion pattern may match siblings",
                tree.path(id).display()
            );
        }

        pattern.push(b'\n');
        out.write_all(&pattern)?;
        count += 1;
    }
    out.flush()?;
    Ok(count)
}

/// On-disk names below the root joined with `/`
fn slash_path_bytes(tree: &DirTree, id: NodeId) -> Vec<u8> {
    let mut names: Vec<&[u8]> = tree
        .ancestors(id)
        .filter(|&ancestor| ancestor != tree.root())
        .map(|ancestor| tree[ancestor].name_bytes())
        .collect();
    names.reverse();
    names.join(&b'/')
}

/// Names below the root joined with `/`
fn slash_path(tree: &DirTree, id: NodeId) -> String {
    let mut names: Vec<&str> = tree
        .ancestors(id)
        .filter(|&ancestor| ancestor != tree.root())
        .map(|ancestor| tree[ancestor].name())
        .collect();
    names.reverse();
    names.join("/")
}

fn ascii_lossy(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii() { c } else { '?' })
        .collect()
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Append `path` to `out` as a pattern rsync matches literally
///
/// rsync only treats `\` as an escape when the pattern holds one of
/// `*`, `?` or `[`, so plain paths are written as they are. Line breaks
/// cannot appear in an exclude file and become the `?` wildcard.
fn escape_pattern(path: &[u8], out: &mut Vec<u8>) {
    let wildcard = path
        .iter()
        .any(|byte| matches!(byte, b'*' | b'?' | b'[' | b'\n' | b'\r'));
    if !wildcard {
        out.extend_from_slice(path);
        return;
    }
    for &byte in path {
        match byte {
            b'\n' | b'\r' => out.push(b'?'),
            b'[' | b']' | b'?' | b'*' | b'\\' => {
                out.push(b'\\');
                out.push(byte);
            }
            _ => out.push(byte),
        }
    }
}
