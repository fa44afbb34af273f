//! Tree file codec
//!
//! Line-oriented format. The first line is a JSON array of field names;
//! every following line is a JSON array of values for one node, in
//! pre-order, root first:
//!
//! ```text
//! ["id","name","is_directory","parent","size","filter","filtered_size","notes"]
//! [1,"/home/me",true,null,35,"P",25,""]
//! [2,"A",true,1,30,"P",20,"photos"]
//! ```
//!
//! Ids are only meaningful within one file. Readers go by the header, so
//! extra columns are ignored and `notes` may be absent. A name that is not
//! valid UTF-8 is stored as an array of its bytes.

use std::collections::HashMap;
use std::fs;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::domain::tree::{trim_separators, DirTree, Node, NodeId};
use crate::domain::value_objects::FilterState;

/// Field names written in the header, in column order
pub const FIELDS: [&str; 8] = [
    "id",
    "name",
    "is_directory",
    "parent",
    "size",
    "filter",
    "filtered_size",
    "notes",
];

const REQUIRED: [&str; 7] = [
    "id",
    "name",
    "is_directory",
    "parent",
    "size",
    "filter",
    "filtered_size",
];

/// A tree file that cannot be turned back into a tree
///
/// Line numbers are 1-based; the header is line 1.
#[derive(Error, Debug)]
pub enum CorruptDataError {
    #[error("cannot read tree file: {0}")]
    Io(#[from] io::Error),

    #[error("tree file is empty")]
    MissingHeader,

    #[error("line {line}: malformed header: {message}")]
    MalformedHeader { line: usize, message: String },

    #[error("line {line}: header lacks required field '{field}'")]
    MissingField { line: usize, field: &'static str },

    #[error("line {line}: malformed record: {message}")]
    MalformedRecord { line: usize, message: String },

    #[error("line {line}: expected {expected} values, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: invalid {field}: {value}")]
    InvalidValue {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: invalid byte count for {field}: {value}")]
    InvalidSize {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: invalid filter code {value}")]
    InvalidFilter { line: usize, value: String },

    #[error("line {line}: duplicate id {id}")]
    DuplicateId { line: usize, id: String },

    #[error("line {line}: parent {parent} does not precede this record")]
    UnknownParent { line: usize, parent: String },

    #[error("line {line}: parent {parent} is a file")]
    ChildOfFile { line: usize, parent: String },

    #[error("line {line}: second root record")]
    SecondRoot { line: usize },

    #[error("tree file has no root record")]
    NoRoot,
}

impl CorruptDataError {
    /// Line the problem was found on, when it is tied to one
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::MalformedHeader { line, .. }
            | Self::MissingField { line, .. }
            | Self::MalformedRecord { line, .. }
            | Self::FieldCount { line, .. }
            | Self::InvalidValue { line, .. }
            | Self::InvalidSize { line, .. }
            | Self::InvalidFilter { line, .. }
            | Self::DuplicateId { line, .. }
            | Self::UnknownParent { line, .. }
            | Self::ChildOfFile { line, .. }
            | Self::SecondRoot { line } => Some(*line),
            Self::Io(_) | Self::MissingHeader | Self::NoRoot => None,
        }
    }
}

/// Write `tree` in the tree file format
pub fn encode<W: Write>(tree: &DirTree, out: W) -> io::Result<()> {
    let mut out = BufWriter::new(out);
    serde_json::to_writer(&mut out, &FIELDS)?;
    writeln!(out)?;

    // Save ids by arena index; parents are numbered before their children
    let mut ids = vec![0u64; tree.node_count()];
    for (next, id) in (1u64..).zip(tree.preorder()) {
        ids[id.index()] = next;
        let node = &tree[id];
        let name = if node.has_lossy_name() {
            Value::from(node.name_bytes().to_vec())
        } else {
            Value::from(node.name())
        };
        let record = (
            next,
            name,
            node.is_directory(),
            node.parent().map(|parent| ids[parent.index()]),
            node.size(),
            node.filter().code().to_string(),
            node.filtered_size(),
            node.notes().unwrap_or(""),
        );
        serde_json::to_writer(&mut out, &record)?;
        writeln!(out)?;
    }

    out.flush()
}

/// Rebuild a tree from the tree file format
///
/// Stored filter states and filtered sizes are taken as they are.
pub fn decode<R: BufRead>(input: R) -> Result<DirTree, CorruptDataError> {
    let mut lines = input
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line));

    let columns = match lines.next() {
        Some((line, text)) => {
            let text = text.map_err(|e| match e.kind() {
                io::ErrorKind::InvalidData => CorruptDataError::MalformedHeader {
                    line,
                    message: e.to_string(),
                },
                _ => CorruptDataError::Io(e),
            })?;
            Columns::parse(line, &text)?
        }
        None => return Err(CorruptDataError::MissingHeader),
    };

    let mut tree: Option<DirTree> = None;
    let mut by_id: HashMap<String, NodeId> = HashMap::new();

    for (line, text) in lines {
        let text = text.map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData => CorruptDataError::MalformedRecord {
                line,
                message: e.to_string(),
            },
            _ => CorruptDataError::Io(e),
        })?;
        if text.trim().is_empty() {
            continue;
        }

        let values: Vec<Value> =
            serde_json::from_str(&text).map_err(|e| CorruptDataError::MalformedRecord {
                line,
                message: e.to_string(),
            })?;
        if values.len() != columns.width {
            return Err(CorruptDataError::FieldCount {
                line,
                expected: columns.width,
                found: values.len(),
            });
        }

        let record = Record::parse(line, &columns, &values)?;
        if by_id.contains_key(&record.id) {
            return Err(CorruptDataError::DuplicateId {
                line,
                id: record.id,
            });
        }

        let node = Node::restored(
            record.name,
            record.is_directory,
            record.size,
            record.filter,
            record.filtered_size,
            record.notes,
        );

        let id = match record.parent {
            None => {
                if tree.is_some() {
                    return Err(CorruptDataError::SecondRoot { line });
                }
                let new_tree = DirTree::from_root(node);
                let root = new_tree.root();
                tree = Some(new_tree);
                root
            }
            Some(parent) => {
                let parent_id = by_id.get(&parent).copied();
                match (tree.as_mut(), parent_id) {
                    (Some(tree), Some(parent_id)) => {
                        if !tree[parent_id].is_directory() {
                            return Err(CorruptDataError::ChildOfFile { line, parent });
                        }
                        tree.attach(parent_id, node)
                    }
                    _ => return Err(CorruptDataError::UnknownParent { line, parent }),
                }
            }
        };
        by_id.insert(record.id, id);
    }

    tree.ok_or(CorruptDataError::NoRoot)
}

/// Save `tree` to `path`, replacing it atomically
pub fn save_tree(tree: &DirTree, path: &Path) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    encode(tree, file.as_file_mut())?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Load a tree saved with [`save_tree`]
pub fn load_tree(path: &Path) -> Result<DirTree, CorruptDataError> {
    let file = fs::File::open(path)?;
    decode(BufReader::new(file))
}

/// Column positions taken from the header
struct Columns {
    width: usize,
    id: usize,
    name: usize,
    is_directory: usize,
    parent: usize,
    size: usize,
    filter: usize,
    filtered_size: usize,
    notes: Option<usize>,
}

impl Columns {
    fn parse(line: usize, text: &str) -> Result<Self, CorruptDataError> {
        let names: Vec<String> =
            serde_json::from_str(text).map_err(|e| CorruptDataError::MalformedHeader {
                line,
                message: e.to_string(),
            })?;

        let position = |field: &str| names.iter().position(|name| name == field);
        for field in REQUIRED {
            if position(field).is_none() {
                return Err(CorruptDataError::MissingField { line, field });
            }
        }
        let required = |field: &str| position(field).unwrap_or_default();

        Ok(Self {
            width: names.len(),
            id: required("id"),
            name: required("name"),
            is_directory: required("is_directory"),
            parent: required("parent"),
            size: required("size"),
            filter: required("filter"),
            filtered_size: required("filtered_size"),
            notes: position("notes"),
        })
    }
}

/// One decoded record, before it is attached to the tree
struct Record {
    id: String,
    parent: Option<String>,
    name: Vec<u8>,
    is_directory: bool,
    size: u64,
    filter: FilterState,
    filtered_size: u64,
    notes: Option<String>,
}

impl Record {
    fn parse(line: usize, columns: &Columns, values: &[Value]) -> Result<Self, CorruptDataError> {
        let id = key(line, "id", &values[columns.id])?;
        let parent = match &values[columns.parent] {
            Value::Null => None,
            value => Some(key(line, "parent", value)?),
        };

        let is_directory = values[columns.is_directory].as_bool().ok_or_else(|| {
            CorruptDataError::InvalidValue {
                line,
                field: "is_directory",
                value: values[columns.is_directory].to_string(),
            }
        })?;

        let invalid_name = || CorruptDataError::InvalidValue {
            line,
            field: "name",
            value: values[columns.name].to_string(),
        };
        let name = match &values[columns.name] {
            Value::String(name) if is_directory => trim_separators(name.clone()).into_bytes(),
            Value::String(name) => name.clone().into_bytes(),
            Value::Array(bytes) => bytes
                .iter()
                .map(|byte| byte.as_u64().and_then(|byte| u8::try_from(byte).ok()))
                .collect::<Option<Vec<u8>>>()
                .ok_or_else(invalid_name)?,
            _ => return Err(invalid_name()),
        };

        let filter = values[columns.filter]
            .as_str()
            .and_then(FilterState::parse_stored)
            .ok_or_else(|| CorruptDataError::InvalidFilter {
                line,
                value: values[columns.filter].to_string(),
            })?;

        let notes = match columns.notes.map(|index| &values[index]) {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(text.trim().to_string()),
            Some(other) => {
                return Err(CorruptDataError::InvalidValue {
                    line,
                    field: "notes",
                    value: other.to_string(),
                })
            }
        };

        let size = byte_count(line, "size", &values[columns.size])?;
        let filtered_size = byte_count(line, "filtered_size", &values[columns.filtered_size])?;
        if filtered_size > size {
            return Err(CorruptDataError::InvalidSize {
                line,
                field: "filtered_size",
                value: format!("{filtered_size} exceeds size {size}"),
            });
        }

        Ok(Self {
            id,
            parent,
            name,
            is_directory,
            size,
            filter,
            filtered_size,
            notes,
        })
    }
}

/// Ids may be integers or strings; both become lookup keys
fn key(line: usize, field: &'static str, value: &Value) -> Result<String, CorruptDataError> {
    match value {
        Value::Number(number) if number.is_u64() || number.is_i64() => Ok(number.to_string()),
        Value::String(text) => Ok(text.clone()),
        other => Err(CorruptDataError::InvalidValue {
            line,
            field,
            value: other.to_string(),
        }),
    }
}

fn byte_count(line: usize, field: &'static str, value: &Value) -> Result<u64, CorruptDataError> {
    value.as_u64().ok_or_else(|| CorruptDataError::InvalidSize {
        line,
        field,
        value: value.to_string(),
    })
}
