//! Domain Layer
//!
//! The selectable directory tree and the rules that keep it consistent,
//! without any I/O.
//!
//! ## Structure
//!
//! - `tree` - Arena-backed directory tree with filter propagation
//! - `value_objects/` - Immutable value types (FilterState, ByteSize)
//! - `ports/` - Interface definitions for infrastructure and presentation
//!
//! ## Design Principles
//!
//! 1. **No I/O** - This layer never touches the file system directly
//! 2. **Invariants after every mutation** - Filter states are re-derived
//!    along the touched path, never lazily
//! 3. **Ports & Adapters** - Scanning, copying and presentation plug in
//!    through trait-defined ports

pub mod ports;
pub mod tree;
pub mod value_objects;
