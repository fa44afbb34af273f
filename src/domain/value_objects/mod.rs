//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod byte_size;
mod filter_state;

pub use byte_size::ByteSize;
pub use filter_state::FilterState;
