//! Terminal user interface
//!
//! - `chooser/` - Interactive tree chooser (the `TreeSelector` implementation)
//! - `theme` - Icons with ASCII fallback
//! - `terminal` - Terminal capability detection

pub mod chooser;
pub mod terminal;
pub mod theme;

pub use chooser::TreeChooser;
