//! Document model.
//!
//! Types shared by the marked-text parser, the block renderer and the
//! package writers.

mod document;
mod paragraph;
mod section;
mod style;
mod table;

pub use document::*;
pub use paragraph::*;
pub use section::*;
pub use style::*;
pub use table::*;
