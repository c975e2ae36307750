//! Shared vocabulary for the Garnet execution engine.
//!
//! Everything the IR and the VM agree on lives here:
//!
//! - **Symbols** (`intern.rs`): globally interned names with O(1) equality
//! - **Shapes** (`shape.rs`): identity of a receiver's effective type
//! - **Values** (`value.rs`): runtime values passed through dispatch
//! - **Locations** (`location.rs`): source positions of call sites

pub mod intern;
pub mod location;
pub mod shape;
pub mod value;

pub use intern::{Symbol, intern};
pub use location::SourceLocation;
pub use shape::ShapeId;
pub use value::{Object, Value};
