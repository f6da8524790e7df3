//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, Renderer, etc.)
//! but are themselves concrete structs, not traits.

mod diagram;
mod tree;

pub use diagram::DiagramService;
pub use tree::{TreeService, TreeSource};
