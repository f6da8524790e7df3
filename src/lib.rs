//! Binary and red-black tree records with padded Graphviz diagrams.
//!
//! Layers, inside out: [`domain`] (tree model, traversal, codec, layout),
//! [`application`] (loading and diagram services), [`infrastructure`]
//! (filesystem, subprocess and Graphviz adapters) and [`cli`].

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
