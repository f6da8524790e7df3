//! Per-variant node policy.
//!
//! A tree is parameterized by its variant tag, so base and colored nodes can
//! never meet inside one tree. Everything that differs between the variants
//! (the `color` key in records, sentinel display, fill color) lives here.

use std::fmt;

use serde_json::{Map, Value};

use crate::domain::color::Color;
use crate::domain::error::ValidationError;

/// Record key holding the color token of a red-black node.
pub const COLOR_KEY: &str = "color";

/// Runtime name of a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    Plain,
    Colored,
}

impl VariantKind {
    pub fn name(&self) -> &'static str {
        match self {
            VariantKind::Plain => "binary",
            VariantKind::Colored => "red-black",
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tag carried by every node of a tree, one implementation per variant.
pub trait Variant: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    const KIND: VariantKind;

    /// Whether diagrams draw absent children as visible `NIL` markers by default.
    const SHOW_SENTINELS: bool;

    /// Reads the variant tag from a node record, enforcing the variant's key rules.
    fn decode_tag(record: &Map<String, Value>) -> Result<Self, ValidationError>;

    /// Writes the variant tag into a node record.
    fn encode_tag(&self, record: &mut Map<String, Value>);

    /// Diagram fill color; `None` draws the node unfilled.
    fn fill_color(&self) -> Option<&'static str>;

    /// Suffix shown after the value in text renderings.
    fn annotation(&self) -> Option<String>;
}

/// Tag of the base (uncolored) binary tree node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Plain;

impl Variant for Plain {
    const KIND: VariantKind = VariantKind::Plain;
    const SHOW_SENTINELS: bool = false;

    fn decode_tag(record: &Map<String, Value>) -> Result<Self, ValidationError> {
        if record.contains_key(COLOR_KEY) {
            return Err(ValidationError::UnexpectedColor);
        }
        Ok(Plain)
    }

    fn encode_tag(&self, _record: &mut Map<String, Value>) {}

    fn fill_color(&self) -> Option<&'static str> {
        None
    }

    fn annotation(&self) -> Option<String> {
        None
    }
}

impl Variant for Color {
    const KIND: VariantKind = VariantKind::Colored;
    const SHOW_SENTINELS: bool = true;

    fn decode_tag(record: &Map<String, Value>) -> Result<Self, ValidationError> {
        match record.get(COLOR_KEY) {
            None => Err(ValidationError::MissingColor),
            Some(Value::String(token)) => token.parse(),
            Some(other) => Err(ValidationError::InvalidColor(other.to_string())),
        }
    }

    fn encode_tag(&self, record: &mut Map<String, Value>) {
        record.insert(COLOR_KEY.to_string(), Value::from(self.as_str()));
    }

    fn fill_color(&self) -> Option<&'static str> {
        Some(self.fill())
    }

    fn annotation(&self) -> Option<String> {
        Some(self.as_str().to_string())
    }
}
