//! Tree records: `{ "value": int, "color"?: "RED"|"BLACK", "left": Node|null, "right": Node|null }`

use std::collections::HashMap;

use generational_arena::Index;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::domain::error::{DomainResult, ValidationError};
use crate::domain::node::{BinaryTree, NodeId, NodeRef, Side, TreeNode};
use crate::domain::variant::Variant;

pub const VALUE_KEY: &str = "value";
pub const LEFT_KEY: &str = "left";
pub const RIGHT_KEY: &str = "right";

/// Default bound on record nesting accepted by the decoder.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Extra bracket nesting allowed around the tree record, e.g. the envelope a
/// JSON pointer selects from.
pub const DOCUMENT_NESTING_SLACK: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Deepest accepted nesting, counting the root as level 1
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

fn side_key(side: Side) -> &'static str {
    match side {
        Side::Left => LEFT_KEY,
        Side::Right => RIGHT_KEY,
    }
}

/// JSON type name for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "record",
    }
}

fn decode_value(record: &Map<String, Value>) -> Result<i64, ValidationError> {
    match record.get(VALUE_KEY) {
        None => Err(ValidationError::MissingValueKey),
        Some(Value::Null) => Err(ValidationError::MissingValue),
        Some(Value::Number(n)) => n.as_i64().ok_or_else(|| ValidationError::InvalidValue {
            found: n.to_string(),
        }),
        Some(other) => Err(ValidationError::InvalidValue {
            found: json_kind(other).to_string(),
        }),
    }
}

/// Deepest `{`/`[` nesting in `text`, stopping early once it passes `limit`.
/// Brackets inside string literals are ignored.
fn bracket_depth(text: &str, limit: usize) -> usize {
    let mut depth = 0usize;
    let mut deepest = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for byte in text.bytes() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                deepest = deepest.max(depth);
                if deepest > limit {
                    break;
                }
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

/// Parses JSON text for tree decoding.
///
/// serde_json's built-in recursion limit (128) is replaced by `max_depth`
/// plus [`DOCUMENT_NESTING_SLACK`], checked on the raw text before parsing,
/// so deep but allowed trees parse and overly deep input is `TooDeep`.
pub fn parse_json(text: &str, max_depth: usize) -> Result<Value, ValidationError> {
    let limit = max_depth.saturating_add(DOCUMENT_NESTING_SLACK);
    if bracket_depth(text, limit) > limit {
        return Err(ValidationError::TooDeep { limit: max_depth });
    }

    let mut deserializer = serde_json::Deserializer::from_str(text);
    deserializer.disable_recursion_limit();
    let malformed = |e: serde_json::Error| ValidationError::MalformedJson(e.to_string());
    let value = Value::deserialize(&mut deserializer).map_err(malformed)?;
    deserializer.end().map_err(malformed)?;
    Ok(value)
}

impl<'a, V: Variant> NodeRef<'a, V> {
    /// Encodes this node and its subtrees as a record.
    pub fn to_value(&self) -> Value {
        let mut encoded: HashMap<Index, Value> = HashMap::new();
        for node in self.iter_postorder() {
            let left = node
                .node
                .left
                .and_then(|i| encoded.remove(&i))
                .unwrap_or(Value::Null);
            let right = node
                .node
                .right
                .and_then(|i| encoded.remove(&i))
                .unwrap_or(Value::Null);

            let mut record = Map::new();
            record.insert(VALUE_KEY.to_string(), Value::from(node.value()));
            node.tag().encode_tag(&mut record);
            record.insert(LEFT_KEY.to_string(), left);
            record.insert(RIGHT_KEY.to_string(), right);
            encoded.insert(node.index, Value::Object(record));
        }
        encoded.remove(&self.index).unwrap_or(Value::Null)
    }
}

impl<V: Variant> BinaryTree<V> {
    /// Encodes the tree; an empty tree encodes as `null`.
    #[instrument(level = "debug", skip(self))]
    pub fn to_value(&self) -> Value {
        self.root_ref()
            .map(|root| root.to_value())
            .unwrap_or(Value::Null)
    }

    pub fn subtree_to_value(&self, id: NodeId) -> DomainResult<Value> {
        Ok(self.get(id)?.to_value())
    }

    pub fn to_json_string(&self) -> String {
        self.to_value().to_string()
    }

    pub fn to_json_pretty(&self) -> String {
        format!("{:#}", self.to_value())
    }

    /// Decodes a record; `null` yields an empty tree.
    pub fn from_value(value: &Value) -> DomainResult<Self> {
        Self::from_value_with(value, DecodeOptions::default())
    }

    /// Decodes a record with explicit limits. Nothing is returned unless the
    /// whole record validates.
    #[instrument(level = "debug", skip(value))]
    pub fn from_value_with(value: &Value, options: DecodeOptions) -> DomainResult<Self> {
        let mut tree = Self::new();
        tree.root = tree.decode_node(value, 1, options.max_depth)?;
        debug!(variant = %V::KIND, nodes = tree.arena.len(), "decoded tree");
        Ok(tree)
    }

    pub fn from_json_str(json: &str) -> DomainResult<Self> {
        Self::from_json_str_with(json, DecodeOptions::default())
    }

    pub fn from_json_str_with(json: &str, options: DecodeOptions) -> DomainResult<Self> {
        let value = parse_json(json, options.max_depth)?;
        Self::from_value_with(&value, options)
    }

    fn decode_node(
        &mut self,
        value: &Value,
        level: usize,
        max_depth: usize,
    ) -> Result<Option<Index>, ValidationError> {
        let record = match value {
            Value::Null => return Ok(None),
            Value::Object(record) => record,
            other => {
                return Err(ValidationError::NotARecord {
                    found: json_kind(other).to_string(),
                })
            }
        };
        if level > max_depth {
            return Err(ValidationError::TooDeep { limit: max_depth });
        }

        let node_value = decode_value(record)?;
        let tag = V::decode_tag(record)?;
        let idx = self.arena.insert(TreeNode::new(node_value, tag));

        for side in [Side::Left, Side::Right] {
            let Some(child_value) = record.get(side_key(side)) else {
                continue;
            };
            let Some(cidx) = self.decode_node(child_value, level + 1, max_depth)? else {
                continue;
            };
            if let Some(child) = self.arena.get_mut(cidx) {
                child.parent = Some(idx);
                child.owner = Some(idx);
            }
            if let Some(node) = self.arena.get_mut(idx) {
                match side {
                    Side::Left => node.left = Some(cidx),
                    Side::Right => node.right = Some(cidx),
                }
            }
        }
        Ok(Some(idx))
    }
}

impl<V: Variant> Serialize for BinaryTree<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de, V: Variant> Deserialize<'de> for BinaryTree<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::PlainTree;
    use serde_json::json;

    #[test]
    fn test_decode_value_rejects_non_integers() {
        let record = |v: Value| match v {
            Value::Object(m) => m,
            _ => Map::new(),
        };
        assert_eq!(
            decode_value(&record(json!({"value": 1.5}))),
            Err(ValidationError::InvalidValue { found: "1.5".into() })
        );
        assert_eq!(
            decode_value(&record(json!({"value": "7"}))),
            Err(ValidationError::InvalidValue { found: "string".into() })
        );
        assert_eq!(decode_value(&record(json!({"value": -3}))), Ok(-3));
    }

    #[test]
    fn test_bracket_depth_ignores_brackets_in_strings() {
        assert_eq!(bracket_depth(r#"{"a": "[[{{\"]]", "b": [1]}"#, 10), 2);
        assert_eq!(bracket_depth("null", 10), 0);
    }

    #[test]
    fn test_bracket_depth_stops_past_limit() {
        let text = "[".repeat(10_000);
        assert_eq!(bracket_depth(&text, 8), 9);
    }

    #[test]
    fn test_depth_limit_counts_root_as_level_one() {
        let two_levels = json!({"value": 1, "left": {"value": 0}, "right": null});
        let limited = DecodeOptions { max_depth: 1 };

        assert!(PlainTree::from_value_with(&two_levels, DecodeOptions { max_depth: 2 }).is_ok());
        assert_eq!(
            PlainTree::from_value_with(&two_levels, limited).unwrap_err(),
            ValidationError::TooDeep { limit: 1 }.into()
        );
    }
}
