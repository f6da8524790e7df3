//! Tree loading service
//!
//! Reads serialized tree records from files or inline text, selects a
//! sub-record by JSON pointer and decodes it as the requested variant.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::codec::parse_json;
use crate::domain::{AnyTree, DecodeOptions, DomainError, VariantKind};
use crate::infrastructure::traits::FileSystem;

/// Where a serialized tree comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeSource {
    File(PathBuf),
    /// Already read text, e.g. from stdin
    Inline(String),
}

/// Service for decoding trees from their JSON records.
pub struct TreeService {
    fs: Arc<dyn FileSystem>,
    options: DecodeOptions,
}

impl TreeService {
    pub fn new(fs: Arc<dyn FileSystem>, max_depth: usize) -> Self {
        Self {
            fs,
            options: DecodeOptions { max_depth },
        }
    }

    /// Load and decode a tree.
    ///
    /// `kind` forces a variant; `None` detects it from the root record.
    /// `pointer` (RFC 6901) selects a nested record, e.g. `/answer/tree`.
    #[instrument(level = "debug", skip(self))]
    pub fn load(
        &self,
        source: &TreeSource,
        kind: Option<VariantKind>,
        pointer: Option<&str>,
    ) -> ApplicationResult<AnyTree> {
        let text = match source {
            TreeSource::File(path) => self
                .fs
                .read_to_string(path)
                .with_path_context("read tree", path)?,
            TreeSource::Inline(text) => text.clone(),
        };
        self.parse(&text, kind, pointer)
    }

    /// Decode a tree from JSON text.
    pub fn parse(
        &self,
        text: &str,
        kind: Option<VariantKind>,
        pointer: Option<&str>,
    ) -> ApplicationResult<AnyTree> {
        let document: Value =
            parse_json(text, self.options.max_depth).map_err(DomainError::from)?;

        let record = match pointer {
            None | Some("") => &document,
            Some(pointer) => {
                document
                    .pointer(pointer)
                    .ok_or_else(|| ApplicationError::PointerNotFound {
                        pointer: pointer.to_string(),
                    })?
            }
        };

        let tree = AnyTree::from_value_as(record, kind, self.options)?;
        debug!(kind = %tree.kind(), nodes = tree.len(), "tree loaded");
        Ok(tree)
    }
}
