//! Diagram service
//!
//! Builds layouts for trees and drives the renderer, either returning the
//! encoded image, saving it, or handing it to an image viewer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{AnyTree, LayoutGraph, LayoutOptions, DEFAULT_MAX_NODES};
use crate::infrastructure::traits::{FileSystem, ImageViewer, Renderer};
use crate::infrastructure::RenderError;

/// Service turning trees into rendered diagrams.
pub struct DiagramService {
    fs: Arc<dyn FileSystem>,
    renderer: Arc<dyn Renderer>,
    viewer: Arc<dyn ImageViewer>,
    max_depth: usize,
    max_nodes: usize,
}

impl DiagramService {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        renderer: Arc<dyn Renderer>,
        viewer: Arc<dyn ImageViewer>,
        max_depth: usize,
    ) -> Self {
        Self {
            fs,
            renderer,
            viewer,
            max_depth,
            max_nodes: DEFAULT_MAX_NODES,
        }
    }

    /// Caps the number of layout nodes a diagram may contain.
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Layout options carrying the configured depth and size guards.
    pub fn options(&self, title: Option<&str>, show_sentinels: Option<bool>) -> LayoutOptions {
        LayoutOptions {
            show_sentinels,
            title: title.map(str::to_string),
            max_depth: self.max_depth,
            max_nodes: self.max_nodes,
        }
    }

    /// Build the padded layout graph of a tree.
    pub fn layout(&self, tree: &AnyTree, options: &LayoutOptions) -> ApplicationResult<LayoutGraph> {
        Ok(tree.layout(options)?)
    }

    /// Render a tree to encoded image bytes.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn render(&self, tree: &AnyTree, title: Option<&str>) -> ApplicationResult<Vec<u8>> {
        let graph = tree
            .layout(&self.options(title, None))
            .map_err(RenderError::Layout)?;
        let image = self.renderer.render(&graph)?;
        debug!(bytes = image.len(), format = self.renderer.format(), "rendered");
        Ok(image)
    }

    /// Render a tree and return the image as standard base64 text.
    pub fn render_base64(&self, tree: &AnyTree, title: Option<&str>) -> ApplicationResult<String> {
        Ok(STANDARD.encode(self.render(tree, title)?))
    }

    /// Render a tree and write the image to `path`.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn save(&self, tree: &AnyTree, path: &Path, title: Option<&str>) -> ApplicationResult<()> {
        let image = self.render(tree, title)?;
        self.fs.ensure_parent(path).or_save_error(path)?;
        self.fs.write(path, &image).or_save_error(path)?;
        info!("Saved diagram to {}", path.display());
        Ok(())
    }

    /// Render a tree into a kept temporary file and open it in the viewer.
    ///
    /// Render failures surface as [`ApplicationError::Render`]; failures to
    /// store or open the image surface as [`ApplicationError::Display`].
    #[instrument(level = "debug", skip(self, tree))]
    pub fn display(&self, tree: &AnyTree, title: Option<&str>) -> ApplicationResult<PathBuf> {
        let image = self.render(tree, title)?;

        let suffix = format!(".{}", self.renderer.format());
        let file = tempfile::Builder::new()
            .prefix("treediag-")
            .suffix(&suffix)
            .tempfile()
            .map_err(|e| display_err("create temporary image", e))?;
        let path = file
            .into_temp_path()
            .keep()
            .map_err(|e| display_err("keep temporary image", e.error))?;

        self.fs
            .write(&path, &image)
            .map_err(|e| display_err("write temporary image", e))?;
        self.viewer
            .open(&path)
            .map_err(|e| display_err("open viewer", e))?;

        debug!("displayed {}", path.display());
        Ok(path)
    }
}

fn display_err(action: &str, error: std::io::Error) -> ApplicationError {
    ApplicationError::Display {
        message: format!("{action}: {error}"),
    }
}
