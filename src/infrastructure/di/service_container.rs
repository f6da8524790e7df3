//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{DiagramService, TreeService};
use crate::config::Settings;
use crate::infrastructure::graphviz::GraphvizRenderer;
use crate::infrastructure::traits::{
    CommandRunner, FileSystem, ImageViewer, RealCommandRunner, RealFileSystem, Renderer,
    SystemViewer,
};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Command runner abstraction
    pub cmd: Arc<dyn CommandRunner>,

    pub renderer: Arc<dyn Renderer>,

    pub viewer: Arc<dyn ImageViewer>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(
            settings,
            Arc::new(RealFileSystem),
            Arc::new(RealCommandRunner),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    ///
    /// Renderer and viewer run their programs through `cmd`.
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        cmd: Arc<dyn CommandRunner>,
    ) -> Self {
        let renderer: Arc<dyn Renderer> =
            Arc::new(GraphvizRenderer::new(cmd.clone(), settings.render.clone()));
        let viewer: Arc<dyn ImageViewer> =
            Arc::new(SystemViewer::new(cmd.clone(), settings.viewer.command.clone()));
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            cmd,
            renderer,
            viewer,
        }
    }

    pub fn tree_service(&self) -> TreeService {
        TreeService::new(self.fs.clone(), self.settings.layout.max_depth)
    }

    pub fn diagram_service(&self) -> DiagramService {
        DiagramService::new(
            self.fs.clone(),
            self.renderer.clone(),
            self.viewer.clone(),
            self.settings.layout.max_depth,
        )
        .with_max_nodes(self.settings.layout.max_nodes)
    }
}
