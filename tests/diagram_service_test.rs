//! Tests for DiagramService and TreeService

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::json;
use tempfile::TempDir;

use treediag::application::services::{DiagramService, TreeService, TreeSource};
use treediag::application::ApplicationError;
use treediag::domain::{AnyTree, LayoutGraph, Order, VariantKind};
use treediag::infrastructure::traits::{FileSystem, ImageViewer, RealFileSystem, Renderer};
use treediag::infrastructure::RenderError;
use treediag::util::testing;

/// Renderer answering with fixed bytes, or failing with a renderer error.
struct StubRenderer {
    fail: bool,
    seen: Mutex<Vec<LayoutGraph>>,
}

impl StubRenderer {
    fn ok() -> Self {
        Self {
            fail: false,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl Renderer for StubRenderer {
    fn render(&self, graph: &LayoutGraph) -> Result<Vec<u8>, RenderError> {
        self.seen.lock().unwrap().push(graph.clone());
        if self.fail {
            return Err(RenderError::Failed {
                program: "dot".into(),
                status: "exit status: 1".into(),
                diagnostic: "Error: syntax error".into(),
            });
        }
        Ok(b"PNG".to_vec())
    }

    fn format(&self) -> &str {
        "png"
    }
}

#[derive(Default)]
struct RecordingViewer {
    opened: Mutex<Vec<PathBuf>>,
    fail: bool,
}

impl ImageViewer for RecordingViewer {
    fn open(&self, path: &Path) -> io::Result<()> {
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no viewer"));
        }
        self.opened.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

fn scenario() -> AnyTree {
    AnyTree::from_value(&json!({
        "value": 2,
        "left": {"value": 1, "left": null, "right": null},
        "right": {"value": 3, "left": null, "right": {"value": 4, "left": null, "right": null}}
    }))
    .unwrap()
}

fn service(renderer: Arc<StubRenderer>, viewer: Arc<RecordingViewer>) -> DiagramService {
    DiagramService::new(Arc::new(RealFileSystem), renderer, viewer, 64)
}

// ============================================================
// render / render_base64
// ============================================================

#[test]
fn given_tree_when_rendered_then_renderer_receives_titled_layout() {
    // Arrange
    testing::init_test_setup();
    let renderer = Arc::new(StubRenderer::ok());
    let service = service(renderer.clone(), Arc::new(RecordingViewer::default()));

    // Act
    let image = service.render(&scenario(), Some("Question 3")).unwrap();

    // Assert
    assert_eq!(image, b"PNG");
    let seen = renderer.seen.lock().unwrap();
    assert_eq!(seen[0].title(), Some("Question 3"));
    assert_eq!(seen[0].height(), 3);
}

#[test]
fn given_tree_when_rendered_as_base64_then_standard_encoding() {
    let service = service(
        Arc::new(StubRenderer::ok()),
        Arc::new(RecordingViewer::default()),
    );

    let encoded = service.render_base64(&scenario(), None).unwrap();

    assert_eq!(encoded, "UE5H");
}

#[test]
fn given_tree_taller_than_limit_when_rendered_then_layout_rejected() {
    let renderer = Arc::new(StubRenderer::ok());
    let service = DiagramService::new(
        Arc::new(RealFileSystem),
        renderer.clone(),
        Arc::new(RecordingViewer::default()),
        2,
    );

    let err = service.render(&scenario(), None).unwrap_err();

    assert!(matches!(err, ApplicationError::Render(RenderError::Layout(_))));
    assert!(renderer.seen.lock().unwrap().is_empty());
}

#[test]
fn given_node_budget_when_rendered_then_oversized_layout_never_reaches_renderer() {
    let renderer = Arc::new(StubRenderer::ok());
    let service =
        service(renderer.clone(), Arc::new(RecordingViewer::default())).with_max_nodes(5);

    let err = service.render(&scenario(), None).unwrap_err();

    assert!(matches!(err, ApplicationError::Render(RenderError::Layout(_))));
    assert!(renderer.seen.lock().unwrap().is_empty());
}

// ============================================================
// save
// ============================================================

#[test]
fn given_output_path_when_saved_then_image_written_with_parents() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("out").join("tree.png");
    let service = service(
        Arc::new(StubRenderer::ok()),
        Arc::new(RecordingViewer::default()),
    );

    // Act
    service.save(&scenario(), &path, None).unwrap();

    // Assert
    assert_eq!(std::fs::read(&path).unwrap(), b"PNG");
}

#[test]
fn given_unwritable_path_when_saved_then_save_error_names_path() {
    // Arrange: parent "directory" is a regular file
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("file.txt");
    std::fs::write(&blocker, "x").unwrap();
    let path = blocker.join("tree.png");
    let service = service(
        Arc::new(StubRenderer::ok()),
        Arc::new(RecordingViewer::default()),
    );

    // Act
    let err = service.save(&scenario(), &path, None).unwrap_err();

    // Assert
    match err {
        ApplicationError::Save { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected Save, got {other:?}"),
    }
}

// ============================================================
// display
// ============================================================

#[test]
fn given_working_viewer_when_displayed_then_opens_written_image() {
    // Arrange
    let viewer = Arc::new(RecordingViewer::default());
    let service = service(Arc::new(StubRenderer::ok()), viewer.clone());

    // Act
    let path = service.display(&scenario(), Some("T")).unwrap();

    // Assert
    assert_eq!(viewer.opened.lock().unwrap().as_slice(), &[path.clone()]);
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
    assert_eq!(std::fs::read(&path).unwrap(), b"PNG");
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn given_failing_renderer_when_displayed_then_render_error_not_display_error() {
    let viewer = Arc::new(RecordingViewer::default());
    let service = service(Arc::new(StubRenderer::failing()), viewer.clone());

    let err = service.display(&scenario(), None).unwrap_err();

    match err {
        ApplicationError::Render(RenderError::Failed { diagnostic, .. }) => {
            assert!(diagnostic.contains("syntax error"))
        }
        other => panic!("expected Render, got {other:?}"),
    }
    assert!(viewer.opened.lock().unwrap().is_empty());
}

#[test]
fn given_failing_viewer_when_displayed_then_display_error() {
    let viewer = Arc::new(RecordingViewer {
        fail: true,
        ..Default::default()
    });
    let service = service(Arc::new(StubRenderer::ok()), viewer);

    let err = service.display(&scenario(), None).unwrap_err();

    assert!(matches!(err, ApplicationError::Display { .. }));
}

// ============================================================
// TreeService
// ============================================================

#[test]
fn given_record_file_when_loaded_then_variant_detected() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("tree.json");
    RealFileSystem
        .write(
            &path,
            br#"{"value": 5, "color": "BLACK", "left": null, "right": null}"#,
        )
        .unwrap();
    let service = TreeService::new(Arc::new(RealFileSystem), 64);

    // Act
    let tree = service
        .load(&TreeSource::File(path), None, None)
        .unwrap();

    // Assert
    assert_eq!(tree.kind(), VariantKind::Colored);
    assert_eq!(tree.values(Order::Pre), vec![5]);
}

#[test]
fn given_missing_file_when_loaded_then_operation_failed() {
    let service = TreeService::new(Arc::new(RealFileSystem), 64);

    let err = service
        .load(&TreeSource::File(PathBuf::from("/nonexistent/tree.json")), None, None)
        .unwrap_err();

    assert!(matches!(err, ApplicationError::OperationFailed { .. }));
}

#[test]
fn given_inline_text_when_forced_colored_then_missing_color_is_domain_error() {
    let service = TreeService::new(Arc::new(RealFileSystem), 64);

    let err = service
        .load(
            &TreeSource::Inline(r#"{"value": 1}"#.into()),
            Some(VariantKind::Colored),
            None,
        )
        .unwrap_err();

    assert!(matches!(err, ApplicationError::Domain(_)));
}

#[test]
fn given_deep_chain_inside_envelope_when_parsed_then_configured_depth_applies() {
    // Arrange: a 200-level right chain under {"answer": ...}
    let mut record = serde_json::Value::Null;
    for value in (0..200).rev() {
        record = json!({"value": value, "left": null, "right": record});
    }
    let text = json!({ "answer": record }).to_string();
    let service = TreeService::new(Arc::new(RealFileSystem), 512);

    // Act
    let tree = service.parse(&text, None, Some("/answer")).unwrap();

    // Assert
    assert_eq!(tree.len(), 200);
    assert_eq!(tree.height(), 200);
}
