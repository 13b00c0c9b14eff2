//! Artifact renderers for the project workspace
//!
//! Two independent, stateless renderers, dispatched by `RenderTarget`:
//! - `mesh`: triangle-soup formats (binary and ASCII STL) rendered with an
//!   orbit/zoom camera, a fixed-size ground reference grid, and one
//!   directional light
//! - `vector`: 2D CAD entity formats (DXF `LINE`/`CIRCLE`/`ARC`) fitted and
//!   drawn into a canvas-space stroke list
//!
//! Rendering is a pure function from bytes to a displayable scene. Malformed
//! input is a renderer-level failure reported to the caller; it never touches
//! repository state.

pub mod mesh;
pub mod vector;

use serde::Serialize;
use thiserror::Error;

pub use mesh::MeshScene;
pub use vector::VectorScene;

/// Renderer-level failure: the bytes do not form a drawable artifact.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderError {
    #[error("Malformed mesh data: {0}")]
    MalformedMesh(String),

    #[error("Malformed drawing data: {0}")]
    MalformedDrawing(String),
}

/// Closed set of render targets.
///
/// Adding a format means adding a variant here and handling it in
/// `render` — a compile-checked change, not a string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderTarget {
    Mesh,
    Vector,
}

/// Target canvas dimensions for 2D rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Default for Canvas {
    fn default() -> Self {
        Canvas {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// A rendered scene, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Scene {
    Mesh(MeshScene),
    Vector(VectorScene),
}

/// Render artifact bytes for the given target.
pub fn render(target: RenderTarget, bytes: &[u8], canvas: Canvas) -> Result<Scene, RenderError> {
    match target {
        RenderTarget::Mesh => Ok(Scene::Mesh(MeshScene::from_bytes(bytes)?)),
        RenderTarget::Vector => {
            let text = std::str::from_utf8(bytes)
                .map_err(|_| RenderError::MalformedDrawing("drawing is not UTF-8".to_string()))?;
            Ok(Scene::Vector(VectorScene::from_text(text, canvas)?))
        }
    }
}
