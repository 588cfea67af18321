use crate::scene::SceneError;
use thiserror::Error;

/// Recoverable failures of an authoring action. None of them is fatal to
/// the session and none leaves partially applied state behind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("at least {required} distinct vertices are needed to form a polygon (have {distinct})")]
    InsufficientVertices { required: usize, distinct: usize },
    #[error("no polygon to copy")]
    NoPolygonToCopy,
    #[error("a copied polygon is still following the cursor; place it first")]
    CycleAlreadyActive,
    #[error("pointer ray does not intersect the drawing plane")]
    NoPlaneIntersection,
    #[error("a polygon already exists; reset the scene before completing another")]
    PolygonAlreadyExists,
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),
}

pub type EditorResult<T> = Result<T, EditorError>;
