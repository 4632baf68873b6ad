//! Error types for the frame solver

use thiserror::Error;

/// Main error type for modelling and analysis
#[derive(Error, Debug)]
pub enum StructuralError {
    #[error("Path parameter t = {0} is outside [0, 1]")]
    Domain(f64),

    #[error("Invalid geometry: {0}")]
    Geometry(String),

    #[error("Point ({x}, {y}, {z}) does not lie on any registered element")]
    OutOfRange { x: f64, y: f64, z: f64 },

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Singular stiffness matrix - {0}")]
    SingularSystem(String),

    #[error("Dimension mismatch: expected {expected} values, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Element is not registered in this system")]
    ElementNotFound,

    #[error("Missing property: {0}")]
    MissingProperty(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("System not analyzed - call run() first")]
    NotAnalyzed,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StructuralError {
    pub(crate) fn out_of_range(point: &crate::elements::Point) -> Self {
        Self::OutOfRange {
            x: point.x,
            y: point.y,
            z: point.z,
        }
    }
}

/// Result type for frame solver operations
pub type StructuralResult<T> = Result<T, StructuralError>;
