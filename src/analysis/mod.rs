//! Analysis types and options

mod assembly;
mod linear;

pub use assembly::{Assembly, SegmentMatrices};
pub use linear::solve;

use serde::{Deserialize, Serialize};

/// Idealization used for the degrees of freedom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FrameType {
    /// Plane when the model lies and is loaded in the global XY plane, space otherwise
    #[default]
    Auto,
    /// Plane frame in global XY: uz, tx and ty are held at zero unless a
    /// boundary condition names them
    Plane,
    /// Full 3D frame
    Space,
}

/// How distributed loads are turned into nodal loads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoadReduction {
    /// Linear shape function split, forces only
    #[default]
    Lumped,
    /// Work-equivalent loads on flexural elements, with end moments
    Consistent,
}

/// Linear solver for the reduced system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LinearSolver {
    /// Equilibrated dense LU with full pivoting
    #[default]
    Dense,
    /// Skyline Cholesky, suited to long banded models
    Skyline,
}

/// Options for structural analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Plane/space idealization
    pub frame_type: FrameType,
    /// Distributed load reduction
    pub load_reduction: LoadReduction,
    /// Reduced system solver
    pub solver: LinearSolver,
    /// Distance below which two points are the same node
    pub point_tolerance: f64,
    /// Relative pivot size below which the stiffness matrix is singular
    pub singular_tolerance: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            frame_type: FrameType::Auto,
            load_reduction: LoadReduction::Lumped,
            solver: LinearSolver::Dense,
            point_tolerance: 1e-6,
            singular_tolerance: 1e-12,
        }
    }
}

impl AnalysisOptions {
    /// Create options for a plane frame
    pub fn plane() -> Self {
        Self {
            frame_type: FrameType::Plane,
            ..Self::default()
        }
    }

    /// Create options for a space frame
    pub fn space() -> Self {
        Self {
            frame_type: FrameType::Space,
            ..Self::default()
        }
    }

    pub fn with_frame_type(mut self, frame_type: FrameType) -> Self {
        self.frame_type = frame_type;
        self
    }

    pub fn with_load_reduction(mut self, load_reduction: LoadReduction) -> Self {
        self.load_reduction = load_reduction;
        self
    }

    pub fn with_solver(mut self, solver: LinearSolver) -> Self {
        self.solver = solver;
        self
    }

    /// Set the node merging distance
    pub fn with_point_tolerance(mut self, tol: f64) -> Self {
        self.point_tolerance = tol;
        self
    }

    /// Set the relative pivot threshold
    pub fn with_singular_tolerance(mut self, tol: f64) -> Self {
        self.singular_tolerance = tol;
        self
    }
}
