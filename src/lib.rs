//! Frame Solver - linear static analysis of structures made of line elements
//!
//! This library implements the direct stiffness method for 3D frames:
//! - Euler-Bernoulli and Timoshenko beams, truss and cable members
//! - Straight or curved element paths with arbitrary cross-section orientation
//! - Supports and loads at any point along an element (nodes are inserted automatically)
//! - Piecewise-linear distributed loads (lumped or consistent reduction)
//! - Plane or space idealization, dense or skyline solver
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use frame_solver::prelude::*;
//!
//! let beam = Arc::new(
//!     Element::euler_bernoulli([0.0, 0.0], [1000.0, 0.0])
//!         .unwrap()
//!         .with_material(Material::new(200.0, 80.0))
//!         .with_section(Section::square(20.0)),
//! );
//!
//! let mut system = StructuralSystem::new();
//! system.add_element(&beam).unwrap();
//! system.add_bc([0.0, 0.0], Dof::ALL.map(|dof| (dof, 0.0))).unwrap();
//! system.add_load([1000.0, 0.0], [(LoadComponent::Fy, -10.0)]).unwrap();
//!
//! system.run().unwrap();
//! let tip = system.node_displacement([1000.0, 0.0]).unwrap();
//! assert!(tip.uy < 0.0);
//! ```

pub mod analysis;
pub mod elements;
pub mod error;
pub mod loads;
pub mod math;
pub mod mesh;
pub mod results;
pub mod system;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{AnalysisOptions, FrameType, LinearSolver, LoadReduction};
    pub use crate::elements::{
        BoundaryCondition, CrossSectionOrientation, Dof, Element, ElementKind, Geometry, Material,
        Point, Section, SectionShape,
    };
    pub use crate::error::{StructuralError, StructuralResult};
    pub use crate::loads::{DistributedLoad, LoadComponent, PointLoad};
    pub use crate::mesh::Mesh;
    pub use crate::results::{
        AnalysisSummary, MemberForces, NodeDisplacement, Reactions, SegmentForces, Solution,
    };
    pub use crate::system::{Stage, StructuralSystem};
}
