//! Structural elements module

mod element;
mod geometry;
mod material;
mod orientation;
mod section;
mod support;

pub use element::{Element, ElementKind};
pub use geometry::{CurveFn, Geometry, IntoPoint, Path, Point, MIN_LENGTH};
pub use material::Material;
pub use orientation::{CrossSectionOrientation, COLINEAR_COSINE};
pub use section::{Section, SectionShape};
pub use support::{BoundaryCondition, Dof};
