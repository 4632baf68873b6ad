//! Degrees of freedom and boundary conditions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::elements::{IntoPoint, Point};
use crate::error::StructuralError;

/// Nodal degree of freedom, in global DOF order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dof {
    Ux,
    Uy,
    Uz,
    Tx,
    Ty,
    Tz,
}

impl Dof {
    pub const ALL: [Dof; 6] = [Dof::Ux, Dof::Uy, Dof::Uz, Dof::Tx, Dof::Ty, Dof::Tz];

    /// Offset of this DOF within a node's block of six
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_rotation(self) -> bool {
        matches!(self, Dof::Tx | Dof::Ty | Dof::Tz)
    }

    pub fn name(self) -> &'static str {
        match self {
            Dof::Ux => "ux",
            Dof::Uy => "uy",
            Dof::Uz => "uz",
            Dof::Tx => "tx",
            Dof::Ty => "ty",
            Dof::Tz => "tz",
        }
    }
}

impl fmt::Display for Dof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dof {
    type Err = StructuralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dof::ALL
            .into_iter()
            .find(|dof| dof.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StructuralError::InvalidInput(format!("unknown degree of freedom '{}'", s)))
    }
}

/// Prescribed displacements at a point
///
/// DOFs left as `None` are free. A fixed DOF with value `0.0` is a plain
/// restraint, any other value is an enforced displacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryCondition {
    pub point: Point,
    pub values: [Option<f64>; 6],
}

impl BoundaryCondition {
    /// Boundary condition with no restrained DOF
    pub fn new(point: impl IntoPoint) -> Self {
        Self {
            point: point.into_point(),
            values: [None; 6],
        }
    }

    /// All six DOFs restrained
    pub fn fixed(point: impl IntoPoint) -> Self {
        Self::new(point).with_dofs(Dof::ALL.map(|dof| (dof, 0.0)))
    }

    /// Translations restrained, rotations free
    pub fn pinned(point: impl IntoPoint) -> Self {
        Self::new(point).with_dofs([(Dof::Ux, 0.0), (Dof::Uy, 0.0), (Dof::Uz, 0.0)])
    }

    /// Prescribe one DOF
    pub fn with(mut self, dof: Dof, value: f64) -> Self {
        self.values[dof.index()] = Some(value);
        self
    }

    pub fn with_dofs(mut self, dofs: impl IntoIterator<Item = (Dof, f64)>) -> Self {
        for (dof, value) in dofs {
            self.values[dof.index()] = Some(value);
        }
        self
    }

    pub fn get(&self, dof: Dof) -> Option<f64> {
        self.values[dof.index()]
    }

    /// Prescribed DOFs and their values
    pub fn prescribed(&self) -> impl Iterator<Item = (Dof, f64)> + '_ {
        Dof::ALL
            .into_iter()
            .filter_map(|dof| self.values[dof.index()].map(|value| (dof, value)))
    }

    /// Later values override earlier ones, DOF by DOF
    pub fn merge(&mut self, other: &BoundaryCondition) {
        for (dof, value) in other.prescribed() {
            self.values[dof.index()] = Some(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dof_parse() {
        assert_eq!("ux".parse::<Dof>().unwrap(), Dof::Ux);
        assert_eq!("TZ".parse::<Dof>().unwrap(), Dof::Tz);
        assert!(matches!("rx".parse::<Dof>(), Err(StructuralError::InvalidInput(_))));
        assert_eq!(Dof::Ty.to_string(), "ty");
        assert_eq!(Dof::Tx.index(), 3);
    }

    #[test]
    fn test_fixed_and_pinned() {
        let fixed = BoundaryCondition::fixed([0.0, 0.0]);
        assert_eq!(fixed.prescribed().count(), 6);

        let pinned = BoundaryCondition::pinned([1.0, 0.0, 0.0]);
        assert_eq!(pinned.get(Dof::Uz), Some(0.0));
        assert_eq!(pinned.get(Dof::Tz), None);
    }

    #[test]
    fn test_merge_later_wins() {
        let mut bc = BoundaryCondition::new([0.0, 0.0]).with(Dof::Ux, 0.0).with(Dof::Uy, 1.0);
        bc.merge(&BoundaryCondition::new([0.0, 0.0]).with(Dof::Uy, 2.0).with(Dof::Tz, 0.0));

        assert_eq!(bc.get(Dof::Ux), Some(0.0));
        assert_eq!(bc.get(Dof::Uy), Some(2.0));
        assert_eq!(bc.get(Dof::Tz), Some(0.0));
        assert_eq!(bc.get(Dof::Uz), None);
    }
}
