//! Load components and concentrated loads

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::elements::{IntoPoint, Point};
use crate::error::StructuralError;
use crate::math::Vec3;

/// Global load component, in the same order as the nodal DOFs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LoadComponent {
    /// Force in global X direction
    Fx,
    /// Force in global Y direction
    Fy,
    /// Force in global Z direction
    Fz,
    /// Moment about global X
    Mx,
    /// Moment about global Y
    My,
    /// Moment about global Z
    Mz,
}

impl LoadComponent {
    pub const ALL: [LoadComponent; 6] = [
        LoadComponent::Fx,
        LoadComponent::Fy,
        LoadComponent::Fz,
        LoadComponent::Mx,
        LoadComponent::My,
        LoadComponent::Mz,
    ];

    /// Offset of the matching DOF within a node's block of six
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            LoadComponent::Fx => "Fx",
            LoadComponent::Fy => "Fy",
            LoadComponent::Fz => "Fz",
            LoadComponent::Mx => "Mx",
            LoadComponent::My => "My",
            LoadComponent::Mz => "Mz",
        }
    }
}

impl fmt::Display for LoadComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LoadComponent {
    type Err = StructuralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LoadComponent::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StructuralError::InvalidInput(format!("unknown load component '{}'", s)))
    }
}

/// A concentrated load applied at a point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointLoad {
    pub point: Point,
    /// Magnitudes indexed by [`LoadComponent::index`]
    pub values: [f64; 6],
}

impl PointLoad {
    /// Create an empty point load
    pub fn new(point: impl IntoPoint) -> Self {
        Self {
            point: point.into_point(),
            values: [0.0; 6],
        }
    }

    /// Add a component (components given twice sum)
    pub fn with(mut self, component: LoadComponent, value: f64) -> Self {
        self.values[component.index()] += value;
        self
    }

    pub fn with_components(mut self, components: impl IntoIterator<Item = (LoadComponent, f64)>) -> Self {
        for (component, value) in components {
            self.values[component.index()] += value;
        }
        self
    }

    pub fn get(&self, component: LoadComponent) -> f64 {
        self.values[component.index()]
    }

    pub fn force(&self) -> Vec3 {
        Vec3::new(self.values[0], self.values[1], self.values[2])
    }

    pub fn moment(&self) -> Vec3 {
        Vec3::new(self.values[3], self.values[4], self.values[5])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_parse() {
        assert_eq!("fy".parse::<LoadComponent>().unwrap(), LoadComponent::Fy);
        assert_eq!("Mz".parse::<LoadComponent>().unwrap(), LoadComponent::Mz);
        assert!("Fw".parse::<LoadComponent>().is_err());
    }

    #[test]
    fn test_components_sum() {
        let load = PointLoad::new([1.0, 0.0])
            .with(LoadComponent::Fy, -10.0)
            .with_components([(LoadComponent::Fy, -5.0), (LoadComponent::Mz, 2.0)]);

        assert_eq!(load.get(LoadComponent::Fy), -15.0);
        assert_eq!(load.force(), Vec3::new(0.0, -15.0, 0.0));
        assert_eq!(load.moment(), Vec3::new(0.0, 0.0, 2.0));
    }
}
