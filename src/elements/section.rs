//! Section properties for line elements

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{StructuralError, StructuralResult};

/// Shape family of a section, used for the shear correction factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SectionShape {
    /// Solid or hollow circle
    Circle,
    /// Solid rectangle or square
    Rectangle,
    /// Anything else
    #[default]
    Generic,
}

/// Cross-section properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Cross-sectional area
    pub a: f64,
    /// Torsional constant
    pub ix: f64,
    /// Moment of inertia about local y-axis (bending in the local xz-plane)
    pub iy: f64,
    /// Moment of inertia about local z-axis (bending in the local xy-plane)
    pub iz: f64,
    /// Shape family
    pub shape: SectionShape,
}

impl Section {
    /// Create a section with explicit properties
    pub fn new(a: f64, ix: f64, iy: f64, iz: f64) -> Self {
        Self {
            a,
            ix,
            iy,
            iz,
            shape: SectionShape::Generic,
        }
    }

    /// Solid circular section
    pub fn circle(radius: f64) -> Self {
        let r4 = radius.powi(4);
        Self {
            a: PI * radius * radius,
            ix: PI * r4 / 2.0,
            iy: PI * r4 / 4.0,
            iz: PI * r4 / 4.0,
            shape: SectionShape::Circle,
        }
    }

    /// Solid square section
    pub fn square(side: f64) -> Self {
        Self::rectangle(side, side)
    }

    /// Solid rectangular section
    ///
    /// `width` runs along local y, `height` along local z.
    pub fn rectangle(width: f64, height: f64) -> Self {
        let (long, short) = if width > height {
            (width, height)
        } else {
            (height, width)
        };
        // Saint-Venant approximation, about 0.1408 b^4 for a square
        let ratio = short / long;
        let ix = long * short.powi(3) * (1.0 / 3.0 - 0.21 * ratio * (1.0 - ratio.powi(4) / 12.0));

        Self {
            a: width * height,
            ix,
            iy: width * height.powi(3) / 12.0,
            iz: height * width.powi(3) / 12.0,
            shape: SectionShape::Rectangle,
        }
    }

    /// Hollow circular (pipe) section
    pub fn pipe(outer_radius: f64, thickness: f64) -> Self {
        let r_o = outer_radius;
        let r_i = (outer_radius - thickness).max(0.0);
        let i = PI * (r_o.powi(4) - r_i.powi(4)) / 4.0;

        Self {
            a: PI * (r_o * r_o - r_i * r_i),
            ix: 2.0 * i,
            iy: i,
            iz: i,
            shape: SectionShape::Circle,
        }
    }

    /// Timoshenko shear correction factor for Poisson's ratio `nu`
    pub fn shear_coefficient(&self, nu: f64) -> f64 {
        match self.shape {
            SectionShape::Circle => 6.0 * (1.0 + nu) / (7.0 + 6.0 * nu),
            SectionShape::Rectangle => 10.0 * (1.0 + nu) / (12.0 + 11.0 * nu),
            SectionShape::Generic => 5.0 / 6.0,
        }
    }

    /// Check that every property is positive
    pub fn validate(&self) -> StructuralResult<()> {
        let properties = [("a", self.a), ("ix", self.ix), ("iy", self.iy), ("iz", self.iz)];
        for (name, value) in properties {
            if !(value > 0.0 && value.is_finite()) {
                return Err(StructuralError::InvalidInput(format!(
                    "section property {} must be positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
