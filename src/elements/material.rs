//! Material properties

use serde::{Deserialize, Serialize};

use crate::error::{StructuralError, StructuralResult};

/// Linear elastic isotropic material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Modulus of elasticity (Young's modulus)
    pub e: f64,
    /// Shear modulus
    pub g: f64,
    /// Poisson's ratio
    pub nu: f64,
}

impl Material {
    /// Create a material from E and G
    /// nu is derived as E / (2 * G) - 1
    pub fn new(e: f64, g: f64) -> Self {
        Self {
            e,
            g,
            nu: e / (2.0 * g) - 1.0,
        }
    }

    /// Create a new isotropic material from E and nu
    /// G is calculated as E / (2 * (1 + nu))
    pub fn isotropic(e: f64, nu: f64) -> Self {
        Self {
            e,
            g: e / (2.0 * (1.0 + nu)),
            nu,
        }
    }

    /// Structural steel
    pub fn steel() -> Self {
        Self::isotropic(200e9, 0.3)
    }

    /// Aluminum (6061-T6)
    pub fn aluminum() -> Self {
        Self {
            e: 68.9e9, // 68.9 GPa
            g: 26e9,   // 26 GPa
            nu: 0.33,
        }
    }

    /// Check that the moduli are usable in a stiffness matrix
    pub fn validate(&self) -> StructuralResult<()> {
        if !(self.e > 0.0 && self.e.is_finite()) {
            return Err(StructuralError::InvalidInput(format!(
                "modulus of elasticity must be positive, got {}",
                self.e
            )));
        }
        if !(self.g > 0.0 && self.g.is_finite()) {
            return Err(StructuralError::InvalidInput(format!(
                "shear modulus must be positive, got {}",
                self.g
            )));
        }
        Ok(())
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::steel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_isotropic_material() {
        let mat = Material::isotropic(200e9, 0.3);
        assert_relative_eq!(mat.g, 200e9 / 2.6, max_relative = 1e-12);
    }

    #[test]
    fn test_poisson_from_moduli() {
        let mat = Material::new(1e9, 1e9 / 2.5);
        assert_relative_eq!(mat.nu, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_validate() {
        assert!(Material::steel().validate().is_ok());
        assert!(matches!(
            Material::new(0.0, 1.0).validate(),
            Err(StructuralError::InvalidInput(_))
        ));
        assert!(Material::isotropic(1e9, f64::NAN).validate().is_err());
    }
}
