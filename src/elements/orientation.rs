//! Cross-section orientation - the local bending frame of an element

use serde::{Deserialize, Serialize};

use crate::error::{StructuralError, StructuralResult};
use crate::math::{self, Mat3, Vec3};

/// Largest |cos| between the up vector and the axis that still defines a bending plane
pub const COLINEAR_COSINE: f64 = 0.99;

/// Orthonormal triple `(r, v, w)` attached to an element
///
/// `r` is the element axis, `v` the "up" vector of the cross section and
/// `w = v x r` the binormal. The rows `(r, w, v)` form the right-handed
/// local frame: local y is `w`, local z is `v`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossSectionOrientation {
    r: Vec3,
    v: Vec3,
    w: Vec3,
}

impl CrossSectionOrientation {
    /// Orientation with the default up vector for this axis
    ///
    /// Global Z is used unless the axis is (nearly) vertical, in which case
    /// the global axis least aligned with the element is taken.
    pub fn new(axis: &Vec3) -> Self {
        let r = axis.normalize();
        let up = Self::default_up(&r);
        // The default up vector is never near-colinear with the axis
        let v = (up - r * r.dot(&up)).normalize();
        Self { r, v, w: v.cross(&r) }
    }

    /// Orientation with an explicit up vector
    pub fn with_up(axis: &Vec3, up: &Vec3) -> StructuralResult<Self> {
        let mut orientation = Self::new(axis);
        orientation.set_v(up)?;
        Ok(orientation)
    }

    /// Deterministic default up vector for an axis
    pub fn default_up(axis: &Vec3) -> Vec3 {
        if axis.z.abs() < COLINEAR_COSINE {
            return Vec3::z();
        }
        if axis.y.abs() < axis.x.abs() {
            Vec3::y()
        } else {
            Vec3::x()
        }
    }

    /// Set the up vector
    ///
    /// The vector is normalized, checked against the axis, stripped of its
    /// axial component and normalized again; `w` is recomputed.
    pub fn set_v(&mut self, up: &Vec3) -> StructuralResult<()> {
        let norm = up.norm();
        if !(norm > 0.0) || !norm.is_finite() {
            return Err(StructuralError::Geometry(
                "up vector must be finite and non-zero".to_string(),
            ));
        }

        let unit = up / norm;
        let cos = unit.dot(&self.r);
        if cos.abs() > COLINEAR_COSINE {
            return Err(StructuralError::Geometry(format!(
                "up vector ({}, {}, {}) is colinear with the element axis",
                up.x, up.y, up.z
            )));
        }

        self.v = (unit - self.r * cos).normalize();
        self.w = self.v.cross(&self.r);
        Ok(())
    }

    /// Frame of a piece of the element lying along `axis`
    ///
    /// The up vector is re-orthogonalized against the piece. When the piece
    /// turns (nearly) parallel to it, the binormal is kept instead and
    /// `v = r x w`, so the local axes do not flip along a curve.
    pub fn along(&self, axis: &Vec3) -> Self {
        let r = axis.normalize();
        let cos = self.v.dot(&r);
        if cos.abs() <= COLINEAR_COSINE {
            let v = (self.v - r * cos).normalize();
            return Self { r, v, w: v.cross(&r) };
        }

        // |w . r| < 0.15 here since w is orthogonal to v
        let w = (self.w - r * self.w.dot(&r)).normalize();
        Self { r, v: r.cross(&w), w }
    }

    /// Element axis
    pub fn r(&self) -> Vec3 {
        self.r
    }

    /// Up vector (local z)
    pub fn v(&self) -> Vec3 {
        self.v
    }

    /// Binormal `v x r` (local y)
    pub fn w(&self) -> Vec3 {
        self.w
    }

    /// Rotation matrix (global -> local) with rows `(r, w, v)`
    pub fn rotation_matrix(&self) -> Mat3 {
        math::frame_rotation(&self.r, &self.w, &self.v)
    }
}
