//! Line element - path, theory, properties and cross-section frame

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::elements::{CrossSectionOrientation, Geometry, IntoPoint, Material, Point, Section};
use crate::error::{StructuralError, StructuralResult};
use crate::math::{self, Mat12, Mat3, Vec3};

/// Structural theory used for an element's stiffness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ElementKind {
    /// Slender beam, no shear deformation
    #[default]
    EulerBernoulli,
    /// Beam with shear deformation
    Timoshenko,
    /// Axial-only bar
    Truss,
    /// Axial-only member, analysed linearly
    Cable,
}

impl ElementKind {
    /// True for kinds that carry bending and torsion
    pub fn is_flexural(self) -> bool {
        matches!(self, ElementKind::EulerBernoulli | ElementKind::Timoshenko)
    }

    /// Local 12x12 stiffness matrix of a straight segment
    pub fn local_stiffness(self, length: f64, material: &Material, section: &Section) -> Mat12 {
        let (e, g) = (material.e, material.g);
        match self {
            ElementKind::EulerBernoulli => math::beam_local_stiffness(
                e, g, section.a, section.ix, section.iy, section.iz, length, 0.0, 0.0,
            ),
            ElementKind::Timoshenko => {
                let kga = section.shear_coefficient(material.nu) * g * section.a;
                let l2 = length * length;
                let phi_y = 12.0 * e * section.iy / (kga * l2);
                let phi_z = 12.0 * e * section.iz / (kga * l2);
                math::beam_local_stiffness(
                    e, g, section.a, section.ix, section.iy, section.iz, length, phi_y, phi_z,
                )
            }
            ElementKind::Truss | ElementKind::Cable => {
                math::axial_local_stiffness(e, section.a, length)
            }
        }
    }
}

/// A line element of a structural system
///
/// Built by the caller and shared with the system through an `Arc`.
#[derive(Debug, Clone)]
pub struct Element {
    kind: ElementKind,
    geometry: Geometry,
    orientation: CrossSectionOrientation,
    material: Option<Arc<Material>>,
    section: Option<Arc<Section>>,
}

impl Element {
    /// Straight element between two points
    pub fn new(kind: ElementKind, start: impl IntoPoint, end: impl IntoPoint) -> StructuralResult<Self> {
        Ok(Self::from_geometry(kind, Geometry::line(start, end)?))
    }

    /// Element following a curve `t -> point`
    pub fn from_curve<F>(kind: ElementKind, curve: F) -> StructuralResult<Self>
    where
        F: Fn(f64) -> Point + Send + Sync + 'static,
    {
        Ok(Self::from_geometry(kind, Geometry::curve(curve)?))
    }

    pub fn from_geometry(kind: ElementKind, geometry: Geometry) -> Self {
        Self {
            kind,
            orientation: CrossSectionOrientation::new(&geometry.axis()),
            geometry,
            material: None,
            section: None,
        }
    }

    pub fn euler_bernoulli(start: impl IntoPoint, end: impl IntoPoint) -> StructuralResult<Self> {
        Self::new(ElementKind::EulerBernoulli, start, end)
    }

    pub fn timoshenko(start: impl IntoPoint, end: impl IntoPoint) -> StructuralResult<Self> {
        Self::new(ElementKind::Timoshenko, start, end)
    }

    pub fn truss(start: impl IntoPoint, end: impl IntoPoint) -> StructuralResult<Self> {
        Self::new(ElementKind::Truss, start, end)
    }

    pub fn cable(start: impl IntoPoint, end: impl IntoPoint) -> StructuralResult<Self> {
        Self::new(ElementKind::Cable, start, end)
    }

    /// Set the material
    pub fn with_material(mut self, material: impl Into<Arc<Material>>) -> Self {
        self.material = Some(material.into());
        self
    }

    /// Set the section
    pub fn with_section(mut self, section: impl Into<Arc<Section>>) -> Self {
        self.section = Some(section.into());
        self
    }

    /// Set the cross-section up vector
    pub fn with_v(mut self, up: impl IntoPoint) -> StructuralResult<Self> {
        self.set_v(up)?;
        Ok(self)
    }

    pub fn set_material(&mut self, material: impl Into<Arc<Material>>) {
        self.material = Some(material.into());
    }

    pub fn set_section(&mut self, section: impl Into<Arc<Section>>) {
        self.section = Some(section.into());
    }

    pub fn set_v(&mut self, up: impl IntoPoint) -> StructuralResult<()> {
        self.orientation.set_v(&up.into_point())
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn orientation(&self) -> &CrossSectionOrientation {
        &self.orientation
    }

    pub fn material(&self) -> Option<&Arc<Material>> {
        self.material.as_ref()
    }

    pub fn section(&self) -> Option<&Arc<Section>> {
        self.section.as_ref()
    }

    /// Point at parameter `t`
    pub fn path(&self, t: f64) -> StructuralResult<Point> {
        self.geometry.path(t)
    }

    pub fn length(&self) -> f64 {
        self.geometry.length()
    }

    /// Material and section, or `MissingProperty` when either is unset
    pub fn properties(&self) -> StructuralResult<(&Material, &Section)> {
        let material = self
            .material
            .as_deref()
            .ok_or_else(|| StructuralError::MissingProperty("element has no material".to_string()))?;
        let section = self
            .section
            .as_deref()
            .ok_or_else(|| StructuralError::MissingProperty("element has no section".to_string()))?;
        Ok((material, section))
    }

    /// Local stiffness matrix over the chord
    pub fn local_stiffness_matrix(&self) -> StructuralResult<Mat12> {
        let (material, section) = self.properties()?;
        Ok(self.kind.local_stiffness(self.length(), material, section))
    }

    /// Rotation matrix (global -> local) over the chord
    pub fn rotation_matrix(&self) -> Mat3 {
        if self.kind.is_flexural() {
            self.orientation.rotation_matrix()
        } else {
            self.geometry.rotation_matrix()
        }
    }

    /// Rotation of a straight piece of this element along `axis`
    ///
    /// Flexural kinds carry the element's frame onto the piece; axial kinds
    /// use the Rodrigues rotation.
    pub fn segment_rotation(&self, axis: &Vec3) -> Mat3 {
        if self.kind.is_flexural() {
            self.orientation.along(axis).rotation_matrix()
        } else {
            math::rodrigues_rotation(axis)
        }
    }

    /// Stiffness matrix over the chord in global coordinates
    pub fn global_stiffness_matrix(&self) -> StructuralResult<Mat12> {
        let k_local = self.local_stiffness_matrix()?;
        Ok(math::rotate_to_global(&k_local, &self.rotation_matrix()))
    }
}
