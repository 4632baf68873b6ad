//! Distributed loads on elements

use serde::{Deserialize, Serialize};

use super::point_load::LoadComponent;
use crate::error::{StructuralError, StructuralResult};
use crate::math::Vec3;

/// Piecewise-linear line load along an element
///
/// Intensities are global components per unit length, given at strictly
/// increasing path parameters `t_0 < ... < t_k` and interpolated linearly
/// between them. Outside `[t_0, t_k]` the intensity is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DistributedLoadData")]
pub struct DistributedLoad {
    positions: Vec<f64>,
    /// Intensities at each position, indexed by [`LoadComponent::index`]
    values: Vec<[f64; 6]>,
}

/// Serialized form, checked by [`DistributedLoad::new`] on the way in
#[derive(Deserialize)]
struct DistributedLoadData {
    positions: Vec<f64>,
    values: Vec<[f64; 6]>,
}

impl TryFrom<DistributedLoadData> for DistributedLoad {
    type Error = StructuralError;

    fn try_from(data: DistributedLoadData) -> Result<Self, Self::Error> {
        let components = LoadComponent::ALL.map(|component| {
            let sequence: Vec<f64> = data.values.iter().map(|row| row[component.index()]).collect();
            (component, sequence)
        });
        Self::new(&data.positions, components)
    }
}

impl DistributedLoad {
    /// Create a distributed load from per-component value sequences
    ///
    /// # Arguments
    /// * `positions` - Path parameters, at least two, strictly increasing in `[0, 1]`
    /// * `components` - One value per position for each loaded component
    pub fn new<V>(
        positions: &[f64],
        components: impl IntoIterator<Item = (LoadComponent, V)>,
    ) -> StructuralResult<Self>
    where
        V: AsRef<[f64]>,
    {
        if positions.len() < 2 {
            return Err(StructuralError::DimensionMismatch {
                expected: 2,
                found: positions.len(),
            });
        }
        if let Some(&t) = positions.iter().find(|t| !(0.0..=1.0).contains(*t)) {
            return Err(StructuralError::Domain(t));
        }
        if positions.windows(2).any(|w| w[1] <= w[0]) {
            return Err(StructuralError::InvalidInput(
                "distributed load positions must be strictly increasing".to_string(),
            ));
        }

        let mut values = vec![[0.0; 6]; positions.len()];
        for (component, sequence) in components {
            let sequence = sequence.as_ref();
            if sequence.len() != positions.len() {
                return Err(StructuralError::DimensionMismatch {
                    expected: positions.len(),
                    found: sequence.len(),
                });
            }
            if sequence.iter().any(|v| !v.is_finite()) {
                return Err(StructuralError::InvalidInput(format!(
                    "non-finite {} intensity",
                    component
                )));
            }
            for (row, value) in values.iter_mut().zip(sequence) {
                row[component.index()] += value;
            }
        }

        Ok(Self {
            positions: positions.to_vec(),
            values,
        })
    }

    /// Constant intensity over the whole element
    pub fn uniform(component: LoadComponent, value: f64) -> StructuralResult<Self> {
        Self::new(&[0.0, 1.0], [(component, [value, value])])
    }

    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    pub fn start(&self) -> f64 {
        self.positions[0]
    }

    pub fn end(&self) -> f64 {
        self.positions[self.positions.len() - 1]
    }

    /// True when the parameter lies within the loaded range
    pub fn covers(&self, t: f64) -> bool {
        t >= self.start() && t <= self.end()
    }

    /// Interpolated intensity at `t`, zero outside the loaded range
    pub fn intensity_at(&self, t: f64) -> [f64; 6] {
        if !self.covers(t) {
            return [0.0; 6];
        }

        let k = self
            .positions
            .windows(2)
            .position(|w| t <= w[1])
            .unwrap_or(self.positions.len() - 2);
        let (t0, t1) = (self.positions[k], self.positions[k + 1]);
        let s = (t - t0) / (t1 - t0);

        let (a, b) = (&self.values[k], &self.values[k + 1]);
        std::array::from_fn(|i| a[i] * (1.0 - s) + b[i] * s)
    }

    /// Force per unit length at `t`
    pub fn force_at(&self, t: f64) -> Vec3 {
        let q = self.intensity_at(t);
        Vec3::new(q[0], q[1], q[2])
    }

    /// Moment per unit length at `t`
    pub fn moment_at(&self, t: f64) -> Vec3 {
        let q = self.intensity_at(t);
        Vec3::new(q[3], q[4], q[5])
    }

    /// True when any component has a non-zero intensity somewhere
    pub fn has_component(&self, component: LoadComponent) -> bool {
        self.values.iter().any(|row| row[component.index()] != 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_interpolation() {
        let load = DistributedLoad::new(
            &[0.2, 0.6, 1.0],
            [(LoadComponent::Fy, vec![0.0, -4.0, -2.0])],
        )
        .unwrap();

        assert_relative_eq!(load.force_at(0.4).y, -2.0, epsilon = 1e-12);
        assert_relative_eq!(load.force_at(0.8).y, -3.0, epsilon = 1e-12);
        assert_relative_eq!(load.force_at(1.0).y, -2.0, epsilon = 1e-12);
        assert_eq!(load.force_at(0.1), Vec3::zeros());
        assert!(load.has_component(LoadComponent::Fy));
        assert!(!load.has_component(LoadComponent::Fz));
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            DistributedLoad::new(&[0.0], [(LoadComponent::Fy, [1.0])]),
            Err(StructuralError::DimensionMismatch { expected: 2, found: 1 })
        ));
        assert!(matches!(
            DistributedLoad::new(&[0.0, 1.0], [(LoadComponent::Fy, vec![1.0])]),
            Err(StructuralError::DimensionMismatch { expected: 2, found: 1 })
        ));
        assert!(matches!(
            DistributedLoad::new(&[0.0, 1.5], [(LoadComponent::Fy, [1.0, 1.0])]),
            Err(StructuralError::Domain(_))
        ));
        assert!(matches!(
            DistributedLoad::new(&[0.5, 0.5], [(LoadComponent::Fy, [1.0, 1.0])]),
            Err(StructuralError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_deserialize_validates() {
        let load = DistributedLoad::new(&[0.0, 0.5], [(LoadComponent::Fz, [-1.0, -2.0])]).unwrap();
        let json = serde_json::to_string(&load).unwrap();
        let back: DistributedLoad = serde_json::from_str(&json).unwrap();
        assert_eq!(back, load);

        let empty = r#"{"positions": [], "values": []}"#;
        assert!(serde_json::from_str::<DistributedLoad>(empty).is_err());

        let decreasing = r#"{"positions": [0.8, 0.2], "values": [[0,1,0,0,0,0],[0,1,0,0,0,0]]}"#;
        assert!(serde_json::from_str::<DistributedLoad>(decreasing).is_err());

        let short = r#"{"positions": [0.0, 1.0], "values": [[0,1,0,0,0,0]]}"#;
        assert!(serde_json::from_str::<DistributedLoad>(short).is_err());
    }

    #[test]
    fn test_uniform_moment() {
        let load = DistributedLoad::uniform(LoadComponent::Mz, 3.0).unwrap();
        assert_eq!(load.moment_at(0.5), Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(load.force_at(0.5), Vec3::zeros());
    }
}
