//! Result types for structural analysis

use serde::{Deserialize, Serialize};

use crate::analysis::{Assembly, FrameType};
use crate::error::StructuralResult;
use crate::math::{Vec as GlobalVec, Vec12, Vec3};
use crate::mesh::Mesh;

/// Translations and rotations of one mesh node, in global axes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeDisplacement {
    pub ux: f64,
    pub uy: f64,
    pub uz: f64,
    /// Rotations follow the right-hand rule about the global axes
    pub tx: f64,
    pub ty: f64,
    pub tz: f64,
}

impl NodeDisplacement {
    /// Build from the node's slice of the global vector, `[ux, uy, uz, tx, ty, tz]`
    pub fn from_array([ux, uy, uz, tx, ty, tz]: [f64; 6]) -> Self {
        Self { ux, uy, uz, tx, ty, tz }
    }

    pub fn as_array(&self) -> [f64; 6] {
        [self.ux, self.uy, self.uz, self.tx, self.ty, self.tz]
    }

    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.ux, self.uy, self.uz)
    }

    pub fn rotation(&self) -> Vec3 {
        Vec3::new(self.tx, self.ty, self.tz)
    }

    pub fn translation_magnitude(&self) -> f64 {
        self.translation().norm()
    }

    pub fn rotation_magnitude(&self) -> f64 {
        self.rotation().norm()
    }
}

/// Support reaction at a node, in global axes
///
/// Components at free DOFs are zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reactions {
    pub fx: f64,
    pub fy: f64,
    pub fz: f64,
    pub mx: f64,
    pub my: f64,
    pub mz: f64,
}

impl Reactions {
    /// Build from `[Fx, Fy, Fz, Mx, My, Mz]`
    pub fn from_array([fx, fy, fz, mx, my, mz]: [f64; 6]) -> Self {
        Self { fx, fy, fz, mx, my, mz }
    }

    pub fn force(&self) -> Vec3 {
        Vec3::new(self.fx, self.fy, self.fz)
    }

    pub fn moment(&self) -> Vec3 {
        Vec3::new(self.mx, self.my, self.mz)
    }

    pub fn force_magnitude(&self) -> f64 {
        self.force().norm()
    }

    pub fn moment_magnitude(&self) -> f64 {
        self.moment().norm()
    }
}

/// Internal forces at one end of a sub-element, in its local frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemberForces {
    /// Axial force (positive = tension)
    pub axial: f64,
    /// Shear force in local y direction
    pub shear_y: f64,
    /// Shear force in local z direction
    pub shear_z: f64,
    /// Torsion
    pub torsion: f64,
    /// Bending moment about local y axis
    pub moment_y: f64,
    /// Bending moment about local z axis
    pub moment_z: f64,
}

impl MemberForces {
    /// Create from local end force array at the start node
    pub fn from_i_node_forces(forces: &[f64; 12]) -> Self {
        Self {
            axial: -forces[0],
            shear_y: forces[1],
            shear_z: forces[2],
            torsion: -forces[3],
            moment_y: forces[4],
            moment_z: forces[5],
        }
    }

    /// Create from local end force array at the end node
    pub fn from_j_node_forces(forces: &[f64; 12]) -> Self {
        Self {
            axial: forces[6],
            shear_y: -forces[7],
            shear_z: -forces[8],
            torsion: forces[9],
            moment_y: forces[10],
            moment_z: forces[11],
        }
    }
}

/// Local end forces of one sub-element
///
/// `forces` are the forces the nodes exert on the sub-element, ordered
/// `[Fx, Fy, Fz, Mx, My, Mz]` at the start then at the end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentForces {
    /// Parent element in registration order
    pub element: usize,
    pub nodes: [usize; 2],
    /// Path parameters of the ends on the parent
    pub t: [f64; 2],
    pub length: f64,
    pub forces: [f64; 12],
}

impl SegmentForces {
    pub fn start(&self) -> MemberForces {
        MemberForces::from_i_node_forces(&self.forces)
    }

    pub fn end(&self) -> MemberForces {
        MemberForces::from_j_node_forces(&self.forces)
    }
}

/// Solved state of a structural system
///
/// Values are per mesh node, in node creation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// Frame idealization actually used
    pub frame_type: FrameType,
    /// Node coordinates
    pub nodes: Vec<[f64; 3]>,
    /// `[ux, uy, uz, tx, ty, tz]` per node
    pub displacements: Vec<[f64; 6]>,
    /// `[Fx, Fy, Fz, Mx, My, Mz]` per node, zero at free DOFs
    pub reactions: Vec<[f64; 6]>,
    /// Local end forces per sub-element
    pub segments: Vec<SegmentForces>,
    /// Number of unknown DOFs
    pub free_dofs: usize,
}

impl Solution {
    /// Recover reactions and end forces from a full displacement vector
    pub fn from_displacements(mesh: &Mesh, assembly: &Assembly, u: &GlobalVec) -> Self {
        let node_count = mesh.node_count();

        let residual = assembly.multiply(u) - assembly.loads();
        let prescribed = assembly.prescribed();
        let reactions: Vec<[f64; 6]> = (0..node_count)
            .map(|node| {
                std::array::from_fn(|i| {
                    let dof = 6 * node + i;
                    if prescribed[dof].is_some() {
                        residual[dof]
                    } else {
                        0.0
                    }
                })
            })
            .collect();

        let displacements: Vec<[f64; 6]> = (0..node_count)
            .map(|node| std::array::from_fn(|i| u[6 * node + i]))
            .collect();

        let segments = mesh
            .sub_elements()
            .iter()
            .zip(assembly.segments())
            .map(|(sub, matrices)| {
                let [a, b] = sub.nodes;
                let d_global = Vec12::from_fn(|i, _| {
                    if i < 6 {
                        u[6 * a + i]
                    } else {
                        u[6 * b + i - 6]
                    }
                });
                let t = &matrices.transformation;
                let f = matrices.k_local * (t * d_global) - t * matrices.equivalent_loads;

                SegmentForces {
                    element: sub.parent,
                    nodes: sub.nodes,
                    t: sub.t,
                    length: sub.length,
                    forces: std::array::from_fn(|i| f[i]),
                }
            })
            .collect();

        Self {
            frame_type: assembly.frame_type(),
            nodes: mesh.nodes().iter().map(|p| [p.x, p.y, p.z]).collect(),
            displacements,
            reactions,
            segments,
            free_dofs: assembly.free_dofs().len(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.displacements.len()
    }

    pub fn displacement(&self, node: usize) -> Option<NodeDisplacement> {
        self.displacements
            .get(node)
            .map(|d| NodeDisplacement::from_array(*d))
    }

    pub fn reaction(&self, node: usize) -> Option<Reactions> {
        self.reactions.get(node).map(|r| Reactions::from_array(*r))
    }

    /// End forces of the sub-elements of one parent element
    pub fn element_forces(&self, element: usize) -> Vec<SegmentForces> {
        self.segments
            .iter()
            .filter(|s| s.element == element)
            .cloned()
            .collect()
    }

    /// Full displacement vector in global DOF order
    pub fn as_vector(&self) -> GlobalVec {
        GlobalVec::from_iterator(
            6 * self.node_count(),
            self.displacements.iter().flatten().copied(),
        )
    }

    /// Sum of all reactions
    pub fn total_reaction(&self) -> [f64; 6] {
        self.reactions.iter().fold([0.0; 6], |mut acc, r| {
            for i in 0..6 {
                acc[i] += r[i];
            }
            acc
        })
    }

    pub fn to_json(&self) -> StructuralResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Extreme values over a solution
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Maximum translation
    pub max_displacement: f64,
    /// Node with maximum translation
    pub max_disp_node: usize,
    /// Maximum reaction force
    pub max_reaction: f64,
    /// Node with maximum reaction
    pub max_reaction_node: usize,
    /// Maximum axial force in any sub-element
    pub max_axial: f64,
    /// Element with maximum axial force
    pub max_axial_element: usize,
    /// Maximum bending moment in any sub-element
    pub max_moment: f64,
    /// Element with maximum moment
    pub max_moment_element: usize,
    /// Total number of nodes
    pub num_nodes: usize,
    /// Registered elements
    pub num_elements: usize,
    /// Sub-elements after discretization
    pub num_sub_elements: usize,
    /// Total DOFs
    pub total_dofs: usize,
    /// Free DOFs (unknown)
    pub free_dofs: usize,
}

impl AnalysisSummary {
    pub fn from_solution(solution: &Solution, num_elements: usize) -> Self {
        let mut summary = AnalysisSummary {
            num_nodes: solution.node_count(),
            num_elements,
            num_sub_elements: solution.segments.len(),
            total_dofs: 6 * solution.node_count(),
            free_dofs: solution.free_dofs,
            ..Default::default()
        };

        for (node, d) in solution.displacements.iter().enumerate() {
            let mag = NodeDisplacement::from_array(*d).translation_magnitude();
            if mag > summary.max_displacement {
                summary.max_displacement = mag;
                summary.max_disp_node = node;
            }
        }

        for (node, r) in solution.reactions.iter().enumerate() {
            let mag = Reactions::from_array(*r).force_magnitude();
            if mag > summary.max_reaction {
                summary.max_reaction = mag;
                summary.max_reaction_node = node;
            }
        }

        for segment in &solution.segments {
            let f = &segment.forces;
            let axial = f[0].abs().max(f[6].abs());
            if axial > summary.max_axial {
                summary.max_axial = axial;
                summary.max_axial_element = segment.element;
            }

            let moment = f[4].abs().max(f[5].abs()).max(f[10].abs()).max(f[11].abs());
            if moment > summary.max_moment {
                summary.max_moment = moment;
                summary.max_moment_element = segment.element;
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_forces_sign_convention() {
        let mut forces = [0.0; 12];
        forces[0] = -5.0;
        forces[6] = 5.0;
        forces[5] = 3.0;
        assert_eq!(MemberForces::from_i_node_forces(&forces).axial, 5.0);
        assert_eq!(MemberForces::from_j_node_forces(&forces).axial, 5.0);
        assert_eq!(MemberForces::from_i_node_forces(&forces).moment_z, 3.0);
    }

    #[test]
    fn test_displacement_magnitudes() {
        let d = NodeDisplacement::from_array([3.0, 4.0, 0.0, 0.0, 0.0, 2.0]);
        assert_eq!(d.translation_magnitude(), 5.0);
        assert_eq!(d.rotation_magnitude(), 2.0);
        assert_eq!(d.as_array()[5], 2.0);
    }
}
