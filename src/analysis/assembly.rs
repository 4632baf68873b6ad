//! Global stiffness matrix, load vector and constraint set

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, info};
use nalgebra_sparse::CsrMatrix;

use super::{AnalysisOptions, FrameType, LoadReduction};
use crate::elements::{BoundaryCondition, Dof, Element};
use crate::error::{StructuralError, StructuralResult};
use crate::loads::{DistributedLoad, LoadComponent, PointLoad};
use crate::math::{self, sparse, Mat, Mat12, StiffnessAssembler, Vec as GlobalVec, Vec12};
use crate::mesh::Mesh;

/// Per sub-element matrices kept for force recovery
#[derive(Debug, Clone)]
pub struct SegmentMatrices {
    /// Local stiffness matrix
    pub k_local: Mat12,
    /// Block-diagonal transformation (global -> local)
    pub transformation: Mat12,
    /// Equivalent nodal loads of distributed loads, global
    pub equivalent_loads: Vec12,
}

/// Assembled linear system of a discretized structure
#[derive(Debug, Clone)]
pub struct Assembly {
    stiffness: CsrMatrix<f64>,
    loads: GlobalVec,
    prescribed: Vec<Option<f64>>,
    segments: Vec<SegmentMatrices>,
    frame_type: FrameType,
}

impl Assembly {
    /// Assemble stiffness, loads and constraints over a mesh
    pub fn build(
        elements: &[Arc<Element>],
        mesh: &Mesh,
        bcs: &[BoundaryCondition],
        point_loads: &[PointLoad],
        dist_loads: &[(usize, DistributedLoad)],
        options: &AnalysisOptions,
    ) -> StructuralResult<Self> {
        let n_dofs = mesh.dof_count();
        let mut assembler = StiffnessAssembler::new(n_dofs);
        let mut segments = Vec::with_capacity(mesh.sub_elements().len());

        for sub in mesh.sub_elements() {
            let element = elements
                .get(sub.parent)
                .ok_or(StructuralError::ElementNotFound)?;
            let (material, section) = element.properties()?;

            let k_local = sub.kind.local_stiffness(sub.length, material, section);
            let k_global = math::rotate_to_global(&k_local, &sub.rotation);
            assembler.add_block(sub.nodes, &k_global);

            segments.push(SegmentMatrices {
                k_local,
                transformation: math::transformation_matrix(&sub.rotation),
                equivalent_loads: Vec12::zeros(),
            });
        }

        let stiffness = assembler.into_csr();
        info!(
            "Assembly: {} DOFs, {} stiffness entries from {} sub-elements",
            n_dofs,
            stiffness.nnz(),
            segments.len()
        );

        let mut loads = GlobalVec::zeros(n_dofs);
        for load in point_loads {
            let node = mesh
                .node_at(&load.point)
                .ok_or_else(|| StructuralError::out_of_range(&load.point))?;
            for (i, value) in load.values.iter().enumerate() {
                loads[6 * node + i] += value;
            }
        }

        for (parent, load) in dist_loads {
            let range = mesh.chain_range(*parent);
            for (offset, sub) in mesh.chain(*parent).iter().enumerate() {
                let mid = 0.5 * (sub.t[0] + sub.t[1]);
                if !load.covers(mid) {
                    continue;
                }
                let ta = sub.t[0].clamp(load.start(), load.end());
                let tb = sub.t[1].clamp(load.start(), load.end());
                let (qa, qb) = (load.force_at(ta), load.force_at(tb));
                let (ma, mb) = (load.moment_at(ta), load.moment_at(tb));

                let mut f_eq = match options.load_reduction {
                    LoadReduction::Consistent if sub.kind.is_flexural() => {
                        math::consistent_line_load(sub.length, &sub.axis, &qa, &qb)
                    }
                    _ => {
                        let (fa, fb) = math::lumped_line_load(sub.length, &qa, &qb);
                        math::pack_end_loads(&fa, &math::Vec3::zeros(), &fb, &math::Vec3::zeros())
                    }
                };
                let (mom_a, mom_b) = math::lumped_line_load(sub.length, &ma, &mb);
                f_eq += math::pack_end_loads(&math::Vec3::zeros(), &mom_a, &math::Vec3::zeros(), &mom_b);

                for i in 0..6 {
                    loads[6 * sub.nodes[0] + i] += f_eq[i];
                    loads[6 * sub.nodes[1] + i] += f_eq[6 + i];
                }
                segments[range.start + offset].equivalent_loads += f_eq;
            }
        }

        let mut prescribed = vec![None; n_dofs];
        for (node, bc) in merge_boundary_conditions(mesh, bcs)? {
            for (i, value) in bc.values.iter().enumerate() {
                prescribed[6 * node + i] = *value;
            }
        }
        let named: Vec<bool> = prescribed.iter().map(Option::is_some).collect();

        // Rotations of nodes reached only by axial members carry no stiffness
        let mut flexural = vec![false; mesh.node_count()];
        for sub in mesh.sub_elements() {
            if sub.kind.is_flexural() {
                flexural[sub.nodes[0]] = true;
                flexural[sub.nodes[1]] = true;
            }
        }
        let mut auto_fixed = 0;
        for (node, _) in flexural.iter().enumerate().filter(|(_, f)| !**f) {
            for dof in Dof::ALL.into_iter().filter(|dof| dof.is_rotation()) {
                let i = 6 * node + dof.index();
                if !named[i] {
                    prescribed[i] = Some(0.0);
                    auto_fixed += 1;
                }
            }
        }

        let frame_type = resolve_frame_type(options, mesh, bcs, point_loads, dist_loads);
        if frame_type == FrameType::Plane {
            for node in 0..mesh.node_count() {
                for dof in [Dof::Uz, Dof::Tx, Dof::Ty] {
                    let i = 6 * node + dof.index();
                    if !named[i] && prescribed[i].is_none() {
                        prescribed[i] = Some(0.0);
                        auto_fixed += 1;
                    }
                }
            }
        }
        debug!(
            "Assembly: {:?} frame, {} DOFs fixed automatically",
            frame_type, auto_fixed
        );

        Ok(Self {
            stiffness,
            loads,
            prescribed,
            segments,
            frame_type,
        })
    }

    /// Global stiffness matrix
    pub fn stiffness(&self) -> &CsrMatrix<f64> {
        &self.stiffness
    }

    /// Global stiffness matrix as a dense matrix
    pub fn stiffness_dense(&self) -> Mat {
        sparse::csr_to_dense(&self.stiffness)
    }

    /// Global load vector
    pub fn loads(&self) -> &GlobalVec {
        &self.loads
    }

    /// Prescribed value per global DOF; `None` for free DOFs
    pub fn prescribed(&self) -> &[Option<f64>] {
        &self.prescribed
    }

    pub fn free_dofs(&self) -> Vec<usize> {
        (0..self.prescribed.len())
            .filter(|&i| self.prescribed[i].is_none())
            .collect()
    }

    pub fn fixed_dofs(&self) -> Vec<usize> {
        (0..self.prescribed.len())
            .filter(|&i| self.prescribed[i].is_some())
            .collect()
    }

    pub fn segments(&self) -> &[SegmentMatrices] {
        &self.segments
    }

    /// Frame type after resolving `Auto`
    pub fn frame_type(&self) -> FrameType {
        self.frame_type
    }

    pub fn dof_count(&self) -> usize {
        self.prescribed.len()
    }

    /// `K * u` using the sparse stiffness
    pub fn multiply(&self, u: &GlobalVec) -> GlobalVec {
        let mut out = GlobalVec::zeros(self.stiffness.nrows());
        for (row, col, value) in self.stiffness.triplet_iter() {
            out[row] += value * u[col];
        }
        out
    }
}

/// One boundary condition per constrained node, later values winning DOF by DOF
fn merge_boundary_conditions(
    mesh: &Mesh,
    bcs: &[BoundaryCondition],
) -> StructuralResult<BTreeMap<usize, BoundaryCondition>> {
    let mut merged: BTreeMap<usize, BoundaryCondition> = BTreeMap::new();
    for bc in bcs {
        let node = mesh
            .node_at(&bc.point)
            .ok_or_else(|| StructuralError::out_of_range(&bc.point))?;
        merged
            .entry(node)
            .and_modify(|existing| existing.merge(bc))
            .or_insert_with(|| bc.clone());
    }
    Ok(merged)
}

fn resolve_frame_type(
    options: &AnalysisOptions,
    mesh: &Mesh,
    bcs: &[BoundaryCondition],
    point_loads: &[PointLoad],
    dist_loads: &[(usize, DistributedLoad)],
) -> FrameType {
    if options.frame_type != FrameType::Auto {
        return options.frame_type;
    }

    let out_of_plane = [LoadComponent::Fz, LoadComponent::Mx, LoadComponent::My];
    let flat = mesh
        .nodes()
        .iter()
        .all(|p| p.z.abs() <= options.point_tolerance);
    let planar_loads = point_loads
        .iter()
        .all(|load| out_of_plane.iter().all(|c| load.get(*c) == 0.0))
        && dist_loads
            .iter()
            .all(|(_, load)| out_of_plane.iter().all(|c| !load.has_component(*c)));
    let planar_bcs = bcs.iter().all(|bc| {
        [Dof::Uz, Dof::Tx, Dof::Ty]
            .iter()
            .all(|dof| bc.get(*dof).map_or(true, |v| v == 0.0))
    });

    if flat && planar_loads && planar_bcs {
        FrameType::Plane
    } else {
        FrameType::Space
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Material, Section};
    use crate::math::Vec3;
    use approx::assert_relative_eq;

    fn cantilever() -> (Vec<Arc<Element>>, Mesh) {
        let element = Arc::new(
            Element::euler_bernoulli([0.0, 0.0], [2.0, 0.0])
                .unwrap()
                .with_material(Material::isotropic(1e9, 0.25))
                .with_section(Section::square(0.1)),
        );
        let elements = vec![element];
        let points = vec![Vec3::zeros(), Vec3::new(2.0, 0.0, 0.0)];
        let mesh = Mesh::build(&elements, &points, &[], 1e-6).unwrap();
        (elements, mesh)
    }

    #[test]
    fn test_stiffness_is_symmetric() {
        let (elements, mesh) = cantilever();
        let assembly =
            Assembly::build(&elements, &mesh, &[], &[], &[], &AnalysisOptions::default()).unwrap();
        let k = assembly.stiffness_dense();
        assert_eq!(k.nrows(), 12);
        assert_relative_eq!(k.clone(), k.transpose(), max_relative = 1e-12);
    }

    #[test]
    fn test_auto_plane_fixes_out_of_plane_dofs() {
        let (elements, mesh) = cantilever();
        let bcs = vec![BoundaryCondition::fixed([0.0, 0.0])];
        let assembly =
            Assembly::build(&elements, &mesh, &bcs, &[], &[], &AnalysisOptions::default()).unwrap();

        assert_eq!(assembly.frame_type(), FrameType::Plane);
        assert_eq!(assembly.free_dofs(), vec![6, 7, 11]);
    }

    #[test]
    fn test_out_of_plane_load_selects_space() {
        let (elements, mesh) = cantilever();
        let loads = vec![PointLoad::new([2.0, 0.0]).with(LoadComponent::Fz, 1.0)];
        let assembly =
            Assembly::build(&elements, &mesh, &[], &loads, &[], &AnalysisOptions::default()).unwrap();

        assert_eq!(assembly.frame_type(), FrameType::Space);
        assert_eq!(assembly.free_dofs().len(), 12);
        assert_eq!(assembly.loads()[8], 1.0);
    }

    #[test]
    fn test_uniform_load_reduction() {
        let (elements, mesh) = cantilever();
        let dist = vec![(0, DistributedLoad::uniform(LoadComponent::Fy, -3.0).unwrap())];

        let lumped =
            Assembly::build(&elements, &mesh, &[], &[], &dist, &AnalysisOptions::default()).unwrap();
        assert_relative_eq!(lumped.loads()[1], -3.0, epsilon = 1e-12);
        assert_relative_eq!(lumped.loads()[7], -3.0, epsilon = 1e-12);
        assert_relative_eq!(lumped.loads()[5], 0.0);

        let options = AnalysisOptions::default().with_load_reduction(LoadReduction::Consistent);
        let consistent = Assembly::build(&elements, &mesh, &[], &[], &dist, &options).unwrap();
        assert_relative_eq!(consistent.loads()[5], -1.0, epsilon = 1e-12);
        assert_relative_eq!(consistent.loads()[11], 1.0, epsilon = 1e-12);
        assert_relative_eq!(
            consistent.segments()[0].equivalent_loads[1],
            -3.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_distributed_moment_is_lumped() {
        let (elements, mesh) = cantilever();
        let dist = vec![(0, DistributedLoad::uniform(LoadComponent::Mz, 3.0).unwrap())];

        for reduction in [LoadReduction::Lumped, LoadReduction::Consistent] {
            let options = AnalysisOptions::default().with_load_reduction(reduction);
            let assembly = Assembly::build(&elements, &mesh, &[], &[], &dist, &options).unwrap();
            assert_relative_eq!(assembly.loads()[5], 3.0, epsilon = 1e-12);
            assert_relative_eq!(assembly.loads()[11], 3.0, epsilon = 1e-12);
            assert_eq!(assembly.loads()[1], 0.0);
            assert_eq!(assembly.loads()[7], 0.0);
            assert_relative_eq!(
                assembly.segments()[0].equivalent_loads[11],
                3.0,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_boundary_conditions_merge_per_node() {
        let (elements, mesh) = cantilever();
        let bcs = vec![
            BoundaryCondition::fixed([0.0, 0.0]),
            BoundaryCondition::new([0.0, 0.0]).with(Dof::Uy, 0.01),
            BoundaryCondition::new([2.0, 0.0]).with(Dof::Tz, 0.0),
            BoundaryCondition::new([2.0, 0.0]).with(Dof::Ux, 0.0),
        ];
        let assembly =
            Assembly::build(&elements, &mesh, &bcs, &[], &[], &AnalysisOptions::default()).unwrap();

        let prescribed = assembly.prescribed();
        assert_eq!(prescribed[0], Some(0.0));
        assert_eq!(prescribed[1], Some(0.01));
        assert_eq!(prescribed[5], Some(0.0));
        assert_eq!(prescribed[6], Some(0.0));
        assert_eq!(prescribed[11], Some(0.0));
        assert_eq!(assembly.free_dofs(), vec![7]);
    }

    #[test]
    fn test_load_off_mesh_is_out_of_range() {
        let (elements, mesh) = cantilever();
        let loads = vec![PointLoad::new([1.0, 0.0]).with(LoadComponent::Fy, 1.0)];
        let result = Assembly::build(&elements, &mesh, &[], &loads, &[], &AnalysisOptions::default());
        assert!(matches!(result, Err(StructuralError::OutOfRange { .. })));
    }
}
