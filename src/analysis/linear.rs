//! Linear static solve of an assembled system

use log::{debug, info, warn};

use super::{AnalysisOptions, Assembly, LinearSolver};
use crate::elements::Dof;
use crate::error::{StructuralError, StructuralResult};
use crate::math::{self, Mat, SkylineCholesky, Vec as GlobalVec};

/// Solve `K_ff * u_f = F_f - K_fc * u_c` and return the full displacement vector
pub fn solve(assembly: &Assembly, options: &AnalysisOptions) -> StructuralResult<GlobalVec> {
    let n_dofs = assembly.dof_count();
    let prescribed = assembly.prescribed();

    // Position of each free DOF in the reduced system
    let mut reduced_index = vec![None; n_dofs];
    let free = assembly.free_dofs();
    for (i, &dof) in free.iter().enumerate() {
        reduced_index[dof] = Some(i);
    }
    let n_free = free.len();

    let mut u = GlobalVec::from_iterator(n_dofs, prescribed.iter().map(|p| p.unwrap_or(0.0)));
    if n_free == 0 {
        warn!("Solve: no free degrees of freedom");
        return Ok(u);
    }

    let mut rhs = GlobalVec::from_iterator(n_free, free.iter().map(|&dof| assembly.loads()[dof]));
    let mut triplets = Vec::with_capacity(assembly.stiffness().nnz());
    let mut diagonal = vec![0.0; n_free];

    for (row, col, &value) in assembly.stiffness().triplet_iter() {
        let Some(r) = reduced_index[row] else {
            continue;
        };
        match (reduced_index[col], prescribed[col]) {
            (Some(c), _) => {
                if r == c {
                    diagonal[r] += value;
                }
                triplets.push((r, c, value));
            }
            (None, Some(u_c)) => rhs[r] -= value * u_c,
            (None, None) => {}
        }
    }

    if let Some(r) = diagonal.iter().position(|d| *d <= 0.0) {
        return Err(StructuralError::SingularSystem(format!(
            "{} has no stiffness",
            describe_dof(free[r])
        )));
    }

    debug!(
        "Solve: {} free / {} total DOFs, {:?} solver",
        n_free, n_dofs, options.solver
    );

    let u_free = match options.solver {
        LinearSolver::Dense => {
            let mut k_ff = Mat::zeros(n_free, n_free);
            for &(r, c, value) in &triplets {
                k_ff[(r, c)] += value;
            }
            math::solve_dense(&k_ff, &rhs, options.singular_tolerance).ok_or_else(|| {
                StructuralError::SingularSystem(
                    "structure is a mechanism or insufficiently restrained".to_string(),
                )
            })?
        }
        LinearSolver::Skyline => {
            let mut chol = SkylineCholesky::from_triplets(n_free, &triplets);
            chol.factorize(options.singular_tolerance).map_err(|r| {
                StructuralError::SingularSystem(format!(
                    "structure is a mechanism at {}",
                    describe_dof(free[r])
                ))
            })?;
            chol.solve(&rhs)
        }
    };

    for (i, &dof) in free.iter().enumerate() {
        u[dof] = u_free[i];
    }

    info!(
        "Solve: max |u| = {:.6e}",
        u.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
    );
    Ok(u)
}

fn describe_dof(global: usize) -> String {
    let dof = Dof::ALL[global % 6];
    format!("DOF {} of node {}", dof, global / 6)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::elements::{BoundaryCondition, Element, Material, Section};
    use crate::loads::{LoadComponent, PointLoad};
    use crate::math::Vec3;
    use crate::mesh::Mesh;
    use approx::assert_relative_eq;

    fn bar_assembly(bcs: &[BoundaryCondition], options: &AnalysisOptions) -> Assembly {
        let element = Arc::new(
            Element::truss([0.0, 0.0], [2.0, 0.0])
                .unwrap()
                .with_material(Material::isotropic(1000.0, 0.25))
                .with_section(Section::new(0.5, 1.0, 1.0, 1.0)),
        );
        let elements = vec![element];
        let points = vec![Vec3::zeros(), Vec3::new(2.0, 0.0, 0.0)];
        let mesh = Mesh::build(&elements, &points, &[], 1e-6).unwrap();
        let loads = vec![PointLoad::new([2.0, 0.0]).with(LoadComponent::Fx, 50.0)];
        Assembly::build(&elements, &mesh, bcs, &loads, &[], options).unwrap()
    }

    fn supports() -> Vec<BoundaryCondition> {
        vec![
            BoundaryCondition::pinned([0.0, 0.0]),
            BoundaryCondition::new([2.0, 0.0]).with(crate::elements::Dof::Uy, 0.0),
        ]
    }

    #[test]
    fn test_axial_bar_dense_and_skyline() {
        for solver in [LinearSolver::Dense, LinearSolver::Skyline] {
            let options = AnalysisOptions::default().with_solver(solver);
            let u = solve(&bar_assembly(&supports(), &options), &options).unwrap();
            // PL / EA = 50 * 2 / (1000 * 0.5)
            assert_relative_eq!(u[6], 0.2, epsilon = 1e-12);
            assert_relative_eq!(u[7], 0.0);
        }
    }

    #[test]
    fn test_unsupported_bar_is_singular() {
        let options = AnalysisOptions::default();
        let result = solve(&bar_assembly(&[], &options), &options);
        assert!(matches!(result, Err(StructuralError::SingularSystem(_))));
    }

    #[test]
    fn test_enforced_displacement() {
        let options = AnalysisOptions::default();
        let mut bcs = supports();
        bcs.push(BoundaryCondition::new([0.0, 0.0]).with(crate::elements::Dof::Ux, 0.01));
        let u = solve(&bar_assembly(&bcs, &options), &options).unwrap();
        assert_relative_eq!(u[0], 0.01);
        assert_relative_eq!(u[6], 0.21, epsilon = 1e-12);
    }
}
