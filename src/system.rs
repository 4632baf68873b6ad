//! Structural system - registration, discretization, assembly and solve

use std::sync::Arc;

use log::{debug, info};

use crate::analysis::{self, AnalysisOptions, Assembly};
use crate::elements::{BoundaryCondition, Dof, Element, IntoPoint, Point};
use crate::error::{StructuralError, StructuralResult};
use crate::loads::{DistributedLoad, LoadComponent, PointLoad};
use crate::math::Mat;
use crate::mesh::Mesh;
use crate::results::{AnalysisSummary, NodeDisplacement, Reactions, SegmentForces, Solution};

/// Lifecycle stage of a [`StructuralSystem`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Accepting elements, boundary conditions and loads
    Building,
    /// Mesh built
    Discretized,
    /// Stiffness, loads and constraints assembled
    Assembled,
    /// Displacements available
    Solved,
}

/// A linear static model made of line elements
///
/// Boundary conditions and loads are attached to points anywhere on the
/// registered elements; the system inserts nodes where needed. Any change
/// to the model drops the mesh, the assembly and the solution.
#[derive(Debug, Default)]
pub struct StructuralSystem {
    options: AnalysisOptions,
    elements: Vec<Arc<Element>>,
    bcs: Vec<BoundaryCondition>,
    point_loads: Vec<PointLoad>,
    dist_loads: Vec<(usize, DistributedLoad)>,

    mesh: Option<Mesh>,
    assembly: Option<Assembly>,
    solution: Option<Solution>,
}

impl StructuralSystem {
    /// Create an empty system with default options
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: AnalysisOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: AnalysisOptions) {
        self.options = options;
        self.invalidate();
    }

    // ========================
    // Model Building
    // ========================

    /// Register an element
    ///
    /// Returns its index in registration order.
    pub fn add_element(&mut self, element: &Arc<Element>) -> StructuralResult<usize> {
        if self.element_index(element).is_some() {
            return Err(StructuralError::Duplicate(
                "element is already registered".to_string(),
            ));
        }
        let (material, section) = element.properties()?;
        material.validate()?;
        section.validate()?;

        self.elements.push(Arc::clone(element));
        self.invalidate();
        Ok(self.elements.len() - 1)
    }

    /// Prescribe DOFs at a point on a registered element
    pub fn add_bc(
        &mut self,
        point: impl IntoPoint,
        dofs: impl IntoIterator<Item = (Dof, f64)>,
    ) -> StructuralResult<()> {
        self.add_boundary_condition(BoundaryCondition::new(point).with_dofs(dofs))
    }

    pub fn add_boundary_condition(&mut self, bc: BoundaryCondition) -> StructuralResult<()> {
        self.check_on_element(&bc.point)?;
        self.bcs.push(bc);
        self.invalidate();
        Ok(())
    }

    /// Apply a concentrated load at a point on a registered element
    pub fn add_load(
        &mut self,
        point: impl IntoPoint,
        components: impl IntoIterator<Item = (LoadComponent, f64)>,
    ) -> StructuralResult<()> {
        self.add_point_load(PointLoad::new(point).with_components(components))
    }

    pub fn add_point_load(&mut self, load: PointLoad) -> StructuralResult<()> {
        self.check_on_element(&load.point)?;
        self.point_loads.push(load);
        self.invalidate();
        Ok(())
    }

    /// Apply a piecewise-linear line load along a registered element
    ///
    /// # Arguments
    /// * `element` - A registered element
    /// * `positions` - Path parameters, strictly increasing in `[0, 1]`
    /// * `components` - One intensity per position for each loaded component
    pub fn add_dist_load<V>(
        &mut self,
        element: &Arc<Element>,
        positions: &[f64],
        components: impl IntoIterator<Item = (LoadComponent, V)>,
    ) -> StructuralResult<()>
    where
        V: AsRef<[f64]>,
    {
        let index = self
            .element_index(element)
            .ok_or(StructuralError::ElementNotFound)?;
        let load = DistributedLoad::new(positions, components)?;
        self.dist_loads.push((index, load));
        self.invalidate();
        Ok(())
    }

    pub fn add_distributed_load(
        &mut self,
        element: &Arc<Element>,
        load: DistributedLoad,
    ) -> StructuralResult<()> {
        let index = self
            .element_index(element)
            .ok_or(StructuralError::ElementNotFound)?;
        self.dist_loads.push((index, load));
        self.invalidate();
        Ok(())
    }

    /// Registration index of an element
    pub fn element_index(&self, element: &Arc<Element>) -> Option<usize> {
        self.elements.iter().position(|e| Arc::ptr_eq(e, element))
    }

    pub fn elements(&self) -> &[Arc<Element>] {
        &self.elements
    }

    fn check_on_element(&self, point: &Point) -> StructuralResult<()> {
        let tol = self.options.point_tolerance;
        if self
            .elements
            .iter()
            .any(|e| e.geometry().locate(point, tol).is_some())
        {
            Ok(())
        } else {
            Err(StructuralError::out_of_range(point))
        }
    }

    fn invalidate(&mut self) {
        self.mesh = None;
        self.assembly = None;
        self.solution = None;
    }

    // ========================
    // Analysis
    // ========================

    /// Current lifecycle stage
    pub fn stage(&self) -> Stage {
        if self.solution.is_some() {
            Stage::Solved
        } else if self.assembly.is_some() {
            Stage::Assembled
        } else if self.mesh.is_some() {
            Stage::Discretized
        } else {
            Stage::Building
        }
    }

    /// Build (or reuse) the mesh
    pub fn discretize(&mut self) -> StructuralResult<&Mesh> {
        let mesh = match self.mesh.take() {
            Some(mesh) => mesh,
            None => self.build_mesh()?,
        };
        Ok(self.mesh.insert(mesh))
    }

    /// Build (or reuse) the assembled system
    pub fn assemble(&mut self) -> StructuralResult<&Assembly> {
        let assembly = match self.assembly.take() {
            Some(assembly) => assembly,
            None => {
                let mesh = match self.mesh.take() {
                    Some(mesh) => mesh,
                    None => self.build_mesh()?,
                };
                let result = Assembly::build(
                    &self.elements,
                    &mesh,
                    &self.bcs,
                    &self.point_loads,
                    &self.dist_loads,
                    &self.options,
                );
                self.mesh = Some(mesh);
                result?
            }
        };
        Ok(self.assembly.insert(assembly))
    }

    /// Run the linear static analysis
    ///
    /// Without a model change in between, a second call returns the same
    /// solution without recomputing it. On error no solution is published.
    pub fn run(&mut self) -> StructuralResult<&Solution> {
        let solution = match self.solution.take() {
            Some(solution) => solution,
            None => {
                self.assemble()?;
                let (Some(mesh), Some(assembly)) = (&self.mesh, &self.assembly) else {
                    return Err(StructuralError::NotAnalyzed);
                };
                let u = analysis::solve(assembly, &self.options)?;
                let solution = Solution::from_displacements(mesh, assembly, &u);
                info!(
                    "Analysis complete: {} nodes, {} free DOFs",
                    solution.node_count(),
                    solution.free_dofs
                );
                solution
            }
        };
        Ok(self.solution.insert(solution))
    }

    fn build_mesh(&self) -> StructuralResult<Mesh> {
        let tol = self.options.point_tolerance;

        let mut points: Vec<Point> = Vec::new();
        for element in &self.elements {
            points.push(element.geometry().start());
            points.push(element.geometry().end());
        }
        points.extend(self.bcs.iter().map(|bc| bc.point));
        points.extend(self.point_loads.iter().map(|load| load.point));

        let mut breakpoints = vec![Vec::new(); self.elements.len()];
        for (index, load) in &self.dist_loads {
            let element = &self.elements[*index];
            for &t in load.positions() {
                points.push(element.path(t)?);
                breakpoints[*index].push(t);
            }
        }
        debug!("Mesh: {} interaction points", points.len());

        let mesh = Mesh::build(&self.elements, &points, &breakpoints, tol)?;
        info!(
            "Mesh: {} elements discretized into {} sub-elements, {} nodes",
            self.elements.len(),
            mesh.sub_elements().len(),
            mesh.node_count()
        );
        Ok(mesh)
    }

    // ========================
    // Result Access Methods
    // ========================

    /// Solution of the last successful run, if still valid
    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        self.mesh.as_ref()
    }

    pub fn assembly(&self) -> Option<&Assembly> {
        self.assembly.as_ref()
    }

    /// Dense global stiffness matrix, once assembled
    pub fn stiffness_matrix(&self) -> Option<Mat> {
        self.assembly.as_ref().map(Assembly::stiffness_dense)
    }

    fn solved(&self) -> StructuralResult<(&Mesh, &Solution)> {
        match (&self.mesh, &self.solution) {
            (Some(mesh), Some(solution)) => Ok((mesh, solution)),
            _ => Err(StructuralError::NotAnalyzed),
        }
    }

    /// Displacement of the node at a point
    pub fn node_displacement(&self, point: impl IntoPoint) -> StructuralResult<NodeDisplacement> {
        let (mesh, solution) = self.solved()?;
        let point = point.into_point();
        mesh.node_at(&point)
            .and_then(|node| solution.displacement(node))
            .ok_or_else(|| StructuralError::out_of_range(&point))
    }

    /// Reactions at the node at a point
    pub fn reaction(&self, point: impl IntoPoint) -> StructuralResult<Reactions> {
        let (mesh, solution) = self.solved()?;
        let point = point.into_point();
        mesh.node_at(&point)
            .and_then(|node| solution.reaction(node))
            .ok_or_else(|| StructuralError::out_of_range(&point))
    }

    /// Local end forces of each sub-element of an element, by increasing `t`
    pub fn element_forces(&self, element: &Arc<Element>) -> StructuralResult<Vec<SegmentForces>> {
        let index = self
            .element_index(element)
            .ok_or(StructuralError::ElementNotFound)?;
        let (_, solution) = self.solved()?;
        Ok(solution.element_forces(index))
    }

    /// Get analysis summary
    pub fn summary(&self) -> StructuralResult<AnalysisSummary> {
        let (_, solution) = self.solved()?;
        Ok(AnalysisSummary::from_solution(solution, self.elements.len()))
    }
}
