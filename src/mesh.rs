//! Discretization of registered elements into two-node sub-elements
//!
//! Every point where something happens (an element end, a support, a load
//! or a distributed-load breakpoint) becomes a node, and each element is cut
//! at the nodes lying on it. The resulting mesh is an index-addressed arena:
//! nodes are numbered in first-seen order, sub-elements are stored as
//! contiguous chains per parent element.

use std::ops::Range;
use std::sync::Arc;

use log::debug;
use serde::Serialize;

use crate::elements::{Element, ElementKind, Point, MIN_LENGTH};
use crate::error::{StructuralError, StructuralResult};
use crate::math::{Mat3, Vec3};

/// Nodes deduplicated by coordinate
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    points: Vec<Point>,
    tolerance: f64,
}

impl NodeRegistry {
    pub fn new(tolerance: f64) -> Self {
        Self {
            points: Vec::new(),
            tolerance,
        }
    }

    /// Index of the node within tolerance of `point`
    pub fn find(&self, point: &Point) -> Option<usize> {
        self.points
            .iter()
            .position(|p| (p - point).norm() <= self.tolerance)
    }

    /// Existing node within tolerance, or a new one
    pub fn find_or_insert(&mut self, point: &Point) -> usize {
        match self.find(point) {
            Some(index) => index,
            None => {
                self.points.push(*point);
                self.points.len() - 1
            }
        }
    }

    pub fn get(&self, index: usize) -> Option<&Point> {
        self.points.get(index)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }
}

/// Straight two-node piece of a registered element
#[derive(Debug, Clone, Serialize)]
pub struct SubElement {
    /// Index of the parent element in registration order
    pub parent: usize,
    /// Start and end node
    pub nodes: [usize; 2],
    /// Path parameters of the ends on the parent
    pub t: [f64; 2],
    /// Chord length between the two nodes
    pub length: f64,
    /// Unit chord direction
    pub axis: Vec3,
    /// Rotation (global -> local)
    #[serde(skip)]
    pub rotation: Mat3,
    pub kind: ElementKind,
}

/// Immutable discretization of a structural system
#[derive(Debug, Clone)]
pub struct Mesh {
    nodes: Vec<Point>,
    sub_elements: Vec<SubElement>,
    chains: Vec<Range<usize>>,
    tolerance: f64,
}

impl Mesh {
    /// Cut every element at the interaction points lying on it
    ///
    /// # Arguments
    /// * `elements` - Registered elements, in registration order
    /// * `points` - Interaction points in the order they should be numbered
    /// * `breakpoints` - Extra path parameters per element (its distributed-load positions)
    /// * `tolerance` - Distance below which two points coincide
    pub fn build(
        elements: &[Arc<Element>],
        points: &[Point],
        breakpoints: &[Vec<f64>],
        tolerance: f64,
    ) -> StructuralResult<Self> {
        let mut registry = NodeRegistry::new(tolerance);
        let mut sub_elements = Vec::new();
        let mut chains = Vec::with_capacity(elements.len());

        for (index, element) in elements.iter().enumerate() {
            let geometry = element.geometry();

            let mut ts: Vec<f64> = points
                .iter()
                .filter_map(|p| geometry.locate(p, tolerance))
                .collect();
            if let Some(extra) = breakpoints.get(index) {
                ts.extend(extra.iter().copied());
            }
            let ts = merge_breakpoints(element, ts, tolerance);

            let chain_start = sub_elements.len();
            let node_ids: Vec<usize> = ts
                .iter()
                .map(|&t| registry.find_or_insert(&geometry.eval(t)))
                .collect();

            for (w, ids) in ts.windows(2).zip(node_ids.windows(2)) {
                let (a, b) = (ids[0], ids[1]);
                let (pa, pb) = match (registry.get(a), registry.get(b)) {
                    (Some(pa), Some(pb)) => (*pa, *pb),
                    _ => continue,
                };
                let chord = pb - pa;
                let length = chord.norm();
                if a == b || length < MIN_LENGTH {
                    return Err(StructuralError::Geometry(format!(
                        "element {} collapses between t = {} and t = {}",
                        index, w[0], w[1]
                    )));
                }
                let axis = chord / length;

                sub_elements.push(SubElement {
                    parent: index,
                    nodes: [a, b],
                    t: [w[0], w[1]],
                    length,
                    axis,
                    rotation: element.segment_rotation(&axis),
                    kind: element.kind(),
                });
            }

            debug!(
                "Mesh: element {} split into {} sub-elements",
                index,
                sub_elements.len() - chain_start
            );
            chains.push(chain_start..sub_elements.len());
        }

        Ok(Self {
            nodes: registry.into_points(),
            sub_elements,
            chains,
            tolerance,
        })
    }

    pub fn nodes(&self) -> &[Point] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Six DOFs per node
    pub fn dof_count(&self) -> usize {
        6 * self.nodes.len()
    }

    pub fn sub_elements(&self) -> &[SubElement] {
        &self.sub_elements
    }

    /// Sub-elements of one parent element, ordered by increasing `t`
    pub fn chain(&self, parent: usize) -> &[SubElement] {
        match self.chains.get(parent) {
            Some(range) => &self.sub_elements[range.clone()],
            None => &[],
        }
    }

    /// Index range of a parent's sub-elements in [`Mesh::sub_elements`]
    pub fn chain_range(&self, parent: usize) -> Range<usize> {
        self.chains.get(parent).cloned().unwrap_or(0..0)
    }

    /// Node within tolerance of `point`
    pub fn node_at(&self, point: &Point) -> Option<usize> {
        self.nodes
            .iter()
            .position(|p| (p - point).norm() <= self.tolerance)
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

/// Sort the parameters, drop interior ones that coincide with an end or a
/// previous breakpoint, and frame them with 0 and 1
fn merge_breakpoints(element: &Element, mut ts: Vec<f64>, tolerance: f64) -> Vec<f64> {
    let geometry = element.geometry();
    ts.retain(|t| *t > 0.0 && *t < 1.0);
    ts.sort_by(f64::total_cmp);

    let end = geometry.end();
    let mut merged = vec![0.0];
    let mut last = geometry.start();
    for t in ts {
        let p = geometry.eval(t);
        if (p - last).norm() > tolerance && (p - end).norm() > tolerance {
            merged.push(t);
            last = p;
        }
    }
    merged.push(1.0);
    merged
}
