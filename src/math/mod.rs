//! Mathematical utilities for frame element and system calculations

pub mod sparse;

use nalgebra::{DMatrix, DVector, Matrix3, SMatrix, SVector, Vector3};

pub use sparse::{SkylineCholesky, StiffnessAssembler};

pub type Mat = DMatrix<f64>;
pub type Vec = DVector<f64>;
pub type Mat3 = Matrix3<f64>;
pub type Vec3 = Vector3<f64>;

/// 12x12 matrix for element stiffness
pub type Mat12 = SMatrix<f64, 12, 12>;
/// 12-element vector for element end forces/displacements
pub type Vec12 = SVector<f64, 12>;

/// Squared sine below which an axis counts as aligned with global X
const ALIGNED_EPS: f64 = 1e-24;

/// Rotation matrix (global -> local) that carries the global X axis onto `axis`
///
/// Built with Rodrigues' formula about the axis perpendicular to both. The
/// first row of the result is always `axis`.
///
/// # Arguments
/// * `axis` - Unit direction of the element
pub fn rodrigues_rotation(axis: &Vec3) -> Mat3 {
    let (px, py, pz) = (axis.x, axis.y, axis.z);
    let pyz = py * py + pz * pz;

    if pyz <= ALIGNED_EPS {
        return if px > 0.0 {
            Mat3::identity()
        } else {
            // Half turn about global Z keeps the frame right-handed
            Mat3::from_diagonal(&Vec3::new(-1.0, -1.0, 1.0))
        };
    }

    let cos = px;
    #[rustfmt::skip]
    let correction = Mat3::new(
        0.0, 0.0,      0.0,
        0.0, pz * pz,  -py * pz,
        0.0, -py * pz, py * py,
    ) * ((1.0 - cos) / pyz);

    #[rustfmt::skip]
    let base = Mat3::new(
        px,  py,  pz,
        -py, px,  0.0,
        -pz, 0.0, px,
    );

    base + correction
}

/// Rotation matrix (global -> local) whose rows are the given local axes
pub fn frame_rotation(x: &Vec3, y: &Vec3, z: &Vec3) -> Mat3 {
    Mat3::from_rows(&[x.transpose(), y.transpose(), z.transpose()])
}

/// Local stiffness matrix of a prismatic 3D beam
///
/// DOF order per node is `[ux, uy, uz, tx, ty, tz]`. With `phi_y = phi_z = 0`
/// this is the Euler-Bernoulli element; non-zero shear parameters give the
/// Timoshenko element.
///
/// # Arguments
/// * `e` - Modulus of elasticity
/// * `g` - Shear modulus
/// * `a` - Cross-sectional area
/// * `ix` - Torsional constant
/// * `iy` - Moment of inertia about local y-axis
/// * `iz` - Moment of inertia about local z-axis
/// * `length` - Element length
/// * `phi_y` - Shear parameter for bending about y
/// * `phi_z` - Shear parameter for bending about z
#[allow(clippy::too_many_arguments)]
pub fn beam_local_stiffness(
    e: f64,
    g: f64,
    a: f64,
    ix: f64,
    iy: f64,
    iz: f64,
    length: f64,
    phi_y: f64,
    phi_z: f64,
) -> Mat12 {
    let l = length;
    let l2 = l * l;
    let l3 = l2 * l;

    let ea_l = e * a / l;
    let gj_l = g * ix / l;

    let ay = e * iy / (l3 * (1.0 + phi_y));
    let az = e * iz / (l3 * (1.0 + phi_z));

    let y12 = 12.0 * ay;
    let y6 = 6.0 * l * ay;
    let y4 = (4.0 + phi_y) * l2 * ay;
    let y2 = (2.0 - phi_y) * l2 * ay;

    let z12 = 12.0 * az;
    let z6 = 6.0 * l * az;
    let z4 = (4.0 + phi_z) * l2 * az;
    let z2 = (2.0 - phi_z) * l2 * az;

    #[rustfmt::skip]
    let data = [
        // Row 0: axial at i
        ea_l,  0.0,  0.0,  0.0,   0.0,  0.0,  -ea_l, 0.0,  0.0,  0.0,   0.0,  0.0,
        // Row 1: shear y at i
        0.0,   z12,  0.0,  0.0,   0.0,  z6,   0.0,   -z12, 0.0,  0.0,   0.0,  z6,
        // Row 2: shear z at i
        0.0,   0.0,  y12,  0.0,   -y6,  0.0,  0.0,   0.0,  -y12, 0.0,   -y6,  0.0,
        // Row 3: torsion at i
        0.0,   0.0,  0.0,  gj_l,  0.0,  0.0,  0.0,   0.0,  0.0,  -gj_l, 0.0,  0.0,
        // Row 4: moment about y at i
        0.0,   0.0,  -y6,  0.0,   y4,   0.0,  0.0,   0.0,  y6,   0.0,   y2,   0.0,
        // Row 5: moment about z at i
        0.0,   z6,   0.0,  0.0,   0.0,  z4,   0.0,   -z6,  0.0,  0.0,   0.0,  z2,
        // Row 6: axial at j
        -ea_l, 0.0,  0.0,  0.0,   0.0,  0.0,  ea_l,  0.0,  0.0,  0.0,   0.0,  0.0,
        // Row 7: shear y at j
        0.0,   -z12, 0.0,  0.0,   0.0,  -z6,  0.0,   z12,  0.0,  0.0,   0.0,  -z6,
        // Row 8: shear z at j
        0.0,   0.0,  -y12, 0.0,   y6,   0.0,  0.0,   0.0,  y12,  0.0,   y6,   0.0,
        // Row 9: torsion at j
        0.0,   0.0,  0.0,  -gj_l, 0.0,  0.0,  0.0,   0.0,  0.0,  gj_l,  0.0,  0.0,
        // Row 10: moment about y at j
        0.0,   0.0,  -y6,  0.0,   y2,   0.0,  0.0,   0.0,  y6,   0.0,   y4,   0.0,
        // Row 11: moment about z at j
        0.0,   z6,   0.0,  0.0,   0.0,  z2,   0.0,   -z6,  0.0,  0.0,   0.0,  z4,
    ];

    Mat12::from_row_slice(&data)
}

/// Local stiffness matrix of an axial-only element (truss, cable)
pub fn axial_local_stiffness(e: f64, a: f64, length: f64) -> Mat12 {
    let ea_l = e * a / length;
    let mut k = Mat12::zeros();
    k[(0, 0)] = ea_l;
    k[(0, 6)] = -ea_l;
    k[(6, 0)] = -ea_l;
    k[(6, 6)] = ea_l;
    k
}

/// Rotate a local 12x12 matrix into global coordinates
///
/// Every 3x3 sub-block (translations and rotations of both nodes) is
/// transformed as `R^T * K_sub * R`.
pub fn rotate_to_global(k_local: &Mat12, rotation: &Mat3) -> Mat12 {
    let rt = rotation.transpose();
    let mut k_global = Mat12::zeros();

    for bi in 0..4 {
        for bj in 0..4 {
            let sub: Mat3 = k_local.fixed_view::<3, 3>(3 * bi, 3 * bj).into_owned();
            k_global
                .fixed_view_mut::<3, 3>(3 * bi, 3 * bj)
                .copy_from(&(rt * sub * rotation));
        }
    }

    k_global
}

/// 12x12 block-diagonal transformation (global -> local) for end vectors
pub fn transformation_matrix(rotation: &Mat3) -> Mat12 {
    let mut t = Mat12::zeros();
    for b in 0..4 {
        t.fixed_view_mut::<3, 3>(3 * b, 3 * b).copy_from(rotation);
    }
    t
}

/// Pack end forces and moments into a 12-vector `[F_a, M_a, F_b, M_b]`
pub fn pack_end_loads(fa: &Vec3, ma: &Vec3, fb: &Vec3, mb: &Vec3) -> Vec12 {
    let mut v = Vec12::zeros();
    v.fixed_rows_mut::<3>(0).copy_from(fa);
    v.fixed_rows_mut::<3>(3).copy_from(ma);
    v.fixed_rows_mut::<3>(6).copy_from(fb);
    v.fixed_rows_mut::<3>(9).copy_from(mb);
    v
}

/// Split a linearly varying line intensity between the two ends of a segment
///
/// Uses the linear shape functions, so the resultant and its first moment
/// are preserved but no end moments are produced.
///
/// # Arguments
/// * `length` - Segment length
/// * `qa` - Intensity at the start of the segment
/// * `qb` - Intensity at the end of the segment
pub fn lumped_line_load(length: f64, qa: &Vec3, qb: &Vec3) -> (Vec3, Vec3) {
    (
        (2.0 * qa + qb) * (length / 6.0),
        (qa + 2.0 * qb) * (length / 6.0),
    )
}

/// Equivalent nodal loads of a linearly varying force intensity on a beam
///
/// The axial part is lumped; the transverse part is integrated against the
/// cubic Hermite shape functions, giving end forces and end moments.
///
/// # Returns
/// `[F_a, M_a, F_b, M_b]` in global coordinates
pub fn consistent_line_load(length: f64, axis: &Vec3, qa: &Vec3, qb: &Vec3) -> Vec12 {
    let l = length;
    let axial_a = axis * axis.dot(qa);
    let axial_b = axis * axis.dot(qb);
    let (fa_axial, fb_axial) = lumped_line_load(l, &axial_a, &axial_b);

    let ta = qa - axial_a;
    let tb = qb - axial_b;

    let fa = fa_axial + (7.0 * ta + 3.0 * tb) * (l / 20.0);
    let fb = fb_axial + (3.0 * ta + 7.0 * tb) * (l / 20.0);
    let ma = axis.cross(&(3.0 * ta + 2.0 * tb)) * (l * l / 60.0);
    let mb = -axis.cross(&(2.0 * ta + 3.0 * tb)) * (l * l / 60.0);

    pack_end_loads(&fa, &ma, &fb, &mb)
}

/// Solve a symmetric stiffness system with singularity detection
///
/// The matrix is Jacobi-equilibrated (unit diagonal) and factorized with
/// full pivoting. Returns `None` when a diagonal entry is not positive or
/// the smallest pivot falls below `tolerance` times the largest one.
pub fn solve_dense(k: &Mat, f: &Vec, tolerance: f64) -> Option<Vec> {
    let n = k.nrows();
    if n == 0 {
        return Some(Vec::zeros(0));
    }

    let mut scale = Vec::zeros(n);
    for i in 0..n {
        let d = k[(i, i)];
        if d <= 0.0 {
            return None;
        }
        scale[i] = 1.0 / d.sqrt();
    }

    let scaled = Mat::from_fn(n, n, |i, j| k[(i, j)] * scale[i] * scale[j]);
    let lu = scaled.full_piv_lu();

    let pivots = lu.u().diagonal().map(f64::abs);
    let max_pivot = pivots.max();
    let min_pivot = pivots.min();
    if !(max_pivot > 0.0) || min_pivot < tolerance * max_pivot {
        return None;
    }

    let rhs = f.component_mul(&scale);
    lu.solve(&rhs).map(|y| y.component_mul(&scale))
}
