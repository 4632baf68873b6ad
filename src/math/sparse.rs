//! Sparse assembly and banded solve
//!
//! Frame stiffness matrices are mostly zeros with a band around the diagonal
//! given by the node numbering. Assembly goes through COO triplets and the
//! reduced system can be factorized in skyline (profile) storage.

use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CsrMatrix};

use super::{Mat, Mat12};

/// Accumulates nodal 12x12 blocks into a square COO matrix
///
/// Repeated `(row, col)` pairs are summed by the CSR conversion.
pub struct StiffnessAssembler {
    coo: CooMatrix<f64>,
}

impl StiffnessAssembler {
    pub fn new(size: usize) -> Self {
        Self {
            coo: CooMatrix::new(size, size),
        }
    }

    /// Add one entry; exact zeros are skipped
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        if value != 0.0 {
            self.coo.push(row, col, value);
        }
    }

    /// Scatter a global-axis sub-element matrix onto its two nodes
    pub fn add_block(&mut self, nodes: [usize; 2], k: &Mat12) {
        let dof = |local: usize| 6 * nodes[local / 6] + local % 6;
        for col in 0..12 {
            for (row, &value) in k.column(col).iter().enumerate() {
                self.add(dof(row), dof(col), value);
            }
        }
    }

    /// Entries pushed so far, before duplicates are summed
    pub fn nnz(&self) -> usize {
        self.coo.nnz()
    }

    pub fn into_csr(self) -> CsrMatrix<f64> {
        CsrMatrix::from(&self.coo)
    }
}

/// Expand a CSR matrix into a dense one
pub fn csr_to_dense(csr: &CsrMatrix<f64>) -> Mat {
    let mut mat = Mat::zeros(csr.nrows(), csr.ncols());
    for (row, col, &val) in csr.triplet_iter() {
        mat[(row, col)] += val;
    }
    mat
}

/// `L * L^T` factorization of a symmetric positive definite matrix in skyline storage
///
/// Row `i` keeps columns `first[i]..=i` of the lower triangle, packed one
/// row after another in `values`; row `i` starts at `offsets[i]`. The cost
/// follows the bandwidth of the node numbering, not the matrix size.
pub struct SkylineCholesky {
    first: Vec<usize>,
    offsets: Vec<usize>,
    values: Vec<f64>,
}

impl SkylineCholesky {
    /// Lower profile of a matrix given as `(row, col, value)` triplets
    ///
    /// Duplicates are summed. Entries above the diagonal are ignored, the
    /// matrix is taken as symmetric.
    pub fn from_triplets(size: usize, triplets: &[(usize, usize, f64)]) -> Self {
        let mut first: Vec<usize> = (0..size).collect();
        for &(row, col, _) in triplets.iter().filter(|(row, col, _)| col <= row) {
            first[row] = first[row].min(col);
        }

        let mut offsets = Vec::with_capacity(size + 1);
        offsets.push(0);
        for (row, &start) in first.iter().enumerate() {
            let next = offsets[row] + row - start + 1;
            offsets.push(next);
        }

        let mut values = vec![0.0; offsets[size]];
        for &(row, col, value) in triplets.iter().filter(|(row, col, _)| col <= row) {
            values[offsets[row] + col - first[row]] += value;
        }

        Self {
            first,
            offsets,
            values,
        }
    }

    pub fn size(&self) -> usize {
        self.first.len()
    }

    /// Stored entries of the profile
    pub fn profile_len(&self) -> usize {
        self.values.len()
    }

    /// Factorize in place
    ///
    /// Returns the row whose pivot drops to `tolerance` times its original
    /// diagonal or below. In a stiffness matrix that is a mechanism.
    pub fn factorize(&mut self, tolerance: f64) -> Result<(), usize> {
        for i in 0..self.size() {
            let fi = self.first[i];
            let (done, rest) = self.values.split_at_mut(self.offsets[i]);
            let row_i = &mut rest[..=i - fi];

            let diagonal = row_i[i - fi];
            if !(diagonal > 0.0) {
                return Err(i);
            }

            for j in fi..i {
                let fj = self.first[j];
                let row_j = &done[self.offsets[j]..self.offsets[j + 1]];
                let k0 = fi.max(fj);
                let dot: f64 = row_i[k0 - fi..j - fi]
                    .iter()
                    .zip(&row_j[k0 - fj..j - fj])
                    .map(|(a, b)| a * b)
                    .sum();
                row_i[j - fi] = (row_i[j - fi] - dot) / row_j[j - fj];
            }

            let (lower, pivot) = row_i.split_at_mut(i - fi);
            let reduced = diagonal - lower.iter().map(|l| l * l).sum::<f64>();
            if reduced <= tolerance * diagonal {
                return Err(i);
            }
            pivot[0] = reduced.sqrt();
        }
        Ok(())
    }

    fn row(&self, i: usize) -> (&[f64], f64) {
        let row = &self.values[self.offsets[i]..self.offsets[i + 1]];
        let (lower, pivot) = row.split_at(row.len() - 1);
        (lower, pivot[0])
    }

    /// Solve `L * L^T * x = b` after a successful factorization
    pub fn solve(&self, b: &DVector<f64>) -> DVector<f64> {
        let mut x = b.clone();

        for i in 0..self.size() {
            let (lower, pivot) = self.row(i);
            let known = x.as_slice()[self.first[i]..i]
                .iter()
                .zip(lower)
                .map(|(xj, l)| xj * l)
                .sum::<f64>();
            x[i] = (x[i] - known) / pivot;
        }

        // Columns of L^T are the stored rows
        for i in (0..self.size()).rev() {
            let (lower, pivot) = self.row(i);
            x[i] /= pivot;
            let xi = x[i];
            for (xj, l) in x.as_mut_slice()[self.first[i]..i].iter_mut().zip(lower) {
                *xj -= l * xi;
            }
        }
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tridiagonal() -> Vec<(usize, usize, f64)> {
        vec![
            (0, 0, 4.0),
            (0, 1, -1.0),
            (1, 0, -1.0),
            (1, 1, 4.0),
            (1, 2, -1.0),
            (2, 1, -1.0),
            (2, 2, 4.0),
        ]
    }

    #[test]
    fn test_assembler_sums_duplicates() {
        let mut assembler = StiffnessAssembler::new(2);
        assembler.add(0, 0, 1.5);
        assembler.add(0, 0, 2.5);
        assembler.add(1, 1, 3.0);
        assembler.add(1, 0, 0.0);
        assert_eq!(assembler.nnz(), 3);

        let dense = csr_to_dense(&assembler.into_csr());
        assert_relative_eq!(dense[(0, 0)], 4.0);
        assert_relative_eq!(dense[(1, 1)], 3.0);
        assert_relative_eq!(dense[(1, 0)], 0.0);
    }

    #[test]
    fn test_block_lands_on_node_dofs() {
        let k = Mat12::from_fn(|r, c| (1 + r + 12 * c) as f64);
        let mut assembler = StiffnessAssembler::new(18);
        assembler.add_block([2, 0], &k);
        let dense = csr_to_dense(&assembler.into_csr());

        // Start node 2 takes rows 12..18, end node 0 rows 0..6
        assert_eq!(dense[(12, 12)], k[(0, 0)]);
        assert_eq!(dense[(17, 0)], k[(5, 6)]);
        assert_eq!(dense[(3, 14)], k[(9, 2)]);
        assert_eq!(dense.rows(6, 6).abs().max(), 0.0);
    }

    #[test]
    fn test_skyline_solve() {
        let mut chol = SkylineCholesky::from_triplets(3, &tridiagonal());
        assert_eq!(chol.profile_len(), 5);
        chol.factorize(1e-12).unwrap();

        let b = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let x = chol.solve(&b);

        let mut dense = Mat::zeros(3, 3);
        for (r, c, v) in tridiagonal() {
            dense[(r, c)] += v;
        }
        assert_relative_eq!(dense * x, b, epsilon = 1e-12);
    }

    #[test]
    fn test_skyline_with_gaps_in_profile() {
        // Row 3 reaches back to column 0, rows 1 and 2 only hold their diagonal
        let triplets = vec![
            (0, 0, 5.0),
            (1, 1, 3.0),
            (2, 2, 2.0),
            (3, 3, 6.0),
            (3, 0, 1.0),
            (0, 3, 1.0),
            (3, 2, -1.0),
            (2, 3, -1.0),
        ];
        let mut chol = SkylineCholesky::from_triplets(4, &triplets);
        assert_eq!(chol.profile_len(), 7);
        chol.factorize(1e-12).unwrap();

        let b = DVector::from_vec(vec![1.0, -2.0, 0.5, 4.0]);
        let x = chol.solve(&b);
        let mut dense = Mat::zeros(4, 4);
        for (r, c, v) in triplets {
            dense[(r, c)] += v;
        }
        assert_relative_eq!(dense * x, b, epsilon = 1e-12);
    }

    #[test]
    fn test_skyline_detects_mechanism() {
        let triplets = vec![(0, 0, 1.0), (0, 1, -1.0), (1, 0, -1.0), (1, 1, 1.0)];
        let mut chol = SkylineCholesky::from_triplets(2, &triplets);
        assert_eq!(chol.factorize(1e-12), Err(1));
    }
}
