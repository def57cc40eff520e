//! Core linear-algebra traits for iterlin.
//!
//! The solver core consumes matrices and vectors exclusively through these
//! seams; it never cares whether storage is dense, compressed-row, or
//! compressed-column.

/// Matrix–vector product: y ← A x.
pub trait MatVec<V> {
    /// Compute y = A · x.
    fn matvec(&self, x: &V, y: &mut V);
}

/// Matrix-transpose–vector product: y ← Aᵀ x.
///
/// Required by the two-sided methods (BiCG, QMR); everything else works from
/// [`MatVec`] alone.
pub trait MatTransVec<V> {
    /// Compute y = Aᵀ · x.
    fn mattransvec(&self, x: &V, y: &mut V);
}

/// Inner products & norms.
pub trait InnerProduct<V> {
    /// Associated scalar type.
    type Scalar: Copy + PartialOrd;
    /// Compute dot(x, y).
    fn dot(&self, x: &V, y: &V) -> Self::Scalar;
    /// Compute ‖x‖₂.
    fn norm(&self, x: &V) -> Self::Scalar;
}

/// Row/column dimensions of a matrix.
pub trait MatShape {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;
}

/// Read a single entry. Preconditioner setup walks matrices through this;
/// sparse implementations may scan, so it is not a hot-path operation.
pub trait MatrixGet<T> {
    fn get(&self, i: usize, j: usize) -> T;
}
