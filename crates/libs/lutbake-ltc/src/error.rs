/// Errors raised while configuring or running an LTC fit.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FitError {
    /// The table needs at least two entries per dimension.
    #[error("LUT size must be at least 2, got {0}")]
    LutSizeTooSmall(usize),
    /// The Monte-Carlo estimators need at least one sample.
    #[error("the number of stratified samples per dimension must be positive")]
    NoSamples,
    /// The roughness floor must be a positive finite number.
    #[error("minimum roughness must be positive and finite, got {0}")]
    InvalidMinAlpha(f32),
    /// Invalid parameters of the simplex search.
    #[error(
        "invalid simplex options: delta = {delta}, tolerance = {tolerance}, max iterations = \
         {max_iterations}"
    )]
    InvalidSimplex {
        /// Size of the initial simplex.
        delta: f64,
        /// Relative tolerance on the objective.
        tolerance: f64,
        /// Iteration limit.
        max_iterations: u32,
    },
    /// The fitted transform of a cell is singular or not finite.
    #[error("degenerate transform at roughness index {roughness_index}, view index {view_index}")]
    DegenerateCell {
        /// Index of the cell along the roughness axis.
        roughness_index: usize,
        /// Index of the cell along the view angle axis.
        view_index: usize,
    },
    /// Two tables that are combined cell by cell differ in size.
    #[error("table size mismatch: expected {expected} entries, found {found}")]
    TableSizeMismatch {
        /// Number of entries of the fitted table.
        expected: usize,
        /// Number of entries of the other table.
        found: usize,
    },
}
