/// Additively combine partial results
///
/// Merging must be associative and commutative up to floating-point
/// rounding, so that the result does not depend on how events were
/// distributed over streams.
pub trait Merge {
    fn merge(&mut self, other: &Self);
}

/// Progress indicator
pub trait Progress {
    /// Advance the progress indicator by the given amount
    fn inc(&self, i: u64);

    /// Finish progress
    fn finish(&self);
}
