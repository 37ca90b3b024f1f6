//! ProcessModel trait for pluggable dynamic systems.

use nalgebra::DVector;

/// A time-invariant dynamic system `dx/dt = f(x, u)`.
///
/// Implementations must be pure: no interior mutability, no side effects.
/// Vector lengths are fixed per model and reported by `state_dim` / `input_dim`;
/// passing vectors of any other length is a caller bug.
pub trait ProcessModel {
    /// Number of entries in the state vector.
    fn state_dim(&self) -> usize;

    /// Number of entries in the input vector.
    fn input_dim(&self) -> usize;

    /// Compute the state derivative for the given state and inputs.
    fn derivative(&self, state: &DVector<f64>, input: &DVector<f64>) -> DVector<f64>;
}
