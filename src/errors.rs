//! Submodule defining the error taxonomy: matrix construction and
//! rearrangement errors, and errors of the marker engine.

mod markers;
mod matrix;

pub use markers::{MarkerError, PartitionError};
pub use matrix::{MalformedMatrixError, MatrixError};
