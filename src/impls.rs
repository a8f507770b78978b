//! Submodule providing the concrete containers: the CSC matrix in both
//! pointer widths, the runtime-width wrapper, and the dense matrix.

pub mod any_csc2d;
pub mod csc2d;
mod csc2d_concat;
mod csc2d_dense;
mod csc2d_transpose;
pub mod dense;

pub use any_csc2d::{AnyCSC2D, PointerWidth};
pub use csc2d::{CSC2D, CSC2D32, CSC2D64};
pub use dense::DenseMatrix;
