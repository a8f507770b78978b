#![doc = include_str!("../README.md")]

pub mod errors;
pub mod impls;
pub mod traits;

/// Prelude module re-exporting the container types, the marker kernels and
/// the error taxonomy.
pub mod prelude {
    pub use crate::{errors::*, impls::*, traits::*};
}
