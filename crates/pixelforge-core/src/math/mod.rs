//! Fixed-point conversion and matrix helpers.

pub mod fixed;
pub mod matrix;

pub use self::fixed::{decode, encode};
pub use self::matrix::MatrixStack;
