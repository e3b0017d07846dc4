//! Rendering-side sinks for published matrices
//!
//! The concrete graphics API is out of scope. This module provides the
//! named-parameter interface the trackers write through, an in-memory
//! material implementing it, and a GPU-ready uniform block layout.

pub mod material;
pub mod uniforms;

pub use material::{Material, MaterialParameters, SharedMaterial};
pub use uniforms::MotionMatrixUniforms;
