//! GPU uniform layout for the motion matrices

// bytemuck's derives expand to `unsafe impl` blocks.
#![allow(unsafe_code)]

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::Mat4Ext;
use crate::motion::PublishedMatrices;

/// Motion matrix uniform block
///
/// Three column-major mat4s in binding order: previous model, current inverse
/// model, current model. 192 bytes, std140 and std430 compatible.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MotionMatrixUniforms {
    /// Previous tick's model matrix
    pub previous_model: [[f32; 4]; 4],
    /// Inverse of this tick's model matrix
    pub current_inverse_model: [[f32; 4]; 4],
    /// This tick's model matrix
    pub current_model: [[f32; 4]; 4],
}

impl MotionMatrixUniforms {
    /// Raw bytes for a buffer upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl From<&PublishedMatrices> for MotionMatrixUniforms {
    fn from(published: &PublishedMatrices) -> Self {
        Self {
            previous_model: published.previous.to_cols_array_2d(),
            current_inverse_model: published.current_inverse.to_cols_array_2d(),
            current_model: published.current.to_cols_array_2d(),
        }
    }
}

impl From<PublishedMatrices> for MotionMatrixUniforms {
    fn from(published: PublishedMatrices) -> Self {
        Self::from(&published)
    }
}
