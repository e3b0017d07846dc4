//! Material parameter storage

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::foundation::math::Mat4;

/// Named shader-parameter write access
///
/// The only capability a tracker needs from the rendering side. Writing a key
/// that already holds a value overwrites it.
pub trait MaterialParameters {
    /// Store `value` under `key`
    fn set_named_matrix(&mut self, key: &str, value: &Mat4);
}

impl<T: MaterialParameters + ?Sized> MaterialParameters for &mut T {
    fn set_named_matrix(&mut self, key: &str, value: &Mat4) {
        (**self).set_named_matrix(key, value);
    }
}

/// In-memory material holding named matrix parameters
#[derive(Debug, Clone, Default)]
pub struct Material {
    name: String,
    matrices: HashMap<String, Mat4>,
    write_count: u64,
}

impl Material {
    /// Create an empty material
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Material name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value of a matrix parameter
    pub fn matrix(&self, key: &str) -> Option<&Mat4> {
        self.matrices.get(key)
    }

    /// Number of distinct parameters set
    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    /// True when no parameter has been set
    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    /// Total writes since creation, overwrites included
    pub fn write_count(&self) -> u64 {
        self.write_count
    }

    /// Iterate over all parameters
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Mat4)> {
        self.matrices.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl MaterialParameters for Material {
    fn set_named_matrix(&mut self, key: &str, value: &Mat4) {
        if let Some(slot) = self.matrices.get_mut(key) {
            *slot = *value;
        } else {
            self.matrices.insert(key.to_owned(), *value);
        }
        self.write_count += 1;
    }
}

/// Shared handle to a [`Material`] owned by the rendering side
///
/// Clones refer to the same material, so several trackers can write to one
/// material and a renderer can read it afterwards. A poisoned lock is
/// recovered: parameter writes cannot leave the map half-updated.
#[derive(Debug, Clone, Default)]
pub struct SharedMaterial {
    inner: Arc<RwLock<Material>>,
}

impl SharedMaterial {
    /// Create a shared handle to a new empty material
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_material(Material::new(name))
    }

    /// Wrap an existing material
    pub fn from_material(material: Material) -> Self {
        Self {
            inner: Arc::new(RwLock::new(material)),
        }
    }

    /// Read access for the consuming render pass
    pub fn read(&self) -> RwLockReadGuard<'_, Material> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write access
    pub fn write(&self) -> RwLockWriteGuard<'_, Material> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of a matrix parameter
    pub fn matrix(&self, key: &str) -> Option<Mat4> {
        self.read().matrix(key).copied()
    }

    /// Whether two handles refer to the same material
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl MaterialParameters for SharedMaterial {
    fn set_named_matrix(&mut self, key: &str, value: &Mat4) {
        self.write().set_named_matrix(key, value);
    }
}
