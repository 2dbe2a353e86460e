//! Temporary material blanking for the bloom pass.
//!
//! Before the bloom render every mesh outside the bloom layer has its
//! material stashed here and replaced with a shared blanking material.
//! Right after the bloom render the stash is drained back. The cache is
//! empty between frames.

use rustc_hash::FxHashMap;

use super::{MaterialId, ObjectId, SceneGraph};

/// `ObjectId -> original MaterialId` side table.
#[derive(Debug, Default)]
pub struct MaterialSwapCache {
    saved: FxHashMap<ObjectId, MaterialId>,
}

impl MaterialSwapCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the material of every non-bloom mesh with `blank`, in
    /// pre-order, remembering the originals. Returns how many meshes were
    /// blanked.
    ///
    /// Must not be called again before [`restore_materials`] has drained
    /// the cache.
    ///
    /// [`restore_materials`]: Self::restore_materials
    pub fn hide_non_bloom(
        &mut self,
        scene: &mut SceneGraph,
        blank: MaterialId,
    ) -> usize {
        debug_assert!(
            self.saved.is_empty(),
            "hide_non_bloom called with {} materials still swapped",
            self.saved.len()
        );
        for id in scene.pre_order() {
            let Some(obj) = scene.get_mut(id) else { continue };
            if !obj.is_mesh() || obj.is_bloom_eligible() {
                continue;
            }
            if let Some(original) = obj.replace_material(blank) {
                let _ = self.saved.insert(id, original);
            }
        }
        self.saved.len()
    }

    /// Put every stashed material back and empty the cache. Objects that
    /// were removed (or stopped being meshes) in the meantime are skipped.
    /// Returns how many materials were restored.
    pub fn restore_materials(&mut self, scene: &mut SceneGraph) -> usize {
        let mut restored = 0;
        for (id, original) in self.saved.drain() {
            match scene.get_mut(id).and_then(|o| o.replace_material(original))
            {
                Some(_) => restored += 1,
                None => log::trace!("swap cache: {id:?} gone before restore"),
            }
        }
        restored
    }

    /// Number of currently swapped objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.saved.len()
    }

    /// Whether nothing is swapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }
}
