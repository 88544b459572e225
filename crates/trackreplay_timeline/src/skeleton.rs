// SPDX-License-Identifier: MIT OR Apache-2.0
//! Skeleton setup records and animation state samples.

use serde::{Deserialize, Serialize};

/// Parent index used for root bones
pub const ROOT_PARENT: i32 = -1;

/// Sub-asset index recorded when the mesh is the only one in its asset
pub const UNAMBIGUOUS_SUB_ASSET: i32 = -1;

/// A bone in a rig, referring to its parent by position in the bone list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bone {
    /// Bone name
    pub name: String,
    /// Index of the parent bone, or [`ROOT_PARENT`]
    pub parent: i32,
}

impl Bone {
    /// Create a bone
    pub fn new(name: impl Into<String>, parent: i32) -> Self {
        Self {
            name: name.into(),
            parent,
        }
    }

    /// Create a root bone
    pub fn root(name: impl Into<String>) -> Self {
        Self::new(name, ROOT_PARENT)
    }

    /// Whether this bone has no parent
    pub fn is_root(&self) -> bool {
        self.parent == ROOT_PARENT
    }
}

/// A skinned mesh bound to a subset of the rig
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Skin {
    /// Asset path of the mesh
    pub mesh_path: String,
    /// Index of the mesh inside its asset, or [`UNAMBIGUOUS_SUB_ASSET`]
    pub sub_asset_index: i32,
    /// Asset paths of the materials, in slot order
    pub material_paths: Vec<String>,
    /// Indices into the rig's bone list, in the skin's joint order
    pub joint_indices: Vec<i32>,
}

/// One-time structural data for a skeletal track
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SkeletonSetup {
    /// Bones in hierarchy order
    pub bones: Vec<Bone>,
    /// Skinned meshes driven by the rig
    pub skins: Vec<Skin>,
    /// Asset path of the animator controller
    pub animator_controller: String,
}

impl SkeletonSetup {
    /// Indices of the root bones
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.bones
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_root())
            .map(|(i, _)| i)
    }

    /// Indices of the direct children of a bone
    pub fn children(&self, bone: usize) -> impl Iterator<Item = usize> + '_ {
        self.bones
            .iter()
            .enumerate()
            .filter(move |(_, b)| usize::try_from(b.parent).ok() == Some(bone))
            .map(|(i, _)| i)
    }
}

/// Animator state captured at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationState {
    /// Name of the playing clip
    pub clip_name: String,
    /// Normalized clip time; the integer part counts completed loops
    pub normalized_time: f32,
}

impl AnimationState {
    /// Create an animation state
    pub fn new(clip_name: impl Into<String>, normalized_time: f32) -> Self {
        Self {
            clip_name: clip_name.into(),
            normalized_time,
        }
    }
}

/// Resolve the sub-asset index to record for a mesh
///
/// `mesh_count` is how many meshes the containing asset holds and
/// `index_in_asset` is this mesh's position among the asset's sub-objects.
pub fn sub_asset_index(mesh_count: usize, index_in_asset: usize) -> i32 {
    if mesh_count > 1 {
        i32::try_from(index_in_asset).unwrap_or(i32::MAX)
    } else {
        UNAMBIGUOUS_SUB_ASSET
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_asset_index() {
        assert_eq!(sub_asset_index(1, 0), UNAMBIGUOUS_SUB_ASSET);
        assert_eq!(sub_asset_index(1, 3), UNAMBIGUOUS_SUB_ASSET);
        assert_eq!(sub_asset_index(3, 2), 2);
    }

    #[test]
    fn test_hierarchy_queries() {
        let setup = SkeletonSetup {
            bones: vec![
                Bone::root("Root"),
                Bone::new("Hip", 0),
                Bone::new("Spine", 1),
                Bone::new("LeftLeg", 1),
            ],
            ..Default::default()
        };
        assert_eq!(setup.roots().collect::<Vec<_>>(), vec![0]);
        assert_eq!(setup.children(1).collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(setup.children(2).count(), 0);
    }
}
