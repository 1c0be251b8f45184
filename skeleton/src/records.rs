//! Flat bone records for export to runtime formats.
//!
//! A record list is a skeleton flattened into parent-indexed entries, the
//! shape sprite runtimes consume. Parent indices point into the same list.

use rigkit_core::math::{self, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::bone::BoneId;
use crate::error::RecordError;
use crate::settings::RigSettings;
use crate::skeleton::Skeleton;

/// One bone of a flattened skeleton.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneRecord {
    pub name: String,
    /// Local position for bones with a parent record, otherwise position
    /// relative to the export root. `z` carries the bone's depth.
    pub position: Vec3,
    /// Local rotation for bones with a parent record, otherwise world
    /// rotation.
    pub rotation: Quat,
    pub length: f32,
    /// Index of the parent record, `None` for top-level bones.
    pub parent: Option<usize>,
}

impl Skeleton {
    /// Flattens `bones` into records.
    ///
    /// A bone whose parent bone is not in `bones` becomes a top-level record.
    /// Its position is expressed relative to `root_transform`.
    pub fn to_records(&self, bones: &[BoneId], root_transform: &Mat4) -> Vec<BoneRecord> {
        let to_root = math::inverse_or_identity(root_transform);
        bones
            .iter()
            .map(|&id| {
                let bone = self.bone(id);
                let parent = bone
                    .parent_bone()
                    .and_then(|p| bones.iter().position(|&b| b == p));
                let (position, rotation) = match parent {
                    Some(_) => (bone.local_position(), bone.local_rotation()),
                    None => (
                        math::transform_point3(&to_root, bone.position()),
                        bone.rotation(),
                    ),
                };
                BoneRecord {
                    name: bone.name().to_owned(),
                    position: Vec3::new(position.x, position.y, bone.depth()),
                    rotation,
                    length: bone.local_length(),
                    parent,
                }
            })
            .collect()
    }

    /// Rebuilds a skeleton from records and captures its default pose.
    ///
    /// Parents must come before their children. Bones whose joint sits on
    /// their parent's tip are chained to it again.
    pub fn from_records(
        name: impl Into<String>,
        records: &[BoneRecord],
        settings: RigSettings,
    ) -> Result<Self, RecordError> {
        for (record, entry) in records.iter().enumerate() {
            match entry.parent {
                Some(parent) if parent >= records.len() => {
                    return Err(RecordError::ParentOutOfRange {
                        record,
                        parent,
                        count: records.len(),
                    });
                }
                Some(parent) if parent >= record => {
                    return Err(RecordError::ParentNotBefore { record, parent });
                }
                _ => {}
            }
        }

        let mut skeleton = Skeleton::new(name).with_settings(settings);
        let mut ids = Vec::with_capacity(records.len());
        for entry in records {
            let id = skeleton.spawn_bone(entry.name.clone());
            let parent = entry.parent.map_or(skeleton.root(), |p| ids[p]);
            let mut bone = skeleton.bone_mut(id);
            bone.set_local_position(Vec3::new(entry.position.x, entry.position.y, 0.0));
            bone.set_local_rotation(entry.rotation);
            bone.set_local_length(entry.length);
            bone.set_depth(entry.position.z);
            bone.set_parent(Some(parent), false);
            skeleton.add_bone(id, false);
            ids.push(id.node());
        }

        skeleton.set_default_pose()?;
        log::debug!("rebuilt {} bones from records", records.len());
        Ok(skeleton)
    }
}
