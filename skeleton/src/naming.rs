//! Bone naming.
//!
//! Automatic names have the form `<stem>_<n>`. New bones inherit their
//! parent's stem and take a counter one past the largest counter already in
//! use anywhere in the skeleton, so names stay unique across branches.

use crate::bone::BoneId;
use crate::skeleton::Skeleton;

const ROOT_STEM: &str = "root";
const BONE_STEM: &str = "bone";

/// Splits an automatic name into stem and counter.
///
/// Names that do not end in `_<digits>` after a word character come back
/// whole, without a counter.
fn dissect(name: &str) -> (&str, Option<u32>) {
    let Some((stem, digits)) = name.rsplit_once('_') else {
        return (name, None);
    };
    let stem_ends_in_word = stem
        .chars()
        .next_back()
        .is_some_and(|c| c.is_alphanumeric() || c == '_');
    if !stem_ends_in_word || digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return (name, None);
    }
    match digits.parse() {
        Ok(counter) => (stem, Some(counter)),
        Err(_) => (name, None),
    }
}

impl Skeleton {
    /// Suggests a name for a new bone under `parent`.
    ///
    /// Bones without a parent bone use the stem `bone`.
    pub fn auto_bone_name(&self, parent: Option<BoneId>) -> String {
        let parent_name = parent.map_or(ROOT_STEM, |p| self.bone(p).name());
        let (stem, _) = dissect(parent_name);
        let stem = if stem == ROOT_STEM { BONE_STEM } else { stem };

        let biggest = self
            .bones()
            .iter()
            .filter_map(|&b| dissect(self.bone(b).name()).1)
            .max()
            .unwrap_or(0);

        format!("{stem}_{}", biggest.saturating_add(1))
    }

    /// Display name of `bone` that tells apart bones sharing a name.
    ///
    /// The first bone in list order with a given name keeps it. Later ones
    /// get ` (2)`, ` (3)` and so on appended.
    ///
    /// # Panics
    ///
    /// Panics if `bone` is not in the skeleton.
    pub fn unique_name(&self, bone: BoneId) -> String {
        let index = self
            .index_of(bone)
            .unwrap_or_else(|| panic!("{bone} is not in the skeleton"));
        let name = self.bone(bone).name();
        let earlier = self.bones()[..index]
            .iter()
            .filter(|&&b| self.bone(b).name() == name)
            .count();

        if earlier == 0 {
            name.to_owned()
        } else {
            format!("{name} ({})", earlier + 1)
        }
    }
}
