//! # rigkit skeleton
//!
//! Transform hierarchy and 2D bone rig model for skeletal animation tools.
//!
//! ## Core Types
//!
//! - [`TransformTree`] / [`NodeId`]: arena of transform nodes with eagerly
//!   propagated world matrices
//! - [`Skeleton`]: bone list, factory and pose operations
//! - [`BoneRef`] / [`BoneMut`]: views of a single bone
//! - [`Pose`] / [`BonePose`]: position, rotation and length values
//!
//! ## Editing
//!
//! - Batch helpers on [`Skeleton`]: `rotate_bones`, `move_bones`,
//!   `free_move_bones`, `move_joints`, `create_bone`, `split_bone`
//! - [`DefaultPoseScope`]: temporarily shows the default pose
//! - [`SkeletonObserver`]: change notifications for the host
//! - [`BoneRecord`]: flat export and import

mod bone;
mod edit;
mod error;
mod events;
mod hierarchy;
mod naming;
mod node;
mod pose;
mod records;
mod scope;
mod settings;
mod skeleton;

pub use bone::{BoneColor, BoneId, BoneMut, BoneRef};
pub use error::{BindPoseError, RecordError};
pub use events::{EventLog, SkeletonEvent, SkeletonObserver};
pub use hierarchy::{Ancestors, TransformNode, TransformTree};
pub use node::NodeId;
pub use pose::{BonePose, Pose, PoseSpace};
pub use records::BoneRecord;
pub use scope::DefaultPoseScope;
pub use settings::RigSettings;
pub use skeleton::Skeleton;
