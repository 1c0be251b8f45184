//! Error types for skeleton operations.

use thiserror::Error;

use crate::bone::BoneId;

/// Capturing a bind pose failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindPoseError {
    /// The bone or one of its ancestors has a non-unit local scale.
    #[error("bind pose of {bone} cannot be set under inherited scale")]
    ScaledHierarchy {
        /// The bone whose pose was being captured.
        bone: BoneId,
    },
}

/// Rebuilding a skeleton from flat bone records failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// A record names a parent index past the end of the record list.
    #[error("record {record} has parent {parent} but only {count} records exist")]
    ParentOutOfRange {
        record: usize,
        parent: usize,
        count: usize,
    },
    /// A record's parent appears at or after the record itself.
    #[error("record {record} has parent {parent}, parents must come first")]
    ParentNotBefore { record: usize, parent: usize },
    /// The rebuilt bones could not capture their default pose.
    #[error(transparent)]
    BindPose(#[from] BindPoseError),
}
