//! Notifications the skeleton sends to its host.
//!
//! The skeleton owns no UI, undo or persistence. Hosts that care about
//! changes register a [`SkeletonObserver`] with
//! [`Skeleton::with_observer`](crate::Skeleton::with_observer). Any
//! `FnMut(&SkeletonEvent)` closure is an observer, and [`EventLog`] records
//! events for later inspection.
//!
//! ```
//! use rigkit_skeleton::{EventLog, Skeleton, SkeletonEvent};
//!
//! let log = EventLog::new();
//! let mut skeleton = Skeleton::new("rig").with_observer(log.clone());
//! skeleton.restore_default_pose();
//! assert_eq!(log.take(), vec![SkeletonEvent::PreviewPoseChanged]);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::bone::BoneId;

/// Something about a skeleton changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkeletonEvent {
    /// The previewed pose was replaced by the default pose.
    PreviewPoseChanged,
    /// Default and bind poses were recaptured.
    BindPoseChanged,
    /// Bones were created, destroyed, split or reordered.
    TopologyChanged,
    /// A bone was destroyed. Its handle is already dead.
    BoneDestroyed(BoneId),
}

/// Receives [`SkeletonEvent`]s.
pub trait SkeletonObserver {
    fn on_event(&mut self, event: &SkeletonEvent);
}

impl<F: FnMut(&SkeletonEvent)> SkeletonObserver for F {
    fn on_event(&mut self, event: &SkeletonEvent) {
        self(event)
    }
}

/// Shared, cloneable event recorder.
///
/// Clones share one buffer, so a host keeps one clone and hands another to
/// the skeleton.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<SkeletonEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every recorded event, oldest first.
    pub fn take(&self) -> Vec<SkeletonEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Whether an equal event is currently recorded.
    pub fn contains(&self, event: &SkeletonEvent) -> bool {
        self.events.borrow().contains(event)
    }
}

impl SkeletonObserver for EventLog {
    fn on_event(&mut self, event: &SkeletonEvent) {
        self.events.borrow_mut().push(*event);
    }
}
