//! Objects placed on the chart and the ways to order them.

use std::cmp::Ordering;

use crate::time::{BeatValue, Span, TimeAnchor, TimeValue};

/// Something with an optional start and an optional end on the chart.
///
/// A missing start means "from the very beginning", a missing end "until the very
/// end". Point objects set the start only.
pub trait TimedObject {
    /// Where the object starts, if anywhere.
    fn start(&self) -> Option<&TimeAnchor>;

    /// Where the object ends, if anywhere.
    fn end(&self) -> Option<&TimeAnchor>;

    /// The start, else the end, else [`TimeAnchor::MIN`].
    fn anchor(&self) -> &TimeAnchor {
        self.start().or_else(|| self.end()).unwrap_or(&TimeAnchor::MIN)
    }

    /// The start, or [`TimeAnchor::MIN`].
    fn safe_start(&self) -> &TimeAnchor {
        self.start().unwrap_or(&TimeAnchor::MIN)
    }

    /// The end, or [`TimeAnchor::MAX`].
    fn safe_end(&self) -> &TimeAnchor {
        self.end().unwrap_or(&TimeAnchor::MAX)
    }

    /// The span in beats, unbounded sides saturated.
    fn beat_span(&self) -> Span<BeatValue> {
        Span::new(self.safe_start().beat(), self.safe_end().beat())
    }

    /// The span in time, unbounded sides saturated.
    fn time_span(&self) -> Span<TimeValue> {
        Span::new(self.safe_start().time(), self.safe_end().time())
    }
}

/// Mutable access to the anchors, for tempo resolution.
pub trait TimedObjectMut: TimedObject {
    /// The start anchor.
    fn start_mut(&mut self) -> Option<&mut TimeAnchor>;

    /// The end anchor.
    fn end_mut(&mut self) -> Option<&mut TimeAnchor>;
}

/// Which anchor of an object to order by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectEdge {
    /// [`TimedObject::anchor`].
    Anchor,
    /// [`TimedObject::safe_start`].
    Start,
    /// [`TimedObject::safe_end`].
    End,
}

/// Which axis to order by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// By beat.
    Beat,
    /// By time.
    Time,
}

/// A comparer for objects by one of their anchors on one axis, for `sort_by`.
pub fn compare_objects<T: TimedObject + ?Sized>(
    edge: ObjectEdge,
    axis: Axis,
) -> impl Fn(&T, &T) -> Ordering {
    move |a, b| {
        let pick = |object: &T| match edge {
            ObjectEdge::Anchor => *object.anchor(),
            ObjectEdge::Start => *object.safe_start(),
            ObjectEdge::End => *object.safe_end(),
        };
        let (a, b) = (pick(a), pick(b));
        match axis {
            Axis::Beat => a.cmp_beat(&b),
            Axis::Time => a.cmp_time(&b),
        }
    }
}

/// Identifies a [`ChartObject`] for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectId(u32);

impl ObjectId {
    /// Wraps a raw id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// The raw id.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for ObjectId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<ObjectId> for u32 {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

/// A note: a single point or a held range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartObject {
    /// The caller's id for this note.
    pub id: ObjectId,
    start: TimeAnchor,
    end: TimeAnchor,
}

impl ChartObject {
    /// A note judged at one point.
    #[must_use]
    pub const fn single(id: ObjectId, anchor: TimeAnchor) -> Self {
        Self {
            id,
            start: anchor,
            end: anchor,
        }
    }

    /// A note held from `start` to `end`.
    #[must_use]
    pub const fn ranged(id: ObjectId, start: TimeAnchor, end: TimeAnchor) -> Self {
        Self { id, start, end }
    }

    /// Whether start and end are the same beat.
    #[must_use]
    pub fn is_single(&self) -> bool {
        self.start.beat() == self.end.beat()
    }
}

impl TimedObject for ChartObject {
    fn start(&self) -> Option<&TimeAnchor> {
        Some(&self.start)
    }

    fn end(&self) -> Option<&TimeAnchor> {
        Some(&self.end)
    }
}

impl TimedObjectMut for ChartObject {
    fn start_mut(&mut self) -> Option<&mut TimeAnchor> {
        Some(&mut self.start)
    }

    fn end_mut(&mut self) -> Option<&mut TimeAnchor> {
        Some(&mut self.end)
    }
}
