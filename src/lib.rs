//! Timeline construction and windowed judgment scheduling for rhythm-game charts.
//!
//! A chart is a sparse description: a beat-sorted list of [`chart::TempoChange`]s,
//! a list of ranged [`chart::Effect`]s (scroll speed, note speed, scroll jumps,
//! time signatures, bar visibility, chorus) and note objects placed on a dual
//! beat/time axis. This crate turns that description into
//!
//! - a [`timeline::Timeline`], an ordered list of [`timeline::TimeCarrier`]
//!   breakpoints queryable by time, beat or roll (scroll position), and
//! - a [`judge::JudgeQueue`] that moves note carriers from pending to active to
//!   retired as the input clock advances, exposing the set of judge units a
//!   judge rule has to consider on each frame.
//!
//! # Order of Processing
//!
//! When several events share a beat, the timeline builder emits one breakpoint per
//! event in this order:
//!
//! - tempo changes,
//! - effect start edges, by effect index,
//! - effect end edges, by effect index.
//!
//! The last breakpoint at a beat carries the half-open state `[start, end)` of every
//! effect and is the one returned by lookups.
//!
//! # Example
//!
//! ```
//! use beatline::prelude::*;
//!
//! let tempos = vec![TempoChange::at_beat(120.0, BeatValue::ZERO)];
//! let effects = vec![Effect::new(
//!     EffectKind::ScrollSpeed,
//!     EffectValue::Number(2.0),
//!     Some(TimeAnchor::from_beat(BeatValue::from_count(2))),
//!     Some(TimeAnchor::from_beat(BeatValue::from_count(4))),
//! )];
//! let mut chart = Chart::new(tempos, effects, Vec::new());
//! chart.resolve_times().expect("tempo list is sorted");
//!
//! let timeline = TimelineBuilder::default().build_chart(&chart).expect("valid chart");
//! assert_eq!(timeline.carriers().len(), 3);
//! assert_eq!(timeline.scroll_velocity_at_beat(BeatValue::from_count(3)), 2.0);
//! ```

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod chart;
pub mod error;
pub mod judge;
pub mod prelude;
pub mod time;
pub mod timeline;
