//! Live election results.
//!
//! [`compute_chart`] turns one question's per-option counts into pie
//! segments: running angles from twelve o'clock, percentages, colours and
//! the leading option(s). [`LivePoller`] re-queries the backend on a fixed
//! interval (and on demand) and publishes each chart through a `watch`
//! channel for as long as its handle is alive.

pub mod chart;
pub mod error;
pub mod poller;

pub use chart::{chart_for, compute_chart, PieChart, PieSegment, SegmentShape, FULL_CIRCLE_PERCENT, PALETTE};
pub use error::ChartError;
pub use poller::{LivePoller, LiveResults, PollTarget, DEFAULT_POLL_INTERVAL, MIN_POLL_INTERVAL};
