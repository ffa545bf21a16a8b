//! Tween-driven animation: Bezier motion paths and the tween scheduler.

pub mod bezier;
pub mod tween;

pub use bezier::{BezierKind, BezierPath};
pub use tween::{Axes, Channel, Path, Segment, Tween, TweenId, Tweens};
