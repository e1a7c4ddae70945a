//! Timeline reconstruction: turn naming, channel timelines and merge graphs.
//!
//! Everything here is pure. I/O lives in `media` and `processor`.

pub mod graph;
pub mod timeline;
pub mod turn;

pub use graph::{MergeGraph, MergeStep, compile};
pub use timeline::{ClipId, Segment, Timelines};
pub use turn::{ParsedTurn, Role, SkipReason, Turn, assemble, parse};
