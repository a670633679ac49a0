//! Traversal and linearization for fabula graphs.
//!
//! Two read paths over a built graph:
//!
//! - [`Walker`] executes the graph: from the start sentinel to the end
//!   sentinel, letting bound selectors pick edges and edge transitions fire
//!   their predicate/processor strategies.
//! - [`chapter_order`] linearizes the graph: one total reading order over
//!   every vertex reachable from the start sentinel, with branches anchored
//!   at the checkpoints where paths reconverge.
//!
//! Both run synchronously to completion; the walker carries an explicit
//! step bound since the graph model itself has no cycle guard.

mod chapters;
mod error;
mod walker;

pub use chapters::{chapter_order, chapter_order_between};
pub use error::{EngineError, EngineResult};
pub use walker::{walk_graph, WalkConfig, WalkOutcome, Walker};
