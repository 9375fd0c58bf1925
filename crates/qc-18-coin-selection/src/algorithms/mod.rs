//! # Algorithms Module
//!
//! Pure selection and planning algorithms.

pub mod accumulator;
pub mod backoff;
pub mod exit_planner;
pub mod move_planner;

pub use accumulator::Accumulator;
pub use backoff::{backoff_delay, jittered_backoff};
pub use exit_planner::plan_exit;
pub use move_planner::plan_move;
